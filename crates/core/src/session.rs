//! Session capability handed to consumers outside the sync pipeline

use ravenfleet_domain::{AuditLogEntry, AuditRecord, Result};

use crate::auth::SessionToken;
use crate::fleet::FleetSync;

/// `{api_url, token, add_log_entry, refresh_token}` bound to the current
/// session.
///
/// Calls made with this handle are expected to report themselves through
/// [`SessionHandle::add_log_entry`] so the audit log stays complete.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    session: SessionToken,
    sync: FleetSync,
}

impl SessionHandle {
    pub(crate) fn new(session: SessionToken, sync: FleetSync) -> Self {
        Self { session, sync }
    }

    pub fn api_url(&self) -> &str {
        self.session.api_url()
    }

    pub fn token(&self) -> &str {
        self.session.token()
    }

    pub fn add_log_entry(&self, record: AuditRecord) -> AuditLogEntry {
        self.sync.audit_log().append(record)
    }

    /// Renew the token this handle carries.
    ///
    /// Handles sharing a stale token converge on one re-login.
    ///
    /// # Errors
    /// `FleetError::SessionExpired` when the re-login fails; the whole
    /// session has been reset by then.
    pub async fn refresh_token(&mut self) -> Result<&str> {
        self.session = self.sync.refresh_session(&self.session).await?;
        Ok(self.session.token())
    }
}
