//! Audit log commands

use ravenfleet_domain::AuditLogEntry;

use crate::context::AppContext;

/// All retained audit entries, oldest first.
pub fn get_logs(ctx: &AppContext) -> Vec<AuditLogEntry> {
    ctx.audit.entries()
}

pub fn clear_logs(ctx: &AppContext) {
    ctx.audit.clear();
}
