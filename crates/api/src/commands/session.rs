//! Session commands: sign in, resume, refresh, sign out

use ravenfleet_core::FleetSnapshot;
use ravenfleet_domain::{Credentials, FleetError, Result as DomainResult};
use serde::Serialize;
use tracing::info;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Token details safe to show; the bearer value itself is not included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub api_url: String,
    pub token_state: String,
}

/// Validate and save credentials, then run a full sync pass.
///
/// On failure the credentials are discarded again and the error is returned.
pub async fn login(
    ctx: &AppContext,
    api_url: &str,
    api_key: &str,
    api_secret: &str,
) -> DomainResult<FleetSnapshot> {
    execute_command("session::login", move || async move {
        let credentials = Credentials::new(api_url, api_key, api_secret)?;
        info!(api_url = %credentials.api_url(), "signing in");
        let snapshot = ctx.sync.submit_credentials(credentials).await?;
        Ok(FleetSnapshot::clone(&snapshot))
    })
    .await
}

/// Resume from saved credentials. `None` when nothing is saved.
pub async fn restore_session(ctx: &AppContext) -> DomainResult<Option<FleetSnapshot>> {
    execute_command("session::restore_session", move || async move {
        let restored = ctx.sync.restore().await?;
        Ok(restored.map(|snapshot| FleetSnapshot::clone(&snapshot)))
    })
    .await
}

/// Force a token refresh on the live session.
///
/// A failed refresh ends the session.
pub async fn refresh_session(ctx: &AppContext) -> DomainResult<SessionInfo> {
    execute_command("session::refresh_session", move || async move {
        let token = ctx.sync.refresh_token().await?;
        Ok(SessionInfo {
            api_url: token.api_url().to_string(),
            token_state: ctx.sync.token_state().to_string(),
        })
    })
    .await
}

/// Current session, if one is live.
pub fn session_info(ctx: &AppContext) -> DomainResult<SessionInfo> {
    let session = ctx
        .sync
        .session()
        .ok_or_else(|| FleetError::invalid_state("no active session"))?;
    Ok(SessionInfo {
        api_url: session.api_url().to_string(),
        token_state: ctx.sync.token_state().to_string(),
    })
}

/// Drop the token, fleet data, audit log and saved credentials.
pub async fn logout(ctx: &AppContext) -> DomainResult<()> {
    execute_command("session::logout", move || async move { ctx.sync.logout().await }).await
}
