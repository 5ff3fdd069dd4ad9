//! Port interfaces for authentication

use async_trait::async_trait;
use ravenfleet_domain::{Credentials, Result};

/// Performs the login exchange against the fleet API.
///
/// There is no refresh-token grant: renewing a token means logging in again
/// with the same credentials.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange credentials for a bearer token.
    ///
    /// A rejected exchange is reported as `FleetError::Auth`.
    async fn login(&self, credentials: &Credentials) -> Result<String>;
}
