//! Command execution helpers
//!
//! Times and logs each command so the individual command functions stay
//! focused on their own logic.

use std::future::Future;
use std::time::Instant;

use ravenfleet_domain::Result as DomainResult;

use crate::utils::logging::{error_label, log_command_execution};

/// Execute a command with automatic timing and logging
///
/// # Example
///
/// ```rust,ignore
/// pub async fn my_command(ctx: &AppContext) -> DomainResult<MyResponse> {
///     execute_command("fleet::my_command", || async {
///         ctx.sync.sync(true).await.map(MyResponse::from)
///     })
///     .await
/// }
/// ```
pub async fn execute_command<F, Fut, T>(command_name: &str, command_fn: F) -> DomainResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();

    let result = command_fn().await;

    let error_type = result.as_ref().err().map(error_label);
    log_command_execution(command_name, start.elapsed(), result.is_ok(), error_type);

    result
}
