//! Authentication: login port and token lifecycle

pub mod ports;
pub mod token_manager;

pub use ports::AuthGateway;
pub use token_manager::{SessionToken, TokenManager, TokenState};
