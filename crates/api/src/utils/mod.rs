//! Shared helpers for command execution

pub mod command_helpers;
pub mod logging;
