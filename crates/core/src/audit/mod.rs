//! Audit log of outbound calls

pub mod log;

pub use log::AuditLog;
