//! Key-value stores backing the credential vault

pub mod file_store;
pub mod memory;

pub use file_store::JsonFileStore;
pub use memory::MemoryStore;
