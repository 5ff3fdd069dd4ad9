//! HTTP transport and the audited exchange built on it

pub mod client;
pub mod exchange;
mod path;

pub use client::{HttpClient, HttpClientBuilder};
pub use exchange::{ExchangeRequest, HttpExchange};
pub(crate) use path::encode_path_segment;
