//! Commands - the surface a front-end or the CLI drives

mod fleet;
mod logs;
mod session;

pub use fleet::*;
pub use logs::*;
pub use session::*;
