//! External VIN lookup

pub mod nhtsa;

pub use nhtsa::NhtsaVinDecoder;
