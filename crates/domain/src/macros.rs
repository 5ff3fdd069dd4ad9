//! Macro for implementing Display and FromStr for state-machine enums
//!
//! Token and sync states are logged and serialized by name; this macro keeps
//! the string forms in one place per enum.
//!
//! # Example
//!
//! ```rust
//! use ravenfleet_domain::impl_state_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum LinkState {
//!     Idle,
//!     Connected,
//! }
//!
//! impl_state_conversions!(LinkState {
//!     Idle => "idle",
//!     Connected => "connected",
//! });
//!
//! assert_eq!(LinkState::Connected.to_string(), "connected");
//! assert_eq!("IDLE".parse::<LinkState>(), Ok(LinkState::Idle));
//! ```

/// Implements Display and FromStr traits for state enums
///
/// - Display writes the given string for each variant
/// - FromStr parses case-insensitively and reports the enum name on failure
#[macro_export]
macro_rules! impl_state_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
