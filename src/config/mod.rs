//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (limits, defaults)
//! - HTTP header name constants
//! - Library configuration and CLI option types

mod constants;
mod headers;
mod types;

// Re-export all constants
pub use constants::*;
pub use headers::*;
pub use types::{parse_header_arg, Config, LogFormat, LogLevel, Opt};
