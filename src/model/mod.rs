//! In-memory HTTP data model.
//!
//! This module provides:
//! - `Response` / `Request`: the backward-linked redirect graph
//! - `Body`: single-pass body streams
//! - `HeaderMultimap`: ordered, multi-valued headers
//! - `GeneratedRequest`: structured vs raw request representations

mod body;
mod headers;
mod types;

// Re-export public API
pub use body::Body;
pub(crate) use headers::is_token_byte;
pub use headers::{canonical_header_name, HeaderMultimap};
pub use types::{GeneratedRequest, RawRequest, Request, Response};
