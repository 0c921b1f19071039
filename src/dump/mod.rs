//! Wire dumps of requests, responses and redirect chains.
//!
//! This module provides:
//! - Redirect chain dumps in chronological order (`chain`)
//! - `Name: value` header serialization (`headers`)
//! - Request dumps for structured and raw requests (`request`)
//! - The renderer and serializer capabilities they build on (`render`, `raw`)

mod chain;
mod headers;
mod raw;
mod render;
mod request;

// Re-export public API
pub use chain::{dump_response_with_redirect_chain, ChainDump, ChainDumper, Truncation};
pub use headers::headers_to_string;
pub use raw::{
    NoopExpander, RawHttp1Serializer, RawOptions, RawWireSerializer, TemplateExpander,
    VariableExpander,
};
pub use render::{dump_request_out, Http1Renderer, ResponseRenderer};
pub use request::{dump_request, structured_body_bytes, RequestDumper};
