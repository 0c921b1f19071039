//! wire_trace library: HTTP wire traces with redirect chains
//!
//! This library reconstructs the complete, human-readable wire trace of an
//! HTTP transaction, including every hop of a followed redirect chain in the
//! order the hops happened, and normalizes transport artifacts (gzip content
//! encoding, consumed request bodies, raw vs structured requests) so that
//! matchers downstream see canonical byte streams.
//!
//! # Example
//!
//! ```
//! use wire_trace::{dump_response_with_redirect_chain, Request, Response};
//!
//! let first = Response::new(301).with_header("Location", "/new");
//! let mut last = Response::new(200)
//!     .with_request(Request::new("GET", "http://example.com/new").redirected_from(first));
//!
//! let dump = dump_response_with_redirect_chain(&mut last, b"hello").unwrap();
//! assert_eq!(
//!     dump,
//!     b"HTTP/1.1 301 Moved Permanently\r\nLocation: /new\r\n\r\nHTTP/1.1 200 OK\r\n\r\nhello"
//! );
//! ```
//!
//! Live traffic is captured with [`Tracer`], which needs a Tokio runtime.

pub mod capture;
pub mod config;
mod decompress;
pub mod dump;
pub mod error_handling;
pub mod initialization;
pub mod model;
mod probe;

// Re-export public API
pub use capture::{CaptureOptions, Tracer, Transaction};
pub use config::{Config, LogFormat, LogLevel};
pub use decompress::{decompress_body, Decompressed};
pub use dump::{
    dump_request, dump_response_with_redirect_chain, headers_to_string, ChainDump, ChainDumper,
    RequestDumper, Truncation,
};
pub use error_handling::{
    CaptureError, DecompressionError, DumpError, DumpStats, RenderError, RequestDumpError,
    SerializationError,
};
pub use model::{Body, GeneratedRequest, HeaderMultimap, RawRequest, Request, Response};
pub use probe::raw_has_body;
