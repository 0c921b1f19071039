//! Configuration constants.
//!
//! This module defines the limits and defaults used throughout the crate.

/// Maximum number of hops walked when dumping a redirect chain.
///
/// Chains are bounded by the client's redirect limit in practice; this caps
/// the backward walk independently of it.
pub const MAX_CHAIN_DEPTH: usize = 32;

/// Maximum number of body bytes read when probing a raw request for a body.
pub const BODY_PROBE_LIMIT: usize = 512;

/// Maximum number of header lines accepted when probing a raw request.
pub const MAX_PROBE_HEADERS: usize = 128;

// Redirect handling
/// Maximum number of redirect hops to follow during capture
pub const MAX_REDIRECT_HOPS: usize = 10;

/// Maximum body size kept per hop during capture, in bytes (10MB).
///
/// Applies to bytes read off the wire and to the decoded final body, so a
/// hostile server cannot exhaust memory with a huge or gzip-bombed body.
pub const MAX_RESPONSE_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default User-Agent string for captured requests.
///
/// Users can override this via the `--user-agent` CLI flag.
pub const DEFAULT_USER_AGENT: &str = concat!("wire_trace/", env!("CARGO_PKG_VERSION"));
