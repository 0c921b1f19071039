//! HTTP header name constants.

/// Content-Encoding header (drives body decompression)
pub const HEADER_CONTENT_ENCODING: &str = "Content-Encoding";
/// Content-Length header
pub const HEADER_CONTENT_LENGTH: &str = "Content-Length";
/// Content-Type header
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
/// Transfer-Encoding header
pub const HEADER_TRANSFER_ENCODING: &str = "Transfer-Encoding";
/// Host header
pub const HEADER_HOST: &str = "Host";
/// Location header (redirect target)
pub const HEADER_LOCATION: &str = "Location";

/// Headers describing a request body.
/// Dropped when a redirect turns the request into a body-less GET.
pub const BODY_HEADERS: &[&str] = &[
    HEADER_CONTENT_LENGTH,
    HEADER_CONTENT_TYPE,
    HEADER_CONTENT_ENCODING,
    HEADER_TRANSFER_ENCODING,
];

/// Credentials that must not leak to a different host on redirect.
pub const SENSITIVE_HEADERS: &[&str] = &["Authorization", "Cookie", "Proxy-Authorization"];
