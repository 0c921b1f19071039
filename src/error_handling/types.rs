//! Error type definitions.
//!
//! This module defines the error and diagnostic event types used throughout
//! the crate.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Rendering a response status line and headers failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Status code outside the three-digit range.
    #[error("invalid status code {0}")]
    InvalidStatus(u16),

    /// Header name is empty or not a token.
    #[error("invalid header name {0:?}")]
    InvalidHeaderName(String),

    /// Header value would break the message framing.
    #[error("header {name:?} has a value containing CR or LF")]
    InvalidHeaderValue { name: String },
}

/// Producing the wire bytes of a request failed.
#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("invalid request URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A header that is not marked unsafe cannot be written as-is.
    #[error("header {name:?} cannot be serialized without being marked unsafe")]
    InvalidHeader { name: String },

    #[error("failed to read request body: {0}")]
    Body(#[from] std::io::Error),
}

/// Dumping a redirect chain failed.
///
/// Only the final response is fatal; earlier hops that fail to render truncate
/// the chain instead (see [`crate::dump::Truncation`]).
#[derive(Error, Debug)]
pub enum DumpError {
    #[error("failed to render final response: {0}")]
    Render(#[from] RenderError),
}

/// Dumping a request failed.
#[derive(Error, Debug)]
pub enum RequestDumpError {
    /// The structured request body could not be buffered.
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error(transparent)]
    Serialization(#[from] SerializationError),
}

/// Decompressing a response body failed.
///
/// Never fatal: the caller still receives the original bytes.
#[derive(Error, Debug)]
pub enum DecompressionError {
    #[error("gzip decompression failed: {0}")]
    Gzip(#[from] std::io::Error),
}

/// Errors from a traced HTTP execution.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] ReqwestError),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid request method {0:?}")]
    InvalidMethod(String),

    #[error(transparent)]
    RequestDump(#[from] RequestDumpError),

    #[error(transparent)]
    Dump(#[from] DumpError),
}

/// Diagnostic events recorded while dumping and capturing.
///
/// None of these fail an operation; they flag output that is degraded but
/// still usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum DumpEvent {
    /// A hop before the final response failed to render; earlier hops were dropped.
    ChainTruncated,
    /// The backward walk stopped at the depth cap.
    DepthLimitReached,
    /// A hop body could not be read and was left out of the dump.
    HopBodyOmitted,
    /// A body declared as gzip could not be decoded.
    DecompressionFailed,
    /// A redirect was followed during capture.
    RedirectFollowed,
    /// A captured or decoded body was cut at the size cap.
    BodyTruncated,
}

impl std::fmt::Display for DumpEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DumpEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            DumpEvent::ChainTruncated => "Redirect chain truncated",
            DumpEvent::DepthLimitReached => "Redirect chain depth limit reached",
            DumpEvent::HopBodyOmitted => "Hop body omitted",
            DumpEvent::DecompressionFailed => "Decompression failed",
            DumpEvent::RedirectFollowed => "Redirect followed",
            DumpEvent::BodyTruncated => "Body truncated at size cap",
        }
    }
}
