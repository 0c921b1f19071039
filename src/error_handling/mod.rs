//! Error handling and dump diagnostics.
//!
//! This module provides:
//! - Error type definitions for every operation
//! - Diagnostic counters for degraded results
//!
//! Failures fall into two groups:
//! - **Fatal**: the operation returns `Err` (final response render, request
//!   serialization, HTTP errors during capture)
//! - **Degraded**: the operation returns usable output and records a
//!   [`DumpEvent`] (truncated chains, omitted hop bodies, failed decompression)

mod stats;
mod types;

// Re-export public API
pub use stats::DumpStats;
pub use types::{
    CaptureError, DecompressionError, DumpError, DumpEvent, InitializationError, RenderError,
    RequestDumpError, SerializationError,
};
