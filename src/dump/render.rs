//! HTTP/1.x head rendering.
//!
//! This module provides the status-line/header renderer used for every hop of
//! a redirect chain, and the wire dump of structured (client-built) requests.

use reqwest::StatusCode;
use url::Url;

use crate::config::{HEADER_CONTENT_LENGTH, HEADER_HOST};
use crate::error_handling::{RenderError, RequestDumpError};
use crate::model::{is_token_byte, HeaderMultimap, Response};

/// Renders a response's status line and headers, excluding the body.
pub trait ResponseRenderer {
    fn render_head(&self, response: &Response) -> Result<Vec<u8>, RenderError>;
}

/// Renders heads in HTTP/1.x wire format with CRLF line endings.
///
/// Output is the status line, one `Name: value` line per header value in
/// insertion order, and the empty line that ends the head.
#[derive(Debug, Default, Clone, Copy)]
pub struct Http1Renderer;

impl ResponseRenderer for Http1Renderer {
    fn render_head(&self, response: &Response) -> Result<Vec<u8>, RenderError> {
        if !(100..=999).contains(&response.status) {
            return Err(RenderError::InvalidStatus(response.status));
        }
        let reason = match &response.reason {
            Some(reason) => reason.clone(),
            None => StatusCode::from_u16(response.status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .map(str::to_string)
                .unwrap_or_else(|| format!("status code {}", response.status)),
        };

        let mut out = format!("{:?} {} {}\r\n", response.version, response.status, reason);
        write_header_lines(&mut out, &response.headers)?;
        out.push_str("\r\n");
        Ok(out.into_bytes())
    }
}

fn write_header_lines(out: &mut String, headers: &HeaderMultimap) -> Result<(), RenderError> {
    for (name, values) in headers.iter() {
        if name.is_empty() || !name.bytes().all(is_token_byte) {
            return Err(RenderError::InvalidHeaderName(name.to_string()));
        }
        for value in values {
            if value.contains(['\r', '\n']) {
                return Err(RenderError::InvalidHeaderValue {
                    name: name.to_string(),
                });
            }
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push_str("\r\n");
        }
    }
    Ok(())
}

/// Host header value for a URL (`host` or `host:port` for non-default ports).
pub(crate) fn authority(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

/// Origin-form request target (`/path?query`).
pub(crate) fn request_target(url: &Url) -> String {
    let mut target = url.path().to_string();
    if target.is_empty() {
        target.push('/');
    }
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }
    target
}

/// Dumps a structured request as it goes out on the wire.
///
/// Header names are canonicalised; `Host` is added from the URL when not set,
/// and `Content-Length` when a non-empty body is included and none is set.
///
/// # Errors
///
/// Returns `RequestDumpError::BodyRead` if `include_body` is set and the body
/// is a stream that cannot be inspected without consuming it.
pub fn dump_request_out(
    request: &reqwest::Request,
    include_body: bool,
) -> Result<Vec<u8>, RequestDumpError> {
    let body: &[u8] = match (include_body, request.body()) {
        (true, Some(body)) => body.as_bytes().ok_or_else(|| {
            RequestDumpError::BodyRead("streaming body cannot be dumped".to_string())
        })?,
        _ => &[],
    };

    let headers = HeaderMultimap::from(request.headers());
    let mut head = format!(
        "{} {} HTTP/1.1\r\n",
        request.method(),
        request_target(request.url())
    );
    if !headers.contains(HEADER_HOST) {
        head.push_str(&format!("{HEADER_HOST}: {}\r\n", authority(request.url())));
    }
    for (name, values) in headers.iter() {
        for value in values {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
    }
    if !body.is_empty() && !headers.contains(HEADER_CONTENT_LENGTH) {
        head.push_str(&format!("{HEADER_CONTENT_LENGTH}: {}\r\n", body.len()));
    }
    head.push_str("\r\n");

    let mut out = head.into_bytes();
    out.extend_from_slice(body);
    Ok(out)
}
