//! Request wire dumps for both request representations.

use crate::error_handling::RequestDumpError;
use crate::model::{Body, GeneratedRequest, RawRequest};

use super::raw::{NoopExpander, RawHttp1Serializer, RawOptions, RawWireSerializer, TemplateExpander};
use super::render::dump_request_out;

/// Dumps requests to wire bytes.
///
/// Structured requests are rendered from the client request itself; raw
/// requests go through the raw serializer after their header placeholders are
/// expanded.
#[derive(Debug, Default, Clone)]
pub struct RequestDumper<S = RawHttp1Serializer, E = NoopExpander> {
    serializer: S,
    expander: E,
}

impl RequestDumper {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: RawWireSerializer, E: TemplateExpander> RequestDumper<S, E> {
    pub fn with_parts(serializer: S, expander: E) -> Self {
        Self {
            serializer,
            expander,
        }
    }

    pub fn expander(&self) -> &E {
        &self.expander
    }

    /// Dumps `request` as it would be sent to `resolved_url`.
    ///
    /// A structured request's body is buffered and put back as a fresh body
    /// over the same bytes, so the request can still be sent (or dumped again)
    /// afterwards. Raw requests are never modified.
    ///
    /// # Errors
    ///
    /// Body read and serialization errors are returned as-is.
    pub fn dump(
        &self,
        request: &mut GeneratedRequest,
        resolved_url: &str,
    ) -> Result<Vec<u8>, RequestDumpError> {
        match request {
            GeneratedRequest::Structured(req) => {
                let body = structured_body_bytes(req)?;
                if req.body().is_some() {
                    *req.body_mut() = Some(reqwest::Body::from(body));
                }
                dump_request_out(req, true)
            }
            GeneratedRequest::Raw(raw) => self.dump_raw(raw, resolved_url),
        }
    }

    fn dump_raw(&self, raw: &RawRequest, resolved_url: &str) -> Result<Vec<u8>, RequestDumpError> {
        let headers = self.expander.expand(&raw.headers);
        let options = RawOptions {
            custom_headers: raw.unsafe_headers.clone(),
        };
        let bytes = self.serializer.serialize(
            &raw.method,
            resolved_url,
            &raw.path,
            &headers,
            Body::from_bytes(raw.data.clone()),
            &options,
        )?;
        Ok(bytes)
    }
}

/// Dumps a request with the default serializer and no placeholder expansion.
pub fn dump_request(
    request: &mut GeneratedRequest,
    resolved_url: &str,
) -> Result<Vec<u8>, RequestDumpError> {
    RequestDumper::new().dump(request, resolved_url)
}

/// Reads the current body of a structured request without consuming it.
///
/// Returns an empty buffer when the request has no body.
///
/// # Errors
///
/// Returns `RequestDumpError::BodyRead` for streaming bodies, whose bytes are
/// only available by consuming the stream.
pub fn structured_body_bytes(request: &reqwest::Request) -> Result<Vec<u8>, RequestDumpError> {
    match request.body() {
        None => Ok(Vec::new()),
        Some(body) => body.as_bytes().map(<[u8]>::to_vec).ok_or_else(|| {
            RequestDumpError::BodyRead("streaming body cannot be buffered".to_string())
        }),
    }
}
