//! Request/response graph and request representations.

use std::collections::HashSet;

use reqwest::Version;

use super::body::Body;
use super::headers::HeaderMultimap;

/// A received HTTP response.
///
/// `request` links back to the request that produced this response. When that
/// request was itself issued because of a redirect, its `response` field holds
/// the previous hop, so the final response of a transaction owns the entire
/// redirect chain.
#[derive(Debug)]
pub struct Response {
    pub version: Version,
    pub status: u16,
    /// Reason phrase; the canonical one for `status` is used when absent.
    pub reason: Option<String>,
    pub headers: HeaderMultimap,
    pub body: Option<Body>,
    pub request: Option<Box<Request>>,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            version: Version::HTTP_11,
            status,
            reason: None,
            headers: HeaderMultimap::new(),
            body: None,
            request: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_request(mut self, request: Request) -> Self {
        self.request = Some(Box::new(request));
        self
    }

    /// The response of the hop before this one, if this response is the
    /// result of a followed redirect.
    pub fn previous(&self) -> Option<&Response> {
        self.request.as_deref().and_then(|req| req.response.as_deref())
    }

    /// Number of hops in the chain ending at this response.
    pub fn chain_len(&self) -> usize {
        let mut len = 1;
        let mut cur = self.previous();
        while let Some(hop) = cur {
            len += 1;
            cur = hop.previous();
        }
        len
    }
}

/// A request as issued on the wire for one hop.
#[derive(Debug)]
pub struct Request {
    pub method: String,
    pub url: String,
    pub headers: HeaderMultimap,
    /// Response of the previous hop that redirected to this request.
    pub response: Option<Box<Response>>,
}

impl Request {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: HeaderMultimap::new(),
            response: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Links the response that redirected to this request.
    pub fn redirected_from(mut self, response: Response) -> Self {
        self.response = Some(Box::new(response));
        self
    }
}

/// Hand-crafted request whose wire bytes are built directly from its parts.
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    pub method: String,
    /// Request target; an empty path falls back to the resolved URL's path.
    pub path: String,
    pub headers: HeaderMultimap,
    pub data: String,
    /// Header names emitted byte-for-byte, bypassing normalisation.
    pub unsafe_headers: HashSet<String>,
}

/// A request ready to be sent, in one of its two representations.
#[derive(Debug)]
pub enum GeneratedRequest {
    /// A request built through the HTTP client.
    Structured(reqwest::Request),
    /// A raw request, possibly carrying non-conformant headers.
    Raw(RawRequest),
}
