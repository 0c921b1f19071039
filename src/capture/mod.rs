//! Traced HTTP execution.
//!
//! The tracer sends a request with a redirect-disabled client and follows
//! redirects itself, linking each hop into the `Response -> Request ->
//! Response` chain that the dump operations read. The result carries the
//! request dump, the chronological response dump and the decoded final body.

mod redirect;

use std::sync::Arc;

use log::{debug, warn};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Method;
use url::Url;

use crate::config::{
    HEADER_LOCATION, MAX_CHAIN_DEPTH, MAX_REDIRECT_HOPS, MAX_RESPONSE_BODY_SIZE,
};
use crate::decompress::decompress_body_capped;
use crate::dump::{
    ChainDump, ChainDumper, NoopExpander, RawHttp1Serializer, RequestDumper, TemplateExpander,
};
use crate::error_handling::{CaptureError, DecompressionError, DumpEvent, DumpStats};
use crate::model::{Body, GeneratedRequest, HeaderMultimap, RawRequest, Request, Response};

/// Options for [`Tracer`].
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// Maximum number of redirects followed before the last response is
    /// treated as final.
    pub max_redirects: usize,
    /// Diagnostics sink for degraded dumps and followed redirects.
    pub stats: Option<Arc<DumpStats>>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            max_redirects: MAX_REDIRECT_HOPS,
            stats: None,
        }
    }
}

/// Everything recorded for one traced request.
#[derive(Debug)]
pub struct Transaction {
    /// Wire dump of the request as first sent.
    pub request_dump: Vec<u8>,
    /// Every response, oldest first; the final one carries the decoded body.
    pub response_dump: ChainDump,
    /// Final body after content decoding.
    pub body: Vec<u8>,
    /// Set when the final body could not be decoded; `body` is then raw.
    pub decompression_error: Option<DecompressionError>,
    /// The final response, owning the redirect chain.
    pub response: Response,
    pub final_url: String,
    pub redirects: usize,
}

impl Transaction {
    pub fn status(&self) -> u16 {
        self.response.status
    }
}

/// Sends requests and records their complete wire trace.
pub struct Tracer<E = NoopExpander> {
    client: reqwest::Client,
    dumper: RequestDumper<RawHttp1Serializer, E>,
    options: CaptureOptions,
}

impl Tracer {
    /// `client` must not follow redirects itself (see
    /// [`crate::initialization::init_client`]), or the chain is lost.
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_expander(client, NoopExpander)
    }
}

impl<E: TemplateExpander> Tracer<E> {
    pub fn with_expander(client: reqwest::Client, expander: E) -> Self {
        Self {
            client,
            dumper: RequestDumper::with_parts(RawHttp1Serializer, expander),
            options: CaptureOptions::default(),
        }
    }

    pub fn options(mut self, options: CaptureOptions) -> Self {
        self.options = options;
        self
    }

    /// Sends `request` to `resolved_url`, following redirects.
    ///
    /// Structured requests carry their own URL; `resolved_url` is used for the
    /// request dump and, for raw requests, as the base the raw path is
    /// resolved against.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be dumped or built, if any hop
    /// fails at the HTTP level, or if the final response cannot be rendered.
    /// Undecodable bodies and truncated chains are reported in the
    /// [`Transaction`] instead.
    pub async fn execute(
        &self,
        mut request: GeneratedRequest,
        resolved_url: &str,
    ) -> Result<Transaction, CaptureError> {
        let request_dump = self.dumper.dump(&mut request, resolved_url)?;
        let mut outgoing = match request {
            GeneratedRequest::Structured(req) => req,
            GeneratedRequest::Raw(raw) => self.build_raw(&raw, resolved_url)?,
        };

        let mut previous: Option<Box<Response>> = None;
        let mut redirects = 0;
        loop {
            let method = outgoing.method().clone();
            let url = outgoing.url().clone();
            let headers = outgoing.headers().clone();
            let replay = outgoing.try_clone();
            let hop_request = Request {
                method: method.to_string(),
                url: url.to_string(),
                headers: HeaderMultimap::from(&headers),
                response: previous.take(),
            };

            debug!("Sending {} {}", method, url);
            let resp = self.client.execute(outgoing).await?;
            let status = resp.status();
            let location = resp
                .headers()
                .get(HEADER_LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let mut hop = response_head(&resp);
            hop.request = Some(Box::new(hop_request));
            let body = self.read_capped(resp, &url).await?;

            let next = if redirects < self.options.max_redirects {
                redirect::next_request(
                    status,
                    &method,
                    &url,
                    &headers,
                    location.as_deref(),
                    replay,
                )?
            } else {
                if redirect::is_redirect(status) {
                    warn!(
                        "Stopped after {} redirects, treating {} response from {} as final",
                        redirects,
                        status.as_u16(),
                        url
                    );
                }
                None
            };

            match next {
                Some(next) => {
                    debug!("Following {} redirect to {}", status.as_u16(), next.url());
                    self.record(DumpEvent::RedirectFollowed);
                    hop.body = Some(Body::from_bytes(body));
                    previous = Some(Box::new(hop));
                    outgoing = next;
                    redirects += 1;
                }
                None => return self.finish(request_dump, hop, &body, url, redirects),
            }
        }
    }

    fn finish(
        &self,
        request_dump: Vec<u8>,
        mut response: Response,
        raw_body: &[u8],
        final_url: Url,
        redirects: usize,
    ) -> Result<Transaction, CaptureError> {
        let (decoded, truncated) =
            decompress_body_capped(Some(&response), raw_body, MAX_RESPONSE_BODY_SIZE);
        if truncated {
            warn!(
                "Decoded body from {} cut at {} bytes",
                final_url, MAX_RESPONSE_BODY_SIZE
            );
            self.record(DumpEvent::BodyTruncated);
        }
        if let Some(e) = &decoded.error {
            warn!("Body from {} left as received: {}", final_url, e);
            self.record(DumpEvent::DecompressionFailed);
        }
        let (body, decompression_error) = decoded.into_owned();

        let mut dumper = ChainDumper::new().max_depth(MAX_CHAIN_DEPTH.max(redirects + 1));
        if let Some(stats) = &self.options.stats {
            dumper = dumper.stats(Arc::clone(stats));
        }
        let response_dump = dumper.dump(&mut response, &body)?;

        Ok(Transaction {
            request_dump,
            response_dump,
            body,
            decompression_error,
            response,
            final_url: final_url.to_string(),
            redirects,
        })
    }

    /// Reads a hop body chunk by chunk, keeping at most
    /// [`MAX_RESPONSE_BODY_SIZE`] bytes.
    async fn read_capped(
        &self,
        mut resp: reqwest::Response,
        url: &Url,
    ) -> Result<Vec<u8>, CaptureError> {
        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await? {
            let room = MAX_RESPONSE_BODY_SIZE - body.len();
            if chunk.len() > room {
                body.extend_from_slice(&chunk[..room]);
                warn!(
                    "Body from {} cut at {} bytes",
                    url, MAX_RESPONSE_BODY_SIZE
                );
                self.record(DumpEvent::BodyTruncated);
                break;
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    /// Builds a client request from a raw request.
    ///
    /// Headers the client cannot represent (invalid names, CR/LF in values)
    /// are skipped here; they remain in the request dump.
    fn build_raw(&self, raw: &RawRequest, resolved_url: &str) -> Result<reqwest::Request, CaptureError> {
        let method = Method::from_bytes(raw.method.as_bytes())
            .map_err(|_| CaptureError::InvalidMethod(raw.method.clone()))?;
        let base = Url::parse(resolved_url)?;
        let url = if raw.path.is_empty() {
            base
        } else {
            base.join(&raw.path)?
        };

        let mut request = reqwest::Request::new(method, url);
        for (name, values) in self.dumper.expander().expand(&raw.headers).iter() {
            for value in values {
                match (
                    HeaderName::from_bytes(name.trim().as_bytes()),
                    HeaderValue::from_str(value.trim()),
                ) {
                    (Ok(name), Ok(value)) => {
                        request.headers_mut().append(name, value);
                    }
                    _ => warn!(
                        "Header {:?} cannot be sent by the HTTP client, it is only in the dump",
                        name
                    ),
                }
            }
        }
        if !raw.data.is_empty() {
            *request.body_mut() = Some(raw.data.clone().into());
        }
        Ok(request)
    }

    fn record(&self, event: DumpEvent) {
        if let Some(stats) = &self.options.stats {
            stats.increment(event);
        }
    }
}

/// Copies status line and headers of a client response into the data model.
fn response_head(resp: &reqwest::Response) -> Response {
    let mut head = Response::new(resp.status().as_u16());
    head.version = resp.version();
    head.headers = HeaderMultimap::from(resp.headers());
    head
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracer() -> Tracer<crate::dump::VariableExpander> {
        let mut expander = crate::dump::VariableExpander::default();
        expander.set("token", "s3cret");
        Tracer::with_expander(reqwest::Client::new(), expander)
    }

    #[test]
    fn test_build_raw_resolves_path_and_expands_headers() {
        let mut headers = HeaderMultimap::new();
        headers.append("Authorization", "Bearer {{token}}");
        let raw = RawRequest {
            method: "PATCH".to_string(),
            path: "/items/1?v=2".to_string(),
            headers,
            data: "{}".to_string(),
            ..Default::default()
        };

        let request = tracer().build_raw(&raw, "http://example.com/base").unwrap();
        assert_eq!(request.method(), Method::PATCH);
        assert_eq!(request.url().as_str(), "http://example.com/items/1?v=2");
        assert_eq!(
            request.headers().get("authorization").unwrap(),
            "Bearer s3cret"
        );
        assert_eq!(request.body().and_then(|b| b.as_bytes()), Some(&b"{}"[..]));
    }

    #[test]
    fn test_build_raw_skips_headers_the_client_rejects() {
        let mut headers = HeaderMultimap::new();
        headers.append("Bad Name", "x");
        headers.append("X-Ok", "1");
        let raw = RawRequest {
            method: "GET".to_string(),
            headers,
            ..Default::default()
        };

        let request = tracer().build_raw(&raw, "http://example.com/").unwrap();
        assert_eq!(request.headers().len(), 1);
        assert!(request.body().is_none());
        assert_eq!(request.url().as_str(), "http://example.com/");
    }

    #[test]
    fn test_build_raw_rejects_invalid_method() {
        let raw = RawRequest {
            method: "GE T".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            tracer().build_raw(&raw, "http://example.com/"),
            Err(CaptureError::InvalidMethod(_))
        ));
    }

    #[test]
    fn test_capture_options_default() {
        let options = CaptureOptions::default();
        assert_eq!(options.max_redirects, MAX_REDIRECT_HOPS);
        assert!(options.stats.is_none());
    }
}
