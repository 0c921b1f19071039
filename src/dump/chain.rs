//! Redirect chain dumps.
//!
//! A client that follows redirects only hands back the final response. Earlier
//! hops are reachable through `response.request.response` links, newest first.
//! The dumper walks those links backward, then emits the hops oldest first so
//! the output reads in the order the exchanges happened.

use std::sync::Arc;

use log::{debug, warn};

use crate::config::MAX_CHAIN_DEPTH;
use crate::error_handling::{DumpError, DumpEvent, DumpStats, RenderError};
use crate::model::Response;

use super::render::{Http1Renderer, ResponseRenderer};

/// Why a chain dump stopped before reaching the first hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Truncation {
    /// The hop `hops_back` steps before the final response failed to render.
    /// It and every earlier hop are missing from the dump.
    RenderFailed { hops_back: usize, error: RenderError },
    /// More hops remained after `max_depth` hops were dumped.
    DepthLimit { max_depth: usize },
}

/// Result of a chain dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainDump {
    /// Hop records concatenated oldest first.
    pub bytes: Vec<u8>,
    /// Number of hops in `bytes`.
    pub hops: usize,
    /// Hops whose body could not be read and was left out.
    pub bodies_omitted: usize,
    pub truncation: Option<Truncation>,
}

impl ChainDump {
    /// True when every hop was dumped with its body.
    pub fn is_complete(&self) -> bool {
        self.truncation.is_none() && self.bodies_omitted == 0
    }
}

/// Dumps a final response together with its redirect chain.
#[derive(Debug, Clone)]
pub struct ChainDumper<R = Http1Renderer> {
    renderer: R,
    max_depth: usize,
    stats: Option<Arc<DumpStats>>,
}

impl Default for ChainDumper {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainDumper {
    pub fn new() -> Self {
        Self::with_renderer(Http1Renderer)
    }
}

impl<R: ResponseRenderer> ChainDumper<R> {
    pub fn with_renderer(renderer: R) -> Self {
        Self {
            renderer,
            max_depth: MAX_CHAIN_DEPTH,
            stats: None,
        }
    }

    /// Caps the number of hops dumped, final response included (minimum 1).
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Records truncations and omitted bodies in `stats`.
    pub fn stats(mut self, stats: Arc<DumpStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Dumps `response` and every earlier hop, oldest first.
    ///
    /// `body` is the already-read body of `response`. Bodies of earlier hops
    /// are read from their streams, which are consumed.
    ///
    /// # Errors
    ///
    /// Returns `DumpError::Render` if the final response cannot be rendered.
    /// Failures on earlier hops are reported through [`ChainDump`] instead.
    pub fn dump(&self, response: &mut Response, body: &[u8]) -> Result<ChainDump, DumpError> {
        let mut record = self.renderer.render_head(response)?;
        record.extend_from_slice(body);
        let mut records = vec![record];
        let mut bodies_omitted = 0;
        let mut truncation = None;

        let mut cur = response
            .request
            .as_deref_mut()
            .and_then(|req| req.response.as_deref_mut());
        while let Some(hop) = cur {
            if records.len() >= self.max_depth {
                truncation = Some(Truncation::DepthLimit {
                    max_depth: self.max_depth,
                });
                break;
            }
            let mut record = match self.renderer.render_head(hop) {
                Ok(head) => head,
                Err(error) => {
                    truncation = Some(Truncation::RenderFailed {
                        hops_back: records.len(),
                        error,
                    });
                    break;
                }
            };
            if let Some(hop_body) = hop.body.as_mut() {
                match hop_body.read_all() {
                    Ok(bytes) => record.extend_from_slice(&bytes),
                    Err(e) => {
                        debug!("Omitting body of hop {} back: {}", records.len(), e);
                        bodies_omitted += 1;
                        self.record(DumpEvent::HopBodyOmitted);
                    }
                }
            }
            records.push(record);
            cur = hop
                .request
                .as_deref_mut()
                .and_then(|req| req.response.as_deref_mut());
        }

        match &truncation {
            Some(Truncation::RenderFailed { hops_back, error }) => {
                warn!(
                    "Redirect chain truncated {} hops back: {}",
                    hops_back, error
                );
                self.record(DumpEvent::ChainTruncated);
            }
            Some(Truncation::DepthLimit { max_depth }) => {
                warn!("Redirect chain longer than {} hops, older hops dropped", max_depth);
                self.record(DumpEvent::DepthLimitReached);
            }
            None => {}
        }

        let hops = records.len();
        let bytes = records.into_iter().rev().flatten().collect();
        Ok(ChainDump {
            bytes,
            hops,
            bodies_omitted,
            truncation,
        })
    }

    fn record(&self, event: DumpEvent) {
        if let Some(stats) = &self.stats {
            stats.increment(event);
        }
    }
}

/// Dumps `response` with its redirect chain using the default renderer and
/// depth cap, returning only the bytes.
pub fn dump_response_with_redirect_chain(
    response: &mut Response,
    body: &[u8],
) -> Result<Vec<u8>, DumpError> {
    Ok(ChainDumper::new().dump(response, body)?.bytes)
}
