//! Response body decompression.
//!
//! The client is built without transparent decompression, so a body sent with
//! `Content-Encoding: gzip` arrives compressed. Dumps and matchers want the
//! decoded bytes; when decoding fails they still get the original ones.

use std::borrow::Cow;
use std::io::Read;

use flate2::read::MultiGzDecoder;
use log::debug;

use crate::config::HEADER_CONTENT_ENCODING;
use crate::error_handling::DecompressionError;
use crate::model::Response;

/// Outcome of [`decompress_body`].
///
/// `body` is always usable. When `error` is set, decoding failed and `body`
/// holds the original, possibly still compressed, bytes.
#[derive(Debug)]
pub struct Decompressed<'a> {
    pub body: Cow<'a, [u8]>,
    pub error: Option<DecompressionError>,
}

impl<'a> Decompressed<'a> {
    fn unchanged(raw: &'a [u8]) -> Self {
        Self {
            body: Cow::Borrowed(raw),
            error: None,
        }
    }

    /// True when decoding was attempted and failed.
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }

    pub fn into_owned(self) -> (Vec<u8>, Option<DecompressionError>) {
        (self.body.into_owned(), self.error)
    }
}

/// Decodes `raw` according to the response's `Content-Encoding`.
///
/// Any encoding containing `gzip` (`gzip`, `x-gzip`, ...) is decoded; other or
/// missing encodings, and an absent response, leave `raw` untouched.
pub fn decompress_body<'a>(response: Option<&Response>, raw: &'a [u8]) -> Decompressed<'a> {
    decode(response, raw, u64::MAX).0
}

/// Like [`decompress_body`], but stops decoding after `limit` bytes.
///
/// The second value is true when the decoded body was cut at `limit`.
pub(crate) fn decompress_body_capped<'a>(
    response: Option<&Response>,
    raw: &'a [u8],
    limit: usize,
) -> (Decompressed<'a>, bool) {
    decode(response, raw, limit as u64)
}

fn decode<'a>(response: Option<&Response>, raw: &'a [u8], limit: u64) -> (Decompressed<'a>, bool) {
    let Some(response) = response else {
        return (Decompressed::unchanged(raw), false);
    };
    let encoding = response
        .headers
        .get(HEADER_CONTENT_ENCODING)
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    if !encoding.contains("gzip") {
        return (Decompressed::unchanged(raw), false);
    }

    let mut decoded = Vec::new();
    let mut decoder = MultiGzDecoder::new(raw).take(limit.saturating_add(1));
    match decoder.read_to_end(&mut decoded) {
        Ok(_) => {
            let truncated = decoded.len() as u64 > limit;
            if truncated {
                decoded.truncate(limit as usize);
            }
            let body = Decompressed {
                body: Cow::Owned(decoded),
                error: None,
            };
            (body, truncated)
        }
        Err(e) => {
            debug!("Keeping original body, gzip decoding failed: {}", e);
            let body = Decompressed {
                body: Cow::Borrowed(raw),
                error: Some(DecompressionError::from(e)),
            };
            (body, false)
        }
    }
}
