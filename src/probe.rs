//! Raw request body detection.
//!
//! Raw requests are free text and may be truncated or malformed on purpose,
//! so this never fails: anything that does not parse as a request head with a
//! readable body counts as "no body".

use log::trace;

use crate::config::{
    BODY_PROBE_LIMIT, HEADER_CONTENT_LENGTH, HEADER_TRANSFER_ENCODING, MAX_PROBE_HEADERS,
};

/// How the message body is delimited.
enum Framing {
    None,
    Length(usize),
    Chunked,
}

/// Why the probe gave up. Only used for tracing; callers see `false`.
#[derive(Debug)]
#[allow(dead_code)] // Fields are only read through Debug
enum ProbeError {
    Head(httparse::Error),
    Incomplete,
    Framing(&'static str),
    ShortBody,
}

/// Returns true when `data` is a request whose body has at least one byte.
///
/// At most [`BODY_PROBE_LIMIT`] body bytes are examined. A parse failure,
/// a truncated head, a body shorter than its framing promises within that
/// window, or a request without a body all yield `false`.
pub fn raw_has_body(data: &str) -> bool {
    match probe(data.as_bytes()) {
        Ok(n) => n > 0,
        Err(e) => {
            trace!("Raw request treated as body-less: {:?}", e);
            false
        }
    }
}

/// Returns the number of body bytes readable within the probe limit.
fn probe(data: &[u8]) -> Result<usize, ProbeError> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_PROBE_HEADERS];
    let mut request = httparse::Request::new(&mut headers);
    let head_len = match request.parse(data).map_err(ProbeError::Head)? {
        httparse::Status::Complete(len) => len,
        httparse::Status::Partial => return Err(ProbeError::Incomplete),
    };
    let rest = &data[head_len..];

    match framing(request.headers)? {
        Framing::None => Ok(0),
        Framing::Length(len) => {
            let want = len.min(BODY_PROBE_LIMIT);
            if rest.len() < want {
                return Err(ProbeError::ShortBody);
            }
            Ok(want)
        }
        Framing::Chunked => read_chunked(rest, BODY_PROBE_LIMIT),
    }
}

/// Determines body framing the way an HTTP/1.1 server reads a request.
fn framing(headers: &[httparse::Header<'_>]) -> Result<Framing, ProbeError> {
    let mut transfer_encoding: Option<String> = None;
    let mut content_length: Option<usize> = None;

    for header in headers {
        if header.name.eq_ignore_ascii_case(HEADER_TRANSFER_ENCODING) {
            if transfer_encoding.is_some() {
                return Err(ProbeError::Framing("repeated Transfer-Encoding"));
            }
            let value = std::str::from_utf8(header.value)
                .map_err(|_| ProbeError::Framing("non-UTF-8 Transfer-Encoding"))?;
            transfer_encoding = Some(value.trim().to_ascii_lowercase());
        } else if header.name.eq_ignore_ascii_case(HEADER_CONTENT_LENGTH) {
            let value = std::str::from_utf8(header.value)
                .ok()
                .map(str::trim)
                .filter(|v| !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|v| v.parse::<usize>().ok())
                .ok_or(ProbeError::Framing("invalid Content-Length"))?;
            if content_length.is_some_and(|existing| existing != value) {
                return Err(ProbeError::Framing("conflicting Content-Length"));
            }
            content_length = Some(value);
        }
    }

    // Transfer-Encoding overrides Content-Length. Only a lone `chunked` is
    // accepted; coding lists such as `gzip, chunked` and `identity` are not.
    if let Some(te) = transfer_encoding {
        return match te.as_str() {
            "chunked" => Ok(Framing::Chunked),
            _ => Err(ProbeError::Framing("unsupported Transfer-Encoding")),
        };
    }
    Ok(match content_length {
        Some(0) | None => Framing::None,
        Some(len) => Framing::Length(len),
    })
}

/// Decodes chunked data until `limit` bytes are gathered or the last chunk.
fn read_chunked(mut data: &[u8], limit: usize) -> Result<usize, ProbeError> {
    let mut read = 0;
    while read < limit {
        let line_end = data
            .iter()
            .position(|&b| b == b'\n')
            .ok_or(ProbeError::ShortBody)?;
        let line = std::str::from_utf8(&data[..line_end])
            .map_err(|_| ProbeError::Framing("non-UTF-8 chunk size"))?;
        let size_field = line
            .trim_end_matches('\r')
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        let size = usize::from_str_radix(size_field, 16)
            .map_err(|_| ProbeError::Framing("invalid chunk size"))?;
        data = &data[line_end + 1..];
        if size == 0 {
            break;
        }

        let take = size.min(limit - read);
        if data.len() < take {
            return Err(ProbeError::ShortBody);
        }
        read += take;
        if take < size {
            break;
        }
        data = &data[size..];
        data = data
            .strip_prefix(b"\r\n")
            .or_else(|| data.strip_prefix(b"\n"))
            .ok_or(ProbeError::ShortBody)?;
    }
    Ok(read)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_without_body() {
        assert!(!raw_has_body("GET / HTTP/1.1\r\nHost: x\r\n\r\n"));
    }

    #[test]
    fn test_post_with_content_length_body() {
        assert!(raw_has_body(
            "POST / HTTP/1.1\r\nHost: x\r\nContent-Length: 3\r\n\r\nabc"
        ));
    }

    #[test]
    fn test_malformed_and_truncated_input() {
        assert!(!raw_has_body(""));
        assert!(!raw_has_body("GET / HTTP/1.1\r\nHost: x\r\n"));
        assert!(!raw_has_body("NOT A REQUEST\r\n\r\nbody"));
        assert!(!raw_has_body("GET / HTTP/1.1\r\nBad Header\r\n\r\n"));
    }

    #[test]
    fn test_zero_or_missing_content_length() {
        assert!(!raw_has_body(
            "POST / HTTP/1.1\r\nContent-Length: 0\r\n\r\n"
        ));
        // Without framing headers trailing bytes are not a body
        assert!(!raw_has_body("POST / HTTP/1.1\r\nHost: x\r\n\r\nabc"));
    }

    #[test]
    fn test_short_body_is_not_a_body() {
        assert!(!raw_has_body(
            "POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc"
        ));
    }

    #[test]
    fn test_large_content_length_only_needs_probe_window() {
        let body = "a".repeat(BODY_PROBE_LIMIT);
        let request = format!("POST / HTTP/1.1\r\nContent-Length: 100000\r\n\r\n{body}");
        assert!(raw_has_body(&request));
    }

    #[test]
    fn test_invalid_content_length() {
        assert!(!raw_has_body(
            "POST / HTTP/1.1\r\nContent-Length: abc\r\n\r\nabc"
        ));
        assert!(!raw_has_body(
            "POST / HTTP/1.1\r\nContent-Length: 3\r\nContent-Length: 4\r\n\r\nabcd"
        ));
        // Repeated identical values are accepted
        assert!(raw_has_body(
            "POST / HTTP/1.1\r\nContent-Length: 3\r\nContent-Length: 3\r\n\r\nabc"
        ));
    }

    #[test]
    fn test_chunked_body() {
        assert!(raw_has_body(
            "POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n3\r\nabc\r\n0\r\n\r\n"
        ));
        assert!(raw_has_body(
            "POST / HTTP/1.1\r\nTransfer-Encoding: Chunked\r\n\r\n1;ext=1\r\nz\r\n0\r\n\r\n"
        ));
        assert!(!raw_has_body(
            "POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n0\r\n\r\n"
        ));
    }

    #[test]
    fn test_malformed_chunked_body() {
        assert!(!raw_has_body(
            "POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\nzz\r\nabc\r\n0\r\n\r\n"
        ));
        assert!(!raw_has_body(
            "POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nab"
        ));
        assert!(!raw_has_body(
            "POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n"
        ));
    }

    #[test]
    fn test_unsupported_transfer_encoding() {
        assert!(!raw_has_body(
            "POST / HTTP/1.1\r\nTransfer-Encoding: gzip\r\nContent-Length: 3\r\n\r\nabc"
        ));
    }

    #[test]
    fn test_only_a_lone_chunked_coding_is_accepted() {
        assert!(!raw_has_body(
            "POST / HTTP/1.1\r\nTransfer-Encoding: gzip, chunked\r\n\r\n1\r\nz\r\n0\r\n\r\n"
        ));
        assert!(!raw_has_body(
            "POST / HTTP/1.1\r\nTransfer-Encoding: identity\r\nContent-Length: 3\r\n\r\nabc"
        ));
        assert!(!raw_has_body(
            "POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\nTransfer-Encoding: chunked\r\n\r\n1\r\nz\r\n0\r\n\r\n"
        ));
    }

    #[test]
    fn test_transfer_encoding_overrides_content_length() {
        assert!(raw_has_body(
            "POST / HTTP/1.1\r\nContent-Length: 100\r\nTransfer-Encoding: chunked\r\n\r\n2\r\nok\r\n0\r\n\r\n"
        ));
    }

    #[test]
    fn test_chunked_probe_stops_at_limit() {
        let chunk = "a".repeat(BODY_PROBE_LIMIT * 2);
        let request = format!(
            "POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n{:x}\r\n{chunk}",
            chunk.len()
        );
        assert!(raw_has_body(&request));
        assert_eq!(probe(request.as_bytes()).unwrap(), BODY_PROBE_LIMIT);
    }
}
