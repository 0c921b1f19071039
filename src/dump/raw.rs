//! Raw request serialization and header placeholder expansion.
//!
//! Raw requests bypass the HTTP client's header model so they can carry
//! non-conformant input. Headers named in [`RawOptions::custom_headers`] are
//! written exactly as given; everything else is normalised.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use url::Url;

use super::render::{authority, request_target};
use crate::config::{HEADER_CONTENT_LENGTH, HEADER_HOST};
use crate::error_handling::SerializationError;
use crate::model::{canonical_header_name, Body, HeaderMultimap};

/// Options for [`RawWireSerializer::serialize`].
#[derive(Debug, Clone, Default)]
pub struct RawOptions {
    /// Header names emitted verbatim, without validation or normalisation.
    pub custom_headers: HashSet<String>,
}

/// Renders a raw request (method, URL, path, headers, body) to wire bytes.
pub trait RawWireSerializer {
    fn serialize(
        &self,
        method: &str,
        url: &str,
        path: &str,
        headers: &HeaderMultimap,
        body: Body,
        options: &RawOptions,
    ) -> Result<Vec<u8>, SerializationError>;
}

/// HTTP/1.1 raw serializer.
///
/// - The request target is `path` when non-empty, otherwise the URL's path and
///   query.
/// - `Host` comes first, taken from the URL, unless a `Host` header (any case)
///   is supplied.
/// - Unsafe headers are copied byte-for-byte. Other names are canonicalised
///   and values trimmed; a CR or LF in either is rejected.
/// - `Content-Length` is appended for a non-empty body when not supplied.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawHttp1Serializer;

impl RawWireSerializer for RawHttp1Serializer {
    fn serialize(
        &self,
        method: &str,
        url: &str,
        path: &str,
        headers: &HeaderMultimap,
        mut body: Body,
        options: &RawOptions,
    ) -> Result<Vec<u8>, SerializationError> {
        let parsed = Url::parse(url).map_err(|source| SerializationError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let target = if path.is_empty() {
            request_target(&parsed)
        } else {
            path.to_string()
        };
        let body = body.read_all()?;

        let mut head = format!("{method} {target} HTTP/1.1\r\n");
        if !headers.contains(HEADER_HOST) {
            head.push_str(&format!("{HEADER_HOST}: {}\r\n", authority(&parsed)));
        }
        for (name, values) in headers.iter() {
            let verbatim = options.custom_headers.contains(name);
            for value in values {
                if verbatim {
                    head.push_str(&format!("{name}: {value}\r\n"));
                    continue;
                }
                if name.contains(['\r', '\n']) || value.contains(['\r', '\n']) {
                    return Err(SerializationError::InvalidHeader {
                        name: name.to_string(),
                    });
                }
                head.push_str(&format!(
                    "{}: {}\r\n",
                    canonical_header_name(name.trim()),
                    value.trim()
                ));
            }
        }
        if !body.is_empty() && !headers.contains(HEADER_CONTENT_LENGTH) {
            head.push_str(&format!("{HEADER_CONTENT_LENGTH}: {}\r\n", body.len()));
        }
        head.push_str("\r\n");

        let mut out = head.into_bytes();
        out.extend_from_slice(&body);
        Ok(out)
    }
}

/// Resolves placeholder values in headers.
pub trait TemplateExpander {
    fn expand(&self, headers: &HeaderMultimap) -> HeaderMultimap;
}

/// Returns headers unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopExpander;

impl TemplateExpander for NoopExpander {
    fn expand(&self, headers: &HeaderMultimap) -> HeaderMultimap {
        headers.clone()
    }
}

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}").expect("placeholder pattern is valid")
});

/// Replaces `{{name}}` markers in header values with known variables.
///
/// Unknown markers are left as written.
#[derive(Debug, Default, Clone)]
pub struct VariableExpander {
    variables: HashMap<String, String>,
}

impl VariableExpander {
    pub fn new(variables: HashMap<String, String>) -> Self {
        Self { variables }
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    fn expand_value(&self, value: &str) -> String {
        PLACEHOLDER
            .replace_all(value, |caps: &Captures| {
                self.variables
                    .get(&caps[1])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

impl TemplateExpander for VariableExpander {
    fn expand(&self, headers: &HeaderMultimap) -> HeaderMultimap {
        let mut expanded = HeaderMultimap::new();
        for (name, values) in headers.iter() {
            expanded.insert(
                name,
                values.iter().map(|v| self.expand_value(v)).collect(),
            );
        }
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serialize(
        path: &str,
        headers: &HeaderMultimap,
        data: &'static str,
        unsafe_names: &[&str],
    ) -> Result<String, SerializationError> {
        let options = RawOptions {
            custom_headers: unsafe_names.iter().map(|s| s.to_string()).collect(),
        };
        RawHttp1Serializer
            .serialize(
                "POST",
                "http://example.com:8080/base?q=1",
                path,
                headers,
                Body::from(data),
                &options,
            )
            .map(|bytes| String::from_utf8(bytes).unwrap())
    }

    #[test]
    fn test_serialize_basic_request() {
        let headers: HeaderMultimap = [("content-type", " text/plain ")].into_iter().collect();
        let out = serialize("/submit", &headers, "abc", &[]).unwrap();
        assert_eq!(
            out,
            "POST /submit HTTP/1.1\r\n\
             Host: example.com:8080\r\n\
             Content-Type: text/plain\r\n\
             Content-Length: 3\r\n\
             \r\n\
             abc"
        );
    }

    #[test]
    fn test_serialize_falls_back_to_url_target() {
        let out = serialize("", &HeaderMultimap::new(), "", &[]).unwrap();
        assert!(out.starts_with("POST /base?q=1 HTTP/1.1\r\n"));
        assert!(!out.contains("Content-Length"));
    }

    #[test]
    fn test_serialize_absolute_url_path_is_verbatim_target() {
        let out = serialize("http://proxy.test/abs?x=1", &HeaderMultimap::new(), "", &[]).unwrap();
        assert!(out.starts_with("POST http://proxy.test/abs?x=1 HTTP/1.1\r\n"));
        assert!(out.contains("Host: example.com:8080\r\n"));
    }

    #[test]
    fn test_serialize_keeps_supplied_host_and_length() {
        let headers: HeaderMultimap = [("host", "spoofed"), ("Content-Length", "99")]
            .into_iter()
            .collect();
        let out = serialize("/", &headers, "abc", &[]).unwrap();
        assert!(out.contains("Host: spoofed\r\n"));
        assert!(!out.contains("example.com"));
        assert!(out.contains("Content-Length: 99\r\n"));
        assert!(!out.contains("Content-Length: 3"));
    }

    #[test]
    fn test_serialize_unsafe_header_is_verbatim() {
        let headers: HeaderMultimap = [("x-smuggle ", "a\r\nTransfer-Encoding: chunked")]
            .into_iter()
            .collect();
        let out = serialize("/", &headers, "", &["x-smuggle "]).unwrap();
        assert!(out.contains("x-smuggle : a\r\nTransfer-Encoding: chunked\r\n"));
    }

    #[test]
    fn test_serialize_rejects_crlf_in_safe_header() {
        let headers: HeaderMultimap = [("X-Evil", "a\r\nInjected: 1")].into_iter().collect();
        assert!(matches!(
            serialize("/", &headers, "", &[]),
            Err(SerializationError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_serialize_repeats_multi_valued_headers() {
        let headers: HeaderMultimap = [("Cookie", "a=1"), ("Cookie", "b=2")].into_iter().collect();
        let out = serialize("/", &headers, "", &[]).unwrap();
        assert!(out.contains("Cookie: a=1\r\nCookie: b=2\r\n"));
    }

    #[test]
    fn test_serialize_invalid_url() {
        let result = RawHttp1Serializer.serialize(
            "GET",
            "not a url",
            "/",
            &HeaderMultimap::new(),
            Body::empty(),
            &RawOptions::default(),
        );
        assert!(matches!(result, Err(SerializationError::InvalidUrl { .. })));
    }

    #[test]
    fn test_variable_expander() {
        let mut expander = VariableExpander::default();
        expander.set("Hostname", "example.com");
        let headers: HeaderMultimap = [
            ("Origin", "https://{{Hostname}}"),
            ("X-Unknown", "{{missing}}"),
            ("X-Spaced", "{{ Hostname }}/a"),
        ]
        .into_iter()
        .collect();

        let expanded = expander.expand(&headers);
        assert_eq!(expanded.get("Origin"), Some("https://example.com"));
        assert_eq!(expanded.get("X-Unknown"), Some("{{missing}}"));
        assert_eq!(expanded.get("X-Spaced"), Some("example.com/a"));
    }

    #[test]
    fn test_noop_expander() {
        let headers: HeaderMultimap = [("A", "{{x}}")].into_iter().collect();
        assert_eq!(NoopExpander.expand(&headers), headers);
    }
}
