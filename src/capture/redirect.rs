//! Redirect following.
//!
//! Decides whether a response is followed and builds the next request with
//! the same method rules as reqwest's own redirect policy.

use log::warn;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use url::Url;

use crate::config::{BODY_HEADERS, SENSITIVE_HEADERS};
use crate::error_handling::CaptureError;

/// Returns true for the redirect statuses that carry a `Location`.
pub(crate) fn is_redirect(status: StatusCode) -> bool {
    matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308)
}

/// Builds the request for the next hop, or `None` when the chain ends here.
///
/// - 301/302/303 turn every method except `GET` and `HEAD` into `GET` and
///   never resend the body.
/// - 307/308 replay the original request, body included. `replay` is `None`
///   when the body was a stream, which ends the chain.
/// - Credentials are dropped when the redirect leaves the host.
///
/// # Errors
///
/// Returns `CaptureError::InvalidUrl` if `location` cannot be resolved
/// against `current`.
pub(crate) fn next_request(
    status: StatusCode,
    method: &Method,
    current: &Url,
    headers: &HeaderMap,
    location: Option<&str>,
    replay: Option<reqwest::Request>,
) -> Result<Option<reqwest::Request>, CaptureError> {
    if !is_redirect(status) {
        return Ok(None);
    }
    let Some(location) = location else {
        warn!(
            "Redirect status {} for {} but no Location header",
            status.as_u16(),
            current
        );
        return Ok(None);
    };
    let next_url = current.join(location)?;

    let mut next = match status.as_u16() {
        307 | 308 => match replay {
            Some(mut request) => {
                *request.url_mut() = next_url.clone();
                request
            }
            None => {
                warn!(
                    "Not following {} redirect to {}: request body cannot be replayed",
                    status.as_u16(),
                    next_url
                );
                return Ok(None);
            }
        },
        code => {
            let switch_to_get = matches!(code, 301 | 302 | 303)
                && !matches!(*method, Method::GET | Method::HEAD);
            let next_method = if switch_to_get {
                Method::GET
            } else {
                method.clone()
            };
            let mut request = reqwest::Request::new(next_method, next_url.clone());
            *request.headers_mut() = headers.clone();
            for name in BODY_HEADERS {
                request.headers_mut().remove(*name);
            }
            request
        }
    };

    if next_url.host_str() != current.host_str() {
        for name in SENSITIVE_HEADERS {
            next.headers_mut().remove(*name);
        }
    }
    Ok(Some(next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn post_with_body(target: &str) -> reqwest::Request {
        let mut request = reqwest::Request::new(Method::POST, url(target));
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        *request.body_mut() = Some("data".into());
        request
    }

    #[test]
    fn test_non_redirect_ends_chain() {
        let next = next_request(
            StatusCode::OK,
            &Method::GET,
            &url("http://a/"),
            &HeaderMap::new(),
            Some("/b"),
            None,
        )
        .unwrap();
        assert!(next.is_none());
        assert!(!is_redirect(StatusCode::NOT_MODIFIED));
    }

    #[test]
    fn test_missing_location_ends_chain() {
        let next = next_request(
            StatusCode::FOUND,
            &Method::GET,
            &url("http://a/"),
            &HeaderMap::new(),
            None,
            None,
        )
        .unwrap();
        assert!(next.is_none());
    }

    #[test]
    fn test_relative_location_is_resolved() {
        let next = next_request(
            StatusCode::MOVED_PERMANENTLY,
            &Method::GET,
            &url("http://a/dir/page"),
            &HeaderMap::new(),
            Some("other?x=1"),
            None,
        )
        .unwrap()
        .unwrap();
        assert_eq!(next.url().as_str(), "http://a/dir/other?x=1");
        assert_eq!(next.method(), Method::GET);
    }

    #[test]
    fn test_post_becomes_get_on_302() {
        let original = post_with_body("http://a/form");
        let next = next_request(
            StatusCode::FOUND,
            original.method(),
            original.url(),
            original.headers(),
            Some("/done"),
            original.try_clone(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(next.method(), Method::GET);
        assert!(next.body().is_none());
        assert!(next.headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_put_patch_delete_become_get_on_301_and_302() {
        for status in [StatusCode::MOVED_PERMANENTLY, StatusCode::FOUND] {
            for method in [Method::PUT, Method::PATCH, Method::DELETE] {
                let mut original = reqwest::Request::new(method.clone(), url("http://a/x"));
                original
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                *original.body_mut() = Some("{}".into());

                let next = next_request(
                    status,
                    original.method(),
                    original.url(),
                    original.headers(),
                    Some("/y"),
                    original.try_clone(),
                )
                .unwrap()
                .unwrap();
                assert_eq!(next.method(), Method::GET, "{method} on {status}");
                assert!(next.body().is_none());
                assert!(next.headers().get(CONTENT_TYPE).is_none());
            }
        }
    }

    #[test]
    fn test_head_keeps_method_on_301() {
        let next = next_request(
            StatusCode::MOVED_PERMANENTLY,
            &Method::HEAD,
            &url("http://a/x"),
            &HeaderMap::new(),
            Some("/y"),
            None,
        )
        .unwrap()
        .unwrap();
        assert_eq!(next.method(), Method::HEAD);
    }

    #[test]
    fn test_303_switches_to_get_except_head() {
        let next = next_request(
            StatusCode::SEE_OTHER,
            &Method::DELETE,
            &url("http://a/x"),
            &HeaderMap::new(),
            Some("/y"),
            None,
        )
        .unwrap()
        .unwrap();
        assert_eq!(next.method(), Method::GET);

        let next = next_request(
            StatusCode::SEE_OTHER,
            &Method::HEAD,
            &url("http://a/x"),
            &HeaderMap::new(),
            Some("/y"),
            None,
        )
        .unwrap()
        .unwrap();
        assert_eq!(next.method(), Method::HEAD);
    }

    #[test]
    fn test_307_replays_body() {
        let original = post_with_body("http://a/upload");
        let next = next_request(
            StatusCode::TEMPORARY_REDIRECT,
            original.method(),
            original.url(),
            original.headers(),
            Some("/upload2"),
            original.try_clone(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(next.method(), Method::POST);
        assert_eq!(next.url().path(), "/upload2");
        assert_eq!(next.body().and_then(|b| b.as_bytes()), Some(&b"data"[..]));
    }

    #[test]
    fn test_307_without_replayable_request_ends_chain() {
        let next = next_request(
            StatusCode::PERMANENT_REDIRECT,
            &Method::POST,
            &url("http://a/"),
            &HeaderMap::new(),
            Some("/b"),
            None,
        )
        .unwrap();
        assert!(next.is_none());
    }

    #[test]
    fn test_cross_host_redirect_drops_credentials() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer x"));

        let same_host = next_request(
            StatusCode::FOUND,
            &Method::GET,
            &url("http://a/"),
            &headers,
            Some("/b"),
            None,
        )
        .unwrap()
        .unwrap();
        assert!(same_host.headers().contains_key(AUTHORIZATION));

        let other_host = next_request(
            StatusCode::FOUND,
            &Method::GET,
            &url("http://a/"),
            &headers,
            Some("http://b/"),
            None,
        )
        .unwrap()
        .unwrap();
        assert!(!other_host.headers().contains_key(AUTHORIZATION));
    }

    #[test]
    fn test_invalid_location_is_an_error() {
        let result = next_request(
            StatusCode::FOUND,
            &Method::GET,
            &url("http://a/"),
            &HeaderMap::new(),
            Some("http://[::1"),
            None,
        );
        assert!(matches!(result, Err(CaptureError::InvalidUrl(_))));
    }
}
