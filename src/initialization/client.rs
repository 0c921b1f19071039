//! HTTP client initialization.

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::Config;
use crate::error_handling::InitializationError;

/// Initializes the HTTP client used for traced execution.
///
/// Creates a `reqwest::Client` with:
/// - Redirects disabled, so each hop can be recorded by the tracer
/// - Timeout and User-Agent from the config
///
/// The client does not decompress bodies; gzip handling is left to
/// [`crate::decompress_body`] so the dump shows what the server actually sent.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails,
/// for example when the User-Agent is not a valid header value.
pub fn init_client(config: &Config) -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(client)
}
