//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `wire_trace` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Building the request and printing the trace
//!
//! All core functionality is implemented in the library crate.

use std::io::Write;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use reqwest::header::{HeaderName, HeaderValue};

use wire_trace::config::Opt;
use wire_trace::initialization::{init_client, init_logger_with};
use wire_trace::{
    raw_has_body, CaptureOptions, Config, DumpStats, GeneratedRequest, RawRequest, Tracer,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from(Opt::parse());

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = run(config).await {
        eprintln!("wire_trace error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn run(config: Config) -> Result<()> {
    let client = init_client(&config).context("Failed to initialize HTTP client")?;
    let stats = Arc::new(DumpStats::new());
    let tracer = Tracer::new(client).options(CaptureOptions {
        max_redirects: config.max_redirects,
        stats: Some(Arc::clone(&stats)),
    });

    let request = build_request(&config)?;
    let transaction = tracer
        .execute(request, &config.url)
        .await
        .with_context(|| format!("Failed to trace {}", config.url))?;

    let mut stdout = std::io::stdout().lock();
    if config.body_only {
        stdout.write_all(&transaction.body)?;
    } else {
        stdout.write_all(&transaction.request_dump)?;
        stdout.write_all(b"\n\n")?;
        stdout.write_all(&transaction.response_dump.bytes)?;
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;

    if transaction.decompression_error.is_some() {
        warn!("Final body may still be compressed");
    }
    if !transaction.response_dump.is_complete() {
        warn!("Earlier hops of the redirect chain are missing from the dump");
    }
    info!(
        "{} {} after {} redirect{}",
        transaction.status(),
        transaction.final_url,
        transaction.redirects,
        if transaction.redirects == 1 { "" } else { "s" }
    );
    stats.log_summary();
    Ok(())
}

/// Builds a raw request when any header is marked unsafe, a structured one otherwise.
fn build_request(config: &Config) -> Result<GeneratedRequest> {
    if !config.unsafe_headers.is_empty() {
        let mut raw = RawRequest {
            method: config.method.clone(),
            data: config.data.clone().unwrap_or_default(),
            unsafe_headers: config.unsafe_headers.iter().cloned().collect(),
            ..Default::default()
        };
        for (name, value) in &config.headers {
            raw.headers.append(name.clone(), value.clone());
        }
        let text = String::from_utf8_lossy(
            &wire_trace::dump_request(&mut GeneratedRequest::Raw(raw.clone()), &config.url)
                .context("Failed to serialize raw request")?,
        )
        .into_owned();
        if !raw.data.is_empty() && !raw_has_body(&text) {
            warn!("Raw request carries data but its framing headers do not describe a body");
        }
        return Ok(GeneratedRequest::Raw(raw));
    }

    let method = reqwest::Method::from_bytes(config.method.as_bytes())
        .with_context(|| format!("Invalid method {:?}", config.method))?;
    let url = url::Url::parse(&config.url).with_context(|| format!("Invalid URL {:?}", config.url))?;
    let mut request = reqwest::Request::new(method, url);
    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("Invalid header name {:?} (mark it with --unsafe-header)", name))?;
        let value = HeaderValue::from_str(value)
            .with_context(|| format!("Invalid value for header {}", name))?;
        request.headers_mut().append(name, value);
    }
    if let Some(data) = &config.data {
        *request.body_mut() = Some(data.clone().into());
    }
    Ok(GeneratedRequest::Structured(request))
}
