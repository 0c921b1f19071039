//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use clap::{Parser, ValueEnum};

use crate::config::constants::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, MAX_REDIRECT_HOPS};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```
/// use wire_trace::Config;
///
/// let config = Config {
///     url: "https://example.com/".to_string(),
///     max_redirects: 5,
///     ..Default::default()
/// };
/// assert_eq!(config.method, "GET");
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Target URL
    pub url: String,

    /// Request method
    pub method: String,

    /// Extra request headers, in order
    pub headers: Vec<(String, String)>,

    /// Request body
    pub data: Option<String>,

    /// Header names sent verbatim; a non-empty list switches to a raw request
    pub unsafe_headers: Vec<String>,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Maximum number of redirects to follow
    pub max_redirects: usize,

    /// Print only the decompressed final body
    pub body_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: "GET".to_string(),
            headers: Vec::new(),
            data: None,
            unsafe_headers: Vec::new(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: MAX_REDIRECT_HOPS,
            body_only: false,
        }
    }
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Trace a GET with its redirect chain
/// wire_trace http://example.com/
///
/// # POST a body, following at most 3 redirects
/// wire_trace https://example.com/login -X POST -d 'user=a' --max-redirects 3
///
/// # Send a malformed header verbatim
/// wire_trace http://example.com/ -H 'X-Bad : a' --unsafe-header 'X-Bad '
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "wire_trace",
    about = "Prints the full wire trace of an HTTP request and its redirect chain."
)]
pub struct Opt {
    /// Target URL
    pub url: String,

    /// Request method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Request header as 'Name: value' (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_header_arg)]
    pub headers: Vec<(String, String)>,

    /// Request body
    #[arg(short = 'd', long)]
    pub data: Option<String>,

    /// Header name to send verbatim (repeatable); implies a raw request
    #[arg(long = "unsafe-header")]
    pub unsafe_headers: Vec<String>,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Maximum number of redirects to follow
    #[arg(long, default_value_t = MAX_REDIRECT_HOPS)]
    pub max_redirects: usize,

    /// Print only the decompressed final body
    #[arg(long)]
    pub body_only: bool,
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        Self {
            url: opt.url,
            method: opt.method,
            headers: opt.headers,
            data: opt.data,
            unsafe_headers: opt.unsafe_headers,
            log_level: opt.log_level,
            log_format: opt.log_format,
            timeout_seconds: opt.timeout_seconds,
            user_agent: opt.user_agent,
            max_redirects: opt.max_redirects,
            body_only: opt.body_only,
        }
    }
}

/// Parses a `Name: value` header argument.
///
/// The name is kept exactly as written (it may be deliberately malformed);
/// a single space after the colon is dropped from the value.
pub fn parse_header_arg(arg: &str) -> Result<(String, String), String> {
    let (name, value) = arg
        .split_once(':')
        .ok_or_else(|| format!("header {arg:?} is not in 'Name: value' form"))?;
    if name.is_empty() {
        return Err(format!("header {arg:?} has an empty name"));
    }
    let value = value.strip_prefix(' ').unwrap_or(value);
    Ok((name.to_string(), value.to_string()))
}
