//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use reqwest::Url;

use crate::domain::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "custview")]
#[command(about = "Search, filter and page through a remote customer collection")]
#[command(version)]
pub struct Cli {
    /// Base URL of the service exposing `GET /customer`
    #[arg(long, env = "CUSTVIEW_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Quiet period after the last keystroke before a search is sent
    #[arg(long, env = "CUSTVIEW_DEBOUNCE_MS", default_value_t = 1000, allow_negative_numbers = true)]
    pub debounce_ms: i64,

    /// Per-request timeout in seconds
    #[arg(long, env = "CUSTVIEW_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Write logs to this file (the terminal is owned by the UI)
    #[arg(long, env = "CUSTVIEW_LOG_FILE", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Always ends in `/` so that joining `customer` appends a segment
    pub base_url: Url,
    /// Raw debounce setting; the debouncer rejects negatives itself
    pub debounce_ms: i64,
    pub timeout: Duration,
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn into_config(self) -> Result<Config, ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Config {
            base_url: parse_base_url(&self.base_url)?,
            debounce_ms: self.debounce_ms,
            timeout: Duration::from_secs(self.timeout_secs),
            log_file: self.log_file,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidBaseUrl(format!("{raw}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl(format!(
            "{raw}: scheme must be http or https"
        )));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
