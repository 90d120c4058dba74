//! Startup configuration.
//!
//! Values are read once from the environment and can then be overridden
//! programmatically (the CLI applies its flags on top). Nothing downstream
//! reads the environment again.

use std::env;
use std::fmt::{Debug, Formatter};
use std::time::Duration;

use time::Date;

use crate::retry::RetryConfig;
use crate::{parse_date, AlignMode, ConfigError, DateWindow, ValidationError, DEFAULT_START};

pub const ENV_FRED_API_KEY: &str = "FERROMACRO_FRED_API_KEY";
pub const ENV_FRED_API_KEY_FALLBACK: &str = "FRED_API_KEY";
pub const ENV_START_DATE: &str = "FERROMACRO_START_DATE";
pub const ENV_CACHE_TTL_SECS: &str = "FERROMACRO_CACHE_TTL_SECS";
pub const ENV_TIMEOUT_MS: &str = "FERROMACRO_TIMEOUT_MS";
pub const ENV_MAX_RETRIES: &str = "FERROMACRO_MAX_RETRIES";

/// Provider credential. Never printed: `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_owned()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for ApiKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Everything the pipeline needs to run.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroConfig {
    pub fred_api_key: Option<ApiKey>,
    pub start: Date,
    /// `None` means "today" at the time the window is resolved.
    pub end: Option<Date>,
    pub cache_ttl: Duration,
    pub timeout_ms: u64,
    pub retry: RetryConfig,
    pub align: AlignMode,
}

impl Default for MacroConfig {
    fn default() -> Self {
        Self {
            fred_api_key: None,
            start: DEFAULT_START,
            end: None,
            cache_ttl: Duration::from_secs(3600),
            timeout_ms: 10_000,
            retry: RetryConfig::default(),
            align: AlignMode::Union,
        }
    }
}

impl MacroConfig {
    /// Read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.fred_api_key = lookup(ENV_FRED_API_KEY)
            .and_then(ApiKey::new)
            .or_else(|| lookup(ENV_FRED_API_KEY_FALLBACK).and_then(ApiKey::new));

        if let Some(raw) = lookup(ENV_START_DATE) {
            config.start = parse_date(&raw)?;
        }
        if let Some(raw) = lookup(ENV_CACHE_TTL_SECS) {
            config.cache_ttl = Duration::from_secs(parse_number(ENV_CACHE_TTL_SECS, &raw)?);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            config.timeout_ms = parse_number(ENV_TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_RETRIES) {
            let retries = parse_number(ENV_MAX_RETRIES, &raw)?;
            config.retry.max_retries =
                u32::try_from(retries).map_err(|_| ConfigError::InvalidEnv {
                    name: ENV_MAX_RETRIES,
                    value: raw.clone(),
                })?;
        }

        Ok(config)
    }

    pub fn with_fred_api_key(mut self, key: ApiKey) -> Self {
        self.fred_api_key = Some(key);
        self
    }

    pub fn with_start(mut self, start: Date) -> Self {
        self.start = start;
        self
    }

    pub fn with_end(mut self, end: Date) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    pub fn with_align(mut self, align: AlignMode) -> Self {
        self.align = align;
        self
    }

    /// The FRED key, or the error explaining how to set it.
    pub fn require_fred_api_key(&self) -> Result<&ApiKey, ConfigError> {
        self.fred_api_key
            .as_ref()
            .ok_or(ConfigError::MissingFredApiKey)
    }

    /// Concrete window for a run starting now.
    pub fn window(&self) -> Result<DateWindow, ValidationError> {
        match self.end {
            Some(end) => DateWindow::new(self.start, end),
            None => DateWindow::until_today(self.start),
        }
    }
}

fn parse_number(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        name,
        value: raw.to_owned(),
    })
}
