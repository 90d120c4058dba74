//! Provider contract and its request/error types.
//!
//! Every provider adapter implements [`SeriesSource`]: given an identifier
//! and a date window it returns an [`ObservationSeries`]. The loader only
//! talks to this trait, which keeps it independent of Yahoo/FRED payloads.
//!
//! # Example
//!
//! ```rust,ignore
//! use ferromacro_core::{DateWindow, SeriesRequest, SeriesSource, SyntheticSource, ProviderKind};
//!
//! async fn first_value(source: &SyntheticSource) -> Option<f64> {
//!     let window = DateWindow::parse("2024-01-01", "2024-01-31").ok()?;
//!     let request = SeriesRequest::new("SPY", window);
//!     let series = source.fetch(request).await.ok()?;
//!     series.observations().first()?.value
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{DateWindow, ObservationSeries, ValidationError};

/// Which provider family serves a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Daily adjusted-close prices (Yahoo Finance).
    Market,
    /// Published economic observation series (FRED).
    Macro,
}

impl ProviderKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Macro => "macro",
        }
    }
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "market" => Ok(Self::Market),
            "macro" => Ok(Self::Macro),
            _ => Err(ValidationError::InvalidProviderKind {
                value: value.to_owned(),
            }),
        }
    }
}

/// One provider call: identifier plus inclusive date window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub id: String,
    pub window: DateWindow,
}

impl SeriesRequest {
    pub fn new(id: impl Into<String>, window: DateWindow) -> Self {
        Self {
            id: id.into(),
            window,
        }
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    Unauthorized,
    NotFound,
    InvalidRequest,
    Malformed,
    Internal,
}

impl SourceErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::RateLimited => "rate_limited",
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not_found",
            Self::InvalidRequest => "invalid_request",
            Self::Malformed => "malformed",
            Self::Internal => "internal",
        }
    }
}

/// Structured provider error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    fn new(kind: SourceErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unavailable, message, true)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::RateLimited, message, true)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unauthorized, message, false)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::NotFound, message, false)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::InvalidRequest, message, false)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Malformed, message, false)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Internal, message, false)
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(provider: &str, status: u16, detail: &str) -> Self {
        let message = if detail.is_empty() {
            format!("{provider} returned status {status}")
        } else {
            format!("{provider} returned status {status}: {detail}")
        };
        match status {
            401 | 403 => Self::unauthorized(message),
            404 => Self::not_found(message),
            429 => Self::rate_limited(message),
            400..=499 => Self::invalid_request(message),
            _ => Self::unavailable(message),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.kind.as_str())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        Self::invalid_request(error.to_string())
    }
}

/// Boxed future returned by [`SeriesSource::fetch`].
pub type SeriesFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ObservationSeries, SourceError>> + Send + 'a>>;

/// Adapter contract implemented by every provider.
pub trait SeriesSource: Send + Sync {
    /// Provider family this source serves.
    fn kind(&self) -> ProviderKind;

    /// Short provider name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Fetch observations for `req.id` within `req.window`.
    ///
    /// Implementations return an error rather than an empty series.
    fn fetch<'a>(&'a self, req: SeriesRequest) -> SeriesFuture<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_error_kinds() {
        assert_eq!(
            SourceError::from_status("fred", 403, "").kind(),
            SourceErrorKind::Unauthorized
        );
        assert_eq!(
            SourceError::from_status("yahoo", 404, "").kind(),
            SourceErrorKind::NotFound
        );
        let limited = SourceError::from_status("yahoo", 429, "");
        assert_eq!(limited.kind(), SourceErrorKind::RateLimited);
        assert!(limited.retryable());
        assert_eq!(
            SourceError::from_status("fred", 400, "bad series").kind(),
            SourceErrorKind::InvalidRequest
        );
        assert_eq!(
            SourceError::from_status("fred", 502, "").kind(),
            SourceErrorKind::Unavailable
        );
    }

    #[test]
    fn provider_kind_round_trips_through_str() {
        assert_eq!("Macro".parse::<ProviderKind>(), Ok(ProviderKind::Macro));
        assert!("crypto".parse::<ProviderKind>().is_err());
    }
}
