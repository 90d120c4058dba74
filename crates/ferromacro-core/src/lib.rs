//! # Ferromacro Core
//!
//! Data loading and table math for the ferromacro indicator dashboard.
//!
//! ## Overview
//!
//! - **Catalog** of market (Yahoo) and macro (FRED) series
//! - **Provider adapters** behind one [`SeriesSource`] trait
//! - **Loader** that aligns, fills and caches one table per date window
//! - **Table transforms**: normalization to 100, percentage change
//! - **Correlation** of returns between indicators
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo chart, FRED observations, synthetic offline data |
//! | [`cache`] | TTL cache keyed by [`DateWindow`] |
//! | [`catalog`] | Named series and their provider family |
//! | [`config`] | Environment-backed [`MacroConfig`] |
//! | [`correlation`] | Pearson correlation matrix |
//! | [`data_source`] | Provider trait, requests and structured errors |
//! | [`domain`] | Tickers, series ids, dates and observations |
//! | [`error`] | Core error types |
//! | [`frame`] | Date-indexed table with fill/normalize/pct-change |
//! | [`http_client`] | HTTP client abstraction and fixture client |
//! | [`loader`] | Catalog-driven table assembly |
//! | [`retry`] | Backoff and retry policy for transport calls |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ferromacro_core::{CacheMode, Loader, MacroConfig, SeriesCatalog};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MacroConfig::from_env()?;
//!     let loader = Loader::synthetic(&config, SeriesCatalog::default());
//!
//!     let outcome = loader.load(config.window()?, CacheMode::Use).await?;
//!     let normalized = outcome.frame.normalize();
//!     println!("{} rows", normalized.row_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / Report   │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │     Loader      │────▶│  FrameCache      │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  SeriesSource   │────▶│ HTTP Client      │
//! │ (Yahoo / FRED)  │     │ (retry, reqwest) │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  SeriesFrame    │
//! └─────────────────┘
//! ```
//!
//! ## Security
//!
//! - The FRED key lives in [`ApiKey`], whose `Debug` output is redacted
//! - Logged URLs mask the `api_key` query parameter
//! - Identifiers are validated before any request is built

pub mod adapters;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod correlation;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod frame;
pub mod http_client;
pub mod loader;
pub mod retry;

// Adapter implementations
pub use adapters::{FredAdapter, SyntheticSource, YahooChartAdapter};

// Caching
pub use cache::{CacheMode, FrameCache, TtlCache};

// Catalog
pub use catalog::{CatalogEntry, SeriesCatalog};

// Configuration
pub use config::{ApiKey, MacroConfig};

// Correlation
pub use correlation::CorrelationMatrix;

// Data source trait and types
pub use data_source::{
    ProviderKind, SeriesFuture, SeriesRequest, SeriesSource, SourceError, SourceErrorKind,
};

// Domain models
pub use domain::{
    format_date, parse_date, DateWindow, Observation, ObservationSeries, SeriesId, Ticker,
    DEFAULT_START,
};

// Error types
pub use error::{ConfigError, CoreError, FrameError, LoadError, ValidationError};

// Table
pub use frame::{AlignMode, Column, SeriesFrame, NORMALIZED_BASE};

// HTTP client types
pub use http_client::{
    FixtureHttpClient, HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse,
    ReqwestHttpClient,
};

// Loader
pub use loader::{LoadOutcome, Loader};

// Retry logic
pub use retry::{Backoff, RetryConfig};
