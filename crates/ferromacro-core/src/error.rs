use thiserror::Error;

use crate::data_source::SourceError;

/// Validation and contract errors exposed by `ferromacro-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker length {len} exceeds max {max}")]
    TickerTooLong { len: usize, max: usize },
    #[error("ticker contains invalid character '{ch}' at index {index}")]
    TickerInvalidChar { ch: char, index: usize },

    #[error("series id cannot be empty")]
    EmptySeriesId,
    #[error("series id length {len} exceeds max {max}")]
    SeriesIdTooLong { len: usize, max: usize },
    #[error("series id contains invalid character '{ch}' at index {index}")]
    SeriesIdInvalidChar { ch: char, index: usize },

    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("window start {start} is after end {end}")]
    InvertedWindow { start: String, end: String },

    #[error("invalid provider kind '{value}', expected one of market, macro")]
    InvalidProviderKind { value: String },
    #[error("invalid alignment '{value}', expected one of union, anchor")]
    InvalidAlignment { value: String },

    #[error("catalog must contain at least one entry")]
    EmptyCatalog,
    #[error("catalog entry name cannot be empty")]
    EmptyEntryName,
    #[error("catalog entry '{name}' is declared more than once")]
    DuplicateEntry { name: String },
}

/// Table construction failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("column '{column}' has {actual} values but the index has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("row index must be strictly increasing (violation at row {row})")]
    UnsortedIndex { row: usize },
    #[error("column '{name}' appears more than once")]
    DuplicateColumn { name: String },
}

/// Configuration resolved at startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("FRED API key is not configured (set FERROMACRO_FRED_API_KEY or FRED_API_KEY)")]
    MissingFredApiKey,
    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidEnv { name: &'static str, value: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Loader failure. The first failing catalog entry aborts the whole load.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("failed to load '{entry}': {source}")]
    Source {
        entry: String,
        #[source]
        source: SourceError,
    },
    #[error(transparent)]
    Frame(#[from] FrameError),
}

impl LoadError {
    pub fn entry(&self) -> Option<&str> {
        match self {
            Self::Source { entry, .. } => Some(entry.as_str()),
            Self::Frame(_) => None,
        }
    }
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
