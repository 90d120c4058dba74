//! # Domain Models
//!
//! Strongly-typed identifiers and value types shared by the loader, the
//! provider adapters and the table math.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Ticker`] | Validated market ticker (`SPY`, `^VIX`, `DX-Y.NYB`) |
//! | [`SeriesId`] | Validated macro series id (`WALCL`) |
//! | [`DateWindow`] | Inclusive `[start, end]` date range, used as cache key |
//! | [`Observation`] | One dated value, possibly missing |
//! | [`ObservationSeries`] | Observations returned by one provider call |
//!
//! All identifiers validate at construction, so adapters never see an
//! identifier they would have to reject themselves.

mod observation;
mod symbol;
mod window;

pub use observation::{Observation, ObservationSeries};
pub use symbol::{SeriesId, Ticker};
pub use window::{format_date, parse_date, DateWindow, DEFAULT_START};
