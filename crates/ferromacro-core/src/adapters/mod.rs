//! Provider adapters implementing [`SeriesSource`](crate::SeriesSource).
//!
//! | Adapter | Family | Upstream |
//! |---------|--------|----------|
//! | [`YahooChartAdapter`] | market | Yahoo Finance chart v8 |
//! | [`FredAdapter`] | macro | FRED series observations |
//! | [`SyntheticSource`] | either | deterministic offline data |

mod fred;
mod synthetic;
mod yahoo;

pub use fred::FredAdapter;
pub use synthetic::SyntheticSource;
pub use yahoo::YahooChartAdapter;
