//! # Ferromacro Report
//!
//! Turns a loaded indicator table into a readable report.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`chart`] | Normalized multi-series line chart (SVG) |
//! | [`heatmap`] | Annotated correlation heatmap with color bar (SVG) |
//! | [`narrative`] | Fixed commentary and the monthly allocation plan |
//! | [`page`] | Section ordering, HTML and plain-text output |
//! | [`palette`] | Series colors and the diverging scale |
//!
//! ```rust,ignore
//! use ferromacro_report::ReportPage;
//!
//! let page = ReportPage::build(&outcome.frame, window)?;
//! page.write_html(Path::new("report.html"))?;
//! ```

pub mod chart;
pub mod error;
pub mod heatmap;
pub mod narrative;
pub mod page;
pub mod palette;
mod svg;

pub use chart::LineChart;
pub use error::ReportError;
pub use heatmap::Heatmap;
pub use narrative::{
    format_krw, AllocationSchedule, Holding, MonthlyAllocation, NarrativeBlock,
    CORRELATION_COMMENTARY, STRATEGY_RATIONALE, TOTAL_BUDGET_KRW, TREND_COMMENTARY,
};
pub use page::{ReportPage, Section};
pub use palette::{DivergingScale, Rgb};
