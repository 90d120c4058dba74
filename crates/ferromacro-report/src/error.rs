use std::path::PathBuf;

use thiserror::Error;

/// Rendering failures.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot render an empty table")]
    EmptyTable,

    #[error("allocation for {period} sums to {total_pct}%, expected 100%")]
    InvalidAllocation { period: String, total_pct: u32 },

    #[error("failed to write report to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
