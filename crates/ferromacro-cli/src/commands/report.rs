use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use ferromacro_core::{format_date, DateWindow, SeriesFrame};
use ferromacro_report::ReportPage;

use crate::cli::ReportArgs;
use crate::error::CliError;

use super::{CommandResult, Context};

#[derive(Debug, Serialize)]
struct ReportResponseData {
    path: PathBuf,
    rows: usize,
    columns: Vec<String>,
    first_date: Option<String>,
    last_date: Option<String>,
}

pub async fn run(args: &ReportArgs, context: &Context) -> Result<CommandResult, CliError> {
    let (window, outcome) = context.load().await?;

    if args.text {
        let page = ReportPage::build(&outcome.frame, window)?;
        return Ok(CommandResult::loaded(Value::Null, window, &outcome).with_raw_text(page.to_text()));
    }

    let data = write_report(&outcome.frame, window, &args.out)?;
    Ok(CommandResult::loaded(data, window, &outcome))
}

/// Build the page, write it as HTML and describe what was written.
pub fn write_report(frame: &SeriesFrame, window: DateWindow, path: &Path) -> Result<Value, CliError> {
    let page = ReportPage::build(frame, window)?;
    page.write_html(path)?;
    tracing::info!(path = %path.display(), rows = frame.row_count(), "report written");

    Ok(serde_json::to_value(ReportResponseData {
        path: path.to_path_buf(),
        rows: frame.row_count(),
        columns: frame.column_names().into_iter().map(str::to_owned).collect(),
        first_date: frame.first_date().map(format_date),
        last_date: frame.last_date().map(format_date),
    })?)
}
