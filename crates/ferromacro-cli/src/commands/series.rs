use serde::Serialize;

use ferromacro_core::{format_date, SeriesFrame};

use crate::cli::SeriesArgs;
use crate::error::CliError;
use crate::output::format_grid;

use super::{CommandResult, Context};

#[derive(Debug, Serialize)]
struct SeriesResponseData<'a> {
    normalized: bool,
    rows: usize,
    frame: &'a SeriesFrame,
}

pub async fn run(args: &SeriesArgs, context: &Context) -> Result<CommandResult, CliError> {
    if args.tail == Some(0) {
        return Err(CliError::Usage(String::from("--tail must be at least 1")));
    }

    let (window, outcome) = context.load().await?;
    let mut frame = if args.normalized {
        outcome.frame.normalize()
    } else {
        outcome.frame.as_ref().clone()
    };
    if let Some(rows) = args.tail {
        frame = frame.tail(rows);
    }

    let data = serde_json::to_value(SeriesResponseData {
        normalized: args.normalized,
        rows: frame.row_count(),
        frame: &frame,
    })?;
    Ok(CommandResult::loaded(data, window, &outcome).with_table(frame_table(&frame)))
}

fn frame_table(frame: &SeriesFrame) -> String {
    let mut header = vec![String::from("date")];
    header.extend(frame.column_names().into_iter().map(str::to_owned));

    let rows: Vec<Vec<String>> = frame
        .index()
        .iter()
        .enumerate()
        .map(|(row, date)| {
            let mut cells = vec![format_date(*date)];
            cells.extend(frame.row(row).into_iter().map(format_value));
            cells
        })
        .collect();

    format_grid(&header, &rows)
}

fn format_value(value: Option<f64>) -> String {
    value.map_or_else(|| String::from("-"), |v| format!("{v:.2}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn table_has_one_line_per_row_plus_header() {
        let frame = SeriesFrame::from_rows(
            vec![date!(2024 - 01 - 02), date!(2024 - 01 - 03)],
            &["SPY", "VIX"],
            &[vec![Some(100.0), Some(13.2)], vec![Some(99.1), None]],
        )
        .expect("valid frame");

        let table = frame_table(&frame);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("date"));
        assert!(lines[2].contains("100.00"));
        assert!(lines[3].ends_with('-'));
    }
}
