use serde::Serialize;

use ferromacro_core::CorrelationMatrix;

use crate::error::CliError;
use crate::output::format_grid;

use super::{CommandResult, Context};

#[derive(Debug, Serialize)]
struct CorrelationResponseData<'a> {
    method: &'static str,
    input: &'static str,
    matrix: &'a CorrelationMatrix,
}

pub async fn run(context: &Context) -> Result<CommandResult, CliError> {
    let (window, outcome) = context.load().await?;
    let matrix = CorrelationMatrix::of_returns(&outcome.frame);

    let data = serde_json::to_value(CorrelationResponseData {
        method: "pearson",
        input: "pct_change",
        matrix: &matrix,
    })?;
    Ok(CommandResult::loaded(data, window, &outcome).with_table(matrix_table(&matrix)))
}

fn matrix_table(matrix: &CorrelationMatrix) -> String {
    let mut header = vec![String::new()];
    header.extend(matrix.labels().iter().cloned());

    let rows: Vec<Vec<String>> = matrix
        .labels()
        .iter()
        .zip(matrix.rows())
        .map(|(label, row)| {
            let mut cells = vec![label.clone()];
            cells.extend(row.iter().map(|cell| {
                cell.map_or_else(|| String::from("n/a"), |value| format!("{value:.2}"))
            }));
            cells
        })
        .collect();

    format_grid(&header, &rows)
}
