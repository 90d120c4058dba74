use serde::Serialize;

use ferromacro_report::{format_krw, AllocationSchedule, NarrativeBlock, STRATEGY_RATIONALE};

use crate::error::CliError;
use crate::output::format_grid;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct StrategyResponseData<'a> {
    schedule: &'a AllocationSchedule,
    rationale: NarrativeBlock,
}

/// The plan is fixed text; nothing is loaded.
pub fn run() -> Result<CommandResult, CliError> {
    let schedule = AllocationSchedule::default_plan();
    schedule.validate()?;

    let data = serde_json::to_value(StrategyResponseData {
        schedule: &schedule,
        rationale: STRATEGY_RATIONALE,
    })?;
    Ok(CommandResult::ok(data).with_table(schedule_table(&schedule)))
}

fn schedule_table(schedule: &AllocationSchedule) -> String {
    let header = ["period", "instrument", "weight", "amount"].map(String::from);
    let rows: Vec<Vec<String>> = schedule
        .months
        .iter()
        .flat_map(|month| {
            month.holdings.iter().map(|holding| {
                vec![
                    month.period.clone(),
                    holding.instrument.clone(),
                    format!("{}%", holding.weight_pct),
                    format_krw(holding.amount_krw),
                ]
            })
        })
        .collect();

    let mut table = format_grid(&header, &rows);
    table.push('\n');
    table.push_str(&schedule.caveat);
    table.push('\n');
    table
}
