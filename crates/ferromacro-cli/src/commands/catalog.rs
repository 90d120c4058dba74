use serde::Serialize;

use ferromacro_core::CatalogEntry;

use crate::error::CliError;
use crate::output::format_grid;

use super::{CommandResult, Context};

#[derive(Debug, Serialize)]
struct CatalogResponseData<'a> {
    entries: &'a [CatalogEntry],
}

pub fn run(context: &Context) -> Result<CommandResult, CliError> {
    let entries = context.catalog.entries();
    let data = serde_json::to_value(CatalogResponseData { entries })?;

    let header = ["name", "id", "kind", "description"].map(String::from);
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|entry| {
            vec![
                entry.name.clone(),
                entry.id.clone(),
                entry.kind.to_string(),
                entry.description.clone(),
            ]
        })
        .collect();

    Ok(CommandResult::ok(data).with_table(format_grid(&header, &rows)))
}
