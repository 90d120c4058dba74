use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::metadata::Envelope;

/// Print one envelope to stdout.
///
/// `table` is a preformatted terminal layout of `data`; commands without one
/// fall back to indented JSON under the metadata header.
pub fn render(
    envelope: &Envelope,
    table: Option<&str>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => print!("{}", render_table(envelope, table)?),
    }

    Ok(())
}

fn render_table(envelope: &Envelope, table: Option<&str>) -> Result<String, CliError> {
    let meta = &envelope.meta;
    let mut out = String::new();
    out.push_str(&format!("request_id  : {}\n", meta.request_id));
    out.push_str(&format!("schema      : {}\n", meta.schema_version));
    out.push_str(&format!("generated_at: {}\n", meta.generated_at));
    if let Some(window) = meta.window {
        out.push_str(&format!("window      : {window}\n"));
    }
    out.push_str(&format!("latency_ms  : {}\n", meta.latency_ms));
    out.push_str(&format!("cache_hit   : {}\n", meta.cache_hit));

    if !meta.warnings.is_empty() {
        out.push_str("warnings:\n");
        for warning in &meta.warnings {
            out.push_str(&format!("  - {warning}\n"));
        }
    }

    out.push_str("data:\n");
    match table {
        Some(table) => {
            for line in table.lines() {
                out.push_str(&format!("  {line}\n"));
            }
        }
        None => {
            let pretty_data = serde_json::to_string_pretty(&envelope.data)?;
            for line in pretty_data.lines() {
                out.push_str(&format!("  {line}\n"));
            }
        }
    }

    Ok(out)
}

/// Left-aligned first column, right-aligned rest, two-space gutters.
pub fn format_grid(header: &[String], rows: &[Vec<String>]) -> String {
    let columns = header.len();
    let mut widths: Vec<usize> = header.iter().map(|cell| cell.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(columns) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .enumerate()
            .take(columns)
            .map(|(i, cell)| {
                if i == 0 {
                    format!("{cell:<width$}", width = widths[i])
                } else {
                    format!("{cell:>width$}", width = widths[i])
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_owned()
    };

    let mut out = line(header);
    out.push('\n');
    let rule_width = widths.iter().sum::<usize>() + 2 * columns.saturating_sub(1);
    out.push_str(&"-".repeat(rule_width));
    out.push('\n');
    for row in rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::EnvelopeMeta;
    use serde_json::json;

    #[test]
    fn grid_aligns_columns() {
        let grid = format_grid(
            &[String::from("date"), String::from("SPY")],
            &[
                vec![String::from("2024-01-02"), String::from("100.00")],
                vec![String::from("2024-01-03"), String::from("99.10")],
            ],
        );
        let lines: Vec<&str> = grid.lines().collect();
        assert_eq!(lines[0], "date           SPY");
        assert_eq!(lines[1], "------------------");
        assert_eq!(lines[2], "2024-01-02  100.00");
        assert_eq!(lines[3], "2024-01-03   99.10");
    }

    #[test]
    fn table_falls_back_to_json_data() {
        let envelope = Envelope {
            meta: EnvelopeMeta::new(None, 5, false),
            data: json!({"entries": 9}),
        };
        let text = render_table(&envelope, None).expect("renders");
        assert!(text.contains("latency_ms  : 5"));
        assert!(text.contains("\"entries\": 9"));
        assert!(!text.contains("window"));
    }

    #[test]
    fn table_prefers_preformatted_layout() {
        let envelope = Envelope {
            meta: EnvelopeMeta::new(None, 0, true),
            data: json!({}),
        };
        let text = render_table(&envelope, Some("a  b\n1  2")).expect("renders");
        assert!(text.ends_with("data:\n  a  b\n  1  2\n"));
    }
}
