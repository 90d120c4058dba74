//! The assembled report: HTML for files, plain text for terminals.

use std::fmt::Write as _;
use std::path::Path;

use ferromacro_core::{CorrelationMatrix, DateWindow, SeriesFrame};

use crate::chart::LineChart;
use crate::heatmap::Heatmap;
use crate::narrative::{
    format_krw, AllocationSchedule, NarrativeBlock, CORRELATION_COMMENTARY, STRATEGY_RATIONALE,
    TREND_COMMENTARY,
};
use crate::svg::escape;
use crate::ReportError;

pub const PAGE_TITLE: &str = "Economic Indicators Analysis and Investment Strategy";
pub const CORRELATION_HEADING: &str = "Correlation Between Indicators";
pub const STRATEGY_HEADING: &str = "Monthly Investment Strategy (Oct 2024 - Mar 2025)";

pub fn trend_heading(start_year: i32) -> String {
    format!("Normalized Economic Indicators Trend ({start_year}-Present)")
}

#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Title(String),
    Heading(String),
    TrendChart {
        svg: String,
        /// Last normalized value per column, for the text rendering.
        latest: Vec<(String, Option<f64>)>,
    },
    CorrelationHeatmap {
        svg: String,
        matrix: CorrelationMatrix,
    },
    Narrative(NarrativeBlock),
    Schedule(AllocationSchedule),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportPage {
    window: DateWindow,
    sections: Vec<Section>,
}

impl ReportPage {
    /// Render every section from the filled (not yet normalized) table.
    pub fn build(frame: &SeriesFrame, window: DateWindow) -> Result<Self, ReportError> {
        if frame.is_empty() {
            return Err(ReportError::EmptyTable);
        }

        let normalized = frame.normalize();
        let chart = LineChart::default().render(&normalized)?;
        let latest = normalized
            .columns()
            .iter()
            .map(|column| (column.name().to_owned(), column.last_present()))
            .collect();

        let matrix = CorrelationMatrix::of_returns(frame);
        let heatmap = Heatmap::default().render(&matrix)?;

        let schedule = AllocationSchedule::default_plan();
        schedule.validate()?;

        let sections = vec![
            Section::Title(PAGE_TITLE.to_owned()),
            Section::Heading(trend_heading(window.start().year())),
            Section::TrendChart { svg: chart, latest },
            Section::Narrative(TREND_COMMENTARY),
            Section::Heading(CORRELATION_HEADING.to_owned()),
            Section::CorrelationHeatmap {
                svg: heatmap,
                matrix,
            },
            Section::Narrative(CORRELATION_COMMENTARY),
            Section::Heading(STRATEGY_HEADING.to_owned()),
            Section::Schedule(schedule),
            Section::Narrative(STRATEGY_RATIONALE),
        ];

        Ok(Self { window, sections })
    }

    pub fn window(&self) -> DateWindow {
        self.window
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn to_html(&self) -> String {
        let mut html = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(html, "<title>{}</title>", escape(PAGE_TITLE));
        html.push_str(STYLE);
        html.push_str("</head>\n<body>\n<main>\n");

        for section in &self.sections {
            match section {
                Section::Title(title) => {
                    let _ = writeln!(html, "<h1>{}</h1>", escape(title));
                    let _ = writeln!(
                        html,
                        "<p class=\"window\">Data window: {}</p>",
                        escape(&self.window.to_string())
                    );
                }
                Section::Heading(heading) => {
                    let _ = writeln!(html, "<h2>{}</h2>", escape(heading));
                }
                Section::TrendChart { svg, .. } | Section::CorrelationHeatmap { svg, .. } => {
                    let _ = writeln!(html, "<figure>{svg}</figure>");
                }
                Section::Narrative(block) => html_block(&mut html, block),
                Section::Schedule(schedule) => html_schedule(&mut html, schedule),
            }
        }

        html.push_str("</main>\n</body>\n</html>\n");
        html
    }

    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for section in &self.sections {
            match section {
                Section::Title(title) => {
                    let _ = writeln!(text, "{title}\n{}", "=".repeat(title.chars().count()));
                    let _ = writeln!(text, "Data window: {}\n", self.window);
                }
                Section::Heading(heading) => {
                    let _ = writeln!(text, "{heading}\n{}", "-".repeat(heading.chars().count()));
                }
                Section::TrendChart { latest, .. } => {
                    text.push_str("Latest normalized values:\n");
                    for (name, value) in latest {
                        let _ = writeln!(text, "  {name:<22} {}", format_cell(*value, 2));
                    }
                    text.push('\n');
                }
                Section::CorrelationHeatmap { matrix, .. } => text_matrix(&mut text, matrix),
                Section::Narrative(block) => text_block(&mut text, block),
                Section::Schedule(schedule) => text_schedule(&mut text, schedule),
            }
        }
        text
    }

    pub fn write_html(&self, path: &Path) -> Result<(), ReportError> {
        std::fs::write(path, self.to_html()).map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

const STYLE: &str = "<style>\n\
body{font-family:Arial,Helvetica,sans-serif;color:#222;margin:0;background:#fafafa}\n\
main{max-width:1080px;margin:0 auto;padding:24px;background:#fff}\n\
figure{margin:16px 0;overflow-x:auto}\n\
table{border-collapse:collapse;margin:8px 0 16px}\n\
th,td{border:1px solid #ddd;padding:4px 10px;text-align:right}\n\
th:first-child,td:first-child{text-align:left}\n\
.window,.caveat{color:#666;font-size:0.9em}\n\
</style>\n";

fn html_block(html: &mut String, block: &NarrativeBlock) {
    let _ = writeln!(html, "<h3>{}</h3>\n<ol>", escape(block.heading));
    for point in block.points {
        let _ = writeln!(html, "<li>{}</li>", escape(point));
    }
    html.push_str("</ol>\n");
}

fn html_schedule(html: &mut String, schedule: &AllocationSchedule) {
    let _ = writeln!(html, "<h3>{}</h3>", escape(&schedule.title));
    for month in &schedule.months {
        let _ = writeln!(
            html,
            "<h4>{}</h4>\n<table>\n<tr><th>Instrument</th><th>Weight</th><th>Amount</th></tr>",
            escape(&month.label)
        );
        for holding in &month.holdings {
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{}%</td><td>{}</td></tr>",
                escape(&holding.instrument),
                holding.weight_pct,
                format_krw(holding.amount_krw)
            );
        }
        let _ = writeln!(
            html,
            "</table>\n<p><strong>Rationale:</strong> {}</p>",
            escape(&month.rationale)
        );
    }
    let _ = writeln!(html, "<p class=\"caveat\">{}</p>", escape(&schedule.caveat));
}

fn text_block(text: &mut String, block: &NarrativeBlock) {
    let _ = writeln!(text, "{}:", block.heading);
    for (i, point) in block.points.iter().enumerate() {
        let _ = writeln!(text, "  {}. {point}", i + 1);
    }
    text.push('\n');
}

fn text_schedule(text: &mut String, schedule: &AllocationSchedule) {
    let _ = writeln!(text, "{}:\n", schedule.title);
    for (i, month) in schedule.months.iter().enumerate() {
        let _ = writeln!(text, "{}. {}", i + 1, month.label);
        for holding in &month.holdings {
            let _ = writeln!(
                text,
                "   - {}: {}% ({})",
                holding.instrument,
                holding.weight_pct,
                format_krw(holding.amount_krw)
            );
        }
        let _ = writeln!(text, "   Rationale: {}\n", month.rationale);
    }
    let _ = writeln!(text, "Note: {}\n", schedule.caveat);
}

fn text_matrix(text: &mut String, matrix: &CorrelationMatrix) {
    let width = matrix
        .labels()
        .iter()
        .map(|label| label.chars().count())
        .max()
        .unwrap_or(0)
        .max(6);

    let _ = write!(text, "{:width$}", "");
    for i in 0..matrix.len() {
        let _ = write!(text, " {:>6}", format!("[{}]", i + 1));
    }
    text.push('\n');

    for (i, label) in matrix.labels().iter().enumerate() {
        let _ = write!(text, "{label:<width$}");
        for j in 0..matrix.len() {
            let _ = write!(text, " {:>6}", format_cell(matrix.get(i, j), 2));
        }
        let _ = writeln!(text, "  [{}]", i + 1);
    }
    text.push('\n');
}

fn format_cell(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| String::from("n/a"), |v| format!("{v:.decimals$}"))
}
