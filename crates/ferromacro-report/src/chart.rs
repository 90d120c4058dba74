//! Multi-series line chart.

use std::fmt::Write as _;

use ferromacro_core::SeriesFrame;
use time::Date;

use crate::palette::series_color;
use crate::svg;
use crate::ReportError;

const MARGIN_LEFT: f64 = 64.0;
const MARGIN_TOP: f64 = 36.0;
const MARGIN_BOTTOM: f64 = 56.0;
const LEGEND_WIDTH: f64 = 190.0;
const Y_TICKS: usize = 6;
const MAX_X_LABELS: usize = 12;

/// Layout and labels for [`LineChart::render`].
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub width: f64,
    pub height: f64,
    pub title: Option<String>,
    pub x_label: String,
    pub y_label: String,
}

impl Default for LineChart {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 520.0,
            title: None,
            x_label: String::from("Date"),
            y_label: String::from("Normalized Value (Starting Point = 100)"),
        }
    }
}

struct PlotArea {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl PlotArea {
    fn x(&self, row: usize, rows: usize) -> f64 {
        if rows <= 1 {
            return (self.left + self.right) / 2.0;
        }
        self.left + (self.right - self.left) * row as f64 / (rows - 1) as f64
    }

    fn y(&self, value: f64, min: f64, max: f64) -> f64 {
        let norm = (value - min) / (max - min);
        self.bottom - norm * (self.bottom - self.top)
    }
}

impl LineChart {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// One polyline per column, legend to the right of the plot area.
    ///
    /// Missing cells break a line into separate segments.
    pub fn render(&self, frame: &SeriesFrame) -> Result<String, ReportError> {
        if frame.is_empty() || frame.columns().is_empty() {
            return Err(ReportError::EmptyTable);
        }
        let (min, max) = value_extent(frame).ok_or(ReportError::EmptyTable)?;

        let area = PlotArea {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            right: self.width - LEGEND_WIDTH,
            bottom: self.height - MARGIN_BOTTOM,
        };
        let rows = frame.row_count();

        let mut out = svg::header(self.width, self.height);
        if let Some(title) = &self.title {
            svg::text(
                &mut out,
                (area.left + area.right) / 2.0,
                MARGIN_TOP / 2.0 + 4.0,
                "middle",
                r#" font-size="14""#,
                title,
            );
        }

        self.draw_y_axis(&mut out, &area, min, max);
        draw_x_axis(&mut out, &area, frame.index());

        for (position, column) in frame.columns().iter().enumerate() {
            let color = series_color(position);
            for segment in segments(column.values()) {
                let points = segment
                    .iter()
                    .map(|(row, value)| {
                        format!("{:.2},{:.2}", area.x(*row, rows), area.y(*value, min, max))
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                let _ = write!(
                    out,
                    r#"<polyline fill="none" stroke="{color}" stroke-width="1.5" points="{points}" />"#
                );
            }
        }

        let legend_x = area.right + 16.0;
        for (position, column) in frame.columns().iter().enumerate() {
            let y = area.top + 8.0 + position as f64 * 18.0;
            svg::line(
                &mut out,
                (legend_x, y),
                (legend_x + 22.0, y),
                series_color(position),
                2.5,
            );
            svg::text(&mut out, legend_x + 28.0, y + 4.0, "start", "", column.name());
        }

        svg::text(
            &mut out,
            (area.left + area.right) / 2.0,
            self.height - 12.0,
            "middle",
            r#" font-size="12""#,
            &self.x_label,
        );
        let y_mid = (area.top + area.bottom) / 2.0;
        svg::text(
            &mut out,
            16.0,
            y_mid,
            "middle",
            &format!(r#" font-size="12" transform="rotate(-90 16 {y_mid:.2})""#),
            &self.y_label,
        );

        out.push_str(svg::footer());
        Ok(out)
    }

    fn draw_y_axis(&self, out: &mut String, area: &PlotArea, min: f64, max: f64) {
        svg::line(out, (area.left, area.top), (area.left, area.bottom), "#000000", 1.0);
        let decimals: usize = if max - min >= 10.0 { 0 } else { 2 };
        for tick in 0..Y_TICKS {
            let value = min + (max - min) * tick as f64 / (Y_TICKS - 1) as f64;
            let y = area.y(value, min, max);
            svg::line(out, (area.left, y), (area.right, y), "#e5e5e5", 0.5);
            svg::text(
                out,
                area.left - 6.0,
                y + 4.0,
                "end",
                "",
                &format!("{value:.decimals$}"),
            );
        }
    }
}

fn draw_x_axis(out: &mut String, area: &PlotArea, index: &[Date]) {
    svg::line(out, (area.left, area.bottom), (area.right, area.bottom), "#000000", 1.0);
    for (row, label) in x_labels(index) {
        let x = area.x(row, index.len());
        svg::line(out, (x, area.top), (x, area.bottom), "#e5e5e5", 0.5);
        svg::line(out, (x, area.bottom), (x, area.bottom + 4.0), "#000000", 1.0);
        svg::text(out, x, area.bottom + 18.0, "middle", "", &label);
    }
}

/// Tick rows and labels: one per year, or one per month for short spans.
fn x_labels(index: &[Date]) -> Vec<(usize, String)> {
    let (Some(first), Some(last)) = (index.first(), index.last()) else {
        return Vec::new();
    };
    let yearly = last.year() > first.year() + 1;

    let mut labels = Vec::new();
    let mut previous = None;
    for (row, date) in index.iter().enumerate() {
        let key = if yearly {
            (date.year(), 0)
        } else {
            (date.year(), u8::from(date.month()))
        };
        if previous == Some(key) {
            continue;
        }
        previous = Some(key);
        let label = if yearly {
            date.year().to_string()
        } else {
            format!("{}-{:02}", date.year(), u8::from(date.month()))
        };
        labels.push((row, label));
    }

    let step = labels.len().div_ceil(MAX_X_LABELS).max(1);
    labels.into_iter().step_by(step).collect()
}

fn value_extent(frame: &SeriesFrame) -> Option<(f64, f64)> {
    let mut values = frame
        .columns()
        .iter()
        .flat_map(|column| column.values().iter().flatten().copied());
    let first = values.next()?;
    let (mut min, mut max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if (max - min).abs() < f64::EPSILON {
        let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.1 };
        min -= pad;
        max += pad;
    }
    Some((min, max))
}

fn segments(values: &[Option<f64>]) -> Vec<Vec<(usize, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (row, value) in values.iter().enumerate() {
        match value {
            Some(value) => current.push((row, *value)),
            None if !current.is_empty() => out.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferromacro_core::Column;
    use time::macros::date;

    fn frame() -> SeriesFrame {
        SeriesFrame::new(
            vec![
                date!(2020 - 01 - 02),
                date!(2021 - 06 - 01),
                date!(2023 - 03 - 01),
            ],
            vec![
                Column::new("SPY", vec![Some(100.0), Some(130.0), Some(120.0)]),
                Column::new("VIX & co", vec![Some(100.0), None, Some(80.0)]),
            ],
        )
        .expect("valid frame")
    }

    #[test]
    fn renders_one_line_per_segment_and_legend() {
        let svg = LineChart::default().render(&frame()).expect("renders");
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        // SPY is one segment, the gapped column two.
        assert_eq!(svg.matches("<polyline").count(), 3);
        assert!(svg.contains(">SPY</text>"));
        assert!(svg.contains(">VIX &amp; co</text>"));
        assert!(svg.contains("Normalized Value (Starting Point = 100)"));
        assert!(svg.contains(">Date</text>"));
    }

    #[test]
    fn long_spans_label_years() {
        let labels = x_labels(frame().index());
        let text: Vec<&str> = labels.iter().map(|(_, label)| label.as_str()).collect();
        assert_eq!(text, vec!["2020", "2021", "2023"]);
    }

    #[test]
    fn short_spans_label_months() {
        let index = vec![
            date!(2024 - 01 - 30),
            date!(2024 - 01 - 31),
            date!(2024 - 02 - 01),
        ];
        let labels = x_labels(&index);
        assert_eq!(labels, vec![(0, "2024-01".to_owned()), (2, "2024-02".to_owned())]);
    }

    #[test]
    fn empty_frame_is_rejected() {
        let error = LineChart::default()
            .render(&SeriesFrame::default())
            .expect_err("must fail");
        assert!(matches!(error, ReportError::EmptyTable));
    }

    #[test]
    fn title_is_rendered_when_set() {
        let svg = LineChart::default()
            .with_title("Trend")
            .render(&frame())
            .expect("renders");
        assert!(svg.contains(">Trend</text>"));
    }
}
