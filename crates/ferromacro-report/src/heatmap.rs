//! Annotated correlation heatmap with a color bar.

use std::fmt::Write as _;

use ferromacro_core::CorrelationMatrix;

use crate::palette::{DivergingScale, Rgb};
use crate::svg;
use crate::ReportError;

const CELL: f64 = 64.0;
const LABEL_GUTTER: f64 = 160.0;
const TITLE_HEIGHT: f64 = 44.0;
const COLORBAR_GAP: f64 = 28.0;
const COLORBAR_WIDTH: f64 = 18.0;
const COLORBAR_TICKS: [f64; 5] = [-1.0, -0.5, 0.0, 0.5, 1.0];
const MISSING_FILL: &str = "#d9d9d9";

/// Square heatmap of a [`CorrelationMatrix`].
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub title: String,
    pub scale: DivergingScale,
}

impl Default for Heatmap {
    fn default() -> Self {
        Self {
            title: String::from("Correlation Heatmap of Economic Indicators"),
            scale: DivergingScale::default(),
        }
    }
}

impl Heatmap {
    pub fn render(&self, matrix: &CorrelationMatrix) -> Result<String, ReportError> {
        if matrix.is_empty() {
            return Err(ReportError::EmptyTable);
        }

        let n = matrix.len();
        let grid = CELL * n as f64;
        let left = LABEL_GUTTER;
        let top = TITLE_HEIGHT;
        let width = left + grid + COLORBAR_GAP + COLORBAR_WIDTH + 48.0;
        let height = top + grid + LABEL_GUTTER;

        let mut out = svg::header(width, height);
        svg::text(
            &mut out,
            left + grid / 2.0,
            TITLE_HEIGHT / 2.0 + 6.0,
            "middle",
            r#" font-size="15""#,
            &self.title,
        );

        for (row, values) in matrix.rows().iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                let x = left + col as f64 * CELL;
                let y = top + row as f64 * CELL;
                self.draw_cell(&mut out, x, y, *value);
            }
        }

        for (i, label) in matrix.labels().iter().enumerate() {
            let center = i as f64 * CELL + CELL / 2.0;
            svg::text(&mut out, left - 8.0, top + center + 4.0, "end", "", label);

            let x = left + center;
            let y = top + grid + 10.0;
            svg::text(
                &mut out,
                x,
                y,
                "end",
                &format!(r#" transform="rotate(-45 {x:.2} {y:.2})""#),
                label,
            );
        }

        self.draw_colorbar(&mut out, left + grid + COLORBAR_GAP, top, grid);
        out.push_str(svg::footer());
        Ok(out)
    }

    fn draw_cell(&self, out: &mut String, x: f64, y: f64, value: Option<f64>) {
        let (fill, label, text_fill) = match value {
            Some(value) => {
                let color = self.scale.color(value);
                (color.to_hex(), format!("{value:.2}"), text_color(color))
            }
            None => (MISSING_FILL.to_owned(), String::from("n/a"), "#333333"),
        };
        let _ = write!(
            out,
            r#"<rect x="{x:.2}" y="{y:.2}" width="{CELL:.2}" height="{CELL:.2}" fill="{fill}" stroke="{white}" stroke-width="1" />"#,
            white = "#ffffff",
        );
        svg::text(
            out,
            x + CELL / 2.0,
            y + CELL / 2.0 + 4.0,
            "middle",
            &format!(r#" fill="{text_fill}""#),
            &label,
        );
    }

    fn draw_colorbar(&self, out: &mut String, x: f64, top: f64, height: f64) {
        let DivergingScale { vmin, center, vmax } = self.scale;
        let stops = [
            (0.0, self.scale.color(vmax)),
            ((vmax - center) / (vmax - vmin) * 100.0, self.scale.color(center)),
            (100.0, self.scale.color(vmin)),
        ];

        out.push_str(r#"<defs><linearGradient id="colorbar" x1="0" y1="0" x2="0" y2="1">"#);
        for (offset, color) in stops {
            let _ = write!(
                out,
                r#"<stop offset="{offset:.1}%" stop-color="{}" />"#,
                color.to_hex()
            );
        }
        out.push_str("</linearGradient></defs>");
        let _ = write!(
            out,
            r#"<rect x="{x:.2}" y="{top:.2}" width="{COLORBAR_WIDTH:.2}" height="{height:.2}" fill="url(#colorbar)" stroke="{black}" stroke-width="0.5" />"#,
            black = "#000000",
        );

        for tick in COLORBAR_TICKS {
            let y = top + (vmax - tick) / (vmax - vmin) * height;
            svg::line(
                out,
                (x + COLORBAR_WIDTH, y),
                (x + COLORBAR_WIDTH + 4.0, y),
                "#000000",
                1.0,
            );
            svg::text(
                out,
                x + COLORBAR_WIDTH + 7.0,
                y + 4.0,
                "start",
                "",
                &format!("{tick:.1}"),
            );
        }
    }
}

fn text_color(background: Rgb) -> &'static str {
    if background.luminance() < 0.5 {
        "#ffffff"
    } else {
        "#262626"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferromacro_core::{Column, SeriesFrame};
    use time::macros::date;

    fn matrix() -> CorrelationMatrix {
        let frame = SeriesFrame::new(
            vec![
                date!(2024 - 01 - 01),
                date!(2024 - 01 - 02),
                date!(2024 - 01 - 03),
            ],
            vec![
                Column::new("SPY", vec![Some(1.0), Some(2.0), Some(3.0)]),
                Column::new("QQQ", vec![Some(2.0), Some(4.0), Some(7.0)]),
                Column::new("FLAT", vec![Some(5.0), Some(5.0), Some(5.0)]),
            ],
        )
        .expect("valid frame");
        CorrelationMatrix::pearson(&frame)
    }

    #[test]
    fn annotates_every_cell() {
        let svg = Heatmap::default().render(&matrix()).expect("renders");
        assert_eq!(svg.matches("<rect x=").count(), 9 + 1);
        assert!(svg.contains(">1.00</text>"));
        assert!(svg.contains(">n/a</text>"));
        assert!(svg.contains("Correlation Heatmap of Economic Indicators"));
    }

    #[test]
    fn colorbar_spans_minus_one_to_one() {
        let svg = Heatmap::default().render(&matrix()).expect("renders");
        assert!(svg.contains(r#"<linearGradient id="colorbar""#));
        assert!(svg.contains(">-1.0</text>"));
        assert!(svg.contains(">0.0</text>"));
        assert!(svg.contains(">1.0</text>"));
        assert!(svg.contains(r##"stop-color="#f7f7f7""##));
    }

    #[test]
    fn empty_matrix_is_rejected() {
        let empty = CorrelationMatrix::pearson(&SeriesFrame::default());
        assert!(matches!(
            Heatmap::default().render(&empty),
            Err(ReportError::EmptyTable)
        ));
    }

    #[test]
    fn strong_values_get_light_text() {
        assert_eq!(text_color(DivergingScale::default().color(1.0)), "#ffffff");
        assert_eq!(text_color(DivergingScale::default().color(0.0)), "#262626");
    }
}
