//! Small helpers shared by the SVG renderers.

use std::fmt::Write as _;

pub(crate) const FONT: &str = "Arial,Helvetica,sans-serif";

pub(crate) fn header(width: f64, height: f64) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width:.0} {height:.0}" width="{width:.0}" height="{height:.0}"><style>text{{font-family:{FONT};font-size:11px;fill:#333}}</style><rect width="100%" height="100%" fill="#ffffff" />"##
    )
}

pub(crate) fn footer() -> &'static str {
    "</svg>"
}

pub(crate) fn text(svg: &mut String, x: f64, y: f64, anchor: &str, extra: &str, content: &str) {
    let _ = write!(
        svg,
        r#"<text x="{x:.2}" y="{y:.2}" text-anchor="{anchor}"{extra}>{}</text>"#,
        escape(content)
    );
}

pub(crate) fn line(svg: &mut String, from: (f64, f64), to: (f64, f64), stroke: &str, width: f64) {
    let _ = write!(
        svg,
        r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{stroke}" stroke-width="{width}" />"#,
        from.0, from.1, to.0, to.1
    );
}

/// Escape text for use in XML/HTML content and attribute values.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
