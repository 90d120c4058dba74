//! Colors for series lines and the diverging correlation scale.

/// Line colors, cycled when there are more series than entries.
pub const SERIES_COLORS: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const COOL: Rgb = Rgb(59, 76, 192);
const NEUTRAL: Rgb = Rgb(247, 247, 247);
const WARM: Rgb = Rgb(180, 4, 38);

pub fn series_color(index: usize) -> &'static str {
    SERIES_COLORS[index % SERIES_COLORS.len()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Relative luminance in `[0, 1]`, used to pick readable text color.
    pub fn luminance(self) -> f64 {
        (0.299 * f64::from(self.0) + 0.587 * f64::from(self.1) + 0.114 * f64::from(self.2))
            / 255.0
    }

    fn mix(self, other: Self, t: f64) -> Self {
        let channel = |a: u8, b: u8| {
            let value = f64::from(a) + (f64::from(b) - f64::from(a)) * t;
            value.round().clamp(0.0, 255.0) as u8
        };
        Self(
            channel(self.0, other.0),
            channel(self.1, other.1),
            channel(self.2, other.2),
        )
    }
}

/// Blue-white-red scale over `[vmin, vmax]` with white at `center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DivergingScale {
    pub vmin: f64,
    pub center: f64,
    pub vmax: f64,
}

impl Default for DivergingScale {
    fn default() -> Self {
        Self {
            vmin: -1.0,
            center: 0.0,
            vmax: 1.0,
        }
    }
}

impl DivergingScale {
    pub fn color(&self, value: f64) -> Rgb {
        if !value.is_finite() {
            return NEUTRAL;
        }
        let value = value.clamp(self.vmin, self.vmax);
        if value < self.center {
            let span = self.center - self.vmin;
            let t = if span > 0.0 { (self.center - value) / span } else { 0.0 };
            NEUTRAL.mix(COOL, t)
        } else {
            let span = self.vmax - self.center;
            let t = if span > 0.0 { (value - self.center) / span } else { 0.0 };
            NEUTRAL.mix(WARM, t)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_endpoints_and_center() {
        let scale = DivergingScale::default();
        assert_eq!(scale.color(-1.0), COOL);
        assert_eq!(scale.color(0.0), NEUTRAL);
        assert_eq!(scale.color(1.0), WARM);
        assert_eq!(scale.color(3.0), WARM);
        assert_eq!(scale.color(f64::NAN), NEUTRAL);
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(Rgb(59, 76, 192).to_hex(), "#3b4cc0");
    }

    #[test]
    fn colors_cycle() {
        assert_eq!(series_color(0), series_color(SERIES_COLORS.len()));
    }
}
