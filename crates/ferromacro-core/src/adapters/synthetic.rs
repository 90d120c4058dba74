use time::{Date, Duration, Weekday};

use crate::data_source::{ProviderKind, SeriesFuture, SeriesRequest, SeriesSource, SourceError};
use crate::{DateWindow, Observation, ObservationSeries, SeriesId, Ticker};

/// Roughly one business day in fifty is left without a value.
const GAP_PERCENT: u32 = 2;

/// Deterministic offline provider used by `--mock` and tests.
///
/// The same identifier and window always yield the same series. Market
/// series are daily random walks on weekdays; macro series are weekly
/// (Wednesday) levels that drift slowly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticSource {
    kind: ProviderKind,
}

impl SyntheticSource {
    pub fn new(kind: ProviderKind) -> Self {
        Self { kind }
    }

    pub fn market() -> Self {
        Self::new(ProviderKind::Market)
    }

    pub fn macro_series() -> Self {
        Self::new(ProviderKind::Macro)
    }

    fn generate(&self, req: &SeriesRequest) -> Result<ObservationSeries, SourceError> {
        let id = match self.kind {
            ProviderKind::Market => Ticker::parse(&req.id)?.to_string(),
            ProviderKind::Macro => SeriesId::parse(&req.id)?.to_string(),
        };

        let mut rng = fastrand::Rng::with_seed(seed_for(&id));
        let mut level = 20.0 + rng.f64() * 480.0;
        let (step, volatility) = match self.kind {
            ProviderKind::Market => (1, 0.015),
            ProviderKind::Macro => (7, 0.004),
        };

        let observations: Vec<Observation> = dates(self.kind, req.window, step)
            .map(|date| {
                let shock = (rng.f64() - 0.5) * 2.0 * volatility;
                level = (level * (1.0 + shock + volatility / 20.0)).max(0.01);
                if self.kind == ProviderKind::Market && rng.u32(0..100) < GAP_PERCENT {
                    Observation::missing(date)
                } else {
                    Observation::present(date, round_cents(level))
                }
            })
            .collect();

        if observations.is_empty() {
            return Err(SourceError::not_found(format!(
                "no synthetic observations for {id} in {}",
                req.window
            )));
        }
        Ok(ObservationSeries::new(observations))
    }
}

impl SeriesSource for SyntheticSource {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn fetch<'a>(&'a self, req: SeriesRequest) -> SeriesFuture<'a> {
        let result = self.generate(&req);
        Box::pin(async move { result })
    }
}

fn dates(kind: ProviderKind, window: DateWindow, step: i64) -> impl Iterator<Item = Date> {
    let first = match kind {
        ProviderKind::Market => window.start(),
        ProviderKind::Macro => next_weekday(window.start(), Weekday::Wednesday),
    };
    std::iter::successors(Some(first), move |date| date.checked_add(Duration::days(step)))
        .take_while(move |date| *date <= window.end())
        .filter(move |date| {
            kind == ProviderKind::Macro
                || !matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)
        })
}

fn next_weekday(from: Date, weekday: Weekday) -> Date {
    let ahead = (weekday.number_days_from_monday() + 7
        - from.weekday().number_days_from_monday())
        % 7;
    from.checked_add(Duration::days(i64::from(ahead)))
        .unwrap_or(from)
}

// FNV-1a, so seeds do not depend on the std hasher.
fn seed_for(id: &str) -> u64 {
    id.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;

    fn window(start: &str, end: &str) -> DateWindow {
        DateWindow::parse(start, end).expect("valid window")
    }

    #[tokio::test]
    async fn same_request_yields_same_series() {
        let source = SyntheticSource::market();
        let req = SeriesRequest::new("SPY", window("2024-01-01", "2024-03-31"));
        let first = source.fetch(req.clone()).await.expect("generated");
        let second = source.fetch(req).await.expect("generated");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn market_series_skip_weekends() {
        let series = SyntheticSource::market()
            .fetch(SeriesRequest::new("QQQ", window("2024-01-01", "2024-01-14")))
            .await
            .expect("generated");
        assert_eq!(series.len(), 10);
        assert!(series
            .dates()
            .all(|date| !matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)));
    }

    #[tokio::test]
    async fn macro_series_are_weekly_wednesdays() {
        let series = SyntheticSource::macro_series()
            .fetch(SeriesRequest::new("WALCL", window("2024-01-01", "2024-01-31")))
            .await
            .expect("generated");
        assert_eq!(series.len(), 5);
        assert!(series.dates().all(|date| date.weekday() == Weekday::Wednesday));
        assert_eq!(series.present_count(), 5);
    }

    #[tokio::test]
    async fn different_ids_diverge() {
        let window = window("2024-01-01", "2024-01-31");
        let spy = SyntheticSource::market()
            .fetch(SeriesRequest::new("SPY", window))
            .await
            .expect("generated");
        let tlt = SyntheticSource::market()
            .fetch(SeriesRequest::new("TLT", window))
            .await
            .expect("generated");
        assert_ne!(spy, tlt);
    }

    #[tokio::test]
    async fn weekend_only_window_is_not_found() {
        let error = SyntheticSource::market()
            .fetch(SeriesRequest::new("SPY", window("2024-01-06", "2024-01-07")))
            .await
            .expect_err("no business days");
        assert_eq!(error.kind(), SourceErrorKind::NotFound);
    }

    #[tokio::test]
    async fn identifiers_are_validated_per_kind() {
        let error = SyntheticSource::macro_series()
            .fetch(SeriesRequest::new("^VIX", window("2024-01-01", "2024-01-31")))
            .await
            .expect_err("not a series id");
        assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
    }
}
