use std::sync::Arc;

use serde::Deserialize;
use time::{OffsetDateTime, UtcOffset};

use crate::data_source::{ProviderKind, SeriesFuture, SeriesRequest, SeriesSource, SourceError};
use crate::http_client::{HttpClient, HttpError, HttpErrorKind, HttpRequest};
use crate::retry::{execute_with_retry, RetryConfig};
use crate::{DateWindow, Observation, ObservationSeries, Ticker};

const CHART_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const PROVIDER: &str = "yahoo";

/// Daily adjusted-close prices from the Yahoo Finance chart endpoint.
#[derive(Clone)]
pub struct YahooChartAdapter {
    http_client: Arc<dyn HttpClient>,
    retry: RetryConfig,
    timeout_ms: u64,
    base_url: String,
}

impl YahooChartAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            retry: RetryConfig::default(),
            timeout_ms: 10_000,
            base_url: CHART_BASE_URL.to_owned(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_request(&self, ticker: &Ticker, window: DateWindow) -> HttpRequest {
        HttpRequest::get(format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(ticker.as_str())
        ))
        .with_query("period1", window.start_unix().to_string())
        .with_query("period2", window.end_unix_exclusive().to_string())
        .with_query("interval", "1d")
        .with_query("events", "div,split")
        .with_query("includeAdjustedClose", "true")
        .with_header("referer", "https://finance.yahoo.com/")
        .with_timeout_ms(self.timeout_ms)
    }

    async fn fetch_chart(&self, req: SeriesRequest) -> Result<ObservationSeries, SourceError> {
        let ticker = Ticker::parse(&req.id)?;
        let request = self.build_request(&ticker, req.window);
        tracing::debug!(url = %request.redacted_url(), "requesting yahoo chart");

        let response = execute_with_retry(self.http_client.as_ref(), request, &self.retry)
            .await
            .map_err(transport_error)?;

        if !response.is_success() {
            let detail = serde_json::from_str::<YahooChartResponse>(&response.body)
                .ok()
                .and_then(|parsed| parsed.chart.error)
                .map(|error| error.describe())
                .unwrap_or_default();
            return Err(SourceError::from_status(PROVIDER, response.status, &detail));
        }

        let series = parse_chart(&response.body, req.window)?;
        if series.is_empty() {
            return Err(SourceError::not_found(format!(
                "yahoo returned no prices for {ticker} in {}",
                req.window
            )));
        }
        Ok(series)
    }
}

impl SeriesSource for YahooChartAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Market
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn fetch<'a>(&'a self, req: SeriesRequest) -> SeriesFuture<'a> {
        Box::pin(self.fetch_chart(req))
    }
}

fn transport_error(error: HttpError) -> SourceError {
    match error.kind() {
        HttpErrorKind::Timeout | HttpErrorKind::Connect => {
            SourceError::unavailable(format!("yahoo transport error: {}", error.message()))
        }
        HttpErrorKind::Body | HttpErrorKind::Other => {
            SourceError::internal(format!("yahoo transport error: {}", error.message()))
        }
    }
}

/// Parse a chart payload into observations inside `window`.
///
/// Adjusted close is preferred; raw close is the fallback when the payload
/// carries no adjusted series (indices such as `^VIX`).
fn parse_chart(body: &str, window: DateWindow) -> Result<ObservationSeries, SourceError> {
    let response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = response.chart.error {
        return Err(SourceError::not_found(format!(
            "yahoo chart API error: {}",
            error.describe()
        )));
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(ObservationSeries::default());
    };

    let offset = result
        .meta
        .as_ref()
        .and_then(|meta| meta.gmtoffset)
        .and_then(|seconds| i32::try_from(seconds).ok())
        .and_then(|seconds| UtcOffset::from_whole_seconds(seconds).ok())
        .unwrap_or(UtcOffset::UTC);

    let timestamps = result.timestamp.unwrap_or_default();
    let prices = result
        .indicators
        .adjclose
        .and_then(|series| series.into_iter().next())
        .map(|series| series.adjclose)
        .filter(|values| !values.is_empty())
        .or_else(|| {
            result
                .indicators
                .quote
                .into_iter()
                .next()
                .map(|quote| quote.close)
        })
        .unwrap_or_default();

    let mut observations = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.into_iter().enumerate() {
        let date = OffsetDateTime::from_unix_timestamp(ts)
            .map_err(|e| SourceError::malformed(format!("invalid yahoo timestamp {ts}: {e}")))?
            .to_offset(offset)
            .date();
        if !window.contains(date) {
            continue;
        }
        observations.push(Observation::new(date, prices.get(i).copied().flatten()));
    }

    Ok(ObservationSeries::new(observations))
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Deserialize)]
struct YahooChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl YahooChartError {
    fn describe(&self) -> String {
        match (&self.code, &self.description) {
            (Some(code), Some(description)) => format!("{code}: {description}"),
            (Some(only), None) | (None, Some(only)) => only.clone(),
            (None, None) => String::from("unknown error"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    meta: Option<YahooChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooChartMeta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
    #[serde(default)]
    adjclose: Option<Vec<YahooAdjClose>>,
}

#[derive(Debug, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct YahooAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::{FixtureHttpClient, HttpResponse};
    use time::macros::date;

    // 2024-01-02 and 2024-01-03 14:30 UTC (09:30 New York).
    const CHART_BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "SPY", "gmtoffset": -18000},
                "timestamp": [1704205800, 1704292200],
                "indicators": {
                    "quote": [{"close": [472.65, 468.79]}],
                    "adjclose": [{"adjclose": [465.1, null]}]
                }
            }],
            "error": null
        }
    }"#;

    fn window() -> DateWindow {
        DateWindow::parse("2024-01-01", "2024-01-31").expect("valid window")
    }

    fn adapter(client: Arc<FixtureHttpClient>) -> YahooChartAdapter {
        YahooChartAdapter::new(client).with_retry(RetryConfig::none())
    }

    #[test]
    fn prefers_adjusted_close_and_keeps_gaps() {
        let series = parse_chart(CHART_BODY, window()).expect("parses");
        let observations = series.observations();
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].date, date!(2024 - 01 - 02));
        assert_eq!(observations[0].value, Some(465.1));
        assert_eq!(observations[1].value, None);
    }

    #[test]
    fn falls_back_to_close_without_adjusted_series() {
        let body = r#"{"chart":{"result":[{"timestamp":[1704205800],
            "indicators":{"quote":[{"close":[13.2]}]}}],"error":null}}"#;
        let series = parse_chart(body, window()).expect("parses");
        assert_eq!(series.value_on(date!(2024 - 01 - 02)), Some(13.2));
    }

    #[test]
    fn drops_rows_outside_window() {
        let narrow = DateWindow::parse("2024-01-03", "2024-01-03").expect("valid");
        let series = parse_chart(CHART_BODY, narrow).expect("parses");
        assert_eq!(series.len(), 1);
    }

    #[tokio::test]
    async fn builds_chart_request_with_encoded_ticker() {
        let client = Arc::new(
            FixtureHttpClient::new().with_route("/chart/%5EVIX", HttpResponse::ok_json(CHART_BODY)),
        );
        let series = adapter(Arc::clone(&client))
            .fetch(SeriesRequest::new("^VIX", window()))
            .await
            .expect("fetch succeeds");
        assert_eq!(series.len(), 2);

        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query_value("interval"), Some("1d"));
        assert_eq!(requests[0].query_value("period1"), Some("1704067200"));
        assert_eq!(requests[0].query_value("includeAdjustedClose"), Some("true"));
    }

    #[tokio::test]
    async fn unknown_symbol_maps_to_not_found() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let client = Arc::new(
            FixtureHttpClient::new().with_route("/chart/NOPE", HttpResponse::new(404, body)),
        );
        let error = adapter(client)
            .fetch(SeriesRequest::new("NOPE", window()))
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::NotFound);
        assert!(error.message().contains("symbol may be delisted"));
    }

    #[tokio::test]
    async fn empty_result_is_an_error() {
        let body = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
        let client =
            Arc::new(FixtureHttpClient::new().with_route("/chart/SPY", HttpResponse::ok_json(body)));
        let error = adapter(client)
            .fetch(SeriesRequest::new("SPY", window()))
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::NotFound);
    }

    #[tokio::test]
    async fn invalid_ticker_never_reaches_transport() {
        let client = Arc::new(FixtureHttpClient::new());
        let error = adapter(Arc::clone(&client))
            .fetch(SeriesRequest::new("BAD TICKER", window()))
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
        assert!(client.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn malformed_body_is_reported() {
        let client = Arc::new(
            FixtureHttpClient::new().with_route("/chart/SPY", HttpResponse::ok_json("<html>")),
        );
        let error = adapter(client)
            .fetch(SeriesRequest::new("SPY", window()))
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Malformed);
    }
}
