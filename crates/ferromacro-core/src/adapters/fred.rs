use std::sync::Arc;

use serde::Deserialize;

use crate::config::ApiKey;
use crate::data_source::{ProviderKind, SeriesFuture, SeriesRequest, SeriesSource, SourceError};
use crate::http_client::{HttpClient, HttpError, HttpErrorKind, HttpRequest};
use crate::retry::{execute_with_retry, RetryConfig};
use crate::{format_date, parse_date, DateWindow, Observation, ObservationSeries, SeriesId};

const OBSERVATIONS_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const PROVIDER: &str = "fred";

/// FRED publishes "." for a date with no value.
const MISSING_MARKER: &str = ".";

/// Macro observation series from the St. Louis Fed FRED API.
#[derive(Clone)]
pub struct FredAdapter {
    http_client: Arc<dyn HttpClient>,
    api_key: ApiKey,
    retry: RetryConfig,
    timeout_ms: u64,
    base_url: String,
}

impl FredAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: ApiKey) -> Self {
        Self {
            http_client,
            api_key,
            retry: RetryConfig::default(),
            timeout_ms: 10_000,
            base_url: OBSERVATIONS_URL.to_owned(),
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

    fn build_request(&self, series_id: &SeriesId, window: DateWindow) -> HttpRequest {
        HttpRequest::get(self.base_url.as_str())
            .with_query("series_id", series_id.as_str())
            .with_query("api_key", self.api_key.expose())
            .with_query("file_type", "json")
            .with_query("observation_start", format_date(window.start()))
            .with_query("observation_end", format_date(window.end()))
            .with_timeout_ms(self.timeout_ms)
    }

    async fn fetch_observations(
        &self,
        req: SeriesRequest,
    ) -> Result<ObservationSeries, SourceError> {
        let series_id = SeriesId::parse(&req.id)?;
        let request = self.build_request(&series_id, req.window);
        tracing::debug!(url = %request.redacted_url(), "requesting fred observations");

        let response = execute_with_retry(self.http_client.as_ref(), request, &self.retry)
            .await
            .map_err(transport_error)?;

        if !response.is_success() {
            let detail = serde_json::from_str::<FredErrorResponse>(&response.body)
                .map(|error| error.error_message)
                .unwrap_or_default();
            // FRED answers 400 for a bad key; surface it as auth.
            if is_key_rejection(&detail) {
                return Err(SourceError::unauthorized(format!(
                    "fred rejected the API key: {detail}"
                )));
            }
            return Err(SourceError::from_status(PROVIDER, response.status, &detail));
        }

        let series = parse_observations(&response.body)?;
        if series.is_empty() {
            return Err(SourceError::not_found(format!(
                "fred returned no observations for {series_id} in {}",
                req.window
            )));
        }
        Ok(series)
    }
}

impl SeriesSource for FredAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Macro
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn fetch<'a>(&'a self, req: SeriesRequest) -> SeriesFuture<'a> {
        Box::pin(self.fetch_observations(req))
    }
}

fn transport_error(error: HttpError) -> SourceError {
    match error.kind() {
        HttpErrorKind::Timeout | HttpErrorKind::Connect => {
            SourceError::unavailable(format!("fred transport error: {}", error.message()))
        }
        HttpErrorKind::Body | HttpErrorKind::Other => {
            SourceError::internal(format!("fred transport error: {}", error.message()))
        }
    }
}

/// FRED's wording for a missing, malformed or unregistered key.
fn is_key_rejection(detail: &str) -> bool {
    const KEY_PHRASES: [&str; 3] = ["is not registered", "has not been set", "32 character"];
    let detail = detail.to_ascii_lowercase();
    detail.contains("api_key") && KEY_PHRASES.iter().any(|phrase| detail.contains(phrase))
}

fn parse_observations(body: &str) -> Result<ObservationSeries, SourceError> {
    let response: FredObservationsResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("failed to parse fred observations: {e}")))?;

    response
        .observations
        .into_iter()
        .map(|raw| {
            let date = parse_date(&raw.date).map_err(|_| {
                SourceError::malformed(format!("fred observation has invalid date '{}'", raw.date))
            })?;
            let value = raw.value.trim();
            if value == MISSING_MARKER || value.is_empty() {
                return Ok(Observation::missing(date));
            }
            let parsed = value.parse::<f64>().map_err(|_| {
                SourceError::malformed(format!(
                    "fred observation on {} has non-numeric value '{value}'",
                    raw.date
                ))
            })?;
            Ok(Observation::present(date, parsed))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(ObservationSeries::new)
}

#[derive(Debug, Deserialize)]
struct FredObservationsResponse {
    #[serde(default)]
    observations: Vec<FredObservation>,
}

#[derive(Debug, Deserialize)]
struct FredObservation {
    date: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct FredErrorResponse {
    #[serde(default)]
    error_message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::{FixtureHttpClient, HttpResponse};
    use time::macros::date;

    const OBSERVATIONS_BODY: &str = r#"{
        "realtime_start": "2024-06-01",
        "observation_start": "2024-01-01",
        "count": 3,
        "observations": [
            {"realtime_start": "2024-06-01", "realtime_end": "2024-06-01", "date": "2024-01-03", "value": "7713433"},
            {"realtime_start": "2024-06-01", "realtime_end": "2024-06-01", "date": "2024-01-10", "value": "."},
            {"realtime_start": "2024-06-01", "realtime_end": "2024-06-01", "date": "2024-01-17", "value": "7677311.5"}
        ]
    }"#;

    fn window() -> DateWindow {
        DateWindow::parse("2024-01-01", "2024-01-31").expect("valid window")
    }

    fn adapter(client: Arc<FixtureHttpClient>) -> FredAdapter {
        let key = ApiKey::new("test-key").expect("non-empty");
        FredAdapter::new(client, key).with_retry(RetryConfig::none())
    }

    #[test]
    fn dot_values_become_missing() {
        let series = parse_observations(OBSERVATIONS_BODY).expect("parses");
        assert_eq!(series.len(), 3);
        assert_eq!(series.value_on(date!(2024 - 01 - 03)), Some(7_713_433.0));
        assert_eq!(series.value_on(date!(2024 - 01 - 10)), None);
        assert_eq!(series.present_count(), 2);
    }

    #[test]
    fn non_numeric_values_are_malformed() {
        let body = r#"{"observations":[{"date":"2024-01-03","value":"n/a"}]}"#;
        let error = parse_observations(body).expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Malformed);
    }

    #[tokio::test]
    async fn sends_series_window_and_key() {
        let client = Arc::new(FixtureHttpClient::new().with_route(
            "series_id=WALCL",
            HttpResponse::ok_json(OBSERVATIONS_BODY),
        ));
        adapter(Arc::clone(&client))
            .fetch(SeriesRequest::new("WALCL", window()))
            .await
            .expect("fetch succeeds");

        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.query_value("observation_start"), Some("2024-01-01"));
        assert_eq!(request.query_value("observation_end"), Some("2024-01-31"));
        assert_eq!(request.query_value("file_type"), Some("json"));
        assert_eq!(request.query_value("api_key"), Some("test-key"));
    }

    #[tokio::test]
    async fn unregistered_key_maps_to_unauthorized() {
        let body = r#"{"error_code":400,"error_message":"Bad Request.  The value for variable api_key is not registered."}"#;
        let client = Arc::new(
            FixtureHttpClient::new().with_route("series_id=WALCL", HttpResponse::new(400, body)),
        );
        let error = adapter(client)
            .fetch(SeriesRequest::new("WALCL", window()))
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Unauthorized);
        assert!(!error.message().contains("test-key"));
    }

    #[tokio::test]
    async fn refused_connection_error_omits_the_key() {
        let client = Arc::new(crate::http_client::ReqwestHttpClient::new());
        let key = ApiKey::new("SECRETKEY123").expect("non-empty");
        let error = FredAdapter::new(client, key)
            .with_retry(RetryConfig::none())
            .with_timeout_ms(2_000)
            .with_base_url("http://127.0.0.1:9/fred/series/observations")
            .fetch(SeriesRequest::new("WALCL", window()))
            .await
            .expect_err("nothing listens on the discard port");

        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
        assert!(!error.message().contains("SECRETKEY123"));
        assert!(!error.to_string().contains("api_key"));
    }

    #[test]
    fn only_key_complaints_count_as_key_rejection() {
        assert!(is_key_rejection(
            "Bad Request.  The value for variable api_key is not registered."
        ));
        assert!(is_key_rejection("Bad Request.  Variable api_key has not been set."));
        assert!(is_key_rejection(
            "Bad Request.  The value for variable api_key is not a 32 character alpha-numeric lower-case string."
        ));
        assert!(!is_key_rejection(
            "Bad Request.  Variable observation_start is not a valid date (api_key accepted)."
        ));
    }

    #[tokio::test]
    async fn other_bad_requests_mentioning_the_key_stay_invalid_requests() {
        let body = r#"{"error_code":400,"error_message":"Bad Request.  Variable file_type must be json or xml; api_key was read."}"#;
        let client = Arc::new(
            FixtureHttpClient::new().with_route("series_id=WALCL", HttpResponse::new(400, body)),
        );
        let error = adapter(client)
            .fetch(SeriesRequest::new("WALCL", window()))
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
    }

    #[tokio::test]
    async fn unknown_series_maps_to_invalid_request() {
        let body = r#"{"error_code":400,"error_message":"Bad Request.  The series does not exist."}"#;
        let client = Arc::new(
            FixtureHttpClient::new().with_route("series_id=NOPE", HttpResponse::new(400, body)),
        );
        let error = adapter(client)
            .fetch(SeriesRequest::new("NOPE", window()))
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
        assert!(error.message().contains("does not exist"));
    }

    #[tokio::test]
    async fn empty_observations_are_an_error() {
        let client = Arc::new(FixtureHttpClient::new().with_route(
            "series_id=WALCL",
            HttpResponse::ok_json(r#"{"observations":[]}"#),
        ));
        let error = adapter(client)
            .fetch(SeriesRequest::new("WALCL", window()))
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::NotFound);
    }

    #[tokio::test]
    async fn timeouts_are_retried_then_reported_unavailable() {
        let client = Arc::new(FixtureHttpClient::new().with_sequence(
            "series_id=WALCL",
            vec![Err(HttpError::timeout("slow upstream"))],
        ));
        let error = adapter(Arc::clone(&client))
            .with_retry(RetryConfig::fixed(std::time::Duration::ZERO, 1))
            .fetch(SeriesRequest::new("WALCL", window()))
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
        assert_eq!(client.recorded_requests().len(), 2);
    }
}
