//! Shared fixtures for the ferromacro integration tests.
//!
//! Canned Yahoo chart and FRED observation payloads cover two trading days in
//! January 2024, routed through [`FixtureHttpClient`] so the live adapters run
//! end to end without network access.

use std::sync::Arc;

use ferromacro_core::{
    ApiKey, DateWindow, FredAdapter, HttpResponse, Loader, RetryConfig, SeriesCatalog,
    YahooChartAdapter,
};

pub use ferromacro_core::FixtureHttpClient;

/// 2024-01-02 and 2024-01-03, 09:30 New York.
pub const TIMESTAMPS: [i64; 2] = [1_704_205_800, 1_704_292_200];

pub fn january_2024() -> DateWindow {
    DateWindow::parse("2024-01-01", "2024-01-31").expect("valid window")
}

/// Chart payload with adjusted closes for [`TIMESTAMPS`].
pub fn chart_body(closes: [f64; 2]) -> String {
    format!(
        r#"{{"chart":{{"result":[{{"meta":{{"gmtoffset":-18000}},
            "timestamp":[{},{}],
            "indicators":{{"quote":[{{"close":[{},{}]}}],"adjclose":[{{"adjclose":[{},{}]}}]}}}}],
            "error":null}}}}"#,
        TIMESTAMPS[0], TIMESTAMPS[1], closes[0], closes[1], closes[0], closes[1]
    )
}

/// Weekly FRED payload with a single 2024-01-03 observation.
pub fn fred_body(value: &str) -> String {
    format!(
        r#"{{"observations":[{{"realtime_start":"2024-06-01","realtime_end":"2024-06-01","date":"2024-01-03","value":"{value}"}}]}}"#
    )
}

/// Routes for every series of the default catalog.
pub fn default_catalog_client() -> FixtureHttpClient {
    FixtureHttpClient::new()
        .with_route("/chart/%5ETYX", HttpResponse::ok_json(chart_body([4.05, 4.10])))
        .with_route("/chart/DX-Y.NYB", HttpResponse::ok_json(chart_body([102.0, 102.5])))
        .with_route("/chart/SPY", HttpResponse::ok_json(chart_body([472.0, 468.0])))
        .with_route("/chart/QQQ", HttpResponse::ok_json(chart_body([400.0, 396.0])))
        .with_route("/chart/%5EVIX", HttpResponse::ok_json(chart_body([13.0, 14.3])))
        .with_route("series_id=WRESBAL", HttpResponse::ok_json(fred_body("3400000")))
        .with_route("series_id=WALCL", HttpResponse::ok_json(fred_body("7700000")))
        .with_route("series_id=WTREGEN", HttpResponse::ok_json(fred_body("750000")))
        .with_route("series_id=RRPONTSYD", HttpResponse::ok_json(fred_body("700.5")))
}

/// Live adapters over `client` with retries disabled.
pub fn fixture_loader(client: Arc<FixtureHttpClient>) -> Loader {
    let key = ApiKey::new("fixture-key").expect("non-empty key");
    let market = YahooChartAdapter::new(client.clone()).with_retry(RetryConfig::none());
    let fred = FredAdapter::new(client, key).with_retry(RetryConfig::none());
    Loader::new(SeriesCatalog::default(), Arc::new(market), Arc::new(fred))
}
