//! Assemble the filled indicator table for a date window.
//!
//! The loader walks the catalog in order, sends each entry to the source of
//! its provider family, aligns the results and fills gaps. The first failing
//! entry aborts the load; nothing partial is returned or cached.

use std::sync::Arc;
use std::time::Instant;

use crate::adapters::{FredAdapter, SyntheticSource, YahooChartAdapter};
use crate::cache::{CacheMode, FrameCache};
use crate::config::MacroConfig;
use crate::data_source::{ProviderKind, SeriesRequest, SeriesSource};
use crate::http_client::HttpClient;
use crate::{AlignMode, ConfigError, DateWindow, LoadError, SeriesCatalog, SeriesFrame};

/// Result of one [`Loader::load`] call.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub frame: Arc<SeriesFrame>,
    pub cache_hit: bool,
    pub latency_ms: u64,
    /// Non-fatal observations about the table, e.g. columns with no data.
    pub warnings: Vec<String>,
}

pub struct Loader {
    catalog: SeriesCatalog,
    market: Arc<dyn SeriesSource>,
    macro_source: Arc<dyn SeriesSource>,
    cache: FrameCache,
    align: AlignMode,
}

impl Loader {
    pub fn new(
        catalog: SeriesCatalog,
        market: Arc<dyn SeriesSource>,
        macro_source: Arc<dyn SeriesSource>,
    ) -> Self {
        Self {
            catalog,
            market,
            macro_source,
            cache: FrameCache::disabled(),
            align: AlignMode::default(),
        }
    }

    /// Live Yahoo and FRED adapters sharing one HTTP client.
    ///
    /// The FRED key is only required when the catalog has macro entries.
    pub fn from_config(
        config: &MacroConfig,
        catalog: SeriesCatalog,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<Self, ConfigError> {
        let market = YahooChartAdapter::new(Arc::clone(&http_client))
            .with_retry(config.retry.clone())
            .with_timeout_ms(config.timeout_ms);

        let macro_source: Arc<dyn SeriesSource> =
            if catalog.of_kind(ProviderKind::Macro).next().is_some() {
                let key = config.require_fred_api_key()?.clone();
                Arc::new(
                    FredAdapter::new(http_client, key)
                        .with_retry(config.retry.clone())
                        .with_timeout_ms(config.timeout_ms),
                )
            } else {
                Arc::new(SyntheticSource::macro_series())
            };

        Ok(Self::new(catalog, Arc::new(market), macro_source)
            .with_cache(FrameCache::new(config.cache_ttl))
            .with_align(config.align))
    }

    /// Offline loader backed by deterministic synthetic series.
    pub fn synthetic(config: &MacroConfig, catalog: SeriesCatalog) -> Self {
        Self::new(
            catalog,
            Arc::new(SyntheticSource::market()),
            Arc::new(SyntheticSource::macro_series()),
        )
        .with_cache(FrameCache::new(config.cache_ttl))
        .with_align(config.align)
    }

    pub fn with_cache(mut self, cache: FrameCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_align(mut self, align: AlignMode) -> Self {
        self.align = align;
        self
    }

    pub fn catalog(&self) -> &SeriesCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &FrameCache {
        &self.cache
    }

    pub fn align(&self) -> AlignMode {
        self.align
    }

    /// Load the filled table for `window`.
    pub async fn load(&self, window: DateWindow, mode: CacheMode) -> Result<LoadOutcome, LoadError> {
        let started = Instant::now();

        if mode.reads() {
            if let Some(frame) = self.cache.get(&window).await {
                tracing::debug!(%window, "table served from cache");
                let warnings = empty_column_warnings(&frame);
                return Ok(LoadOutcome {
                    frame,
                    cache_hit: true,
                    latency_ms: elapsed_ms(started),
                    warnings,
                });
            }
        }

        let frame = Arc::new(self.fetch_all(window).await?);
        if mode.writes() {
            tracing::debug!(%window, "storing table in cache");
            self.cache.clear_expired().await;
            self.cache.put(window, Arc::clone(&frame)).await;
        }

        let warnings = empty_column_warnings(&frame);
        Ok(LoadOutcome {
            frame,
            cache_hit: false,
            latency_ms: elapsed_ms(started),
            warnings,
        })
    }

    async fn fetch_all(&self, window: DateWindow) -> Result<SeriesFrame, LoadError> {
        let mut series = Vec::with_capacity(self.catalog.len());

        for entry in self.catalog.entries() {
            let source = match entry.kind {
                ProviderKind::Market => &self.market,
                ProviderKind::Macro => &self.macro_source,
            };
            let observations = source
                .fetch(SeriesRequest::new(entry.id.as_str(), window))
                .await
                .map_err(|source_error| {
                    tracing::error!(
                        entry = %entry.name,
                        provider = source.name(),
                        error = %source_error,
                        "series fetch failed"
                    );
                    LoadError::Source {
                        entry: entry.name.clone(),
                        source: source_error,
                    }
                })?;
            tracing::info!(
                entry = %entry.name,
                id = %entry.id,
                provider = source.name(),
                observations = observations.len(),
                "fetched series"
            );
            series.push((entry.name.clone(), observations));
        }

        let frame = SeriesFrame::from_series(series, self.align)?;
        tracing::info!(
            rows = frame.row_count(),
            columns = frame.columns().len(),
            align = %self.align,
            "assembled indicator table"
        );
        Ok(frame.fill_missing())
    }
}

fn empty_column_warnings(frame: &SeriesFrame) -> Vec<String> {
    frame
        .columns()
        .iter()
        .filter(|column| column.first_present().is_none())
        .map(|column| format!("column '{}' has no values in the window", column.name()))
        .collect()
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
