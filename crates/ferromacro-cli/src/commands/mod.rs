mod catalog;
mod correlation;
mod report;
mod series;
mod strategy;
mod watch;

use std::sync::Arc;

use ferromacro_core::{
    parse_date, CacheMode, DateWindow, HttpClient, LoadOutcome, Loader, MacroConfig,
    ReqwestHttpClient, SeriesCatalog,
};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::{Envelope, EnvelopeMeta};
use crate::output;

pub struct CommandResult {
    pub data: Value,
    /// Terminal layout used by `--format table`.
    pub table: Option<String>,
    /// Printed verbatim instead of an envelope (`report --text`).
    pub raw_text: Option<String>,
    pub window: Option<DateWindow>,
    pub warnings: Vec<String>,
    pub latency_ms: u64,
    pub cache_hit: bool,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            table: None,
            raw_text: None,
            window: None,
            warnings: Vec::new(),
            latency_ms: 0,
            cache_hit: false,
        }
    }

    /// Result of a command that ran the loader.
    pub fn loaded(data: Value, window: DateWindow, outcome: &LoadOutcome) -> Self {
        Self {
            window: Some(window),
            warnings: outcome.warnings.clone(),
            latency_ms: outcome.latency_ms,
            cache_hit: outcome.cache_hit,
            ..Self::ok(data)
        }
    }

    pub fn with_table(mut self, table: String) -> Self {
        self.table = Some(table);
        self
    }

    pub fn with_raw_text(mut self, text: String) -> Self {
        self.raw_text = Some(text);
        self
    }
}

/// Resolved configuration shared by every command.
pub struct Context {
    pub config: MacroConfig,
    pub catalog: SeriesCatalog,
    pub mock: bool,
    pub cache_mode: CacheMode,
}

impl Context {
    /// Environment first, then command-line overrides.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let mut config = MacroConfig::from_env()?.with_align(cli.align.into());
        if let Some(start) = &cli.start {
            config = config.with_start(parse_date(start)?);
        }
        if let Some(end) = &cli.end {
            config = config.with_end(parse_date(end)?);
        }
        if let Some(timeout_ms) = cli.timeout_ms {
            config = config.with_timeout_ms(timeout_ms);
        }
        if let Some(retries) = cli.retries {
            config = config.with_max_retries(retries);
        }

        let catalog = match &cli.catalog {
            Some(path) => SeriesCatalog::from_path(path)?,
            None => SeriesCatalog::default(),
        };

        Ok(Self {
            config,
            catalog,
            mock: cli.mock,
            cache_mode: cli.cache.into(),
        })
    }

    pub fn window(&self) -> Result<DateWindow, CliError> {
        Ok(self.config.window()?)
    }

    /// Build the loader; live mode needs a FRED key when the catalog has macro series.
    pub fn loader(&self) -> Result<Loader, CliError> {
        if self.mock {
            tracing::debug!("using synthetic providers");
            return Ok(Loader::synthetic(&self.config, self.catalog.clone()));
        }
        let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
        Ok(Loader::from_config(
            &self.config,
            self.catalog.clone(),
            http_client,
        )?)
    }

    /// One-shot load through a fresh loader.
    pub async fn load(&self) -> Result<(DateWindow, LoadOutcome), CliError> {
        let window = self.window()?;
        let outcome = self.loader()?.load(window, self.cache_mode).await?;
        Ok((window, outcome))
    }
}

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let context = Context::from_cli(cli)?;

    match &cli.command {
        Command::Report(args) => emit(cli, report::run(args, &context).await?),
        Command::Catalog => emit(cli, catalog::run(&context)?),
        Command::Series(args) => emit(cli, series::run(args, &context).await?),
        Command::Correlation => emit(cli, correlation::run(&context).await?),
        Command::Strategy => emit(cli, strategy::run()?),
        Command::Watch(args) => watch::run(args, &context, |result| emit(cli, result)).await,
    }
}

/// Wrap a result in an envelope and print it.
pub fn emit(cli: &Cli, result: CommandResult) -> Result<(), CliError> {
    if let Some(text) = result.raw_text {
        print!("{text}");
        return Ok(());
    }

    let CommandResult {
        data,
        table,
        window,
        warnings,
        latency_ms,
        cache_hit,
        ..
    } = result;

    let mut meta = EnvelopeMeta::new(window, latency_ms, cache_hit);
    for warning in warnings {
        meta.push_warning(warning);
    }
    let envelope = Envelope { meta, data };
    output::render(&envelope, table.as_deref(), cli.format, cli.pretty)
}
