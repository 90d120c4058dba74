//! CLI argument definitions for ferromacro.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `report` | Run the pipeline and write the HTML report |
//! | `catalog` | List the series catalog |
//! | `series` | Print the filled (or normalized) table |
//! | `correlation` | Print the correlation matrix of returns |
//! | `strategy` | Print the monthly allocation schedule |
//! | `watch` | Rebuild the report on an interval |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--mock` | `false` | Use deterministic offline data |
//! | `--start` | `2020-01-01` | First date of the window |
//! | `--end` | today | Last date of the window |
//! | `--align` | `union` | Date alignment (union, anchor) |
//! | `--catalog` | built-in | JSON catalog file |
//! | `--cache` | `use` | Cache policy (use, refresh, bypass) |
//! | `--timeout-ms` | `10000` | Per-request timeout |
//! | `--retries` | `2` | Retries for transient transport failures |
//! | `--verbose` | `false` | Debug logging on stderr |
//!
//! # Examples
//!
//! ```bash
//! # Offline report
//! ferromacro --mock report --out report.html
//!
//! # Last five normalized rows as a table
//! ferromacro series --normalized --tail 5 --format table
//!
//! # Rebuild every ten minutes, three times
//! ferromacro watch --interval-secs 600 --iterations 3
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use ferromacro_core::{AlignMode, CacheMode};

/// ferromacro - macro liquidity and market indicator dashboard
///
/// Loads Yahoo Finance market series and FRED macro series, normalizes them,
/// correlates their returns and renders a report with a fixed allocation plan.
#[derive(Debug, Parser)]
#[command(
    name = "ferromacro",
    author,
    version,
    about = "Macro liquidity and market indicator dashboard",
    long_about = "ferromacro loads market series from Yahoo Finance and macro series from FRED, \
aligns them into one table and renders:\n\
\n\
  • a normalized trend chart (first row = 100)\n\
  • a correlation heatmap of daily changes\n\
  • a fixed monthly allocation plan with commentary\n\
\n\
Set FERROMACRO_FRED_API_KEY (or FRED_API_KEY) for live FRED data, or pass --mock.\n\
Use 'ferromacro <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Use deterministic synthetic series instead of live providers.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// First date of the window (YYYY-MM-DD). Overrides FERROMACRO_START_DATE.
    #[arg(long, global = true)]
    pub start: Option<String>,

    /// Last date of the window (YYYY-MM-DD). Defaults to today (UTC).
    #[arg(long, global = true)]
    pub end: Option<String>,

    /// How dates from different series are aligned.
    ///
    /// - union: every date seen in any series
    /// - anchor: dates of the first catalog series only
    #[arg(long, global = true, value_enum, default_value_t = AlignArg::Union)]
    pub align: AlignArg,

    /// Load the series catalog from a JSON file.
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// How the table cache is consulted.
    ///
    /// - use: serve fresh entries, store new loads
    /// - refresh: always fetch, then store
    /// - bypass: always fetch, store nothing
    #[arg(long, global = true, value_enum, default_value_t = CacheArg::Use)]
    pub cache: CacheArg,

    /// Request timeout in milliseconds. Overrides FERROMACRO_TIMEOUT_MS.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Retries for transient transport failures. Overrides FERROMACRO_MAX_RETRIES.
    #[arg(long, global = true)]
    pub retries: Option<u32>,

    /// Debug-level logging (RUST_LOG takes precedence when set).
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII layout for terminal display.
    Table,
    /// Single JSON envelope.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlignArg {
    Union,
    Anchor,
}

impl From<AlignArg> for AlignMode {
    fn from(value: AlignArg) -> Self {
        match value {
            AlignArg::Union => AlignMode::Union,
            AlignArg::Anchor => AlignMode::Anchor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheArg {
    Use,
    Refresh,
    Bypass,
}

impl From<CacheArg> for CacheMode {
    fn from(value: CacheArg) -> Self {
        match value {
            CacheArg::Use => CacheMode::Use,
            CacheArg::Refresh => CacheMode::Refresh,
            CacheArg::Bypass => CacheMode::Bypass,
        }
    }
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the pipeline and write the HTML report.
    ///
    /// # Examples
    ///
    ///   ferromacro report
    ///   ferromacro --mock report --out /tmp/macro.html
    ///   ferromacro report --text
    Report(ReportArgs),

    /// List the series catalog.
    Catalog,

    /// Print the filled indicator table.
    ///
    /// # Examples
    ///
    ///   ferromacro series --tail 10
    ///   ferromacro series --normalized --format table
    Series(SeriesArgs),

    /// Print the correlation matrix of daily percentage changes.
    Correlation,

    /// Print the monthly allocation schedule and its rationale.
    Strategy,

    /// Rebuild the report on an interval; reruns within the cache TTL reuse the table.
    ///
    /// # Examples
    ///
    ///   ferromacro watch --interval-secs 300
    ///   ferromacro --mock watch --interval-secs 1 --iterations 3
    Watch(WatchArgs),
}

/// Arguments for the `report` command.
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Destination of the HTML report.
    #[arg(long, default_value = "ferromacro-report.html")]
    pub out: PathBuf,

    /// Print the plain-text report to stdout instead of writing HTML.
    #[arg(long, default_value_t = false)]
    pub text: bool,
}

/// Arguments for the `series` command.
#[derive(Debug, Args)]
pub struct SeriesArgs {
    /// Rebase every column to 100 at the first row.
    #[arg(long, default_value_t = false)]
    pub normalized: bool,

    /// Only the last N rows.
    #[arg(long)]
    pub tail: Option<usize>,
}

/// Arguments for the `watch` command.
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Destination of the HTML report.
    #[arg(long, default_value = "ferromacro-report.html")]
    pub out: PathBuf,

    /// Seconds between runs.
    #[arg(long, default_value_t = 300)]
    pub interval_secs: u64,

    /// Stop after N runs (runs until interrupted when omitted).
    #[arg(long)]
    pub iterations: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ferromacro",
            "series",
            "--normalized",
            "--tail",
            "5",
            "--mock",
            "--align",
            "anchor",
            "--format",
            "table",
        ])
        .expect("valid arguments");

        assert!(cli.mock);
        assert_eq!(cli.align, AlignArg::Anchor);
        assert_eq!(cli.format, OutputFormat::Table);
        match cli.command {
            Command::Series(args) => {
                assert!(args.normalized);
                assert_eq!(args.tail, Some(5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn watch_defaults() {
        let cli = Cli::try_parse_from(["ferromacro", "watch"]).expect("valid arguments");
        match cli.command {
            Command::Watch(args) => {
                assert_eq!(args.interval_secs, 300);
                assert_eq!(args.iterations, None);
                assert_eq!(args.out, PathBuf::from("ferromacro-report.html"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cache_policy_defaults_to_use_and_accepts_overrides() {
        let cli = Cli::try_parse_from(["ferromacro", "catalog"]).expect("valid arguments");
        assert_eq!(CacheMode::from(cli.cache), CacheMode::Use);

        let cli = Cli::try_parse_from(["ferromacro", "watch", "--cache", "refresh"])
            .expect("valid arguments");
        assert_eq!(CacheMode::from(cli.cache), CacheMode::Refresh);

        let cli = Cli::try_parse_from(["ferromacro", "--cache", "bypass", "series"])
            .expect("valid arguments");
        assert_eq!(CacheMode::from(cli.cache), CacheMode::Bypass);

        assert!(Cli::try_parse_from(["ferromacro", "--cache", "never", "catalog"]).is_err());
    }

    #[test]
    fn rejects_unknown_alignment() {
        assert!(Cli::try_parse_from(["ferromacro", "--align", "outer", "catalog"]).is_err());
    }

    #[test]
    fn definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
