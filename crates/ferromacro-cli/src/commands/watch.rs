use std::time::Duration;

use ferromacro_core::Loader;

use crate::cli::WatchArgs;
use crate::error::CliError;

use super::report::write_report;
use super::{CommandResult, Context};

/// Rebuild the report every `interval_secs` through one loader so reruns
/// inside the cache TTL reuse the table.
///
/// A failed iteration is logged and the loop keeps going; only emitting
/// output can end it early.
pub async fn run<F>(args: &WatchArgs, context: &Context, mut emit: F) -> Result<(), CliError>
where
    F: FnMut(CommandResult) -> Result<(), CliError>,
{
    if args.interval_secs == 0 {
        return Err(CliError::Usage(String::from("--interval-secs must be at least 1")));
    }
    if args.iterations == Some(0) {
        return Err(CliError::Usage(String::from("--iterations must be at least 1")));
    }

    let loader = context.loader()?;
    let interval = Duration::from_secs(args.interval_secs);
    let mut iteration: u64 = 0;

    loop {
        iteration += 1;
        match run_once(args, context, &loader).await {
            Ok(result) => {
                tracing::info!(iteration, cache_hit = result.cache_hit, "watch iteration complete");
                emit(result)?;
            }
            Err(error) => tracing::error!(iteration, %error, "watch iteration failed"),
        }

        if args.iterations.is_some_and(|limit| iteration >= limit) {
            break;
        }

        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!(iteration, "interrupted, stopping watch");
                break;
            }
        }
    }

    Ok(())
}

async fn run_once(
    args: &WatchArgs,
    context: &Context,
    loader: &Loader,
) -> Result<CommandResult, CliError> {
    let window = context.window()?;
    let outcome = loader.load(window, context.cache_mode).await?;
    let data = write_report(&outcome.frame, window, &args.out)?;
    Ok(CommandResult::loaded(data, window, &outcome))
}
