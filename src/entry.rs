//! Process entry: argument parsing, config merge, and run dispatch.
use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::args::RunArgs;
use crate::error::AppResult;
use crate::runner::{self, RunConfig};
use crate::stats::StatsAggregator;
use crate::{config, logger, report};

/// Default config filenames checked when no CLI args are provided.
const DEFAULT_CONFIG_FILES: [&str; 2] = ["stampede.toml", "stampede.json"];

/// Parse arguments, merge config, and execute one load run.
///
/// # Errors
///
/// Returns an error for invalid arguments or configuration, or when the
/// runtime or HTTP client cannot be built.
pub fn run() -> AppResult<()> {
    let (mut args, matches) = match parse_args()? {
        Some(parsed) => parsed,
        None => return Ok(()),
    };

    logger::init_logging(args.verbose, args.no_color);

    apply_config(&mut args, &matches)?;
    let run_config = Arc::new(RunConfig::from_args(&args)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_load(&run_config))
}

fn parse_args() -> AppResult<Option<(RunArgs, ArgMatches)>> {
    let mut cmd = RunArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = RunArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !has_default_config()
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

fn apply_config(args: &mut RunArgs, matches: &ArgMatches) -> AppResult<()> {
    let loaded = config::load_config(args.config.as_deref())?;
    if let Some(config_file) = loaded {
        config::apply_config(args, matches, &config_file)?;
    }
    Ok(())
}

async fn run_load(config: &Arc<RunConfig>) -> AppResult<()> {
    announce(config);

    let stats = Arc::new(StatsAggregator::new(config.ttl));
    runner::run(config, &stats).await?;

    report::print_summary(stats.summary().as_ref(), config.window, config.warmup);
    Ok(())
}

fn announce(config: &RunConfig) {
    tracing::info!(
        "Starting cache-stampede run against {}{}",
        config.base_url,
        config.endpoint.trim_start_matches('/')
    );
    tracing::info!(
        "ttl={:?}, expire window=±{:?}, users={}, duration={:?}",
        config.ttl,
        config.window,
        config.users,
        config.duration
    );
}
