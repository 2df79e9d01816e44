use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PositiveU64, PositiveUsize, RunArgs};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};
use crate::workload::WeightedQuery;

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments. Explicit CLI values win;
/// config values fill in everything left at its default.
///
/// # Errors
///
/// Returns an error when config values are out of range.
pub fn apply_config(args: &mut RunArgs, matches: &ArgMatches, config: &ConfigFile) -> AppResult<()> {
    if !is_cli(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = Some(url);
    }

    if !is_cli(matches, "endpoint")
        && let Some(endpoint) = config.endpoint.clone()
    {
        args.endpoint = endpoint;
    }

    if !is_cli(matches, "users")
        && let Some(users) = config.users
    {
        args.users = ensure_positive_usize(users, "users")?;
    }

    if !is_cli(matches, "duration")
        && let Some(duration) = config.duration
    {
        args.duration = ensure_positive_u64(duration, "duration")?;
    }

    if !is_cli(matches, "ttl")
        && let Some(ttl) = config.ttl.as_ref()
    {
        args.ttl = ttl.to_duration("ttl").map_err(AppError::config)?;
    }

    if !is_cli(matches, "window")
        && let Some(window) = config.window.as_ref()
    {
        args.window = window.to_duration("window").map_err(AppError::config)?;
    }

    if !is_cli(matches, "warmup")
        && let Some(warmup) = config.warmup.as_ref()
    {
        args.warmup = Some(warmup.to_duration("warmup").map_err(AppError::config)?);
    }

    if !is_cli(matches, "hot_keys")
        && let Some(hot_keys) = config.hot_keys.clone()
    {
        args.hot_keys = hot_keys;
    }

    if !is_cli(matches, "hot_ratio")
        && let Some(hot_ratio) = config.hot_ratio
    {
        args.hot_ratio = ensure_ratio(hot_ratio, "hot_ratio")?;
    }

    if !is_cli(matches, "tail_size")
        && let Some(tail_size) = config.tail_size
    {
        args.tail_size = tail_size;
    }

    if !is_cli(matches, "pages")
        && let Some(pages) = config.pages
    {
        args.pages = ensure_positive_u64(pages, "pages")?;
    }

    if !is_cli(matches, "think_min_ms")
        && let Some(think_min_ms) = config.think_min_ms
    {
        args.think_min_ms = think_min_ms;
    }

    if !is_cli(matches, "think_max_ms")
        && let Some(think_max_ms) = config.think_max_ms
    {
        args.think_max_ms = think_max_ms;
    }

    if !is_cli(matches, "slow_ms")
        && let Some(slow_ms) = config.slow_ms
    {
        args.slow_ms = slow_ms;
    }

    if !is_cli(matches, "expected_status_code")
        && let Some(status) = config.status
    {
        args.expected_status_code = status;
    }

    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = timeout.to_duration("timeout").map_err(AppError::config)?;
    }

    if !is_cli(matches, "connect_timeout")
        && let Some(connect_timeout) = config.connect_timeout.as_ref()
    {
        args.connect_timeout = connect_timeout
            .to_duration("connect_timeout")
            .map_err(AppError::config)?;
    }

    if !is_cli(matches, "no_color")
        && let Some(no_color) = config.no_color
    {
        args.no_color = no_color;
    }

    if let Some(queries) = config.queries.as_ref() {
        if queries.is_empty() {
            return Err(AppError::validation(ValidationError::QueryWeightsEmpty));
        }
        args.queries = Some(
            queries
                .iter()
                .map(|(key, weight)| WeightedQuery {
                    key: key.clone(),
                    weight: *weight,
                })
                .collect(),
        );
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

fn ensure_positive_u64(value: u64, field: &str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn ensure_positive_usize(value: usize, field: &str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn ensure_ratio(value: f64, field: &str) -> AppResult<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(AppError::config(ConfigError::InvalidRatio {
            field: field.to_owned(),
            source: ValidationError::RatioOutOfRange {
                value: value.to_string(),
            },
        }))
    }
}
