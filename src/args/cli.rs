use clap::Parser;
use std::time::Duration;

use super::parsers::{parse_duration_arg, parse_positive_u64, parse_positive_usize, parse_ratio};
use super::types::{PositiveU64, PositiveUsize};
use crate::workload::WeightedQuery;

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Async HTTP load generator that provokes and measures cache-stampede behavior around TTL boundaries."
)]
pub struct RunArgs {
    /// Base URL of the book-search service under test
    #[arg(long, short)]
    pub url: Option<String>,

    /// Search endpoint path appended to the base URL
    #[arg(long, default_value = "/api/books")]
    pub endpoint: String,

    /// Number of concurrent users
    #[arg(long, short = 'c', default_value = "100", value_parser = parse_positive_usize)]
    pub users: PositiveUsize,

    /// Duration of the run (seconds)
    #[arg(
        long,
        short = 't',
        default_value = "60",
        value_parser = parse_positive_u64
    )]
    pub duration: PositiveU64,

    /// Cache TTL of the service under test (supports ms/s/m/h)
    #[arg(long, default_value = "5s", value_parser = parse_duration_arg)]
    pub ttl: Duration,

    /// Half-width of the expire window around each TTL boundary (supports ms/s/m/h)
    #[arg(long, default_value = "500ms", value_parser = parse_duration_arg)]
    pub window: Duration,

    /// Treat the first part of the run as warmup in the report (supports ms/s/m/h)
    #[arg(long, value_parser = parse_duration_arg)]
    pub warmup: Option<Duration>,

    /// Hot query key receiving the concentrated traffic share (repeatable)
    #[arg(long = "hot-key", default_value = "springboot")]
    pub hot_keys: Vec<String>,

    /// Share of traffic aimed at the hot keys (0.0 to 1.0)
    #[arg(long, default_value = "0.95", value_parser = parse_ratio)]
    pub hot_ratio: f64,

    /// Number of generated long-tail keys sharing the residual traffic
    #[arg(long, default_value = "10")]
    pub tail_size: usize,

    /// Pages are drawn uniformly from 1..=pages
    #[arg(long, default_value = "1", value_parser = parse_positive_u64)]
    pub pages: PositiveU64,

    /// Minimum think time between iterations (milliseconds)
    #[arg(long = "think-min-ms", default_value = "10")]
    pub think_min_ms: u64,

    /// Maximum think time between iterations (milliseconds)
    #[arg(long = "think-max-ms", default_value = "40")]
    pub think_max_ms: u64,

    /// Log successful responses slower than this threshold (milliseconds)
    #[arg(long = "slow-ms", default_value = "800")]
    pub slow_ms: u64,

    /// Expected HTTP status code
    #[arg(long = "status", short = 's', default_value = "200")]
    pub expected_status_code: u16,

    /// Request timeout (supports ms/s/m/h)
    #[arg(
        long = "timeout",
        default_value = "10s",
        value_parser = parse_duration_arg
    )]
    pub request_timeout: Duration,

    /// Timeout for establishing a new connection (supports ms/s/m/h)
    #[arg(
        long = "connect-timeout",
        default_value = "5s",
        value_parser = parse_duration_arg
    )]
    pub connect_timeout: Duration,

    /// Path to config file (TOML/JSON). Defaults to ./stampede.toml or ./stampede.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by STAMPEDE_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Explicit query weight table; only settable from a config file
    #[clap(skip)]
    pub queries: Option<Vec<WeightedQuery>>,
}
