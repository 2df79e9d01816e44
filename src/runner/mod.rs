//! Worker-pool execution of one load run.
//!
//! Each worker loops over the same iteration the reference traffic shape
//! uses: advance the expire anchor, pick a weighted query, time one GET,
//! classify it against the expire window, record the outcome, then sleep a
//! uniform think time. A broadcast shutdown channel fed by the run-duration
//! timer (or Ctrl-C) drains the pool; in-flight requests are allowed to
//! finish.
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};
use url::Url;

use crate::args::RunArgs;
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::{SearchClient, SearchStatus};
use crate::shutdown::ShutdownSender;
use crate::stats::StatsAggregator;
use crate::workload::QueryMix;

const SHUTDOWN_CHANNEL_CAPACITY: usize = 1;

/// Fully validated settings for one run.
#[derive(Debug)]
pub struct RunConfig {
    pub base_url: Url,
    pub endpoint: String,
    pub users: usize,
    pub duration: Duration,
    pub ttl: Duration,
    pub window: Duration,
    pub warmup: Option<Duration>,
    pub think_min_ms: u64,
    pub think_max_ms: u64,
    pub slow_ms: u64,
    pub expected_status: u16,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub mix: QueryMix,
}

impl RunConfig {
    /// Validate merged CLI/config arguments into a runnable configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for a missing or hostless URL, inverted think-time
    /// bounds, or an unbuildable query mix.
    pub fn from_args(args: &RunArgs) -> AppResult<Self> {
        let url_value = args
            .url
            .as_deref()
            .ok_or_else(|| AppError::validation(ValidationError::MissingUrl))?;
        let base_url = Url::parse(url_value).map_err(|err| {
            AppError::validation(ValidationError::InvalidUrl {
                url: url_value.to_owned(),
                source: err,
            })
        })?;
        if base_url.host_str().is_none() {
            return Err(AppError::validation(ValidationError::UrlMissingHost));
        }
        if args.think_min_ms > args.think_max_ms {
            return Err(AppError::validation(ValidationError::ThinkTimeInverted));
        }

        let pages = args.pages.get();
        let mix = args
            .queries
            .as_ref()
            .map_or_else(
                || QueryMix::hot_tail(&args.hot_keys, args.hot_ratio, args.tail_size, pages),
                |entries| QueryMix::from_weighted(entries, pages),
            )
            .map_err(AppError::validation)?;

        Ok(Self {
            base_url,
            endpoint: args.endpoint.clone(),
            users: args.users.get(),
            duration: Duration::from_secs(args.duration.get()),
            ttl: args.ttl,
            window: args.window,
            warmup: args.warmup,
            think_min_ms: args.think_min_ms,
            think_max_ms: args.think_max_ms,
            slow_ms: args.slow_ms,
            expected_status: args.expected_status_code,
            request_timeout: args.request_timeout,
            connect_timeout: args.connect_timeout,
            mix,
        })
    }
}

/// Drive the worker pool until the run duration elapses or the process is
/// interrupted.
///
/// # Errors
///
/// Returns an error when the HTTP client cannot be built.
pub async fn run(config: &Arc<RunConfig>, stats: &Arc<StatsAggregator>) -> AppResult<()> {
    let client = Arc::new(
        SearchClient::new(
            &config.base_url,
            &config.endpoint,
            config.request_timeout,
            config.connect_timeout,
        )
        .map_err(AppError::http)?,
    );

    let (shutdown_tx, _) =
        tokio::sync::broadcast::channel::<()>(SHUTDOWN_CHANNEL_CAPACITY);
    spawn_stop_timer(&shutdown_tx, config.duration);

    let mut worker_handles = Vec::with_capacity(config.users);
    for worker_id in 0..config.users {
        let config = Arc::clone(config);
        let stats = Arc::clone(stats);
        let client = Arc::clone(&client);
        let shutdown_tx = shutdown_tx.clone();
        worker_handles.push(tokio::spawn(async move {
            let mut shutdown_rx = shutdown_tx.subscribe();
            loop {
                run_iteration(worker_id, &config, &client, &stats).await;
                let think = think_delay(config.think_min_ms, config.think_max_ms);
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    () = sleep(think) => {}
                }
            }
        }));
    }

    for handle in worker_handles {
        if let Err(err) = handle.await {
            warn!("Worker task failed to join: {}", err);
        }
    }
    Ok(())
}

fn spawn_stop_timer(shutdown_tx: &ShutdownSender, duration: Duration) {
    let shutdown_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::select! {
            () = sleep(duration) => {
                info!("Run duration elapsed; stopping workers.");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received; stopping workers.");
            }
        }
        drop(shutdown_tx.send(()));
    });
}

async fn run_iteration(
    worker_id: usize,
    config: &RunConfig,
    client: &SearchClient,
    stats: &StatsAggregator,
) {
    stats.advance_anchor_if_needed();

    let (key, page) = {
        let mut rng = rand::thread_rng();
        let pick = config.mix.pick(&mut rng);
        (pick.key.to_owned(), pick.page)
    };

    stats.request_start();
    let started = Instant::now();
    let status = client.search(&key, page).await;
    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

    match status {
        SearchStatus::Responded { status: code, .. } => {
            stats.mark_if_in_expire_window(config.window);
            let ok = code == config.expected_status;
            stats.request_end(latency_ms, ok);
            if !ok {
                debug!(
                    "Worker {} got status {} for key '{}'.",
                    worker_id, code, key
                );
            } else if latency_ms > config.slow_ms as f64 {
                warn!(
                    "Worker {} saw a slow response: {:.0}ms for key '{}'.",
                    worker_id, latency_ms, key
                );
            }
        }
        SearchStatus::Failed(err) => {
            stats.request_end(latency_ms, false);
            debug!("Worker {} request failed: {}", worker_id, err);
        }
    }
}

fn think_delay(min_ms: u64, max_ms: u64) -> Duration {
    let mut rng = rand::thread_rng();
    Duration::from_millis(rng.gen_range(min_ms..=max_ms))
}
