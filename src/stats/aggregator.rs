use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::percentile::interpolate;

/// Floor for the elapsed-seconds divisor when a summary is requested
/// immediately after construction.
const MIN_ELAPSED_SECS: f64 = 1e-9;

/// Thread-safe accumulator of per-request outcomes for one load run.
///
/// All fields live behind a single lock; every operation is O(1) under the
/// lock except [`StatsAggregator::percentile`] and
/// [`StatsAggregator::summary`], which copy the success samples and sort the
/// private copy outside the lock. The latency sample sequence and the
/// per-second buckets grow for the lifetime of the run; bounding run
/// duration is the caller's job.
///
/// The expire anchor is the most recently passed TTL-multiple boundary since
/// the run started. Callers advance it before classifying a request against
/// the boundary; advancing is idempotent and converges under concurrent
/// calls because each step depends only on the current wall clock.
#[derive(Debug)]
pub struct StatsAggregator {
    ttl_secs: f64,
    state: Mutex<StatsState>,
}

#[derive(Debug)]
struct StatsState {
    /// Latency in milliseconds, successes only. Insertion order is
    /// irrelevant; never pruned.
    response_times: Vec<f64>,
    inflight: i64,
    /// Requests completed per wall-clock epoch second.
    per_second: BTreeMap<u64, u64>,
    start_ts: f64,
    expire_anchor: f64,
    expire_window_hits: u64,
    total_requests: u64,
    errors: u64,
}

/// One consistent snapshot of a run's accumulated statistics.
#[derive(Debug, Clone)]
pub struct StatsSummary {
    pub total_requests: u64,
    pub success_count: u64,
    pub error_count: u64,
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub p50_ms: f64,
    pub p90_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub inflight_now: i64,
    pub expire_window_hits: u64,
    pub max_rps: u64,
    pub avg_rps: f64,
}

impl StatsAggregator {
    /// Create an aggregator anchored at the current wall clock.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::new_at(ttl, now_epoch_secs())
    }

    pub(crate) fn new_at(ttl: Duration, now: f64) -> Self {
        let ttl_secs = ttl.as_secs_f64();
        Self {
            ttl_secs,
            state: Mutex::new(StatsState {
                response_times: Vec::new(),
                inflight: 0,
                per_second: BTreeMap::new(),
                start_ts: now,
                expire_anchor: anchor_at_or_before(now, ttl_secs, now),
                expire_window_hits: 0,
                total_requests: 0,
                errors: 0,
            }),
        }
    }

    /// Record that a request is about to be issued.
    pub fn request_start(&self) {
        let mut state = self.locked();
        state.inflight = state.inflight.saturating_add(1);
    }

    /// Record a completed request. Successful latencies enter the sample
    /// sequence; failures only bump the error counter. Both count toward
    /// the current second's throughput bucket.
    pub fn request_end(&self, latency_ms: f64, ok: bool) {
        self.request_end_at(now_epoch_secs(), latency_ms, ok);
    }

    pub(crate) fn request_end_at(&self, now: f64, latency_ms: f64, ok: bool) {
        let mut state = self.locked();
        state.inflight = state.inflight.saturating_sub(1);
        state.total_requests = state.total_requests.saturating_add(1);
        if ok {
            state.response_times.push(latency_ms);
        } else {
            state.errors = state.errors.saturating_add(1);
        }
        let second = now.floor() as u64;
        let count = state.per_second.entry(second).or_insert(0);
        *count = count.saturating_add(1);
    }

    /// Step the expire anchor forward until it is the most recent passed
    /// TTL boundary. May jump several steps when the caller has not polled
    /// for longer than one TTL interval; a no-op otherwise.
    pub fn advance_anchor_if_needed(&self) {
        self.advance_anchor_at(now_epoch_secs());
    }

    pub(crate) fn advance_anchor_at(&self, now: f64) {
        if self.ttl_secs <= 0.0 {
            return;
        }
        let mut state = self.locked();
        while now - state.expire_anchor >= self.ttl_secs {
            state.expire_anchor += self.ttl_secs;
        }
    }

    /// Count the current instant as an expire-window hit when it falls
    /// within `window` of the anchor, on either side of the boundary.
    pub fn mark_if_in_expire_window(&self, window: Duration) {
        self.mark_if_in_expire_window_at(now_epoch_secs(), window.as_secs_f64());
    }

    pub(crate) fn mark_if_in_expire_window_at(&self, now: f64, window_secs: f64) {
        let mut state = self.locked();
        let delta = (now - state.expire_anchor).abs();
        if delta <= window_secs {
            state.expire_window_hits = state.expire_window_hits.saturating_add(1);
        }
    }

    /// Interpolated percentile of the successful-request latencies, in
    /// milliseconds. `0.0` when no sample has been recorded.
    #[must_use]
    pub fn percentile(&self, p: f64) -> f64 {
        let mut snapshot = {
            let state = self.locked();
            state.response_times.clone()
        };
        snapshot.sort_by(f64::total_cmp);
        interpolate(&snapshot, p)
    }

    /// One consistent snapshot of the run, or `None` before the first
    /// successful sample.
    #[must_use]
    pub fn summary(&self) -> Option<StatsSummary> {
        self.summary_at(now_epoch_secs())
    }

    pub(crate) fn summary_at(&self, now: f64) -> Option<StatsSummary> {
        let (mut samples, inflight, max_rps, start_ts, hits, total, errors) = {
            let state = self.locked();
            (
                state.response_times.clone(),
                state.inflight,
                state.per_second.values().max().copied().unwrap_or(0),
                state.start_ts,
                state.expire_window_hits,
                state.total_requests,
                state.errors,
            )
        };
        if samples.is_empty() {
            return None;
        }

        let count = samples.len();
        let sum: f64 = samples.iter().sum();
        let avg_ms = sum / count as f64;
        let min_ms = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max_ms = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        samples.sort_by(f64::total_cmp);
        let elapsed = (now - start_ts).max(MIN_ELAPSED_SECS);

        Some(StatsSummary {
            total_requests: total,
            success_count: count as u64,
            error_count: errors,
            avg_ms,
            min_ms,
            max_ms,
            p50_ms: interpolate(&samples, 50.0),
            p90_ms: interpolate(&samples, 90.0),
            p95_ms: interpolate(&samples, 95.0),
            p99_ms: interpolate(&samples, 99.0),
            inflight_now: inflight,
            expire_window_hits: hits,
            max_rps,
            avg_rps: total as f64 / elapsed,
        })
    }

    fn locked(&self) -> MutexGuard<'_, StatsState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
impl StatsAggregator {
    pub(crate) fn anchor(&self) -> f64 {
        self.locked().expire_anchor
    }

    pub(crate) fn inflight(&self) -> i64 {
        self.locked().inflight
    }

    pub(crate) fn totals(&self) -> (u64, u64) {
        let state = self.locked();
        (state.total_requests, state.errors)
    }

    pub(crate) fn expire_window_hits(&self) -> u64 {
        self.locked().expire_window_hits
    }

    pub(crate) fn samples(&self) -> Vec<f64> {
        self.locked().response_times.clone()
    }
}

/// Largest `start_ts + k * ttl` (integer `k >= 0`) at or before `now`.
fn anchor_at_or_before(start_ts: f64, ttl_secs: f64, now: f64) -> f64 {
    if now <= start_ts || ttl_secs <= 0.0 {
        return start_ts;
    }
    let steps = ((now - start_ts) / ttl_secs).floor();
    start_ts + steps * ttl_secs
}

fn now_epoch_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |elapsed| elapsed.as_secs_f64())
}
