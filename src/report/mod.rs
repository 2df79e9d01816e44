//! End-of-run report rendering.
use std::time::Duration;

use crate::stats::StatsSummary;

/// Expire-window hit share above which the report calls out heavy boundary
/// concentration.
const STAMPEDE_RATIO_CALLOUT: f64 = 0.1;

/// How well the service held up around TTL boundaries, judged from the
/// reference thresholds on mean and tail latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    Effective,
    PartiallyEffective,
    NeedsTuning,
}

impl Verdict {
    pub(crate) const fn classify(avg_ms: f64, p95_ms: f64) -> Self {
        if avg_ms < 100.0 && p95_ms < 200.0 {
            Verdict::Effective
        } else if avg_ms < 300.0 && p95_ms < 500.0 {
            Verdict::PartiallyEffective
        } else {
            Verdict::NeedsTuning
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Verdict::Effective => "effective (latencies stay stable across TTL boundaries)",
            Verdict::PartiallyEffective => "partially effective (some tuning headroom remains)",
            Verdict::NeedsTuning => "needs tuning (latency degrades around expiry)",
        }
    }
}

/// Print the final report to stdout.
pub fn print_summary(summary: Option<&StatsSummary>, window: Duration, warmup: Option<Duration>) {
    let Some(summary) = summary else {
        println!("No successful requests recorded.");
        return;
    };
    for line in summary_lines(summary, window, warmup) {
        println!("{}", line);
    }
}

pub(crate) fn summary_lines(
    summary: &StatsSummary,
    window: Duration,
    warmup: Option<Duration>,
) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!(
        "Total Requests: {} (success {}, errors {})",
        summary.total_requests, summary.success_count, summary.error_count
    ));
    lines.push(format!(
        "RPS: max {}, avg {:.1}",
        summary.max_rps, summary.avg_rps
    ));
    lines.push(format!(
        "Latency (ms): avg {:.1}, min {:.1}, max {:.1}",
        summary.avg_ms, summary.min_ms, summary.max_ms
    ));
    lines.push(format!(
        "P50/P90/P95/P99 Latency: {:.1}ms / {:.1}ms / {:.1}ms / {:.1}ms",
        summary.p50_ms, summary.p90_ms, summary.p95_ms, summary.p99_ms
    ));
    lines.push(format!("In Flight Now: {}", summary.inflight_now));
    lines.push(format!(
        "Expire-Window Hits (within {:.1}s of a boundary): {}",
        window.as_secs_f64(),
        summary.expire_window_hits
    ));

    let hit_ratio = if summary.total_requests > 0 {
        summary.expire_window_hits as f64 / summary.total_requests as f64
    } else {
        0.0
    };
    if hit_ratio > STAMPEDE_RATIO_CALLOUT {
        lines.push(format!(
            "High boundary concentration: {:.1}% of requests landed in the expire window.",
            hit_ratio * 100.0
        ));
    }

    if let Some(warmup) = warmup {
        lines.push(format!(
            "Warmup: treat the first {}s as advisory when reading these numbers.",
            warmup.as_secs()
        ));
    }

    lines.push(format!(
        "Cache protection: {}",
        Verdict::classify(summary.avg_ms, summary.p95_ms).as_str()
    ));
    lines
}
