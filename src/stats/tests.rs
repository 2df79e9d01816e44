use std::sync::Arc;
use std::time::Duration;

use super::StatsAggregator;
use super::percentile::interpolate;

fn expect_close(label: &str, actual: f64, expected: f64) -> Result<(), String> {
    if (actual - expected).abs() < 1e-9 {
        Ok(())
    } else {
        Err(format!("{}: expected {}, got {}", label, expected, actual))
    }
}

fn aggregator_with_samples(samples: &[f64]) -> StatsAggregator {
    let stats = StatsAggregator::new_at(Duration::from_secs(5), 1_000.0);
    for latency in samples {
        stats.request_start();
        stats.request_end_at(1_000.5, *latency, true);
    }
    stats
}

#[test]
fn percentile_interpolates_between_ranks() -> Result<(), String> {
    let stats = aggregator_with_samples(&[30.0, 10.0, 40.0, 20.0]);
    expect_close("p50", stats.percentile(50.0), 25.0)?;
    expect_close("p0", stats.percentile(0.0), 10.0)?;
    expect_close("p100", stats.percentile(100.0), 40.0)?;
    expect_close("p75", stats.percentile(75.0), 32.5)?;
    Ok(())
}

#[test]
fn percentile_single_sample_is_constant() -> Result<(), String> {
    let sorted = [42.0];
    expect_close("p0", interpolate(&sorted, 0.0), 42.0)?;
    expect_close("p50", interpolate(&sorted, 50.0), 42.0)?;
    expect_close("p100", interpolate(&sorted, 100.0), 42.0)?;
    Ok(())
}

#[test]
fn percentile_empty_returns_zero() -> Result<(), String> {
    let stats = StatsAggregator::new_at(Duration::from_secs(5), 1_000.0);
    expect_close("empty p50", stats.percentile(50.0), 0.0)?;
    expect_close("empty p99", stats.percentile(99.0), 0.0)?;
    if stats.summary_at(1_001.0).is_some() {
        return Err("Expected empty summary before the first success.".to_owned());
    }
    Ok(())
}

#[test]
fn anchor_advance_is_a_noop_without_elapsed_time() -> Result<(), String> {
    let stats = StatsAggregator::new_at(Duration::from_secs(5), 1_000.0);
    stats.advance_anchor_at(1_000.0);
    expect_close("anchor", stats.anchor(), 1_000.0)
}

#[test]
fn anchor_advance_jumps_multiple_steps() -> Result<(), String> {
    let stats = StatsAggregator::new_at(Duration::from_secs(5), 1_000.0);
    stats.advance_anchor_at(1_012.0);
    expect_close("anchor after two steps", stats.anchor(), 1_010.0)?;
    // Converged: repeating with the same clock must not move the anchor.
    stats.advance_anchor_at(1_012.0);
    expect_close("anchor unchanged", stats.anchor(), 1_010.0)?;
    let behind = 1_012.0 - stats.anchor();
    if !(0.0..5.0).contains(&behind) {
        return Err(format!("anchor lag out of range: {}", behind));
    }
    Ok(())
}

#[test]
fn paired_start_end_balances_inflight() -> Result<(), String> {
    let stats = StatsAggregator::new_at(Duration::from_secs(5), 1_000.0);
    stats.request_start();
    stats.request_end_at(1_000.2, 100.0, true);
    if stats.inflight() != 0 {
        return Err(format!("Expected inflight 0, got {}", stats.inflight()));
    }
    let (total, errors) = stats.totals();
    if total != 1 || errors != 0 {
        return Err(format!("Expected totals (1, 0), got ({}, {})", total, errors));
    }
    let samples = stats.samples();
    if samples.len() != 1 {
        return Err(format!("Expected one sample, got {}", samples.len()));
    }
    expect_close("sample", samples.first().copied().unwrap_or(0.0), 100.0)
}

#[test]
fn failures_count_errors_without_sampling() -> Result<(), String> {
    let stats = StatsAggregator::new_at(Duration::from_secs(5), 1_000.0);
    stats.request_start();
    stats.request_end_at(1_000.2, 250.0, false);
    let (total, errors) = stats.totals();
    if total != 1 || errors != 1 {
        return Err(format!("Expected totals (1, 1), got ({}, {})", total, errors));
    }
    if !stats.samples().is_empty() {
        return Err("Failure latency must not enter the sample sequence.".to_owned());
    }
    if stats.summary_at(1_001.0).is_some() {
        return Err("Summary must stay empty while only failures exist.".to_owned());
    }
    Ok(())
}

#[test]
fn concurrent_workers_converge_on_exact_totals() -> Result<(), String> {
    let stats = Arc::new(StatsAggregator::new(Duration::from_secs(5)));
    let mut handles = Vec::new();
    for _worker in 0..8_usize {
        let stats = Arc::clone(&stats);
        handles.push(std::thread::spawn(move || {
            for iteration in 0..50_usize {
                stats.request_start();
                let ok = iteration % 5 != 0;
                stats.request_end(7.5, ok);
            }
        }));
    }
    for handle in handles {
        handle
            .join()
            .map_err(|_err| "worker thread panicked".to_owned())?;
    }

    // 8 workers x 50 iterations, one failure in five.
    let (total, errors) = stats.totals();
    if total != 400 {
        return Err(format!("Expected 400 total requests, got {}", total));
    }
    if errors != 80 {
        return Err(format!("Expected 80 errors, got {}", errors));
    }
    if stats.samples().len() != 320 {
        return Err(format!("Expected 320 samples, got {}", stats.samples().len()));
    }
    if stats.inflight() != 0 {
        return Err(format!("Expected inflight 0, got {}", stats.inflight()));
    }
    Ok(())
}

#[test]
fn expire_window_marks_both_sides_of_the_anchor() -> Result<(), String> {
    let stats = StatsAggregator::new_at(Duration::from_secs(5), 1_000.0);
    stats.mark_if_in_expire_window_at(1_000.4, 0.5);
    if stats.expire_window_hits() != 1 {
        return Err("Expected a hit just after the boundary.".to_owned());
    }
    stats.mark_if_in_expire_window_at(1_000.5, 0.5);
    if stats.expire_window_hits() != 2 {
        return Err("Expected the window half-width to be inclusive.".to_owned());
    }
    stats.mark_if_in_expire_window_at(1_000.6, 0.5);
    if stats.expire_window_hits() != 2 {
        return Err("Expected no hit outside the window.".to_owned());
    }

    // Pre-expiry side: 1004.7 is 0.3s before the 1005 boundary once the
    // anchor has been advanced past it.
    stats.advance_anchor_at(1_005.1);
    stats.mark_if_in_expire_window_at(1_004.7, 0.5);
    if stats.expire_window_hits() != 3 {
        return Err("Expected a hit just before the boundary.".to_owned());
    }
    stats.mark_if_in_expire_window_at(1_003.0, 0.5);
    if stats.expire_window_hits() != 3 {
        return Err("Expected no hit far from the boundary.".to_owned());
    }
    Ok(())
}

#[test]
fn throughput_buckets_share_wall_clock_seconds() -> Result<(), String> {
    let stats = StatsAggregator::new_at(Duration::from_secs(5), 1_000.0);
    stats.request_start();
    stats.request_end_at(1_000.2, 5.0, true);
    stats.request_start();
    stats.request_end_at(1_000.9, 6.0, true);
    stats.request_start();
    stats.request_end_at(1_001.1, 7.0, true);

    let summary = stats
        .summary_at(1_002.0)
        .ok_or_else(|| "Expected a summary after successes.".to_owned())?;
    if summary.max_rps != 2 {
        return Err(format!("Expected max_rps 2, got {}", summary.max_rps));
    }
    expect_close("avg_rps", summary.avg_rps, 1.5)?;
    expect_close("avg_ms", summary.avg_ms, 6.0)?;
    expect_close("min_ms", summary.min_ms, 5.0)?;
    expect_close("max_ms", summary.max_ms, 7.0)?;
    if summary.total_requests != 3 || summary.success_count != 3 {
        return Err(format!(
            "Expected 3 totals, got {} and {}",
            summary.total_requests, summary.success_count
        ));
    }
    Ok(())
}

#[test]
fn summary_reports_unfinished_requests() -> Result<(), String> {
    let stats = StatsAggregator::new_at(Duration::from_secs(5), 1_000.0);
    stats.request_start();
    stats.request_start();
    stats.request_end_at(1_000.3, 12.0, true);
    let summary = stats
        .summary_at(1_001.0)
        .ok_or_else(|| "Expected a summary.".to_owned())?;
    if summary.inflight_now != 1 {
        return Err(format!(
            "Expected one request in flight, got {}",
            summary.inflight_now
        ));
    }
    Ok(())
}

#[test]
fn summary_percentiles_match_direct_queries() -> Result<(), String> {
    let stats = aggregator_with_samples(&[10.0, 20.0, 30.0, 40.0]);
    let summary = stats
        .summary_at(1_001.0)
        .ok_or_else(|| "Expected a summary.".to_owned())?;
    expect_close("p50", summary.p50_ms, stats.percentile(50.0))?;
    expect_close("p90", summary.p90_ms, stats.percentile(90.0))?;
    expect_close("p95", summary.p95_ms, stats.percentile(95.0))?;
    expect_close("p99", summary.p99_ms, stats.percentile(99.0))
}
