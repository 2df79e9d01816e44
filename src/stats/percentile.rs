/// Linear-interpolated percentile over an ascending-sorted slice.
///
/// Uses fractional-rank interpolation (the "type 7" scheme shared by most
/// statistics packages): rank `k = (n - 1) * p / 100`, blending the two
/// nearest samples by the fractional part of `k`. Returns `0.0` for an
/// empty slice.
pub(super) fn interpolate(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    let last = n.saturating_sub(1);
    let clamped = p.clamp(0.0, 100.0);
    let k = (last as f64) * (clamped / 100.0);
    let floor_rank = k.floor();
    let lower_idx = floor_rank as usize;
    let upper_idx = lower_idx.saturating_add(1).min(last);
    let lower = sorted.get(lower_idx).copied().unwrap_or(0.0);
    if lower_idx == upper_idx {
        return lower;
    }
    let upper = sorted.get(upper_idx).copied().unwrap_or(0.0);
    lower * (upper_idx as f64 - k) + upper * (k - floor_rank)
}
