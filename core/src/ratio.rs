//! Ratio and delta helpers that guard degenerate denominators.
//!
//! RULE: none of these ever return NaN or ±∞.

/// Relative change of `baseline` against `reform`: `(baseline - reform) / reform`.
/// Returns 0.0 when `reform` is zero or not a finite number.
pub fn safe_percent_change(baseline: f64, reform: f64) -> f64 {
    if reform == 0.0 || !reform.is_finite() {
        return 0.0;
    }
    let change = (baseline - reform) / reform;
    if change.is_finite() { change } else { 0.0 }
}

/// Percent cut attributable to keeping the credit.
/// Positive means the metric is lower with the credit than without it.
pub fn percent_cut(baseline: f64, reform: f64) -> f64 {
    // Negating 0.0 gives -0.0, which would leak into output files.
    let change = safe_percent_change(baseline, reform);
    if change == 0.0 { 0.0 } else { -change }
}

/// `numerator / denominator`, or 0.0 when the denominator is not positive.
pub fn weighted_share(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 { numerator / denominator } else { 0.0 }
}

/// Replace a non-finite value with 0.0. Returns whether a replacement happened.
pub fn finite_or_zero(value: f64) -> (f64, bool) {
    if value.is_finite() { (value, false) } else { (0.0, true) }
}
