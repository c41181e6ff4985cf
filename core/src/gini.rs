//! Weighted Gini coefficient from the Lorenz curve.
//!
//! The curve runs from (0, 0) through the cumulative (population share, income share)
//! points of the ascending-sorted entries and is integrated with the trapezoidal rule.

/// Gini index of `values` weighted by `weights`, clamped to [0, 1].
///
/// Returns 0.0 for an empty input, a non-positive total weight, a zero total income,
/// or a population whose values are all equal. A negative total income is integrated
/// like any other and the result clamped.
pub fn weighted_gini(values: &[f64], weights: &[f64]) -> f64 {
    debug_assert_eq!(values.len(), weights.len(), "values and weights must be parallel");
    let n = values.len().min(weights.len());
    if n == 0 {
        return 0.0;
    }

    let total_weight: f64 = weights[..n].iter().sum();
    if total_weight <= 0.0 {
        return 0.0;
    }

    // Stable sort: ties keep input order, which does not change any partial sum.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    if values[order[0]] == values[order[n - 1]] {
        return 0.0;
    }

    let total_income: f64 = order.iter().map(|&i| values[i] * weights[i]).sum();
    if total_income == 0.0 {
        return 0.0;
    }

    let mut cum_weight = 0.0;
    let mut cum_income = 0.0;
    let mut prev_x = 0.0;
    let mut prev_y = 0.0;
    let mut area = 0.0;
    for &i in &order {
        cum_weight += weights[i];
        cum_income += values[i] * weights[i];
        let x = cum_weight / total_weight;
        let y = cum_income / total_income;
        area += (x - prev_x) * (y + prev_y) / 2.0;
        prev_x = x;
        prev_y = y;
    }

    (1.0 - 2.0 * area).clamp(0.0, 1.0)
}
