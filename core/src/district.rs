//! District metric calculator.
//!
//! Reduces one simulation's household and person tables to one
//! `DistrictMetrics` per valid congressional district.

use crate::{
    gini::weighted_gini,
    microdata::{valid_district, HouseholdTable, PersonTable},
    ratio::weighted_share,
    types::DistrictGeoid,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistrictMetrics {
    /// Σ household net income × household weight.
    pub net_income:    f64,
    /// Weighted share of persons in poverty.
    pub poverty:       f64,
    /// Weighted share of children in poverty.
    pub child_poverty: f64,
    /// Σ poverty gap × household weight.
    pub poverty_gap:   f64,
    pub gini_index:    f64,
}

/// Metrics keyed by district geoid.
pub type DistrictMetricsMap = BTreeMap<DistrictGeoid, DistrictMetrics>;

#[derive(Default)]
struct DistrictAccumulator {
    net_income:        f64,
    poverty_gap:       f64,
    equiv_incomes:     Vec<f64>,
    gini_weights:      Vec<f64>,
    person_weight:     f64,
    poor_weight:       f64,
    child_weight:      f64,
    poor_child_weight: f64,
}

/// Compute metrics for each of `districts` observed in `households`.
///
/// Null and zero districts are skipped, as are districts with no household rows.
pub fn compute_district_metrics(
    households: &HouseholdTable,
    persons: &PersonTable,
    districts: &[Option<DistrictGeoid>],
) -> DistrictMetricsMap {
    let wanted: HashSet<DistrictGeoid> =
        districts.iter().filter_map(|d| valid_district(*d)).collect();

    let mut acc: BTreeMap<DistrictGeoid, DistrictAccumulator> = BTreeMap::new();
    let mut household_district: HashMap<u64, DistrictGeoid> = HashMap::new();

    for h in &households.rows {
        let Some(district) = valid_district(h.district).filter(|d| wanted.contains(d)) else {
            continue;
        };
        household_district.insert(h.household_id, district);

        let a = acc.entry(district).or_default();
        a.net_income += h.net_income * h.weight;
        a.poverty_gap += h.poverty_gap * h.weight;
        a.equiv_incomes.push(h.equiv_net_income);
        a.gini_weights.push(h.weight * h.person_count);
    }

    for p in &persons.rows {
        let Some(district) = household_district.get(&p.household_id) else {
            continue;
        };
        let Some(a) = acc.get_mut(district) else {
            continue;
        };
        let poor = if p.in_poverty { p.weight } else { 0.0 };
        a.person_weight += p.weight;
        a.poor_weight += poor;
        if p.is_child {
            a.child_weight += p.weight;
            a.poor_child_weight += poor;
        }
    }

    acc.into_iter()
        .map(|(district, a)| {
            let metrics = DistrictMetrics {
                net_income:    a.net_income,
                poverty:       weighted_share(a.poor_weight, a.person_weight),
                child_poverty: weighted_share(a.poor_child_weight, a.child_weight),
                poverty_gap:   a.poverty_gap,
                gini_index:    weighted_gini(&a.equiv_incomes, &a.gini_weights),
            };
            (district, metrics)
        })
        .collect()
}
