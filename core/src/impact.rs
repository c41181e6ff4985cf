//! Impact calculator: differences baseline against each reform per district.

use crate::{
    district::DistrictMetricsMap,
    ratio::percent_cut,
    types::{DistrictGeoid, StateCode, StateFips},
};
use serde::{Deserialize, Serialize};

/// One row of the district-level output. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactRecord {
    pub congressional_district_geoid: DistrictGeoid,
    pub state_fips:                   StateFips,
    pub state:                        StateCode,
    pub reform_type:                  String,
    /// Baseline minus reform net income. Positive means the credit costs money.
    pub cost:                         f64,
    pub poverty_pct_cut:              f64,
    pub child_poverty_pct_cut:        f64,
    pub poverty_gap_pct_cut:          f64,
    pub gini_index_pct_cut:           f64,
}

/// Metrics of one reform run, tagged with the scenario name.
#[derive(Debug, Clone)]
pub struct ReformMetrics {
    pub reform_type: String,
    pub metrics:     DistrictMetricsMap,
}

/// Emit one record per (baseline district, reform) pair where the reform
/// also produced that district. Missing districts are skipped silently.
///
/// Records come out district-major, reforms in the order given.
pub fn compute_impacts(
    state: &str,
    state_fips: StateFips,
    baseline: &DistrictMetricsMap,
    reforms: &[ReformMetrics],
) -> Vec<ImpactRecord> {
    let mut records = Vec::new();
    for (district, base) in baseline {
        for reform in reforms {
            let Some(alt) = reform.metrics.get(district) else {
                continue;
            };
            records.push(ImpactRecord {
                congressional_district_geoid: *district,
                state_fips,
                state:                 state.to_string(),
                reform_type:           reform.reform_type.clone(),
                cost:                  base.net_income - alt.net_income,
                poverty_pct_cut:       percent_cut(base.poverty, alt.poverty),
                child_poverty_pct_cut: percent_cut(base.child_poverty, alt.child_poverty),
                poverty_gap_pct_cut:   percent_cut(base.poverty_gap, alt.poverty_gap),
                gini_index_pct_cut:    percent_cut(base.gini_index, alt.gini_index),
            });
        }
    }
    records
}

/// Sort by (state FIPS, district, reform type as a string).
pub fn sort_impacts(records: &mut [ImpactRecord]) {
    records.sort_by(|a, b| {
        a.state_fips
            .cmp(&b.state_fips)
            .then(a.congressional_district_geoid.cmp(&b.congressional_district_geoid))
            .then_with(|| a.reform_type.cmp(&b.reform_type))
    });
}
