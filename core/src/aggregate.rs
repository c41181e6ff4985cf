//! State aggregator: rolls district impacts up to (state, reform).
//!
//! Cost is summed; each percent-cut is the unweighted mean across districts.

use crate::{impact::ImpactRecord, types::StateCode};
use serde::{Deserialize, Serialize};

/// One row of the state-level output. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSummary {
    pub state:                 StateCode,
    pub reform_type:           String,
    pub cost:                  f64,
    pub poverty_pct_cut:       f64,
    pub child_poverty_pct_cut: f64,
    pub poverty_gap_pct_cut:   f64,
    pub gini_index_pct_cut:    f64,
}

/// Aggregate `records` per state and reform.
///
/// States come out in order of first appearance in `records`; reforms in
/// `reform_order`. Pairs with no contributing district are omitted.
pub fn aggregate_states(records: &[ImpactRecord], reform_order: &[String]) -> Vec<StateSummary> {
    let mut states: Vec<&str> = Vec::new();
    for r in records {
        if !states.contains(&r.state.as_str()) {
            states.push(&r.state);
        }
    }

    let mut summaries = Vec::new();
    for state in states {
        for reform_type in reform_order {
            let rows: Vec<&ImpactRecord> = records
                .iter()
                .filter(|r| r.state == state && &r.reform_type == reform_type)
                .collect();
            if rows.is_empty() {
                continue;
            }
            summaries.push(StateSummary {
                state:                 state.to_string(),
                reform_type:           reform_type.clone(),
                cost:                  rows.iter().map(|r| r.cost).sum(),
                poverty_pct_cut:       mean(&rows, |r| r.poverty_pct_cut),
                child_poverty_pct_cut: mean(&rows, |r| r.child_poverty_pct_cut),
                poverty_gap_pct_cut:   mean(&rows, |r| r.poverty_gap_pct_cut),
                gini_index_pct_cut:    mean(&rows, |r| r.gini_index_pct_cut),
            });
        }
    }
    summaries
}

fn mean(rows: &[&ImpactRecord], field: impl Fn(&ImpactRecord) -> f64) -> f64 {
    rows.iter().map(|&r| field(r)).sum::<f64>() / rows.len() as f64
}
