//! Reform scenarios: named sets of engine variables forced to zero.
//!
//! RULE: a scenario is plain data. Engines interpret it through
//! `ReformScenario::key()`; nothing builds types at runtime.

use serde::{Deserialize, Serialize};

/// Aggregate of every state child tax credit in the engine.
pub const STATE_CTC_VAR: &str = "state_ctc";
/// Aggregate of every state earned income tax credit in the engine.
pub const STATE_EITC_VAR: &str = "state_eitc";

pub const CTCS: &str = "CTCs";
pub const EITCS: &str = "EITCs";
pub const CTCS_AND_EITCS: &str = "CTCs and EITCs";

/// Dispatch key for a run with no reform applied.
pub const BASELINE_KEY: &str = "baseline";

/// Individual state child tax credit programs.
pub const STATE_CTC_PROGRAMS: [&str; 13] = [
    "ca_yctc",
    "co_ctc",
    "co_family_affordability_credit",
    "id_ctc",
    "md_ctc",
    "mn_child_and_working_families_credits",
    "mt_ctc",
    "nc_ctc",
    "nj_ctc",
    "nm_ctc",
    "ny_ctc",
    "or_ctc",
    "vt_ctc",
];

/// Individual state earned income tax credit programs.
pub const STATE_EITC_PROGRAMS: [&str; 31] = [
    "ca_eitc",
    "co_eitc",
    "ct_eitc",
    "dc_eitc",
    "de_eitc",
    "hi_eitc",
    "ia_eitc",
    "il_eitc",
    "in_eitc",
    "ks_total_eitc",
    "la_eitc",
    "ma_eitc",
    "md_eitc",
    "me_eitc",
    "mi_eitc",
    "mo_wftc",
    "mt_eitc",
    "ne_eitc",
    "nj_eitc",
    "nm_eitc",
    "ny_eitc",
    "oh_eitc",
    "ok_eitc",
    "or_eitc",
    "ri_eitc",
    "sc_eitc",
    "ut_eitc",
    "va_eitc",
    "vt_eitc",
    "wa_working_families_tax_credit",
    "wi_earned_income_credit",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReformScenario {
    pub name:        String,
    pub neutralized: Vec<String>,
}

impl ReformScenario {
    pub fn new(name: &str, neutralized: &[&str]) -> Self {
        Self {
            name:        name.to_string(),
            neutralized: neutralized.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// The three scenarios of a standard run, in output order.
    pub fn standard() -> Vec<Self> {
        vec![
            Self::new(CTCS, &[STATE_CTC_VAR]),
            Self::new(EITCS, &[STATE_EITC_VAR]),
            Self::new(CTCS_AND_EITCS, &[STATE_CTC_VAR, STATE_EITC_VAR]),
        ]
    }

    /// Every named state credit program neutralized at once.
    pub fn all_state_credit_programs() -> Self {
        let programs: Vec<&str> = STATE_CTC_PROGRAMS
            .iter()
            .chain(STATE_EITC_PROGRAMS.iter())
            .copied()
            .collect();
        Self::new(CTCS_AND_EITCS, &programs)
    }

    pub fn neutralizes(&self, variable: &str) -> bool {
        self.neutralized.iter().any(|v| v == variable)
    }

    /// Stable dispatch key: sorted, de-duplicated variables joined with `+`.
    pub fn key(&self) -> String {
        let mut vars: Vec<&str> = self.neutralized.iter().map(String::as_str).collect();
        vars.sort_unstable();
        vars.dedup();
        vars.join("+")
    }
}

/// Dispatch key for an optional scenario.
pub fn scenario_key(reform: Option<&ReformScenario>) -> String {
    match reform {
        Some(r) if !r.neutralized.is_empty() => r.key(),
        _ => BASELINE_KEY.to_string(),
    }
}
