//! Reference household impact: one fixed family evaluated in every state,
//! with and without all named state credit programs.

use crate::{
    error::ImpactResult,
    reform::{ReformScenario, STATE_CTC_PROGRAMS, STATE_EITC_PROGRAMS},
    types::{StateCode, Year},
};
use serde::{Deserialize, Serialize};

pub const NET_INCOME_VAR: &str = "household_net_income";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceHousehold {
    pub year:       Year,
    pub adult_age:  u32,
    pub wages:      f64,
    pub child_ages: Vec<u32>,
}

impl Default for ReferenceHousehold {
    /// A single parent aged 40 earning $20,000, with children aged 10 and 5.
    fn default() -> Self {
        Self {
            year:       2024,
            adult_age:  40,
            wages:      20_000.0,
            child_ages: vec![10, 5],
        }
    }
}

/// Evaluates single variables for a described household.
pub trait HouseholdCalculator {
    fn calculate(
        &self,
        household: &ReferenceHousehold,
        state: &str,
        reform: Option<&ReformScenario>,
        variable: &str,
        year: Year,
    ) -> ImpactResult<f64>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdImpact {
    pub state:             StateCode,
    pub net_income_change: f64,
    pub ctc_total:         f64,
    pub eitc_total:        f64,
}

pub fn household_impact<C: HouseholdCalculator>(
    calc: &C,
    household: &ReferenceHousehold,
    state: &str,
) -> ImpactResult<HouseholdImpact> {
    let reform = ReformScenario::all_state_credit_programs();
    let year = household.year;
    let delta = |variable: &str| -> ImpactResult<f64> {
        let base = calc.calculate(household, state, None, variable, year)?;
        let alt = calc.calculate(household, state, Some(&reform), variable, year)?;
        Ok(base - alt)
    };

    let net_income_change = delta(NET_INCOME_VAR)?;
    let mut ctc_total = 0.0;
    for program in STATE_CTC_PROGRAMS {
        ctc_total += delta(program)?;
    }
    let mut eitc_total = 0.0;
    for program in STATE_EITC_PROGRAMS {
        eitc_total += delta(program)?;
    }

    Ok(HouseholdImpact {
        state: state.to_string(),
        net_income_change,
        ctc_total,
        eitc_total,
    })
}

/// Impact in each state. States whose calculation fails are logged and left out.
pub fn household_impacts<C: HouseholdCalculator>(
    calc: &C,
    household: &ReferenceHousehold,
    states: &[String],
) -> Vec<HouseholdImpact> {
    states
        .iter()
        .filter_map(|state| match household_impact(calc, household, state) {
            Ok(impact) => Some(impact),
            Err(e) => {
                log::error!("Reference household failed for {state}: {e}");
                None
            }
        })
        .collect()
}
