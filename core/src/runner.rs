//! Simulation runner: one engine invocation per (dataset, reform).
//!
//! RULE: at most one simulation is alive at a time. The simulation is
//! dropped before `run_simulation` returns, whether extraction succeeded
//! or not. Engine errors are returned unmodified; nothing is retried.

use crate::{
    engine::{Simulation, SimulationEngine},
    error::ImpactResult,
    microdata::{
        EntityLevel, Frame, HouseholdRecord, HouseholdTable, PersonRecord, PersonTable,
        CONGRESSIONAL_DISTRICT, EQUIV_NET_INCOME, HOUSEHOLD_COLUMNS, HOUSEHOLD_ID,
        HOUSEHOLD_NET_INCOME, HOUSEHOLD_PEOPLE, HOUSEHOLD_WEIGHT, IN_POVERTY, IS_CHILD,
        PERSON_COLUMNS, PERSON_HOUSEHOLD_ID, PERSON_ID, PERSON_WEIGHT, POVERTY_GAP,
    },
    ratio::finite_or_zero,
    reform::ReformScenario,
    types::{DatasetRef, DistrictGeoid, Year},
};

/// The minimal tables kept from one simulation.
#[derive(Debug, Clone, Default)]
pub struct SimulationTables {
    pub households: HouseholdTable,
    pub persons:    PersonTable,
}

pub fn run_simulation<E: SimulationEngine>(
    engine: &E,
    dataset: &DatasetRef,
    reform: Option<&ReformScenario>,
    year: Year,
) -> ImpactResult<SimulationTables> {
    let sim = engine.simulate(dataset, reform, year)?;
    let households = extract_households(&sim, year);
    let persons = extract_persons(&sim, year);
    drop(sim);

    let tables = SimulationTables {
        households: households?,
        persons:    persons?,
    };
    log::debug!(
        "{dataset} [{}]: extracted {} households, {} persons",
        reform.map(|r| r.name.as_str()).unwrap_or("baseline"),
        tables.households.len(),
        tables.persons.len()
    );
    Ok(tables)
}

fn extract_households<S: Simulation>(sim: &S, year: Year) -> ImpactResult<HouseholdTable> {
    let entity = EntityLevel::Household;
    let frame = sim.calculate_frame(&HOUSEHOLD_COLUMNS, entity, year)?;
    let rows = frame.row_count()?;

    let ids = frame.column(entity, HOUSEHOLD_ID)?;
    let weights = frame.column(entity, HOUSEHOLD_WEIGHT)?;
    let districts = frame.column(entity, CONGRESSIONAL_DISTRICT)?;
    let net_incomes = frame.column(entity, HOUSEHOLD_NET_INCOME)?;
    let gaps = frame.column(entity, POVERTY_GAP)?;
    let equiv = frame.column(entity, EQUIV_NET_INCOME)?;
    let people = frame.column(entity, HOUSEHOLD_PEOPLE)?;

    let mut sanitizer = Sanitizer::default();
    let records = (0..rows)
        .map(|i| HouseholdRecord {
            household_id:     to_id(ids[i]),
            weight:           sanitizer.clean(weights[i]),
            district:         to_district(districts[i]),
            net_income:       sanitizer.clean(net_incomes[i]),
            poverty_gap:      sanitizer.clean(gaps[i]),
            equiv_net_income: sanitizer.clean(equiv[i]),
            person_count:     sanitizer.clean(people[i]),
        })
        .collect();
    sanitizer.report(entity);

    Ok(HouseholdTable::new(records))
}

fn extract_persons<S: Simulation>(sim: &S, year: Year) -> ImpactResult<PersonTable> {
    let entity = EntityLevel::Person;
    let frame: Frame = sim.calculate_frame(&PERSON_COLUMNS, entity, year)?;
    let rows = frame.row_count()?;

    let ids = frame.column(entity, PERSON_ID)?;
    let household_ids = frame.column(entity, PERSON_HOUSEHOLD_ID)?;
    let weights = frame.column(entity, PERSON_WEIGHT)?;
    let in_poverty = frame.column(entity, IN_POVERTY)?;
    let is_child = frame.column(entity, IS_CHILD)?;

    let mut sanitizer = Sanitizer::default();
    let records = (0..rows)
        .map(|i| PersonRecord {
            person_id:    to_id(ids[i]),
            household_id: to_id(household_ids[i]),
            weight:       sanitizer.clean(weights[i]),
            in_poverty:   to_flag(in_poverty[i]),
            is_child:     to_flag(is_child[i]),
        })
        .collect();
    sanitizer.report(entity);

    Ok(PersonTable::new(records))
}

/// Counts non-finite values replaced by zero during one extraction.
#[derive(Default)]
struct Sanitizer {
    replaced: usize,
}

impl Sanitizer {
    fn clean(&mut self, value: f64) -> f64 {
        let (value, replaced) = finite_or_zero(value);
        if replaced {
            self.replaced += 1;
        }
        value
    }

    fn report(&self, entity: EntityLevel) {
        if self.replaced > 0 {
            log::warn!(
                "{} non-finite {} values replaced with 0",
                self.replaced,
                entity.as_str()
            );
        }
    }
}

fn to_id(value: f64) -> u64 {
    if value.is_finite() && value >= 0.0 { value as u64 } else { 0 }
}

fn to_district(value: f64) -> Option<DistrictGeoid> {
    if value.is_finite() && value >= 1.0 {
        Some(value as DistrictGeoid)
    } else {
        None
    }
}

fn to_flag(value: f64) -> bool {
    value.is_finite() && value != 0.0
}
