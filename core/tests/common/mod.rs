//! Shared test fixtures: an in-memory engine and row builders.

#![allow(dead_code)]

use credit_impact_core::{
    engine::{Simulation, SimulationEngine},
    error::{ImpactError, ImpactResult},
    microdata::*,
    reform::{scenario_key, ReformScenario},
    types::{DatasetRef, Year},
};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

#[derive(Debug, Clone, Copy)]
pub struct Hh {
    pub id:         u64,
    pub weight:     f64,
    pub district:   f64,
    pub net_income: f64,
    pub gap:        f64,
    pub equiv:      f64,
    pub people:     f64,
}

pub fn hh(id: u64, district: f64, net_income: f64) -> Hh {
    Hh {
        id,
        weight: 1.0,
        district,
        net_income,
        gap: 0.0,
        equiv: net_income,
        people: 1.0,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Person {
    pub id:         u64,
    pub household:  u64,
    pub weight:     f64,
    pub in_poverty: bool,
    pub is_child:   bool,
}

pub fn person(id: u64, household: u64, in_poverty: bool, is_child: bool) -> Person {
    Person { id, household, weight: 1.0, in_poverty, is_child }
}

fn flag(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

pub fn household_frame(rows: &[Hh]) -> Frame {
    Frame::new()
        .with_column(HOUSEHOLD_ID, rows.iter().map(|h| h.id as f64).collect())
        .with_column(HOUSEHOLD_WEIGHT, rows.iter().map(|h| h.weight).collect())
        .with_column(CONGRESSIONAL_DISTRICT, rows.iter().map(|h| h.district).collect())
        .with_column(HOUSEHOLD_NET_INCOME, rows.iter().map(|h| h.net_income).collect())
        .with_column(POVERTY_GAP, rows.iter().map(|h| h.gap).collect())
        .with_column(EQUIV_NET_INCOME, rows.iter().map(|h| h.equiv).collect())
        .with_column(HOUSEHOLD_PEOPLE, rows.iter().map(|h| h.people).collect())
}

pub fn person_frame(rows: &[Person]) -> Frame {
    Frame::new()
        .with_column(PERSON_ID, rows.iter().map(|p| p.id as f64).collect())
        .with_column(PERSON_HOUSEHOLD_ID, rows.iter().map(|p| p.household as f64).collect())
        .with_column(PERSON_WEIGHT, rows.iter().map(|p| p.weight).collect())
        .with_column(IN_POVERTY, rows.iter().map(|p| flag(p.in_poverty)).collect())
        .with_column(IS_CHILD, rows.iter().map(|p| flag(p.is_child)).collect())
}

pub fn household_table(rows: &[Hh]) -> HouseholdTable {
    HouseholdTable::new(
        rows.iter()
            .map(|h| HouseholdRecord {
                household_id:     h.id,
                weight:           h.weight,
                district:         if h.district.is_finite() && h.district >= 1.0 {
                    Some(h.district as u32)
                } else {
                    None
                },
                net_income:       h.net_income,
                poverty_gap:      h.gap,
                equiv_net_income: h.equiv,
                person_count:     h.people,
            })
            .collect(),
    )
}

pub fn person_table(rows: &[Person]) -> PersonTable {
    PersonTable::new(
        rows.iter()
            .map(|p| PersonRecord {
                person_id:    p.id,
                household_id: p.household,
                weight:       p.weight,
                in_poverty:   p.in_poverty,
                is_child:     p.is_child,
            })
            .collect(),
    )
}

// ── Mock engine ────────────────────────────────────────────────

/// Engine serving fixed frames per (dataset, scenario key).
/// Tracks how many simulations are alive at once.
#[derive(Default)]
pub struct MockEngine {
    runs:      HashMap<(String, String), (Frame, Frame)>,
    failing:   HashSet<(String, String)>,
    chained:   HashMap<(String, String), (String, String)>,
    pub live:  Rc<Cell<usize>>,
    pub peak:  Rc<Cell<usize>>,
    pub calls: RefCell<Vec<(String, String)>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_run(
        mut self,
        dataset: &str,
        reform: Option<&ReformScenario>,
        households: &[Hh],
        persons: &[Person],
    ) -> Self {
        self.runs.insert(
            (dataset.to_string(), scenario_key(reform)),
            (household_frame(households), person_frame(persons)),
        );
        self
    }

    pub fn with_frames(
        mut self,
        dataset: &str,
        reform: Option<&ReformScenario>,
        household: Frame,
        person: Frame,
    ) -> Self {
        self.runs
            .insert((dataset.to_string(), scenario_key(reform)), (household, person));
        self
    }

    pub fn failing_on(mut self, dataset: &str, reform: Option<&ReformScenario>) -> Self {
        self.failing.insert((dataset.to_string(), scenario_key(reform)));
        self
    }

    /// Fail with an `anyhow` error carrying `context` over a root `cause`.
    pub fn failing_with_context(
        mut self,
        dataset: &str,
        reform: Option<&ReformScenario>,
        context: &str,
        cause: &str,
    ) -> Self {
        self.chained.insert(
            (dataset.to_string(), scenario_key(reform)),
            (context.to_string(), cause.to_string()),
        );
        self
    }
}

pub struct MockSimulation {
    household: Frame,
    person:    Frame,
    live:      Rc<Cell<usize>>,
}

impl Drop for MockSimulation {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

impl Simulation for MockSimulation {
    fn calculate_frame(
        &self,
        columns: &[&str],
        entity: EntityLevel,
        _year: Year,
    ) -> ImpactResult<Frame> {
        match entity {
            EntityLevel::Household => self.household.select(entity, columns),
            EntityLevel::Person    => self.person.select(entity, columns),
        }
    }
}

impl SimulationEngine for MockEngine {
    type Simulation = MockSimulation;

    fn simulate(
        &self,
        dataset: &DatasetRef,
        reform: Option<&ReformScenario>,
        _year: Year,
    ) -> ImpactResult<MockSimulation> {
        let key = (dataset.clone(), scenario_key(reform));
        self.calls.borrow_mut().push(key.clone());
        if self.failing.contains(&key) {
            return Err(ImpactError::Engine {
                dataset: dataset.clone(),
                message: "dataset unreadable".into(),
            });
        }
        if let Some((context, cause)) = self.chained.get(&key) {
            return Err(anyhow::anyhow!(cause.clone()).context(context.clone()).into());
        }
        let (household, person) = self.runs.get(&key).cloned().ok_or_else(|| {
            ImpactError::Engine {
                dataset: dataset.clone(),
                message: format!("no run for {}", key.1),
            }
        })?;
        self.live.set(self.live.get() + 1);
        self.peak.set(self.peak.get().max(self.live.get()));
        Ok(MockSimulation {
            household,
            person,
            live: self.live.clone(),
        })
    }
}

/// Register baseline and the three standard reforms for `state`.
///
/// Every district gets one household of weight 1 with one adult; the
/// household is poor when its net income is below 20,000.
pub fn standard_state(
    engine: MockEngine,
    dataset: &str,
    districts: &[u32],
    baseline_income: f64,
    reform_income: f64,
) -> MockEngine {
    let rows = |income: f64| -> (Vec<Hh>, Vec<Person>) {
        let households: Vec<Hh> = districts
            .iter()
            .enumerate()
            .map(|(i, d)| hh(i as u64 + 1, *d as f64, income))
            .collect();
        let persons: Vec<Person> = households
            .iter()
            .map(|h| person(h.id * 10, h.id, h.net_income < 20_000.0, false))
            .collect();
        (households, persons)
    };

    let (base_h, base_p) = rows(baseline_income);
    let (alt_h, alt_p) = rows(reform_income);
    let mut engine = engine.with_run(dataset, None, &base_h, &base_p);
    for scenario in ReformScenario::standard() {
        engine = engine.with_run(dataset, Some(&scenario), &alt_h, &alt_p);
    }
    engine
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Route `log` output through the test harness when RUST_LOG is set.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
