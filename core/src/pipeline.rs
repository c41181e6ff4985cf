//! Pipeline orchestrator: every state, every scenario, strictly in sequence.
//!
//! Per state:
//!   PENDING → BASELINE_RUN → REFORM_RUN ×N → METRICS_COMPUTED → DONE
//! Any error moves the state to FAILED. A failed state contributes no
//! rows and the run moves on to the next state.
//!
//! RULES:
//!   - One state is finished before the next starts.
//!   - One simulation is alive at a time (see runner.rs).
//!   - Only the accumulator owned by `run()` outlives a state, and it is
//!     only appended to once a state reaches DONE.

use crate::{
    aggregate::{aggregate_states, StateSummary},
    config::PipelineConfig,
    district::compute_district_metrics,
    engine::SimulationEngine,
    error::ImpactResult,
    event::PipelineEvent,
    impact::{compute_impacts, sort_impacts, ImpactRecord, ReformMetrics},
    runner::{run_simulation, SimulationTables},
    states::state_fips,
    types::{RunId, StateCode},
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateStage {
    Pending,
    BaselineRun,
    /// Index into the configured scenarios.
    ReformRun(usize),
    MetricsComputed,
    Done,
    Failed,
}

impl fmt::Display for StateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateStage::Pending         => write!(f, "PENDING"),
            StateStage::BaselineRun     => write!(f, "BASELINE_RUN"),
            StateStage::ReformRun(i)    => write!(f, "REFORM_RUN[{i}]"),
            StateStage::MetricsComputed => write!(f, "METRICS_COMPUTED"),
            StateStage::Done            => write!(f, "DONE"),
            StateStage::Failed          => write!(f, "FAILED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateFailure {
    pub state: StateCode,
    /// Last stage entered before the error.
    pub stage: StateStage,
    pub error: String,
}

/// Rows accumulated across states. Appended to, never rewritten.
#[derive(Debug, Default)]
pub struct ImpactAccumulator {
    pub records:   Vec<ImpactRecord>,
    pub completed: Vec<StateCode>,
    pub failed:    Vec<StateFailure>,
    pub events:    Vec<PipelineEvent>,
}

impl ImpactAccumulator {
    fn commit(&mut self, state: &str, districts: usize, records: Vec<ImpactRecord>) {
        self.events.push(PipelineEvent::StateCompleted {
            state:   state.to_string(),
            districts,
            records: records.len(),
        });
        self.completed.push(state.to_string());
        self.records.extend(records);
    }

    fn fail(&mut self, failure: StateFailure) {
        self.events.push(PipelineEvent::StateFailed {
            state: failure.state.clone(),
            stage: failure.stage.to_string(),
            error: failure.error.clone(),
        });
        self.failed.push(failure);
    }
}

/// The two output tables plus what happened while producing them.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub run_id:           RunId,
    /// Sorted by (state FIPS, district, reform type).
    pub district_impacts: Vec<ImpactRecord>,
    pub state_summaries:  Vec<StateSummary>,
    pub completed:        Vec<StateCode>,
    pub failed:           Vec<StateFailure>,
    pub events:           Vec<PipelineEvent>,
}

/// Successful output of one state.
struct StateImpacts {
    districts: usize,
    records:   Vec<ImpactRecord>,
}

pub struct ImpactPipeline<'a, E: SimulationEngine> {
    engine: &'a E,
    config: &'a PipelineConfig,
    run_id: RunId,
}

impl<'a, E: SimulationEngine> ImpactPipeline<'a, E> {
    pub fn new(engine: &'a E, config: &'a PipelineConfig) -> Self {
        Self {
            engine,
            config,
            run_id: format!("run-{}", uuid::Uuid::new_v4()),
        }
    }

    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = run_id;
        self
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Process every configured state and build both output tables.
    pub fn run(&self) -> PipelineOutcome {
        let states = &self.config.states;
        let mut acc = ImpactAccumulator::default();
        acc.events.push(PipelineEvent::RunStarted {
            run_id: self.run_id.clone(),
            year:   self.config.year,
            states: states.len(),
        });
        log::info!(
            "Run {}: {} states × {} scenarios for {}",
            self.run_id,
            states.len(),
            self.config.scenarios.len(),
            self.config.year
        );

        for (i, state) in states.iter().enumerate() {
            log::info!("[{}/{}] {state}", i + 1, states.len());
            self.run_state(state, &mut acc);
        }

        let mut district_impacts = acc.records;
        sort_impacts(&mut district_impacts);
        let state_summaries = aggregate_states(&district_impacts, &self.config.reform_types());

        acc.events.push(PipelineEvent::RunCompleted {
            completed: acc.completed.len(),
            failed:    acc.failed.len(),
        });
        log::info!(
            "Run {} complete: {} states ok, {} failed, {} district rows, {} state rows",
            self.run_id,
            acc.completed.len(),
            acc.failed.len(),
            district_impacts.len(),
            state_summaries.len()
        );

        PipelineOutcome {
            run_id: self.run_id.clone(),
            district_impacts,
            state_summaries,
            completed: acc.completed,
            failed: acc.failed,
            events: acc.events,
        }
    }

    /// Drive one state to DONE or FAILED, recording the result in `acc`.
    pub fn run_state(&self, state: &str, acc: &mut ImpactAccumulator) -> StateStage {
        acc.events.push(PipelineEvent::StateStarted { state: state.to_string() });
        let mut stage = StateStage::Pending;

        match self.process_state(state, &mut stage, &mut acc.events) {
            Ok(out) => {
                log::info!("  {state}: {} district-reform combinations", out.records.len());
                acc.commit(state, out.districts, out.records);
                StateStage::Done
            }
            Err(err) => {
                let error = format!("{err:#}");
                log::error!("  {state}: failed during {stage}: {error}");
                acc.fail(StateFailure {
                    state: state.to_string(),
                    stage,
                    error,
                });
                StateStage::Failed
            }
        }
    }

    fn process_state(
        &self,
        state: &str,
        stage: &mut StateStage,
        events: &mut Vec<PipelineEvent>,
    ) -> ImpactResult<StateImpacts> {
        let fips = state_fips(state)?;
        let dataset = self.config.dataset_for(state);
        let year = self.config.year;

        *stage = StateStage::BaselineRun;
        log::info!("  {state}: running baseline");
        let baseline = run_simulation(self.engine, &dataset, None, year)?;
        record_extraction(events, state, None, &baseline);
        let districts = baseline.households.districts();
        let baseline_metrics =
            compute_district_metrics(&baseline.households, &baseline.persons, &districts);
        drop(baseline);

        let mut reforms = Vec::with_capacity(self.config.scenarios.len());
        for (i, scenario) in self.config.scenarios.iter().enumerate() {
            *stage = StateStage::ReformRun(i);
            log::info!("  {state}: running {} neutralized", scenario.name);
            let tables = run_simulation(self.engine, &dataset, Some(scenario), year)?;
            record_extraction(events, state, Some(&scenario.name), &tables);
            reforms.push(ReformMetrics {
                reform_type: scenario.name.clone(),
                metrics:     compute_district_metrics(
                    &tables.households,
                    &tables.persons,
                    &districts,
                ),
            });
        }

        *stage = StateStage::MetricsComputed;
        let records = compute_impacts(state, fips, &baseline_metrics, &reforms);

        *stage = StateStage::Done;
        Ok(StateImpacts {
            districts: baseline_metrics.len(),
            records,
        })
    }
}

fn record_extraction(
    events: &mut Vec<PipelineEvent>,
    state: &str,
    scenario: Option<&str>,
    tables: &SimulationTables,
) {
    events.push(PipelineEvent::ScenarioExtracted {
        state:      state.to_string(),
        scenario:   scenario.map(str::to_string),
        households: tables.households.len(),
        persons:    tables.persons.len(),
    });
}
