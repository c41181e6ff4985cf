//! The external microsimulation engine, seen from the pipeline.
//!
//! RULE: the pipeline never evaluates tax or benefit rules itself.
//! It asks an engine for a simulation of (dataset, reform, year) and
//! pulls numeric frames out of it. Dropping the simulation releases it.
//!
//! `ExportedEngine` replays engine output exported to disk:
//!   {root}/{dataset_stem}/{scenario_key}.json
//!   {root}/reference_household/{state}/{scenario_key}.json

use crate::{
    error::{ImpactError, ImpactResult},
    household::{HouseholdCalculator, ReferenceHousehold},
    microdata::{EntityLevel, Frame},
    reform::{scenario_key, ReformScenario},
    types::{DatasetRef, Year},
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One loaded simulation. Holds the engine's full in-memory state until dropped.
pub trait Simulation {
    /// Evaluate `columns` for `year`, mapped to `entity` granularity.
    fn calculate_frame(
        &self,
        columns: &[&str],
        entity: EntityLevel,
        year: Year,
    ) -> ImpactResult<Frame>;
}

/// Factory for simulations. A reform forces its variables to zero for the whole run.
pub trait SimulationEngine {
    type Simulation: Simulation;

    fn simulate(
        &self,
        dataset: &DatasetRef,
        reform: Option<&ReformScenario>,
        year: Year,
    ) -> ImpactResult<Self::Simulation>;
}

// ── Exported engine ────────────────────────────────────────────

pub struct ExportedEngine {
    root: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct ExportedSimulation {
    #[serde(skip)]
    dataset:   String,
    pub year:  Year,
    household: Frame,
    person:    Frame,
}

impl ExportedEngine {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn simulation_path(&self, dataset: &str, reform: Option<&ReformScenario>) -> PathBuf {
        self.root
            .join(dataset_stem(dataset))
            .join(format!("{}.json", scenario_key(reform)))
    }

    fn household_path(&self, state: &str, reform: Option<&ReformScenario>) -> PathBuf {
        self.root
            .join("reference_household")
            .join(state)
            .join(format!("{}.json", scenario_key(reform)))
    }
}

impl SimulationEngine for ExportedEngine {
    type Simulation = ExportedSimulation;

    fn simulate(
        &self,
        dataset: &DatasetRef,
        reform: Option<&ReformScenario>,
        year: Year,
    ) -> ImpactResult<ExportedSimulation> {
        let path = self.simulation_path(dataset, reform);
        let content = std::fs::read_to_string(&path).map_err(|e| ImpactError::Engine {
            dataset: dataset.clone(),
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        let mut sim: ExportedSimulation = serde_json::from_str(&content)?;
        if sim.year != year {
            return Err(ImpactError::Engine {
                dataset: dataset.clone(),
                message: format!("export covers {}, requested {year}", sim.year),
            });
        }
        sim.dataset = dataset.clone();
        Ok(sim)
    }
}

impl Simulation for ExportedSimulation {
    fn calculate_frame(
        &self,
        columns: &[&str],
        entity: EntityLevel,
        year: Year,
    ) -> ImpactResult<Frame> {
        if year != self.year {
            return Err(ImpactError::Engine {
                dataset: self.dataset.clone(),
                message: format!("period {year} not simulated"),
            });
        }
        let source = match entity {
            EntityLevel::Household => &self.household,
            EntityLevel::Person    => &self.person,
        };
        source.select(entity, columns)
    }
}

impl HouseholdCalculator for ExportedEngine {
    fn calculate(
        &self,
        _household: &ReferenceHousehold,
        state: &str,
        reform: Option<&ReformScenario>,
        variable: &str,
        _year: Year,
    ) -> ImpactResult<f64> {
        let path = self.household_path(state, reform);
        let content = std::fs::read_to_string(&path).map_err(|e| ImpactError::Engine {
            dataset: state.to_string(),
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        let values: HashMap<String, f64> = serde_json::from_str(&content)?;
        // Programs a state does not have are absent from the export.
        Ok(values.get(variable).copied().unwrap_or(0.0))
    }
}

/// Final path segment of a dataset reference, without extension.
pub fn dataset_stem(dataset: &str) -> &str {
    let name = dataset.rsplit('/').next().unwrap_or(dataset);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(i) => &name[..i],
    }
}
