//! Pipeline event log.
//!
//! RULE: every state transition the orchestrator makes is recorded here.
//! Variants are added over time and never removed or reordered.

use crate::types::{RunId, StateCode, Year};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    RunStarted {
        run_id: RunId,
        year:   Year,
        states: usize,
    },
    StateStarted {
        state: StateCode,
    },
    ScenarioExtracted {
        state:      StateCode,
        /// `None` for the baseline run.
        scenario:   Option<String>,
        households: usize,
        persons:    usize,
    },
    StateCompleted {
        state:     StateCode,
        districts: usize,
        records:   usize,
    },
    StateFailed {
        state: StateCode,
        stage: String,
        error: String,
    },
    RunCompleted {
        completed: usize,
        failed:    usize,
    },
}

impl PipelineEvent {
    /// Stable name stored in the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            PipelineEvent::RunStarted { .. }        => "run_started",
            PipelineEvent::StateStarted { .. }      => "state_started",
            PipelineEvent::ScenarioExtracted { .. } => "scenario_extracted",
            PipelineEvent::StateCompleted { .. }    => "state_completed",
            PipelineEvent::StateFailed { .. }       => "state_failed",
            PipelineEvent::RunCompleted { .. }      => "run_completed",
        }
    }

    pub fn state(&self) -> Option<&str> {
        match self {
            PipelineEvent::StateStarted { state }
            | PipelineEvent::ScenarioExtracted { state, .. }
            | PipelineEvent::StateCompleted { state, .. }
            | PipelineEvent::StateFailed { state, .. } => Some(state.as_str()),
            _ => None,
        }
    }
}

/// A persisted event row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:         Option<i64>,
    pub run_id:     RunId,
    pub seq:        u64,
    pub state:      Option<StateCode>,
    pub event_type: String,
    pub payload:    String,
}
