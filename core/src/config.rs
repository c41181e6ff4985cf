use crate::{
    reform::ReformScenario,
    states::state_codes,
    types::{DatasetRef, Year},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_YEAR: Year = 2025;
pub const DEFAULT_DATASET_TEMPLATE: &str =
    "hf://policyengine/policyengine-us-data/states/{state}.h5";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub year: Year,
    /// States to process, in processing order.
    pub states: Vec<String>,
    /// Dataset reference with `{state}` standing for the state code.
    pub dataset_template: String,
    /// Reform scenarios run after the baseline, in output order.
    pub scenarios: Vec<ReformScenario>,
    pub output_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            year:             DEFAULT_YEAR,
            states:           state_codes(),
            dataset_template: DEFAULT_DATASET_TEMPLATE.to_string(),
            scenarios:        ReformScenario::standard(),
            output_dir:       PathBuf::from("data"),
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        if config.scenarios.is_empty() {
            anyhow::bail!("{path}: at least one reform scenario is required");
        }
        Ok(config)
    }

    /// Small config for tests: the given states, standard scenarios.
    pub fn default_test(states: &[&str]) -> Self {
        Self {
            states:           states.iter().map(|s| s.to_string()).collect(),
            dataset_template: "test://{state}".to_string(),
            output_dir:       std::env::temp_dir().join("credit-impact-test"),
            ..Self::default()
        }
    }

    pub fn dataset_for(&self, state: &str) -> DatasetRef {
        self.dataset_template.replace("{state}", state)
    }

    pub fn reform_types(&self) -> Vec<String> {
        self.scenarios.iter().map(|s| s.name.clone()).collect()
    }
}
