//! CSV artifacts written at the end of a run.

use crate::{error::ImpactResult, pipeline::PipelineOutcome};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const DISTRICT_FILE: &str = "district_impacts.csv";
pub const STATE_FILE: &str = "state_impacts.csv";
pub const HOUSEHOLD_FILE: &str = "household_impacts.csv";

/// Write `rows` with a header taken from the row type's field names.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> ImpactResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut out = csv::Writer::from_path(path)?;
    for row in rows {
        out.serialize(row)?;
    }
    out.flush()?;
    Ok(())
}

/// Write both output tables into `dir`. Returns the two paths written.
pub fn write_outcome(dir: &Path, outcome: &PipelineOutcome) -> ImpactResult<(PathBuf, PathBuf)> {
    let district_path = dir.join(DISTRICT_FILE);
    let state_path = dir.join(STATE_FILE);
    write_csv(&district_path, &outcome.district_impacts)?;
    log::info!("Saved district data: {} rows", outcome.district_impacts.len());
    write_csv(&state_path, &outcome.state_summaries)?;
    log::info!("Saved state data: {} rows", outcome.state_summaries.len());
    Ok((district_path, state_path))
}
