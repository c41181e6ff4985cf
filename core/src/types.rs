//! Shared primitive types used across the entire pipeline.

/// Simulation period. One period = one tax year.
pub type Year = u32;

/// Two-letter postal code of a state (or DC).
pub type StateCode = String;

/// Numeric FIPS code of a state.
pub type StateFips = u32;

/// Congressional district geographic identifier (state FIPS × 100 + district number).
pub type DistrictGeoid = u32;

/// The canonical run identifier.
pub type RunId = String;

/// Opaque per-state dataset handle. Only the engine interprets it.
pub type DatasetRef = String;
