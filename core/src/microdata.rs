//! Engine frames and the minimal household/person tables extracted from them.

use crate::{
    error::{ImpactError, ImpactResult},
    types::DistrictGeoid,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityLevel {
    Household,
    Person,
}

impl EntityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityLevel::Household => "household",
            EntityLevel::Person    => "person",
        }
    }
}

// ── Column names requested from the engine ─────────────────────

pub const HOUSEHOLD_ID: &str = "household_id";
pub const HOUSEHOLD_WEIGHT: &str = "household_weight";
pub const CONGRESSIONAL_DISTRICT: &str = "congressional_district_geoid";
pub const HOUSEHOLD_NET_INCOME: &str = "household_net_income";
pub const POVERTY_GAP: &str = "poverty_gap";
pub const EQUIV_NET_INCOME: &str = "equiv_household_net_income";
pub const HOUSEHOLD_PEOPLE: &str = "household_count_people";

pub const HOUSEHOLD_COLUMNS: [&str; 7] = [
    HOUSEHOLD_ID,
    HOUSEHOLD_WEIGHT,
    CONGRESSIONAL_DISTRICT,
    HOUSEHOLD_NET_INCOME,
    POVERTY_GAP,
    EQUIV_NET_INCOME,
    HOUSEHOLD_PEOPLE,
];

pub const PERSON_ID: &str = "person_id";
pub const PERSON_HOUSEHOLD_ID: &str = "person_household_id";
pub const PERSON_WEIGHT: &str = "person_weight";
pub const IN_POVERTY: &str = "in_poverty";
pub const IS_CHILD: &str = "is_child";

pub const PERSON_COLUMNS: [&str; 5] = [
    PERSON_ID,
    PERSON_HOUSEHOLD_ID,
    PERSON_WEIGHT,
    IN_POVERTY,
    IS_CHILD,
];

/// Column-major numeric table returned by an engine.
/// Booleans are 0/1, identifiers integral, a missing value NaN.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frame {
    pub columns: BTreeMap<String, Vec<f64>>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: &str, values: Vec<f64>) -> Self {
        self.columns.insert(name.to_string(), values);
        self
    }

    pub fn column(&self, entity: EntityLevel, name: &str) -> ImpactResult<&[f64]> {
        self.columns
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| ImpactError::MissingColumn {
                entity: entity.as_str().to_string(),
                column: name.to_string(),
            })
    }

    /// Copy only the requested columns.
    pub fn select(&self, entity: EntityLevel, names: &[&str]) -> ImpactResult<Frame> {
        let mut out = Frame::new();
        for name in names {
            let values = self.column(entity, name)?.to_vec();
            out.columns.insert(name.to_string(), values);
        }
        Ok(out)
    }

    /// Row count, checking that every column agrees.
    pub fn row_count(&self) -> ImpactResult<usize> {
        let mut expected: Option<usize> = None;
        for (name, values) in &self.columns {
            match expected {
                None => expected = Some(values.len()),
                Some(n) if n != values.len() => {
                    return Err(ImpactError::ColumnLength {
                        column:   name.clone(),
                        expected: n,
                        actual:   values.len(),
                    });
                }
                Some(_) => {}
            }
        }
        Ok(expected.unwrap_or(0))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HouseholdRecord {
    pub household_id:      u64,
    pub weight:            f64,
    /// `None` when the engine reported no district (NaN or 0).
    pub district:          Option<DistrictGeoid>,
    pub net_income:        f64,
    pub poverty_gap:       f64,
    pub equiv_net_income:  f64,
    pub person_count:      f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonRecord {
    pub person_id:    u64,
    pub household_id: u64,
    pub weight:       f64,
    pub in_poverty:   bool,
    pub is_child:     bool,
}

#[derive(Debug, Clone, Default)]
pub struct HouseholdTable {
    pub rows: Vec<HouseholdRecord>,
}

impl HouseholdTable {
    pub fn new(rows: Vec<HouseholdRecord>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct district values in order of first appearance, including `None`.
    pub fn districts(&self) -> Vec<Option<DistrictGeoid>> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|h| h.district)
            .filter(|d| seen.insert(*d))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PersonTable {
    pub rows: Vec<PersonRecord>,
}

impl PersonTable {
    pub fn new(rows: Vec<PersonRecord>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A district value is valid when it is present and non-zero.
pub fn valid_district(district: Option<DistrictGeoid>) -> Option<DistrictGeoid> {
    district.filter(|d| *d != 0)
}
