//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The pipeline produces a `PipelineOutcome`; this module writes it.

use crate::{
    aggregate::StateSummary,
    error::ImpactResult,
    event::EventLogEntry,
    impact::ImpactRecord,
    pipeline::PipelineOutcome,
    types::Year,
};
use rusqlite::{params, Connection, OpenFlags};

pub struct ImpactStore {
    conn: Connection,
}

impl ImpactStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &str) -> ImpactResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI,
        )?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> ImpactResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> ImpactResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_impacts.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, run_id: &str, year: Year, version: &str) -> ImpactResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, year, version, started_at) VALUES (?1, ?2, ?3, ?4)",
            params![run_id, year, version, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    // ── Outcome ────────────────────────────────────────────────

    /// Write events and both output tables for one run, atomically.
    pub fn save_outcome(&mut self, outcome: &PipelineOutcome) -> ImpactResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO event_log (run_id, seq, state, event_type, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (seq, event) in outcome.events.iter().enumerate() {
                stmt.execute(params![
                    outcome.run_id,
                    seq as i64,
                    event.state(),
                    event.type_name(),
                    serde_json::to_string(event)?,
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO district_impact (
                    run_id, row_order, congressional_district_geoid, state_fips, state,
                    reform_type, cost, poverty_pct_cut, child_poverty_pct_cut,
                    poverty_gap_pct_cut, gini_index_pct_cut)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for (i, r) in outcome.district_impacts.iter().enumerate() {
                stmt.execute(params![
                    outcome.run_id,
                    i as i64,
                    r.congressional_district_geoid,
                    r.state_fips,
                    r.state,
                    r.reform_type,
                    r.cost,
                    r.poverty_pct_cut,
                    r.child_poverty_pct_cut,
                    r.poverty_gap_pct_cut,
                    r.gini_index_pct_cut,
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO state_impact (
                    run_id, row_order, state, reform_type, cost, poverty_pct_cut,
                    child_poverty_pct_cut, poverty_gap_pct_cut, gini_index_pct_cut)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for (i, s) in outcome.state_summaries.iter().enumerate() {
                stmt.execute(params![
                    outcome.run_id,
                    i as i64,
                    s.state,
                    s.reform_type,
                    s.cost,
                    s.poverty_pct_cut,
                    s.child_poverty_pct_cut,
                    s.poverty_gap_pct_cut,
                    s.gini_index_pct_cut,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn district_impacts(&self, run_id: &str) -> ImpactResult<Vec<ImpactRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT congressional_district_geoid, state_fips, state, reform_type, cost,
                    poverty_pct_cut, child_poverty_pct_cut, poverty_gap_pct_cut,
                    gini_index_pct_cut
             FROM district_impact WHERE run_id = ?1
             ORDER BY row_order ASC",
        )?;
        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok(ImpactRecord {
                    congressional_district_geoid: row.get(0)?,
                    state_fips:                   row.get(1)?,
                    state:                        row.get(2)?,
                    reform_type:                  row.get(3)?,
                    cost:                         row.get(4)?,
                    poverty_pct_cut:              row.get(5)?,
                    child_poverty_pct_cut:        row.get(6)?,
                    poverty_gap_pct_cut:          row.get(7)?,
                    gini_index_pct_cut:           row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn state_impacts(&self, run_id: &str) -> ImpactResult<Vec<StateSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT state, reform_type, cost, poverty_pct_cut, child_poverty_pct_cut,
                    poverty_gap_pct_cut, gini_index_pct_cut
             FROM state_impact WHERE run_id = ?1
             ORDER BY row_order ASC",
        )?;
        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok(StateSummary {
                    state:                 row.get(0)?,
                    reform_type:           row.get(1)?,
                    cost:                  row.get(2)?,
                    poverty_pct_cut:       row.get(3)?,
                    child_poverty_pct_cut: row.get(4)?,
                    poverty_gap_pct_cut:   row.get(5)?,
                    gini_index_pct_cut:    row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn events(&self, run_id: &str) -> ImpactResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, seq, state, event_type, payload
             FROM event_log WHERE run_id = ?1
             ORDER BY seq ASC",
        )?;
        let entries = stmt
            .query_map(params![run_id], |row| {
                Ok(EventLogEntry {
                    id:         Some(row.get(0)?),
                    run_id:     row.get(1)?,
                    seq:        row.get::<_, i64>(2)? as u64,
                    state:      row.get(3)?,
                    event_type: row.get(4)?,
                    payload:    row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
