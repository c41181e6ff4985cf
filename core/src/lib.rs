//! Fiscal and distributional impact of state tax credits, per state and
//! congressional district.
//!
//! Data flows one way:
//!   runner → district → impact → aggregate → pipeline outcome
//! with `gini` and `ratio` as leaf helpers.

pub mod aggregate;
pub mod config;
pub mod district;
pub mod engine;
pub mod error;
pub mod event;
pub mod gini;
pub mod household;
pub mod impact;
pub mod microdata;
pub mod output;
pub mod pipeline;
pub mod ratio;
pub mod reform;
pub mod runner;
pub mod states;
pub mod store;
pub mod types;
