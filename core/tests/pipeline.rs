//! Orchestrator tests: sequencing, failure isolation and output tables.

mod common;

use common::*;
use credit_impact_core::{
    config::PipelineConfig,
    event::PipelineEvent,
    pipeline::{ImpactAccumulator, ImpactPipeline, StateStage},
    reform::{ReformScenario, CTCS, CTCS_AND_EITCS, EITCS},
};

fn two_state_engine() -> MockEngine {
    let engine = standard_state(MockEngine::new(), "test://AL", &[102, 101], 1_000_000.0, 950_000.0);
    standard_state(engine, "test://AK", &[200], 500_000.0, 480_000.0)
}

#[test]
fn full_run_produces_sorted_district_table() {
    init_logging();
    let engine = two_state_engine();
    let config = PipelineConfig::default_test(&["AL", "AK"]);

    let outcome = ImpactPipeline::new(&engine, &config).run();

    assert_eq!(outcome.completed, vec!["AL", "AK"]);
    assert!(outcome.failed.is_empty());
    assert_eq!(outcome.district_impacts.len(), 9);

    let keys: Vec<(u32, u32, &str)> = outcome
        .district_impacts
        .iter()
        .map(|r| (r.state_fips, r.congressional_district_geoid, r.reform_type.as_str()))
        .collect();
    assert_eq!(keys[0], (1, 101, CTCS));
    assert_eq!(keys[1], (1, 101, CTCS_AND_EITCS));
    assert_eq!(keys[2], (1, 101, EITCS));
    assert_eq!(keys[3], (1, 102, CTCS));
    assert_eq!(keys[8], (2, 200, EITCS));

    for r in &outcome.district_impacts {
        let expected = if r.state == "AL" { 50_000.0 } else { 20_000.0 };
        assert_close(r.cost, expected);
    }
}

#[test]
fn state_table_sums_costs_per_reform() {
    let engine = two_state_engine();
    let config = PipelineConfig::default_test(&["AL", "AK"]);

    let outcome = ImpactPipeline::new(&engine, &config).run();

    assert_eq!(outcome.state_summaries.len(), 6);
    let al_ctc = &outcome.state_summaries[0];
    assert_eq!((al_ctc.state.as_str(), al_ctc.reform_type.as_str()), ("AL", CTCS));
    assert_close(al_ctc.cost, 100_000.0);
    assert_eq!(outcome.state_summaries[1].reform_type, EITCS);
    assert_eq!(outcome.state_summaries[2].reform_type, CTCS_AND_EITCS);
    assert_eq!(outcome.state_summaries[3].state, "AK");
}

#[test]
fn failing_state_is_skipped_and_run_continues() {
    init_logging();
    let eitc = &ReformScenario::standard()[1];
    let engine = two_state_engine().failing_on("test://AL", Some(eitc));
    let config = PipelineConfig::default_test(&["AL", "AK"]);

    let outcome = ImpactPipeline::new(&engine, &config).run();

    assert_eq!(outcome.completed, vec!["AK"]);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].state, "AL");
    assert_eq!(outcome.failed[0].stage, StateStage::ReformRun(1));
    assert!(
        outcome.district_impacts.iter().all(|r| r.state == "AK"),
        "partial AL results must be discarded"
    );
    assert!(outcome.state_summaries.iter().all(|s| s.state == "AK"));
    assert!(outcome.events.iter().any(|e| matches!(
        e,
        PipelineEvent::StateFailed { state, .. } if state == "AL"
    )));
}

#[test]
fn state_failure_keeps_the_whole_error_chain() {
    init_logging();
    let engine = two_state_engine().failing_with_context(
        "test://AL",
        None,
        "loading test://AL",
        "h5 group missing",
    );
    let config = PipelineConfig::default_test(&["AL", "AK"]);

    let outcome = ImpactPipeline::new(&engine, &config).run();

    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].stage, StateStage::BaselineRun);
    assert_eq!(outcome.failed[0].error, "loading test://AL: h5 group missing");
    assert_eq!(outcome.completed, vec!["AK"]);
}

#[test]
fn unknown_state_fails_before_any_simulation() {
    init_logging();
    let engine = two_state_engine();
    let config = PipelineConfig::default_test(&["ZZ", "AK"]);

    let outcome = ImpactPipeline::new(&engine, &config).run();

    assert_eq!(outcome.failed[0].state, "ZZ");
    assert_eq!(outcome.failed[0].stage, StateStage::Pending);
    assert_eq!(outcome.completed, vec!["AK"]);
    assert!(engine.calls.borrow().iter().all(|(dataset, _)| dataset != "test://ZZ"));
}

#[test]
fn at_most_one_simulation_alive_and_runs_are_sequential() {
    let engine = two_state_engine();
    let config = PipelineConfig::default_test(&["AL", "AK"]);

    ImpactPipeline::new(&engine, &config).run();

    assert_eq!(engine.peak.get(), 1);
    assert_eq!(engine.live.get(), 0);
    let calls = engine.calls.borrow();
    let order: Vec<(&str, &str)> = calls.iter().map(|(d, k)| (d.as_str(), k.as_str())).collect();
    assert_eq!(
        order,
        vec![
            ("test://AL", "baseline"),
            ("test://AL", "state_ctc"),
            ("test://AL", "state_eitc"),
            ("test://AL", "state_ctc+state_eitc"),
            ("test://AK", "baseline"),
            ("test://AK", "state_ctc"),
            ("test://AK", "state_eitc"),
            ("test://AK", "state_ctc+state_eitc"),
        ]
    );
}

#[test]
fn district_missing_from_reform_contributes_fewer_rows() {
    let scenarios = ReformScenario::standard();
    let baseline = [hh(1, 101.0, 60_000.0), hh(2, 102.0, 40_000.0)];
    let shrunk = [hh(1, 101.0, 55_000.0)];
    let mut engine = MockEngine::new()
        .with_run("test://AL", None, &baseline, &[])
        .with_run("test://AL", Some(&scenarios[0]), &shrunk, &[]);
    for scenario in &scenarios[1..] {
        engine = engine.with_run("test://AL", Some(scenario), &baseline, &[]);
    }
    let config = PipelineConfig::default_test(&["AL"]);

    let outcome = ImpactPipeline::new(&engine, &config).run();

    let ctc_rows: Vec<_> = outcome
        .district_impacts
        .iter()
        .filter(|r| r.reform_type == CTCS)
        .collect();
    assert_eq!(ctc_rows.len(), 1);
    assert_eq!(ctc_rows[0].congressional_district_geoid, 101);
    assert_close(ctc_rows[0].cost, 5_000.0);
    assert_eq!(outcome.district_impacts.len(), 5);
}

#[test]
fn poverty_cut_matches_reference_scenario() {
    // Poverty 0.10 with the credit, 0.12 without it.
    let scenarios = ReformScenario::standard();
    let households = [hh(1, 101.0, 1_000_000.0)];
    let base_people: Vec<Person> = (0..10).map(|i| person(i, 1, i == 0, false)).collect();
    // Total person weight stays 10; poor weight rises from 1.0 to 1.2.
    let mut reform_people = base_people.clone();
    reform_people[1].in_poverty = true;
    reform_people[1].weight = 0.2;
    reform_people[2].weight = 1.8;

    let reform_households = [hh(1, 101.0, 950_000.0)];
    let mut engine = MockEngine::new().with_run("test://AL", None, &households, &base_people);
    for scenario in &scenarios {
        engine = engine.with_run("test://AL", Some(scenario), &reform_households, &reform_people);
    }
    let config = PipelineConfig::default_test(&["AL"]);

    let outcome = ImpactPipeline::new(&engine, &config).run();

    let r = &outcome.district_impacts[0];
    assert_close(r.cost, 50_000.0);
    assert_close(r.poverty_pct_cut, 1.0 / 6.0);
}

#[test]
fn run_state_reports_terminal_stage() {
    let engine = two_state_engine();
    let config = PipelineConfig::default_test(&["AL"]);
    let pipeline = ImpactPipeline::new(&engine, &config).with_run_id("run-fixed".into());
    let mut acc = ImpactAccumulator::default();

    assert_eq!(pipeline.run_state("AL", &mut acc), StateStage::Done);
    assert_eq!(pipeline.run_state("WY", &mut acc), StateStage::Failed);
    assert_eq!(acc.completed, vec!["AL"]);
    assert_eq!(acc.records.len(), 6);
    assert_eq!(pipeline.run_id(), "run-fixed");
}

#[test]
fn events_bracket_the_run() {
    let engine = two_state_engine();
    let config = PipelineConfig::default_test(&["AK"]);

    let outcome = ImpactPipeline::new(&engine, &config).run();

    assert!(matches!(outcome.events.first(), Some(PipelineEvent::RunStarted { states: 1, .. })));
    assert!(matches!(
        outcome.events.last(),
        Some(PipelineEvent::RunCompleted { completed: 1, failed: 0 })
    ));
    let extracted = outcome
        .events
        .iter()
        .filter(|e| matches!(e, PipelineEvent::ScenarioExtracted { .. }))
        .count();
    assert_eq!(extracted, 4);
}
