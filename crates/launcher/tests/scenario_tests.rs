use std::fs;

use launcher::native::load_config;
use launcher::sim::{Scenario, create_sim_app, run_scenario, spawn_scenario};
use launcher::world::WaterWorld;
use root_motion::abilities::BreachSequence;
use root_motion::config::MotionConfig;
use root_motion::source::MotionKind;
use root_motion::task::ForceOutcome;

fn flat_ground() -> WaterWorld {
    WaterWorld {
        surface_height: -5000.0,
        floor_height: 0.0,
    }
}

#[test]
fn test_dash_scenario_elapses_and_slides_to_a_stop() {
    let mut app = create_sim_app(MotionConfig::default(), flat_ground(), None);
    let entity = spawn_scenario(&mut app, Scenario::Dash);
    let report = run_scenario(&mut app, entity, 600);

    let outcomes: Vec<_> = report
        .completions
        .iter()
        .map(|completion| (completion.kind, completion.outcome))
        .collect();
    assert_eq!(outcomes, vec![(MotionKind::ForwardForce, ForceOutcome::Elapsed)]);
    assert!(report.position.x > 400.0, "dash covered {:?}", report.position);
    assert!(report.position.z.abs() < 1.0, "dash drifted sideways: {:?}", report.position);
    assert_eq!(report.position.y, 0.0, "runner should stay on the floor");
    assert!(report.velocity.length() < 1.0, "friction should stop the runner: {:?}", report.velocity);
}

#[test]
fn test_breach_scenario_surfaces_leaps_and_dives_back() {
    let mut app = create_sim_app(MotionConfig::default(), WaterWorld::default(), None);
    let entity = spawn_scenario(&mut app, Scenario::Breach);
    let report = run_scenario(&mut app, entity, 600);

    let outcomes: Vec<_> = report
        .completions
        .iter()
        .map(|completion| (completion.kind, completion.outcome))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            (MotionKind::BreachRise, ForceOutcome::Succeeded),
            (MotionKind::BreachJump, ForceOutcome::Succeeded),
            (MotionKind::BreachFall, ForceOutcome::Succeeded),
        ]
    );
    assert!(report.position.y < 0.0, "swimmer should end underwater: {:?}", report.position);
    assert!(app.world().get::<BreachSequence>(entity).is_none());
}

#[test]
fn test_load_config_keeps_defaults_for_missing_fields() {
    let path = std::env::temp_dir().join(format!("root_motion_config_{}.json", std::process::id()));
    fs::write(&path, r#"{ "dash": { "strength": 2000.0 }, "water_depth_threshold": 75.0 }"#)
        .unwrap();

    let config = load_config(&path);
    fs::remove_file(&path).unwrap();
    let config = config.expect("config should parse");

    assert_eq!(config.dash.strength, 2000.0);
    assert_eq!(config.dash.duration, MotionConfig::default().dash.duration);
    assert_eq!(config.water_depth_threshold, 75.0);
    assert_eq!(config.breach, MotionConfig::default().breach);
}

#[test]
fn test_load_config_reports_the_failing_path() {
    let path = std::env::temp_dir().join("root_motion_config_that_does_not_exist.json");
    let err = load_config(&path).expect_err("missing file should fail");
    assert!(
        format!("{err:#}").contains("root_motion_config_that_does_not_exist.json"),
        "error should name the file: {err:#}"
    );
}

#[test]
fn test_load_config_rejects_malformed_json() {
    let path = std::env::temp_dir().join(format!("root_motion_bad_config_{}.json", std::process::id()));
    fs::write(&path, "{ dash: ").unwrap();

    let result = load_config(&path);
    fs::remove_file(&path).unwrap();

    assert!(result.is_err(), "malformed JSON should not load");
}
