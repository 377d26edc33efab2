//! Integration tests for comparing scenarios.
use policysim::analysis::compare_scenarios;
use policysim::cli::handle_compare_command;
use policysim::model::Model;
use policysim::settings::Settings;
use policysim::simulation::PolicySimulator;
use std::path::PathBuf;

/// An integration test for the `compare` command.
#[test]
fn test_handle_compare_command() {
    unsafe { std::env::set_var("POLICYSIM_LOG_LEVEL", "off") };

    handle_compare_command(&PathBuf::from("demos/malaysia"), Some(Settings::default())).unwrap();
}

#[test]
fn test_compare_demo_scenarios() {
    let model = Model::from_path(PathBuf::from("demos/default")).unwrap();
    let simulator = PolicySimulator::new(model.parameters.clone()).unwrap();
    let comparison = compare_scenarios(&simulator, model.scenarios.values()).unwrap();

    // Summaries keep the order of the scenarios file
    assert_eq!(
        comparison
            .scenarios
            .iter()
            .map(|summary| summary.name.to_string())
            .collect::<Vec<_>>(),
        [
            "baseline",
            "green_transport",
            "equity_focused",
            "balanced",
            "charge_and_tax"
        ]
    );
    assert_eq!(comparison.scenarios[0].policies, Vec::<&str>::new());
    assert_eq!(comparison.scenarios[4].policies.len(), 2);

    let best = comparison.best.unwrap();
    assert_eq!(best.emissions, "green_transport".into());
}
