//! Integration tests for analysing a single policy.
use policysim::analysis::analyze_policy;
use policysim::cli::handle_analyze_command;
use policysim::model::Model;
use policysim::policy::PolicyKind;
use policysim::settings::Settings;
use policysim::simulation::PolicySimulator;
use std::path::PathBuf;
use std::str::FromStr;

/// An integration test for the `analyze` command.
#[test]
fn test_handle_analyze_command() {
    unsafe { std::env::set_var("POLICYSIM_LOG_LEVEL", "off") };

    handle_analyze_command(
        &PathBuf::from("demos/thailand"),
        PolicyKind::FuelTax,
        Some(Settings::default()),
    )
    .unwrap();
}

#[test]
fn test_policy_type_from_str() {
    assert_eq!(
        PolicyKind::from_str("congestion_pricing").unwrap(),
        PolicyKind::CongestionPricing
    );
    assert!(PolicyKind::from_str("toll_road").is_err());
}

#[test]
fn test_analyze_default_fuel_tax() {
    let model = Model::from_path(PathBuf::from("demos/thailand")).unwrap();
    let simulator = PolicySimulator::new(model.parameters).unwrap();
    let analysis = analyze_policy(&simulator, &PolicyKind::FuelTax.default_policy()).unwrap();

    // A fuel tax moves trips away from cars and motorcycles, cutting emissions
    assert!(analysis.improvement.emissions_change_percent < 0.0);
    assert_eq!(analysis.policy.kind(), PolicyKind::FuelTax);
}
