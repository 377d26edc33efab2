//! Integration tests for loading the example models.
use policysim::context::RegionalContext;
use policysim::mode::Mode;
use policysim::model::Model;
use policysim::units::MoneyPerLitre;
use std::path::PathBuf;

fn load_model(name: &str) -> Model {
    Model::from_path(PathBuf::from("demos").join(name)).unwrap()
}

#[test]
fn test_load_default_model() {
    let model = load_model("default");
    assert_eq!(model.parameters.context, RegionalContext::Default);
    assert_eq!(
        model
            .scenarios
            .keys()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
        [
            "baseline",
            "green_transport",
            "equity_focused",
            "balanced",
            "charge_and_tax"
        ]
    );
}

#[test]
fn test_load_malaysia_model() {
    let model = load_model("malaysia");
    assert_eq!(model.parameters.context, RegionalContext::Malaysia);
    assert_eq!(model.parameters.fuel_price_per_liter, MoneyPerLitre(2.05));
    assert_eq!(model.parameters.share(Mode::PrivateCar), 0.55);
    assert_eq!(model.scenarios.len(), 4);
}

#[test]
fn test_load_thailand_model() {
    let model = load_model("thailand");
    assert_eq!(model.parameters.context, RegionalContext::Thailand);
    assert_eq!(
        model.parameters.emission_factor(Mode::Motorcycle).value(),
        0.08
    );
    // Factors not given in the file keep their default values
    assert_eq!(
        model.parameters.emission_factor(Mode::PrivateCar).value(),
        0.21
    );
}
