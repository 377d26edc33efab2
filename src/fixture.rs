//! Fixtures for tests

use crate::id::collect_by_id;
use crate::model::Model;
use crate::parameters::ParameterSet;
use crate::policy::{Lever, PolicyAdjustments};
use crate::scenario::BuiltinScenario;
use crate::simulation::PolicySimulator;
use rstest::fixture;
use std::path::PathBuf;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

#[fixture]
pub fn params() -> ParameterSet {
    ParameterSet::default()
}

#[fixture]
pub fn simulator(params: ParameterSet) -> PolicySimulator {
    PolicySimulator::new(params).unwrap()
}

/// The adjustments used as a worked example: a 20% transit subsidy and a congestion charge of 2
#[fixture]
pub fn subsidy_and_charge() -> PolicyAdjustments {
    PolicyAdjustments::default()
        .with(Lever::PtSubsidyPercent, 20.0)
        .with(Lever::CongestionPrice, 2.0)
}

#[fixture]
pub fn model(params: ParameterSet) -> Model {
    let scenarios = [
        BuiltinScenario::Baseline.scenario(),
        BuiltinScenario::Balanced.scenario(),
    ];
    Model {
        model_dir: PathBuf::from("model"),
        parameters: params,
        scenarios: collect_by_id(scenarios).unwrap(),
    }
}
