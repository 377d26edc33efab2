//! Code for loading a model from a directory of configuration files.
use crate::id::collect_by_id;
use crate::input::{input_err_msg, read_toml};
use crate::parameters::ParameterSet;
use crate::scenario::{BuiltinScenario, Scenario, ScenarioMap};
use anyhow::{Context, Result, ensure};
use itertools::Itertools;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const SCENARIOS_FILE_NAME: &str = "scenarios.toml";

/// Model definition
#[derive(Debug)]
pub struct Model {
    /// Path to model folder
    pub model_dir: PathBuf,
    /// Regional and travel-demand constants
    pub parameters: ParameterSet,
    /// Scenarios to simulate, in the order they will be run
    pub scenarios: ScenarioMap,
}

/// Represents the contents of the scenarios file.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct ScenariosFile {
    /// Scenarios from the built-in library, which are run first
    #[serde(default)]
    builtin: Vec<BuiltinScenario>,
    /// Scenarios defined by the user
    #[serde(default)]
    scenarios: Vec<Scenario>,
}

impl ScenariosFile {
    /// All the scenarios in the file, with built-in ones first
    fn into_scenarios(self) -> impl Iterator<Item = Scenario> {
        self.builtin
            .into_iter()
            .map(BuiltinScenario::scenario)
            .chain(self.scenarios)
    }
}

/// Read scenarios from the specified model directory, checking that they are valid
fn read_scenarios(model_dir: &Path) -> Result<ScenarioMap> {
    let file_path = model_dir.join(SCENARIOS_FILE_NAME);
    let scenarios_file: ScenariosFile = read_toml(&file_path)?;
    let scenarios: ScenarioMap = collect_by_id(scenarios_file.into_scenarios())
        .with_context(|| input_err_msg(&file_path))?;
    ensure!(
        !scenarios.is_empty(),
        "{}: No scenarios defined",
        input_err_msg(&file_path)
    );

    for scenario in scenarios.values() {
        let errors = scenario.validate();
        ensure!(
            errors.is_empty(),
            "{}: Invalid scenario {}:\n  * {}",
            input_err_msg(&file_path),
            scenario.id,
            errors.iter().join("\n  * ")
        );
    }

    Ok(scenarios)
}

impl Model {
    /// Read a model from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
        let model_dir = model_dir.as_ref();
        let parameters = ParameterSet::from_path(model_dir)?;
        let scenarios = read_scenarios(model_dir)?;

        Ok(Model {
            model_dir: model_dir.to_path_buf(),
            parameters,
            scenarios,
        })
    }
}
