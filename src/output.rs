//! The module responsible for writing output data to disk.
use crate::analysis::BestPerformers;
use crate::mode::Mode;
use crate::scenario::ScenarioID;
use crate::simulation::SimulationResult;
use crate::simulation::equity::IncomeGroup;
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "policysim_results";

/// The output file name for the headline results of each scenario
const SUMMARY_FILE_NAME: &str = "summary.csv";

/// The output file name for mode shares
const MODE_SHARES_FILE_NAME: &str = "mode_shares.csv";

/// The output file name for emissions by mode
const EMISSIONS_FILE_NAME: &str = "emissions_by_mode.csv";

/// The output file name for user costs by mode
const COSTS_FILE_NAME: &str = "costs_by_mode.csv";

/// The output file name for cost burden by income group
const BURDEN_FILE_NAME: &str = "burden_by_income.csv";

/// The output file name for travel times by mode
const TRAVEL_TIME_FILE_NAME: &str = "travel_time_by_mode.csv";

/// The output file name for the best scenario for each metric
const BEST_PERFORMERS_FILE_NAME: &str = "best_performers.csv";

/// Get the output folder for the model in the specified directory
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Canonicalise in case the user has specified "."
    let model_dir = model_dir
        .canonicalize()
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory, if it does not already exist.
///
/// An existing directory which contains files is only reused if `allow_overwrite` is set, in which
/// case it is emptied first.
///
/// # Returns
///
/// Whether an existing directory was overwritten
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let mut overwrite = false;
    if output_dir.is_dir() {
        if fs::read_dir(output_dir)?.next().is_none() {
            // Empty directory, so nothing to overwrite
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. \
            Please delete the folder or pass the --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir)?;
        overwrite = true;
    }

    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in the summary CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct SummaryRow {
    scenario: ScenarioID,
    overall_score: f64,
    total_co2_kg_per_day: f64,
    per_trip_co2_kg: f64,
    user_cost_per_trip: f64,
    government_cost_per_year: f64,
    gini_index: f64,
    equity_score: f64,
    avg_travel_time_minutes: f64,
    congestion_index: f64,
    system_throughput: f64,
    summary: String,
}

impl SummaryRow {
    fn new(scenario: &ScenarioID, result: &SimulationResult) -> Self {
        Self {
            scenario: scenario.clone(),
            overall_score: result.overall_score,
            total_co2_kg_per_day: result.emissions.total_co2_kg_per_day,
            per_trip_co2_kg: result.emissions.per_trip_co2_kg,
            user_cost_per_trip: result.cost.user_cost_per_trip,
            government_cost_per_year: result.cost.government_cost_per_year,
            gini_index: result.equity.gini_index,
            equity_score: result.equity.equity_score,
            avg_travel_time_minutes: result.efficiency.avg_travel_time_minutes,
            congestion_index: result.efficiency.congestion_index,
            system_throughput: result.efficiency.system_throughput,
            summary: result.summary.clone(),
        }
    }
}

/// Represents a row in the mode shares CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ModeShareRow {
    scenario: ScenarioID,
    mode: Mode,
    baseline_share: f64,
    projected_share: f64,
    shift_percentage: f64,
}

/// Represents a row in one of the CSV files containing a single value per mode
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ModeValueRow {
    scenario: ScenarioID,
    mode: Mode,
    value: f64,
}

/// Represents a row in the burden by income CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct IncomeGroupRow {
    scenario: ScenarioID,
    income_group: IncomeGroup,
    burden_percent: f64,
    accessibility: f64,
}

/// Represents a row in the best performers CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct BestPerformerRow {
    metric: String,
    scenario: ScenarioID,
}

/// An object for writing simulation results to file
pub struct DataWriter {
    summary_writer: csv::Writer<File>,
    mode_shares_writer: csv::Writer<File>,
    emissions_writer: csv::Writer<File>,
    costs_writer: csv::Writer<File>,
    burden_writer: csv::Writer<File>,
    travel_time_writer: csv::Writer<File>,
    best_performers_writer: csv::Writer<File>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    pub fn create(output_path: &Path) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        Ok(Self {
            summary_writer: new_writer(SUMMARY_FILE_NAME)?,
            mode_shares_writer: new_writer(MODE_SHARES_FILE_NAME)?,
            emissions_writer: new_writer(EMISSIONS_FILE_NAME)?,
            costs_writer: new_writer(COSTS_FILE_NAME)?,
            burden_writer: new_writer(BURDEN_FILE_NAME)?,
            travel_time_writer: new_writer(TRAVEL_TIME_FILE_NAME)?,
            best_performers_writer: new_writer(BEST_PERFORMERS_FILE_NAME)?,
        })
    }

    /// Write the results for one scenario to every output file
    pub fn write_result(&mut self, scenario: &ScenarioID, result: &SimulationResult) -> Result<()> {
        self.summary_writer
            .serialize(SummaryRow::new(scenario, result))?;
        self.write_mode_shares(scenario, result)?;
        self.write_incomes(scenario, result)?;

        let per_mode = [
            (&mut self.emissions_writer, &result.emissions.co2_by_mode),
            (&mut self.costs_writer, &result.cost.cost_by_mode),
            (
                &mut self.travel_time_writer,
                &result.efficiency.travel_time_by_mode,
            ),
        ];
        for (writer, values) in per_mode {
            for (mode, value) in values {
                writer.serialize(ModeValueRow {
                    scenario: scenario.clone(),
                    mode: *mode,
                    value: *value,
                })?;
            }
        }

        Ok(())
    }

    /// Write mode shares to file
    fn write_mode_shares(&mut self, scenario: &ScenarioID, result: &SimulationResult) -> Result<()> {
        let shares = &result.mode_share;
        for (mode, baseline_share) in &shares.baseline_shares {
            let row = ModeShareRow {
                scenario: scenario.clone(),
                mode: *mode,
                baseline_share: *baseline_share,
                projected_share: shares.projected_shares.get(mode).copied().unwrap_or(0.0),
                shift_percentage: shares.shift_percentage.get(mode).copied().unwrap_or(0.0),
            };
            self.mode_shares_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Write cost burden and accessibility by income group to file
    fn write_incomes(&mut self, scenario: &ScenarioID, result: &SimulationResult) -> Result<()> {
        let equity = &result.equity;
        for (income_group, burden_percent) in &equity.burden_by_income {
            let row = IncomeGroupRow {
                scenario: scenario.clone(),
                income_group: *income_group,
                burden_percent: *burden_percent,
                accessibility: equity
                    .accessibility_by_income
                    .get(income_group)
                    .copied()
                    .unwrap_or(0.0),
            };
            self.burden_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Write the best scenario for each metric, once all scenarios have been simulated
    pub fn write_best_performers(&mut self, best: &BestPerformers) -> Result<()> {
        for (metric, scenario) in best.iter() {
            self.best_performers_writer.serialize(BestPerformerRow {
                metric: metric.to_string(),
                scenario: scenario.clone(),
            })?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.summary_writer.flush()?;
        self.mode_shares_writer.flush()?;
        self.emissions_writer.flush()?;
        self.costs_writer.flush()?;
        self.burden_writer.flush()?;
        self.travel_time_writer.flush()?;
        self.best_performers_writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{simulator, subsidy_and_charge};
    use crate::policy::PolicyAdjustments;
    use crate::simulation::PolicySimulator;
    use itertools::Itertools;
    use rstest::{fixture, rstest};
    use tempfile::tempdir;

    #[fixture]
    fn result(simulator: PolicySimulator, subsidy_and_charge: PolicyAdjustments) -> SimulationResult {
        simulator.simulate(&subsidy_and_charge).unwrap()
    }

    /// Write a single result to a temporary directory
    fn write_result(result: &SimulationResult) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        {
            let mut writer = DataWriter::create(dir.path()).unwrap();
            writer.write_result(&"test".into(), result).unwrap();
            writer.flush().unwrap();
        }

        dir
    }

    fn read_rows<T: serde::de::DeserializeOwned>(dir: &Path, file_name: &str) -> Vec<T> {
        csv::Reader::from_path(dir.join(file_name))
            .unwrap()
            .into_deserialize()
            .try_collect()
            .unwrap()
    }

    #[rstest]
    fn test_write_summary(result: SimulationResult) {
        let dir = write_result(&result);
        let records: Vec<SummaryRow> = read_rows(dir.path(), SUMMARY_FILE_NAME);
        assert_eq!(records, [SummaryRow::new(&"test".into(), &result)]);
    }

    #[rstest]
    fn test_write_mode_shares(result: SimulationResult) {
        let dir = write_result(&result);
        let records: Vec<ModeShareRow> = read_rows(dir.path(), MODE_SHARES_FILE_NAME);
        assert_eq!(records.len(), 4);
        assert_eq!(records[2].mode, Mode::PublicTransit);
        assert_eq!(
            records[2].projected_share,
            result.mode_share.projected_shares[&Mode::PublicTransit]
        );
    }

    #[rstest]
    #[case(EMISSIONS_FILE_NAME)]
    #[case(COSTS_FILE_NAME)]
    #[case(TRAVEL_TIME_FILE_NAME)]
    fn test_write_per_mode(result: SimulationResult, #[case] file_name: &str) {
        let dir = write_result(&result);
        let records: Vec<ModeValueRow> = read_rows(dir.path(), file_name);
        assert_eq!(
            records.iter().map(|row| row.mode).collect_vec(),
            [
                Mode::PrivateCar,
                Mode::Motorcycle,
                Mode::PublicTransit,
                Mode::WalkingCycling
            ]
        );
    }

    #[rstest]
    fn test_write_burden(result: SimulationResult) {
        let dir = write_result(&result);
        let records: Vec<IncomeGroupRow> = read_rows(dir.path(), BURDEN_FILE_NAME);
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].income_group, IncomeGroup::Low);
        assert_eq!(
            records[0].burden_percent,
            result.equity.burden_by_income[&IncomeGroup::Low]
        );
    }

    #[test]
    fn test_write_best_performers() {
        let best = BestPerformers {
            overall: "a".into(),
            emissions: "b".into(),
            cost: "a".into(),
            equity: "c".into(),
            efficiency: "b".into(),
        };

        let dir = tempdir().unwrap();
        {
            let mut writer = DataWriter::create(dir.path()).unwrap();
            writer.write_best_performers(&best).unwrap();
            writer.flush().unwrap();
        }

        let records: Vec<BestPerformerRow> = read_rows(dir.path(), BEST_PERFORMERS_FILE_NAME);
        assert_eq!(
            records
                .iter()
                .map(|row| (row.metric.as_str(), row.scenario.to_string()))
                .collect_vec(),
            [
                ("overall", "a".to_string()),
                ("emissions", "b".to_string()),
                ("cost", "a".to_string()),
                ("equity", "c".to_string()),
                ("efficiency", "b".to_string())
            ]
        );
    }

    #[test]
    fn test_create_output_directory_new() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("results");
        assert!(!create_output_directory(&output_dir, false).unwrap());
        assert!(output_dir.is_dir());
    }

    #[test]
    fn test_create_output_directory_existing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("file.txt"), "data").unwrap();

        assert!(create_output_directory(dir.path(), false).is_err());
        assert!(create_output_directory(dir.path(), true).unwrap());
        assert!(!dir.path().join("file.txt").exists());
    }

    #[test]
    fn test_create_output_directory_empty() {
        let dir = tempdir().unwrap();
        assert!(!create_output_directory(dir.path(), false).unwrap());
    }
}
