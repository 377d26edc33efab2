//! Functionality for running the policy simulation.
//!
//! A simulation runs a fixed pipeline of models, where later models consume the outputs of
//! earlier ones:
//!
//! 1. [`ModeShareModel`] projects how trips shift between modes
//! 2. [`EmissionsModel`] and [`CostBenefitModel`] evaluate the projected mode share
//! 3. [`EquityModel`] distributes the user cost across income groups
//! 4. [`EfficiencyModel`] evaluates travel times, with congestion derived from the change in car
//!    share
//!
//! The results are then combined into a single overall score.
use crate::analysis::{BestPerformers, ScenarioSummary};
use crate::mode::Mode;
use crate::model::Model;
use crate::output::DataWriter;
use crate::parameters::ParameterSet;
use crate::policy::{Lever, PolicyAdjustments};
use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

pub mod cost;
use cost::{CostBenefitModel, CostResult};
pub mod efficiency;
use efficiency::{EfficiencyModel, EfficiencyResult};
pub mod emissions;
use emissions::{EmissionsModel, EmissionsResult};
pub mod equity;
use equity::{EquityModel, EquityResult};
pub mod mode_share;
use mode_share::{ModeShareModel, ModeShareResult};

/// Congestion never falls below this fraction of current levels, however many drivers switch mode
const MIN_CONGESTION_FACTOR: f64 = 0.8;

/// Emissions per trip (kg CO2) at which the emissions sub-score reaches zero
const EMISSIONS_SCORE_LIMIT: f64 = 5.0;

/// User cost per trip at which the cost sub-score reaches zero
const COST_SCORE_LIMIT: f64 = 20.0;

/// Average travel time (minutes) at which the efficiency sub-score reaches zero
const TRAVEL_TIME_SCORE_LIMIT: f64 = 60.0;

/// Weight given to each of the four sub-scores in the overall score
const SUB_SCORE_WEIGHT: f64 = 0.25;

/// Round a value to the given number of decimal places
pub(crate) fn round_dp(value: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    (value * factor).round() / factor
}

/// Reasons why a set of adjustments cannot be simulated
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// A lever was given a NaN or infinite value
    #[error("Value for {lever} must be a finite number (got {value})")]
    NonFiniteLever {
        /// The offending lever
        lever: Lever,
        /// The value it was given
        value: f64,
    },
    /// A lever was given a negative value
    #[error("Value for {lever} cannot be negative (got {value})")]
    NegativeLever {
        /// The offending lever
        lever: Lever,
        /// The value it was given
        value: f64,
    },
    /// A percentage lever was given a value above 100
    #[error("Value for {lever} must be a percentage between 0 and 100 (got {value})")]
    PercentOutOfRange {
        /// The offending lever
        lever: Lever,
        /// The value it was given
        value: f64,
    },
}

/// The complete result of simulating a policy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    /// Emissions under the policy
    pub emissions: EmissionsResult,
    /// Costs under the policy
    pub cost: CostResult,
    /// Distribution of costs under the policy
    pub equity: EquityResult,
    /// Travel times under the policy
    pub efficiency: EfficiencyResult,
    /// Mode shares with and without the policy
    pub mode_share: ModeShareResult,
    /// Score between 0 and 100 (higher is better)
    pub overall_score: f64,
    /// One-line summary of the key results
    pub summary: String,
}

/// Runs the simulation models for a fixed set of parameters.
///
/// The parameters are validated on construction and never change afterwards, so a single
/// simulator can be shared between threads.
#[derive(Debug, Clone)]
pub struct PolicySimulator {
    params: ParameterSet,
}

impl PolicySimulator {
    /// Create a new [`PolicySimulator`], checking that the parameters are valid
    pub fn new(params: ParameterSet) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// The parameters used by the simulator
    pub fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    /// Simulate the effect of the given policy adjustments.
    ///
    /// Unrecognised levers have already been dropped by [`PolicyAdjustments`] and absent levers
    /// have no effect, so an empty set of adjustments gives the baseline.
    pub fn simulate(
        &self,
        adjustments: &PolicyAdjustments,
    ) -> Result<SimulationResult, SimulationError> {
        adjustments.validate()?;
        debug!("Simulating adjustments: {adjustments}");

        let mode_share = ModeShareModel::new(&self.params).calculate(adjustments);
        let projected = &mode_share.projected_shares;

        let emissions = EmissionsModel::new(&self.params).calculate(projected);
        let cost = CostBenefitModel::new(&self.params).calculate(projected, adjustments);
        let equity = EquityModel::new(&self.params).calculate(
            cost.user_cost_per_trip,
            projected,
            adjustments,
        );

        let factor = congestion_factor(
            mode_share.baseline_shares.get(&Mode::PrivateCar).copied().unwrap_or(0.0),
            projected.get(&Mode::PrivateCar).copied().unwrap_or(0.0),
        );
        debug!("Congestion factor: {factor}");
        let efficiency = EfficiencyModel::new(&self.params).calculate(projected, factor);

        let overall_score = overall_score(&emissions, &cost, &equity, &efficiency);
        let summary = self.summarise(&emissions, &cost, &equity, &efficiency);

        Ok(SimulationResult {
            emissions,
            cost,
            equity,
            efficiency,
            mode_share,
            overall_score,
            summary,
        })
    }

    /// Describe the key results in one line
    fn summarise(
        &self,
        emissions: &EmissionsResult,
        cost: &CostResult,
        equity: &EquityResult,
        efficiency: &EfficiencyResult,
    ) -> String {
        let currency_symbol = self.params.context.info().currency_symbol;
        format!(
            "Daily CO2 emissions: {} kg. Average user cost: {currency_symbol}{:.2}/trip. \
            Equity score: {:.2}/1.00. Average travel time: {:.0} minutes.",
            format_thousands(emissions.total_co2_kg_per_day),
            cost.user_cost_per_trip,
            equity.equity_score,
            efficiency.avg_travel_time_minutes,
        )
    }
}

/// Scale factor for road travel times caused by a change in car share.
///
/// Fewer cars reduce congestion, down to a floor of [`MIN_CONGESTION_FACTOR`]. More cars increase
/// it without limit.
pub fn congestion_factor(baseline_car_share: f64, projected_car_share: f64) -> f64 {
    (1.0 + projected_car_share - baseline_car_share).max(MIN_CONGESTION_FACTOR)
}

/// Combine the model results into a score between 0 and 100.
///
/// Emissions, cost and travel time are scored linearly from 1 (zero) to 0 (at or beyond their
/// limit). The equity score is used as is. The four sub-scores are weighted equally.
pub fn overall_score(
    emissions: &EmissionsResult,
    cost: &CostResult,
    equity: &EquityResult,
    efficiency: &EfficiencyResult,
) -> f64 {
    let emissions_score = (1.0 - emissions.per_trip_co2_kg / EMISSIONS_SCORE_LIMIT).max(0.0);
    let cost_score = (1.0 - cost.user_cost_per_trip / COST_SCORE_LIMIT).max(0.0);
    let efficiency_score =
        (1.0 - efficiency.avg_travel_time_minutes / TRAVEL_TIME_SCORE_LIMIT).max(0.0);

    let total = SUB_SCORE_WEIGHT
        * (emissions_score + cost_score + equity.equity_score + efficiency_score);
    round_dp(total * 100.0, 1)
}

/// Format a value as a whole number with commas between groups of thousands
fn format_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value.is_sign_negative() && digits.bytes().any(|b| b != b'0') {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

/// Run the simulation for every scenario in the model and write the results to disk.
///
/// # Arguments:
///
/// * `model` - The model to run
/// * `output_path` - The folder to which output files will be written
pub fn run(model: &Model, output_path: &Path) -> Result<()> {
    let simulator = PolicySimulator::new(model.parameters.clone())?;
    let mut writer = DataWriter::create(output_path)?;
    let mut summaries = Vec::with_capacity(model.scenarios.len());

    for scenario in model.scenarios.values() {
        info!("Simulating scenario: {}", scenario.id);
        let adjustments = scenario.get_combined_adjustments();
        let result = simulator
            .simulate(&adjustments)
            .with_context(|| format!("Failed to simulate scenario {}", scenario.id))?;
        info!(
            "Scenario {}: overall score {:.1}",
            scenario.id, result.overall_score
        );

        writer.write_result(&scenario.id, &result)?;
        summaries.push(ScenarioSummary::new(scenario, adjustments, &result));
    }

    if let Some(best) = BestPerformers::find(&summaries) {
        info!("Best overall scenario: {}", best.overall);
        writer.write_best_performers(&best)?;
    }

    writer.flush()
}
