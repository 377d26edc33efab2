//! Higher-level analyses built from repeated simulations: evaluating a single policy, comparing
//! scenarios and recommending policies.
use crate::mode::ModeMap;
use crate::policy::{Lever, Policy, PolicyAdjustments};
use crate::scenario::{Scenario, ScenarioID};
use crate::simulation::{PolicySimulator, SimulationError, SimulationResult, round_dp};
use log::{debug, info};
use serde::Serialize;
use std::cmp::Ordering;
use strum::Display;

/// Percentage change from `baseline` to `new`, rounded to 2 d.p. (zero if `baseline` is zero)
pub fn percent_change(baseline: f64, new: f64) -> f64 {
    if baseline == 0.0 {
        return 0.0;
    }

    round_dp((new - baseline) / baseline * 100.0, 2)
}

/// How a policy changes the headline results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Improvement {
    /// Change in overall score (positive is better)
    pub score_change: f64,
    /// Percentage change in total daily emissions
    pub emissions_change_percent: f64,
    /// Percentage change in user cost per trip
    pub cost_change_percent: f64,
}

/// The results of simulating a policy against the baseline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyAnalysis {
    /// The policy analysed
    pub policy: Policy,
    /// Results with no policy
    pub baseline: SimulationResult,
    /// Results with the policy
    pub with_policy: SimulationResult,
    /// The difference the policy makes
    pub improvement: Improvement,
}

/// Simulate a single policy and compare it with the baseline
pub fn analyze_policy(
    simulator: &PolicySimulator,
    policy: &Policy,
) -> Result<PolicyAnalysis, SimulationError> {
    info!("Analysing policy: {policy}");
    let baseline = simulator.simulate(&PolicyAdjustments::default())?;
    let with_policy = simulator.simulate(&policy.get_adjustments())?;

    let improvement = Improvement {
        score_change: round_dp(with_policy.overall_score - baseline.overall_score, 1),
        emissions_change_percent: percent_change(
            baseline.emissions.total_co2_kg_per_day,
            with_policy.emissions.total_co2_kg_per_day,
        ),
        cost_change_percent: percent_change(
            baseline.cost.user_cost_per_trip,
            with_policy.cost.user_cost_per_trip,
        ),
    };

    Ok(PolicyAnalysis {
        policy: policy.clone(),
        baseline,
        with_policy,
        improvement,
    })
}

/// The headline results of one scenario in a comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSummary {
    /// The scenario's name
    pub name: ScenarioID,
    /// The scenario's description
    pub description: String,
    /// Names of the scenario's policies
    pub policies: Vec<&'static str>,
    /// The combined adjustments of the scenario's policies
    pub adjustments: PolicyAdjustments,
    /// Overall score (0 to 100)
    pub overall_score: f64,
    /// Total daily CO2 emissions (kg)
    pub emissions: f64,
    /// User cost per trip
    pub user_cost: f64,
    /// Equity score (0 to 1)
    pub equity_score: f64,
    /// Average travel time (minutes)
    pub travel_time: f64,
    /// Projected mode shares
    pub mode_share: ModeMap<f64>,
}

impl ScenarioSummary {
    /// Summarise the result of simulating `scenario` with its combined `adjustments`
    pub fn new(
        scenario: &Scenario,
        adjustments: PolicyAdjustments,
        result: &SimulationResult,
    ) -> Self {
        Self {
            name: scenario.id.clone(),
            description: scenario.description.clone(),
            policies: scenario.policies.iter().map(Policy::name).collect(),
            adjustments,
            overall_score: result.overall_score,
            emissions: result.emissions.total_co2_kg_per_day,
            user_cost: result.cost.user_cost_per_trip,
            equity_score: result.equity.equity_score,
            travel_time: result.efficiency.avg_travel_time_minutes,
            mode_share: result.mode_share.projected_shares.clone(),
        }
    }
}

/// The best scenario for each metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestPerformers {
    /// Highest overall score
    pub overall: ScenarioID,
    /// Lowest emissions
    pub emissions: ScenarioID,
    /// Lowest user cost
    pub cost: ScenarioID,
    /// Highest equity score
    pub equity: ScenarioID,
    /// Lowest travel time
    pub efficiency: ScenarioID,
}

/// The results of comparing several scenarios
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioComparison {
    /// One summary per scenario, in the order given
    pub scenarios: Vec<ScenarioSummary>,
    /// The best scenarios (`None` if there were no scenarios)
    pub best: Option<BestPerformers>,
}

/// Find the first summary with the best value of `key`
fn best_by<F>(summaries: &[ScenarioSummary], key: F, higher_is_better: bool) -> Option<ScenarioID>
where
    F: Fn(&ScenarioSummary) -> f64,
{
    summaries
        .iter()
        .fold(None, |best: Option<&ScenarioSummary>, summary| {
            let Some(current) = best else {
                return Some(summary);
            };
            let ordering = key(summary).total_cmp(&key(current));
            let is_better = if higher_is_better {
                ordering == Ordering::Greater
            } else {
                ordering == Ordering::Less
            };
            Some(if is_better { summary } else { current })
        })
        .map(|summary| summary.name.clone())
}

impl BestPerformers {
    /// Find the best scenario for each metric (`None` if there are no scenarios)
    pub fn find(summaries: &[ScenarioSummary]) -> Option<Self> {
        Some(Self {
            overall: best_by(summaries, |s| s.overall_score, true)?,
            emissions: best_by(summaries, |s| s.emissions, false)?,
            cost: best_by(summaries, |s| s.user_cost, false)?,
            equity: best_by(summaries, |s| s.equity_score, true)?,
            efficiency: best_by(summaries, |s| s.travel_time, false)?,
        })
    }

    /// The best scenario for each metric, keyed by metric name
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ScenarioID)> {
        [
            ("overall", &self.overall),
            ("emissions", &self.emissions),
            ("cost", &self.cost),
            ("equity", &self.equity),
            ("efficiency", &self.efficiency),
        ]
        .into_iter()
    }
}

/// Simulate each scenario and find the best performer for each metric.
///
/// Where scenarios tie, the first one is chosen.
pub fn compare_scenarios<'a, I>(
    simulator: &PolicySimulator,
    scenarios: I,
) -> Result<ScenarioComparison, SimulationError>
where
    I: IntoIterator<Item = &'a Scenario>,
{
    let mut summaries = Vec::new();
    for scenario in scenarios {
        let adjustments = scenario.get_combined_adjustments();
        let result = simulator.simulate(&adjustments)?;
        debug!(
            "Scenario {}: overall score {}",
            scenario.id, result.overall_score
        );

        summaries.push(ScenarioSummary::new(scenario, adjustments, &result));
    }

    let best = BestPerformers::find(&summaries);
    Ok(ScenarioComparison {
        scenarios: summaries,
        best,
    })
}

/// The metric to optimise when recommending policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecommendationTarget {
    /// Lowest total emissions
    Emissions,
    /// Lowest user cost per trip
    Cost,
    /// Highest equity score
    Equity,
    /// Highest overall score
    Overall,
}

/// A candidate policy tested when making recommendations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyOption {
    /// Name of the option
    pub name: &'static str,
    /// Lever values for the option
    pub adjustments: PolicyAdjustments,
    /// Overall score (0 to 100)
    pub overall_score: f64,
    /// Total daily CO2 emissions (kg)
    pub emissions: f64,
    /// Percentage change in emissions from the baseline (negative is a reduction)
    pub emissions_reduction: f64,
    /// User cost per trip
    pub user_cost: f64,
    /// Annual cost to government
    pub government_cost: f64,
    /// Equity score (0 to 1)
    pub equity: f64,
}

/// Recommended policies for a target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendations {
    /// The metric optimised
    pub target: RecommendationTarget,
    /// The maximum annual government cost, if any
    pub budget: Option<f64>,
    /// The best options (at most three)
    pub recommendations: Vec<PolicyOption>,
    /// Every option within budget, best first
    pub all_tested: Vec<PolicyOption>,
    /// Overall score with no policy
    pub baseline_score: f64,
}

/// Maximum number of options to recommend
const NUM_RECOMMENDATIONS: usize = 3;

/// The candidate policies tested when making recommendations
fn candidate_policies() -> [(&'static str, PolicyAdjustments); 10] {
    let none = PolicyAdjustments::default;
    [
        (
            "Low Congestion Price",
            none().with(Lever::CongestionPrice, 2.0),
        ),
        (
            "Medium Congestion Price",
            none().with(Lever::CongestionPrice, 5.0),
        ),
        (
            "High Congestion Price",
            none().with(Lever::CongestionPrice, 10.0),
        ),
        ("Low PT Subsidy", none().with(Lever::PtSubsidyPercent, 20.0)),
        (
            "Medium PT Subsidy",
            none().with(Lever::PtSubsidyPercent, 40.0),
        ),
        ("High PT Subsidy", none().with(Lever::PtSubsidyPercent, 60.0)),
        ("Low Fuel Tax", none().with(Lever::FuelTaxPercent, 10.0)),
        ("High Fuel Tax", none().with(Lever::FuelTaxPercent, 30.0)),
        (
            "Combined Moderate",
            none()
                .with(Lever::CongestionPrice, 3.0)
                .with(Lever::PtSubsidyPercent, 25.0),
        ),
        (
            "Combined Aggressive",
            none()
                .with(Lever::CongestionPrice, 8.0)
                .with(Lever::PtSubsidyPercent, 50.0)
                .with(Lever::FuelTaxPercent, 20.0),
        ),
    ]
}

/// Recommend policies which perform best for the given target.
///
/// A fixed set of candidate policies is simulated. Candidates whose annual government cost exceeds
/// `budget` are discarded and the rest are ranked by the target metric. Candidates which tie keep
/// their original order.
pub fn recommend(
    simulator: &PolicySimulator,
    target: RecommendationTarget,
    budget: Option<f64>,
) -> Result<Recommendations, SimulationError> {
    info!("Recommending policies for target: {target}");
    let baseline = simulator.simulate(&PolicyAdjustments::default())?;

    let mut options = Vec::new();
    for (name, adjustments) in candidate_policies() {
        let result = simulator.simulate(&adjustments)?;
        let government_cost = result.cost.government_cost_per_year;
        if budget.is_some_and(|budget| government_cost > budget) {
            debug!("Skipping {name}: government cost {government_cost} is over budget");
            continue;
        }

        options.push(PolicyOption {
            name,
            adjustments,
            overall_score: result.overall_score,
            emissions: result.emissions.total_co2_kg_per_day,
            emissions_reduction: percent_change(
                baseline.emissions.total_co2_kg_per_day,
                result.emissions.total_co2_kg_per_day,
            ),
            user_cost: result.cost.user_cost_per_trip,
            government_cost,
            equity: result.equity.equity_score,
        });
    }

    // `sort_by` is stable, so ties keep their original order
    match target {
        RecommendationTarget::Emissions => {
            options.sort_by(|a, b| a.emissions.total_cmp(&b.emissions));
        }
        RecommendationTarget::Cost => options.sort_by(|a, b| a.user_cost.total_cmp(&b.user_cost)),
        RecommendationTarget::Equity => options.sort_by(|a, b| b.equity.total_cmp(&a.equity)),
        RecommendationTarget::Overall => {
            options.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));
        }
    }

    Ok(Recommendations {
        target,
        budget,
        recommendations: options.iter().take(NUM_RECOMMENDATIONS).cloned().collect(),
        all_tested: options,
        baseline_score: baseline.overall_score,
    })
}
