//! Evaluates how the cost of travel is distributed across income groups.
use super::round_dp;
use crate::mode::{Mode, ModeMap};
use crate::parameters::ParameterSet;
use crate::policy::{Lever, PolicyAdjustments};
use crate::units::{Dimensionless, Hours};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

/// Length of a working day, used to turn an hourly wage into a daily income
const WORKING_DAY: Hours = Hours(8.0);

/// Income quintiles
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IncomeGroup {
    /// Lowest fifth of earners
    Low,
    /// Second fifth
    LowerMiddle,
    /// Middle fifth
    Middle,
    /// Fourth fifth
    UpperMiddle,
    /// Highest fifth of earners
    High,
}

impl IncomeGroup {
    /// Income of the group relative to the average wage
    pub fn income_multiplier(self) -> Dimensionless {
        Dimensionless(match self {
            Self::Low => 0.4,
            Self::LowerMiddle => 0.7,
            Self::Middle => 1.0,
            Self::UpperMiddle => 1.5,
            Self::High => 2.5,
        })
    }
}

/// A map of values keyed by income group
pub type IncomeGroupMap<T> = IndexMap<IncomeGroup, T>;

/// How fairly the cost of travel falls across income groups
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityResult {
    /// Gini index of the travel cost burden (0 is perfectly equal)
    pub gini_index: f64,
    /// Proxy for each group's access to opportunities (informational only)
    pub accessibility_by_income: IncomeGroupMap<f64>,
    /// Daily travel cost as a percentage of daily income for each group
    pub burden_by_income: IncomeGroupMap<f64>,
    /// 1 - Gini index (higher is more equitable)
    pub equity_score: f64,
    /// How the values were calculated
    pub methodology: &'static str,
}

/// Calculates the distribution of travel cost burden across income quintiles
pub struct EquityModel<'a> {
    params: &'a ParameterSet,
}

impl<'a> EquityModel<'a> {
    /// Description of the method used
    pub const METHODOLOGY: &'static str =
        "Burden = (transport_cost / income) x 100 by income quintile. \
        Gini index calculated on burden distribution. \
        Equity score = 1 - Gini (higher is more equitable).";

    /// Create a new [`EquityModel`]
    pub fn new(params: &'a ParameterSet) -> Self {
        Self { params }
    }

    /// Calculate equity metrics.
    ///
    /// Every group makes the same number of trips at the same average cost, so only income
    /// varies between groups.
    pub fn calculate(
        &self,
        user_cost_per_trip: f64,
        mode_share: &ModeMap<f64>,
        adjustments: &PolicyAdjustments,
    ) -> EquityResult {
        let daily_cost = user_cost_per_trip * self.params.daily_trips_per_capita();
        let average_daily_income = self.params.avg_hourly_wage * WORKING_DAY;
        let pt_subsidy = adjustments.get(Lever::PtSubsidyPercent);
        debug!(
            "Daily travel cost per person: {daily_cost} (transit share {})",
            mode_share.get(&Mode::PublicTransit).copied().unwrap_or(0.0)
        );

        let mut burden_by_income = IncomeGroupMap::new();
        let mut accessibility_by_income = IncomeGroupMap::new();
        for group in IncomeGroup::iter() {
            let multiplier = group.income_multiplier();
            let daily_income = average_daily_income * multiplier;
            burden_by_income.insert(group, round_dp(daily_cost / daily_income.value() * 100.0, 2));

            let car_access = multiplier.value().min(1.0);
            let pt_quality = 1.0 - pt_subsidy / 200.0;
            let accessibility = car_access * 0.5 + (1.0 - pt_quality) * 0.5;
            accessibility_by_income.insert(group, round_dp(accessibility, 2));
        }

        let burdens: Vec<f64> = burden_by_income.values().copied().collect();
        let gini = gini_coefficient(&burdens);

        EquityResult {
            gini_index: round_dp(gini, 3),
            accessibility_by_income,
            burden_by_income,
            equity_score: round_dp(1.0 - gini, 3),
            methodology: Self::METHODOLOGY,
        }
    }
}

/// Calculate the Gini coefficient of a set of values.
///
/// Returns 0 if there are no values or they sum to zero.
pub fn gini_coefficient(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let total: f64 = sorted.iter().sum();
    if sorted.is_empty() || total == 0.0 {
        return 0.0;
    }

    let cumulative: Vec<f64> = sorted
        .iter()
        .scan(0.0, |acc, value| {
            *acc += value;
            Some(*acc)
        })
        .collect();
    let n = sorted.len() as f64;
    let last = cumulative[cumulative.len() - 1];
    let cumulative_sum: f64 = cumulative.iter().sum();

    (n + 1.0 - 2.0 * cumulative_sum / last) / n
}
