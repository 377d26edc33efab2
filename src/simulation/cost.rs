//! Calculates the cost of travel to users and the cost of policies to government.
use super::round_dp;
use crate::mode::{Mode, ModeMap, mode_map_from_fn};
use crate::parameters::ParameterSet;
use crate::policy::{Lever, PolicyAdjustments};
use crate::units::{Dimensionless, Money, MoneyPerMinute};
use log::debug;
use serde::Serialize;

/// Fraction of the hourly wage used as the value of travel time
const VALUE_OF_TIME_WAGE_FRACTION: Dimensionless = Dimensionless(0.5);

/// How much further a motorcycle travels on a litre of fuel than a car
const MOTORCYCLE_FUEL_EFFICIENCY_FACTOR: Dimensionless = Dimensionless(1.5);

/// Days per year used when annualising daily costs
const DAYS_PER_YEAR: f64 = 365.0;

/// Multiplier applied to the average trip time to give the perceived trip time for each mode
fn time_factor(mode: Mode) -> Dimensionless {
    Dimensionless(match mode {
        Mode::PrivateCar => 1.0,
        Mode::Motorcycle => 0.9,
        Mode::PublicTransit => 1.3,
        Mode::WalkingCycling => 1.5,
    })
}

/// Costs of travel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostResult {
    /// Average generalised cost of a trip to the traveller
    pub user_cost_per_trip: f64,
    /// Total generalised cost of all trips in a day
    pub total_user_cost_per_day: f64,
    /// Annual cost of transit subsidies to government
    pub government_cost_per_year: f64,
    /// Generalised cost of a trip by each mode
    pub cost_by_mode: ModeMap<f64>,
    /// How the values were calculated
    pub methodology: &'static str,
}

/// Calculates generalised user costs (money plus time) and government subsidy costs
pub struct CostBenefitModel<'a> {
    params: &'a ParameterSet,
}

impl<'a> CostBenefitModel<'a> {
    /// Description of the method used
    pub const METHODOLOGY: &'static str =
        "User cost = fuel_cost + fare + (travel_time x value_of_time). \
        Value of time = 50% of hourly wage. \
        Government cost = subsidy x subsidized_trips x 365.";

    /// Create a new [`CostBenefitModel`]
    pub fn new(params: &'a ParameterSet) -> Self {
        Self { params }
    }

    /// Calculate costs for the given mode share and policy.
    ///
    /// The user cost is weighted by `mode_share`, but the government cost uses the baseline
    /// transit share, so ridership growth caused by a subsidy does not increase its cost.
    pub fn calculate(
        &self,
        mode_share: &ModeMap<f64>,
        adjustments: &PolicyAdjustments,
    ) -> CostResult {
        let params = self.params;
        let pt_subsidy = adjustments.get(Lever::PtSubsidyPercent) / 100.0;
        let fuel_price = params.fuel_price_per_liter
            * Dimensionless(1.0 + adjustments.get(Lever::FuelTaxPercent) / 100.0);
        let fare = params.public_transit_fare * Dimensionless(1.0 - pt_subsidy);
        let value_of_time: MoneyPerMinute =
            (params.avg_hourly_wage * VALUE_OF_TIME_WAGE_FRACTION).per_minute();

        let distance = params.avg_trip_distance_km;
        let efficiency = params.fuel_efficiency_km_per_liter;
        let cost_by_mode = mode_map_from_fn(|mode| {
            let time_cost = params.avg_trip_time_minutes * time_factor(mode) * value_of_time;
            let money_cost = match mode {
                Mode::PrivateCar => distance / efficiency * fuel_price,
                Mode::Motorcycle => {
                    distance / (efficiency * MOTORCYCLE_FUEL_EFFICIENCY_FACTOR) * fuel_price
                }
                Mode::PublicTransit => fare,
                Mode::WalkingCycling => Money(0.0),
            };
            round_dp((money_cost + time_cost).value(), 2)
        });

        let user_cost: f64 = mode_share
            .iter()
            .map(|(mode, share)| cost_by_mode.get(mode).copied().unwrap_or(0.0) * share)
            .sum();
        let daily_trips = params.daily_trips as f64;
        debug!("User cost per trip: {user_cost}");

        let pt_trips = daily_trips * params.share(Mode::PublicTransit);
        let subsidy_per_trip = params.public_transit_fare * Dimensionless(pt_subsidy);
        let government_cost = subsidy_per_trip.value() * pt_trips * DAYS_PER_YEAR;

        CostResult {
            user_cost_per_trip: round_dp(user_cost, 2),
            total_user_cost_per_day: round_dp(user_cost * daily_trips, 2),
            government_cost_per_year: round_dp(government_cost, 2),
            cost_by_mode,
            methodology: Self::METHODOLOGY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::params;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_baseline_costs(params: ParameterSet) {
        let result = CostBenefitModel::new(&params)
            .calculate(&params.mode_share, &PolicyAdjustments::default());

        // value of time = 8 x 0.5 / 60 per minute
        assert_eq!(result.cost_by_mode[&Mode::PrivateCar], 3.53);
        assert_eq!(result.cost_by_mode[&Mode::Motorcycle], 2.9);
        assert_eq!(result.cost_by_mode[&Mode::PublicTransit], 4.53);
        assert_eq!(result.cost_by_mode[&Mode::WalkingCycling], 3.5);
        assert_approx_eq!(f64, result.user_cost_per_trip, 3.57, epsilon = 0.011);
        assert_approx_eq!(
            f64,
            result.total_user_cost_per_day,
            3.5695 * 2_500_000.0,
            epsilon = 1.0
        );
        assert_eq!(result.government_cost_per_year, 0.0);
        assert_eq!(result.methodology, CostBenefitModel::METHODOLOGY);
    }

    #[rstest]
    #[case(0.0, 4.53)]
    #[case(50.0, 3.78)]
    #[case(100.0, 3.03)]
    fn test_pt_subsidy_reduces_fare(
        params: ParameterSet,
        #[case] subsidy: f64,
        #[case] expected: f64,
    ) {
        let adjustments = PolicyAdjustments::default().with(Lever::PtSubsidyPercent, subsidy);
        let result = CostBenefitModel::new(&params).calculate(&params.mode_share, &adjustments);
        assert_eq!(result.cost_by_mode[&Mode::PublicTransit], expected);
    }

    #[rstest]
    fn test_fuel_tax_raises_vehicle_costs(params: ParameterSet) {
        let adjustments = PolicyAdjustments::default().with(Lever::FuelTaxPercent, 50.0);
        let result = CostBenefitModel::new(&params).calculate(&params.mode_share, &adjustments);

        // car fuel: 12 / 12 x 1.8 = 1.8; motorcycle fuel: 12 / 18 x 1.8 = 1.2
        assert_eq!(result.cost_by_mode[&Mode::PrivateCar], 4.13);
        assert_eq!(result.cost_by_mode[&Mode::Motorcycle], 3.3);
        assert_eq!(result.cost_by_mode[&Mode::PublicTransit], 4.53);
    }

    #[rstest]
    fn test_government_cost_uses_baseline_ridership(params: ParameterSet) {
        let adjustments = PolicyAdjustments::default().with(Lever::PtSubsidyPercent, 20.0);
        let mut shifted = params.mode_share.clone();
        shifted.insert(Mode::PublicTransit, 0.3);
        shifted.insert(Mode::PrivateCar, 0.35);
        let result = CostBenefitModel::new(&params).calculate(&shifted, &adjustments);

        // 2.5M x 0.2 x (1.5 x 0.2) x 365
        assert_approx_eq!(
            f64,
            result.government_cost_per_year,
            54_750_000.0,
            epsilon = 0.01
        );
    }

    #[rstest]
    fn test_user_cost_weighted_by_given_shares(params: ParameterSet) {
        let mut all_walking = ModeMap::new();
        all_walking.insert(Mode::WalkingCycling, 1.0);
        let result = CostBenefitModel::new(&params)
            .calculate(&all_walking, &PolicyAdjustments::default());
        assert_eq!(result.user_cost_per_trip, 3.5);
        assert_eq!(result.total_user_cost_per_day, 8_750_000.0);
    }
}
