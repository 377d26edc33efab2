//! Calculates transportation emissions from mode share and travel patterns.
use super::round_dp;
use crate::mode::{Mode, ModeMap};
use crate::parameters::ParameterSet;
use crate::units::{Dimensionless, KgCO2};
use log::debug;
use serde::Serialize;

/// Daily CO2 emissions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmissionsResult {
    /// Total CO2 emitted per day (kg)
    pub total_co2_kg_per_day: f64,
    /// CO2 emitted per day by each mode (kg)
    pub co2_by_mode: ModeMap<f64>,
    /// CO2 emitted per resident per day (kg)
    pub per_capita_co2_kg: f64,
    /// CO2 emitted per trip (kg)
    pub per_trip_co2_kg: f64,
    /// How the values were calculated
    pub methodology: &'static str,
}

/// Calculates emissions as the sum over modes of trips x distance x emission factor
pub struct EmissionsModel<'a> {
    params: &'a ParameterSet,
}

impl<'a> EmissionsModel<'a> {
    /// Description of the method used
    pub const METHODOLOGY: &'static str = "CO2 = sum(trips x distance x emission_factor). \
        Emission factors from IPCC guidelines. \
        Private car emissions adjusted for average occupancy.";

    /// Create a new [`EmissionsModel`]
    pub fn new(params: &'a ParameterSet) -> Self {
        Self { params }
    }

    /// Calculate daily emissions for the given mode share
    pub fn calculate(&self, mode_share: &ModeMap<f64>) -> EmissionsResult {
        let daily_trips = self.params.daily_trips as f64;

        let mut co2_by_mode = ModeMap::new();
        let mut total = KgCO2(0.0);
        for (mode, share) in mode_share {
            let distance = self.params.avg_trip_distance_km * Dimensionless(daily_trips * share);

            // Car emissions are shared between occupants
            let factor = if *mode == Mode::PrivateCar {
                self.params.emission_factor(*mode) / self.params.avg_vehicle_occupancy
            } else {
                self.params.emission_factor(*mode)
            };

            let co2 = distance * factor;
            co2_by_mode.insert(*mode, round_dp(co2.value(), 2));
            total = total + co2;
        }
        debug!("Total emissions: {} kg CO2/day", total.value());

        EmissionsResult {
            total_co2_kg_per_day: round_dp(total.value(), 2),
            co2_by_mode,
            per_capita_co2_kg: round_dp(total.value() / self.params.population as f64, 4),
            per_trip_co2_kg: round_dp(total.value() / daily_trips, 4),
            methodology: Self::METHODOLOGY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::params;
    use crate::units::KgCO2PerKilometre;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_baseline_emissions(params: ParameterSet) {
        let result = EmissionsModel::new(&params).calculate(&params.mode_share);

        // car: 2.5M x 0.45 x 12 km x 0.21 / 1.3
        assert_approx_eq!(
            f64,
            result.co2_by_mode[&Mode::PrivateCar],
            2_180_769.23,
            epsilon = 0.01
        );
        assert_approx_eq!(f64, result.co2_by_mode[&Mode::Motorcycle], 750_000.0, epsilon = 0.01);
        assert_approx_eq!(f64, result.co2_by_mode[&Mode::PublicTransit], 300_000.0, epsilon = 0.01);
        assert_eq!(result.co2_by_mode[&Mode::WalkingCycling], 0.0);
        assert_approx_eq!(f64, result.total_co2_kg_per_day, 3_230_769.23, epsilon = 0.01);
        assert_approx_eq!(f64, result.per_capita_co2_kg, 3.2308, epsilon = 1e-9);
        assert_approx_eq!(f64, result.per_trip_co2_kg, 1.2923, epsilon = 1e-9);
        assert_eq!(result.methodology, EmissionsModel::METHODOLOGY);
    }

    #[rstest]
    fn test_missing_emission_factor(mut params: ParameterSet) {
        params.emission_factors.shift_remove(&Mode::PublicTransit);
        let result = EmissionsModel::new(&params).calculate(&params.mode_share);
        assert_eq!(result.co2_by_mode[&Mode::PublicTransit], 0.0);
        assert_approx_eq!(f64, result.total_co2_kg_per_day, 2_930_769.23, epsilon = 0.01);
    }

    #[rstest]
    fn test_occupancy_only_affects_cars(mut params: ParameterSet) {
        params.avg_vehicle_occupancy = Dimensionless(2.0);
        params
            .emission_factors
            .insert(Mode::PrivateCar, KgCO2PerKilometre(0.2));
        let result = EmissionsModel::new(&params).calculate(&params.mode_share);

        // 2.5M x 0.45 x 12 x 0.2 / 2
        assert_approx_eq!(f64, result.co2_by_mode[&Mode::PrivateCar], 1_350_000.0, epsilon = 0.01);
        assert_approx_eq!(f64, result.co2_by_mode[&Mode::Motorcycle], 750_000.0, epsilon = 0.01);
    }
}
