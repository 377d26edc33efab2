//! Calculates how well the transport system moves people.
use super::round_dp;
use crate::mode::{Mode, ModeMap};
use crate::parameters::ParameterSet;
use crate::units::{Dimensionless, Minutes};
use log::debug;
use serde::Serialize;

/// Door-to-door travel time for a trip by each mode without congestion
fn base_travel_time(mode: Mode) -> Minutes {
    Minutes(match mode {
        Mode::PrivateCar => 30.0,
        Mode::Motorcycle => 25.0,
        Mode::PublicTransit => 45.0,
        Mode::WalkingCycling => 50.0,
    })
}

/// System efficiency metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfficiencyResult {
    /// Average travel time per trip, weighted by mode share
    pub avg_travel_time_minutes: f64,
    /// Travel time per trip for each mode
    pub travel_time_by_mode: ModeMap<f64>,
    /// Ratio of actual to free-flow travel time (1.0 means no congestion)
    pub congestion_index: f64,
    /// Person-kilometres travelled per hour spent travelling
    pub system_throughput: f64,
    /// How the values were calculated
    pub methodology: &'static str,
}

/// Calculates travel times and congestion
pub struct EfficiencyModel<'a> {
    params: &'a ParameterSet,
}

impl<'a> EfficiencyModel<'a> {
    /// Description of the method used
    pub const METHODOLOGY: &'static str =
        "Travel time weighted by mode share. \
        Congestion index = actual_time / free_flow_time. \
        Throughput = person-km / (trips x hours).";

    /// Create a new [`EfficiencyModel`]
    pub fn new(params: &'a ParameterSet) -> Self {
        Self { params }
    }

    /// Calculate efficiency metrics.
    ///
    /// `congestion_factor` scales the travel time of road vehicles only.
    pub fn calculate(&self, mode_share: &ModeMap<f64>, congestion_factor: f64) -> EfficiencyResult {
        let travel_time_by_mode: ModeMap<f64> = mode_share
            .keys()
            .map(|mode| {
                let time = if mode.is_road_vehicle() {
                    base_travel_time(*mode) * Dimensionless(congestion_factor)
                } else {
                    base_travel_time(*mode)
                };
                (*mode, round_dp(time.value(), 1))
            })
            .collect();

        let avg_time = Minutes(
            mode_share
                .iter()
                .map(|(mode, share)| travel_time_by_mode[mode] * share)
                .sum(),
        );
        let free_flow_time: Minutes = mode_share
            .iter()
            .map(|(mode, share)| base_travel_time(*mode) * Dimensionless(*share))
            .sum();
        debug!(
            "Average travel time: {} min (free flow {} min)",
            avg_time.value(),
            free_flow_time.value()
        );

        let congestion_index = if free_flow_time.value() > 0.0 {
            (avg_time / free_flow_time).value()
        } else {
            1.0
        };

        let daily_trips = self.params.daily_trips as f64;
        let person_km = self.params.avg_trip_distance_km.value() * daily_trips;
        let person_hours = avg_time.to_hours().value() * daily_trips;
        let system_throughput = if person_hours > 0.0 {
            person_km / person_hours
        } else {
            0.0
        };

        EfficiencyResult {
            avg_travel_time_minutes: round_dp(avg_time.value(), 1),
            travel_time_by_mode,
            congestion_index: round_dp(congestion_index, 3),
            system_throughput: round_dp(system_throughput, 2),
            methodology: Self::METHODOLOGY,
        }
    }
}
