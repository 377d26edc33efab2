//! Defines the `ParameterSet` struct, which holds the regional and travel-demand constants read by
//! every simulation model. Overrides are read from `parameters.toml`.
use crate::context::RegionalContext;
use crate::input::{check_non_negative, check_positive, input_err_msg, read_toml};
use crate::mode::{Mode, ModeMap};
use crate::units::{
    Dimensionless, KgCO2PerKilometre, Kilometres, KilometresPerLitre, Minutes, Money,
    MoneyPerHour, MoneyPerLitre,
};
use anyhow::{Context, Result, ensure};
use float_cmp::approx_eq;
use indexmap::indexmap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use strum::IntoEnumIterator;

const PARAMETERS_FILE_NAME: &str = "parameters.toml";

/// How far mode shares may sum from 1.0
pub const MODE_SHARE_TOLERANCE: f64 = 1e-6;

/// Regional and travel-demand constants.
///
/// Never mutated once a simulator has been constructed from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSet {
    /// The regional context the values apply to
    pub context: RegionalContext,
    /// Number of residents
    pub population: u64,
    /// Number of trips made each day
    pub daily_trips: u64,
    /// Fraction of trips made by each mode
    pub mode_share: ModeMap<f64>,
    /// Average trip distance
    pub avg_trip_distance_km: Kilometres,
    /// Average trip duration
    pub avg_trip_time_minutes: Minutes,
    /// Average number of people in each private car
    pub avg_vehicle_occupancy: Dimensionless,
    /// Fuel efficiency of a private car
    pub fuel_efficiency_km_per_liter: KilometresPerLitre,
    /// Price of fuel before taxes
    pub fuel_price_per_liter: MoneyPerLitre,
    /// Public transit fare before subsidies
    pub public_transit_fare: Money,
    /// Average hourly wage
    pub avg_hourly_wage: MoneyPerHour,
    /// CO2 emitted per km travelled by each mode (per passenger for public transit)
    pub emission_factors: ModeMap<KgCO2PerKilometre>,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            context: RegionalContext::Default,
            population: 1_000_000,
            daily_trips: 2_500_000,
            mode_share: indexmap! {
                Mode::PrivateCar => 0.45,
                Mode::Motorcycle => 0.25,
                Mode::PublicTransit => 0.20,
                Mode::WalkingCycling => 0.10,
            },
            avg_trip_distance_km: Kilometres(12.0),
            avg_trip_time_minutes: Minutes(35.0),
            avg_vehicle_occupancy: Dimensionless(1.3),
            fuel_efficiency_km_per_liter: KilometresPerLitre(12.0),
            fuel_price_per_liter: MoneyPerLitre(1.2),
            public_transit_fare: Money(1.5),
            avg_hourly_wage: MoneyPerHour(8.0),
            emission_factors: indexmap! {
                Mode::PrivateCar => KgCO2PerKilometre(0.21),
                Mode::Motorcycle => KgCO2PerKilometre(0.10),
                Mode::PublicTransit => KgCO2PerKilometre(0.05),
                Mode::WalkingCycling => KgCO2PerKilometre(0.0),
            },
        }
    }
}

/// The contents of `parameters.toml`. Every field is an optional override.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct ParameterOverrides {
    #[serde(default)]
    context: RegionalContext,
    population: Option<u64>,
    daily_trips: Option<u64>,
    mode_share: Option<ModeMap<f64>>,
    avg_trip_distance_km: Option<Kilometres>,
    avg_trip_time_minutes: Option<Minutes>,
    avg_vehicle_occupancy: Option<Dimensionless>,
    fuel_efficiency_km_per_liter: Option<KilometresPerLitre>,
    fuel_price_per_liter: Option<MoneyPerLitre>,
    public_transit_fare: Option<Money>,
    avg_hourly_wage: Option<MoneyPerHour>,
    #[serde(default)]
    emission_factors: ModeMap<KgCO2PerKilometre>,
}

macro_rules! override_fields {
    ($params:ident, $overrides:ident, $($field:ident),*) => {
        $(
            if let Some(value) = $overrides.$field {
                $params.$field = value;
            }
        )*
    };
}

impl ParameterSet {
    /// The default parameter set with the local prices of `context` applied
    pub fn for_context(context: RegionalContext) -> Self {
        let prices = context.price_overrides();
        let mut params = Self {
            context,
            ..Self::default()
        };
        if let Some(fuel_price) = prices.fuel_price_per_liter {
            params.fuel_price_per_liter = fuel_price;
        }
        if let Some(fare) = prices.public_transit_fare {
            params.public_transit_fare = fare;
        }
        if let Some(wage) = prices.avg_hourly_wage {
            params.avg_hourly_wage = wage;
        }

        params
    }

    /// Read a parameters file from the specified model directory.
    ///
    /// Values not given in the file are taken from the file's regional context.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// A validated [`ParameterSet`] or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ParameterSet> {
        let file_path = model_dir.as_ref().join(PARAMETERS_FILE_NAME);
        let overrides: ParameterOverrides = read_toml(&file_path)?;
        let params = Self::from_overrides(overrides);
        params.validate().with_context(|| input_err_msg(&file_path))?;

        Ok(params)
    }

    fn from_overrides(overrides: ParameterOverrides) -> Self {
        let mut params = Self::for_context(overrides.context);
        override_fields!(
            params,
            overrides,
            population,
            daily_trips,
            mode_share,
            avg_trip_distance_km,
            avg_trip_time_minutes,
            avg_vehicle_occupancy,
            fuel_efficiency_km_per_liter,
            fuel_price_per_liter,
            public_transit_fare,
            avg_hourly_wage
        );

        // Emission factors are merged so that a file can override a single mode
        params.emission_factors.extend(overrides.emission_factors);

        params
    }

    /// The baseline share of trips for the given mode (zero if absent)
    pub fn share(&self, mode: Mode) -> f64 {
        self.mode_share.get(&mode).copied().unwrap_or(0.0)
    }

    /// The emission factor for the given mode (zero if absent)
    pub fn emission_factor(&self, mode: Mode) -> KgCO2PerKilometre {
        self.emission_factors
            .get(&mode)
            .copied()
            .unwrap_or_default()
    }

    /// Average number of trips made per resident per day
    pub fn daily_trips_per_capita(&self) -> f64 {
        self.daily_trips as f64 / self.population as f64
    }

    /// Check that the parameters are internally consistent
    pub fn validate(&self) -> Result<()> {
        ensure!(self.population > 0, "population must be greater than zero");
        ensure!(self.daily_trips > 0, "daily_trips must be greater than zero");
        check_mode_share(&self.mode_share)?;

        check_non_negative(self.avg_trip_distance_km.value())
            .context("Invalid value for avg_trip_distance_km")?;
        check_non_negative(self.avg_trip_time_minutes.value())
            .context("Invalid value for avg_trip_time_minutes")?;
        check_positive(self.avg_vehicle_occupancy.value())
            .context("Invalid value for avg_vehicle_occupancy")?;
        check_positive(self.fuel_efficiency_km_per_liter.value())
            .context("Invalid value for fuel_efficiency_km_per_liter")?;
        check_non_negative(self.fuel_price_per_liter.value())
            .context("Invalid value for fuel_price_per_liter")?;
        check_non_negative(self.public_transit_fare.value())
            .context("Invalid value for public_transit_fare")?;
        check_positive(self.avg_hourly_wage.value())
            .context("Invalid value for avg_hourly_wage")?;

        for (mode, factor) in &self.emission_factors {
            check_non_negative(factor.value())
                .with_context(|| format!("Invalid emission factor for {mode}"))?;
        }

        Ok(())
    }
}

/// Check that shares are given for every mode and sum to one
fn check_mode_share(mode_share: &ModeMap<f64>) -> Result<()> {
    for mode in Mode::iter() {
        let share = mode_share
            .get(&mode)
            .with_context(|| format!("mode_share is missing a value for {mode}"))?;
        check_non_negative(*share).with_context(|| format!("Invalid mode share for {mode}"))?;
    }

    let total: f64 = mode_share.values().sum();
    ensure!(
        approx_eq!(f64, total, 1.0, epsilon = MODE_SHARE_TOLERANCE),
        "mode_share values must sum to 1 (sum is {total})"
    );

    Ok(())
}
