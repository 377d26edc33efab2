//! Policies are interventions (e.g. a fuel tax) which are described to the simulation models as a
//! set of named numeric levers.
use crate::simulation::SimulationError;
use indexmap::IndexMap;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// A named numeric knob through which a policy affects the simulation models
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Lever {
    /// Charge for entering the congestion zone (currency units)
    CongestionPrice,
    /// Multiplier applied to the congestion charge at peak times
    PeakMultiplier,
    /// Percentage of the transit fare covered by subsidy
    PtSubsidyPercent,
    /// Additional tax as a percentage of the fuel price
    FuelTaxPercent,
    /// Parking fee per hour
    ParkingHourlyRate,
    /// Direct subsidy for purchasing an electric vehicle
    EvPurchaseSubsidy,
    /// Reduction in vehicle registration tax for electric vehicles
    EvTaxReductionPercent,
    /// Maximum allowed parking duration in hours
    ParkingMaxHours,
}

impl Lever {
    /// Whether the lever is a percentage (and so must lie between 0 and 100)
    pub fn is_percent(self) -> bool {
        matches!(
            self,
            Self::PtSubsidyPercent | Self::FuelTaxPercent | Self::EvTaxReductionPercent
        )
    }
}

/// A map of lever values describing a policy (or combination of policies).
///
/// Absent levers have no effect, which is equivalent to a value of zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, f64>")]
pub struct PolicyAdjustments(IndexMap<Lever, f64>);

impl PolicyAdjustments {
    /// Create adjustments from a map keyed by lever name.
    ///
    /// Unrecognised keys are skipped.
    pub fn from_raw<I, K>(raw: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut adjustments = Self::default();
        for (key, value) in raw {
            let key = key.as_ref();
            match Lever::from_str(key) {
                Ok(lever) => adjustments.set(lever, value),
                Err(_) => debug!("Ignoring unrecognised adjustment: {key}"),
            }
        }

        adjustments
    }

    /// Get the value of a lever (zero if not set)
    pub fn get(&self, lever: Lever) -> f64 {
        self.0.get(&lever).copied().unwrap_or(0.0)
    }

    /// Set the value of a lever
    pub fn set(&mut self, lever: Lever, value: f64) {
        self.0.insert(lever, value);
    }

    /// Return a copy with the given lever set
    pub fn with(mut self, lever: Lever, value: f64) -> Self {
        self.set(lever, value);
        self
    }

    /// Merge in another set of adjustments. Values in `other` replace existing ones.
    pub fn merge(&mut self, other: &PolicyAdjustments) {
        for (lever, value) in other.iter() {
            self.set(lever, value);
        }
    }

    /// Iterate over the levers which have been set
    pub fn iter(&self) -> impl Iterator<Item = (Lever, f64)> + '_ {
        self.0.iter().map(|(lever, value)| (*lever, *value))
    }

    /// Whether no levers have been set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check that every lever has a usable value
    pub fn validate(&self) -> Result<(), SimulationError> {
        for (lever, value) in self.iter() {
            if !value.is_finite() {
                return Err(SimulationError::NonFiniteLever { lever, value });
            }
            if value < 0.0 {
                return Err(SimulationError::NegativeLever { lever, value });
            }
            if lever.is_percent() && value > 100.0 {
                return Err(SimulationError::PercentOutOfRange { lever, value });
            }
        }

        Ok(())
    }
}

impl From<IndexMap<String, f64>> for PolicyAdjustments {
    fn from(raw: IndexMap<String, f64>) -> Self {
        Self::from_raw(raw)
    }
}

impl fmt::Display for PolicyAdjustments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        write!(
            f,
            "{}",
            self.iter()
                .map(|(lever, value)| format!("{lever}={value}"))
                .join(", ")
        )
    }
}

/// Broad categories of policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PolicyCategory {
    /// Charges for using the transport system
    Pricing,
    /// Reductions in the cost of travel
    Subsidy,
    /// New or improved infrastructure
    Infrastructure,
    /// Rules and restrictions
    Regulation,
    /// Financial encouragement of particular choices
    Incentive,
}

/// The areas of the transport system a policy is expected to affect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ImpactArea {
    /// CO2 emissions
    Emissions,
    /// Costs to users and government
    Cost,
    /// Distribution of costs across income groups
    Equity,
    /// Travel times and congestion
    Efficiency,
    /// Choice of transport mode
    ModeShare,
}

/// Groups of people who may be eligible for a transit subsidy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TargetGroup {
    /// Everyone
    All,
    /// Students
    Students,
    /// Older people
    Elderly,
    /// People on low incomes
    LowIncome,
    /// Disabled people
    Disabled,
}

/// Metadata about a numeric policy parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDefinition {
    /// The lever which this parameter sets
    pub lever: Lever,
    /// Human-readable name
    pub name: &'static str,
    /// Unit of measurement
    pub unit: &'static str,
    /// Smallest permitted value
    pub min: f64,
    /// Largest permitted value
    pub max: f64,
    /// Value used if none is given
    pub default: f64,
    /// Longer description
    pub description: &'static str,
}

static CONGESTION_PRICING_PARAMETERS: [ParameterDefinition; 2] = [
    ParameterDefinition {
        lever: Lever::CongestionPrice,
        name: "Base Price per Entry",
        unit: "currency",
        min: 0.0,
        max: 50.0,
        default: 5.0,
        description: "Base charge for entering the congestion zone",
    },
    ParameterDefinition {
        lever: Lever::PeakMultiplier,
        name: "Peak Hour Multiplier",
        unit: "multiplier",
        min: 1.0,
        max: 3.0,
        default: 1.5,
        description: "Price multiplier during peak hours",
    },
];

static PT_SUBSIDY_PARAMETERS: [ParameterDefinition; 1] = [ParameterDefinition {
    lever: Lever::PtSubsidyPercent,
    name: "Subsidy Percentage",
    unit: "%",
    min: 0.0,
    max: 100.0,
    default: 30.0,
    description: "Percentage of fare covered by subsidy",
}];

static FUEL_TAX_PARAMETERS: [ParameterDefinition; 1] = [ParameterDefinition {
    lever: Lever::FuelTaxPercent,
    name: "Tax Rate",
    unit: "%",
    min: 0.0,
    max: 100.0,
    default: 20.0,
    description: "Additional tax as percentage of fuel price",
}];

static EV_INCENTIVE_PARAMETERS: [ParameterDefinition; 2] = [
    ParameterDefinition {
        lever: Lever::EvPurchaseSubsidy,
        name: "Purchase Subsidy",
        unit: "currency",
        min: 0.0,
        max: 20000.0,
        default: 5000.0,
        description: "Direct subsidy for EV purchase",
    },
    ParameterDefinition {
        lever: Lever::EvTaxReductionPercent,
        name: "Tax Reduction",
        unit: "%",
        min: 0.0,
        max: 100.0,
        default: 50.0,
        description: "Reduction in vehicle registration tax",
    },
];

static PARKING_POLICY_PARAMETERS: [ParameterDefinition; 2] = [
    ParameterDefinition {
        lever: Lever::ParkingHourlyRate,
        name: "Hourly Rate",
        unit: "currency/hour",
        min: 0.0,
        max: 20.0,
        default: 3.0,
        description: "Parking fee per hour",
    },
    ParameterDefinition {
        lever: Lever::ParkingMaxHours,
        name: "Maximum Duration",
        unit: "hours",
        min: 1.0,
        max: 24.0,
        default: 4.0,
        description: "Maximum allowed parking duration",
    },
];

/// The kinds of policy which can be simulated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum PolicyKind {
    /// Road pricing in congested areas
    CongestionPricing,
    /// Public transit fare subsidy
    PtSubsidy,
    /// Additional tax on fuel
    FuelTax,
    /// Incentives for electric vehicles
    EvIncentive,
    /// Parking pricing and time limits
    ParkingPolicy,
}

impl PolicyKind {
    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            Self::CongestionPricing => "Congestion Pricing",
            Self::PtSubsidy => "Public Transit Subsidy",
            Self::FuelTax => "Fuel Tax",
            Self::EvIncentive => "EV Incentive",
            Self::ParkingPolicy => "Parking Management",
        }
    }

    /// Longer description of the policy
    pub fn description(self) -> &'static str {
        match self {
            Self::CongestionPricing => {
                "Implements road pricing in congested urban areas. Vehicles are charged for \
                entering designated zones, with higher prices during peak hours."
            }
            Self::PtSubsidy => {
                "Government subsidizes public transit fares to increase ridership and reduce \
                private vehicle use. Can be universal or targeted at specific groups."
            }
            Self::FuelTax => {
                "Increases fuel prices through taxation to discourage private vehicle use and \
                generate revenue for sustainable transportation investments."
            }
            Self::EvIncentive => {
                "Provides financial incentives for purchasing electric vehicles, including \
                direct subsidies and tax reductions."
            }
            Self::ParkingPolicy => {
                "Implements parking pricing and time restrictions to manage parking demand and \
                encourage alternative transportation modes."
            }
        }
    }

    /// The category the policy belongs to
    pub fn category(self) -> PolicyCategory {
        match self {
            Self::CongestionPricing | Self::FuelTax | Self::ParkingPolicy => {
                PolicyCategory::Pricing
            }
            Self::PtSubsidy => PolicyCategory::Subsidy,
            Self::EvIncentive => PolicyCategory::Incentive,
        }
    }

    /// The areas the policy is expected to affect
    pub fn impact_areas(self) -> &'static [ImpactArea] {
        use ImpactArea::{Cost, Efficiency, Emissions, Equity, ModeShare};
        match self {
            Self::CongestionPricing => &[ModeShare, Emissions, Efficiency, Equity],
            Self::PtSubsidy => &[ModeShare, Cost, Equity, Emissions],
            Self::FuelTax => &[ModeShare, Emissions, Cost, Equity],
            Self::EvIncentive => &[Emissions, Cost, Equity],
            Self::ParkingPolicy => &[ModeShare, Efficiency, Emissions],
        }
    }

    /// Definitions of the policy's numeric parameters
    pub fn parameter_definitions(self) -> &'static [ParameterDefinition] {
        match self {
            Self::CongestionPricing => &CONGESTION_PRICING_PARAMETERS,
            Self::PtSubsidy => &PT_SUBSIDY_PARAMETERS,
            Self::FuelTax => &FUEL_TAX_PARAMETERS,
            Self::EvIncentive => &EV_INCENTIVE_PARAMETERS,
            Self::ParkingPolicy => &PARKING_POLICY_PARAMETERS,
        }
    }

    /// Create a policy of this kind with default parameters
    pub fn default_policy(self) -> Policy {
        match self {
            Self::CongestionPricing => Policy::CongestionPricing {
                price_per_entry: default_price_per_entry(),
                peak_multiplier: default_peak_multiplier(),
            },
            Self::PtSubsidy => Policy::PtSubsidy {
                subsidy_percent: default_subsidy_percent(),
                target_groups: default_target_groups(),
            },
            Self::FuelTax => Policy::FuelTax {
                tax_percent: default_tax_percent(),
                revenue_for_transit: default_revenue_for_transit(),
            },
            Self::EvIncentive => Policy::EvIncentive {
                purchase_subsidy: default_purchase_subsidy(),
                tax_reduction_percent: default_tax_reduction_percent(),
            },
            Self::ParkingPolicy => Policy::ParkingPolicy {
                hourly_rate: default_hourly_rate(),
                max_hours: default_max_hours(),
            },
        }
    }
}

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_price_per_entry, f64, 5.0);
define_param_default!(default_peak_multiplier, f64, 1.5);
define_param_default!(default_subsidy_percent, f64, 30.0);
define_param_default!(default_target_groups, Vec<TargetGroup>, vec![TargetGroup::All]);
define_param_default!(default_tax_percent, f64, 20.0);
define_param_default!(default_revenue_for_transit, bool, true);
define_param_default!(default_purchase_subsidy, f64, 5000.0);
define_param_default!(default_tax_reduction_percent, f64, 50.0);
define_param_default!(default_hourly_rate, f64, 3.0);
define_param_default!(default_max_hours, f64, 4.0);

/// A transport policy with its parameters.
///
/// In input files, the kind of policy is given by the `type` key. Parameters which are omitted
/// take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Policy {
    /// Road pricing in congested urban areas
    CongestionPricing {
        /// Charge for entering the zone
        #[serde(default = "default_price_per_entry")]
        price_per_entry: f64,
        /// Multiplier applied at peak times
        #[serde(default = "default_peak_multiplier")]
        peak_multiplier: f64,
    },
    /// Subsidised public transit fares
    PtSubsidy {
        /// Percentage of the fare covered
        #[serde(default = "default_subsidy_percent")]
        subsidy_percent: f64,
        /// Who is eligible
        #[serde(default = "default_target_groups")]
        target_groups: Vec<TargetGroup>,
    },
    /// Additional tax on fuel
    FuelTax {
        /// Tax as a percentage of the fuel price
        #[serde(default = "default_tax_percent")]
        tax_percent: f64,
        /// Whether revenue is earmarked for transit
        #[serde(default = "default_revenue_for_transit")]
        revenue_for_transit: bool,
    },
    /// Incentives for electric vehicles
    EvIncentive {
        /// Direct subsidy for purchasing an EV
        #[serde(default = "default_purchase_subsidy")]
        purchase_subsidy: f64,
        /// Reduction in registration tax
        #[serde(default = "default_tax_reduction_percent")]
        tax_reduction_percent: f64,
    },
    /// Parking pricing and time limits
    ParkingPolicy {
        /// Fee per hour
        #[serde(default = "default_hourly_rate")]
        hourly_rate: f64,
        /// Maximum parking duration in hours
        #[serde(default = "default_max_hours")]
        max_hours: f64,
    },
}

impl Policy {
    /// The kind of policy
    pub fn kind(&self) -> PolicyKind {
        match self {
            Self::CongestionPricing { .. } => PolicyKind::CongestionPricing,
            Self::PtSubsidy { .. } => PolicyKind::PtSubsidy,
            Self::FuelTax { .. } => PolicyKind::FuelTax,
            Self::EvIncentive { .. } => PolicyKind::EvIncentive,
            Self::ParkingPolicy { .. } => PolicyKind::ParkingPolicy,
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Longer description of the policy
    pub fn description(&self) -> &'static str {
        self.kind().description()
    }

    /// The category the policy belongs to
    pub fn category(&self) -> PolicyCategory {
        self.kind().category()
    }

    /// The areas the policy is expected to affect
    pub fn impact_areas(&self) -> &'static [ImpactArea] {
        self.kind().impact_areas()
    }

    /// Definitions of the policy's numeric parameters
    pub fn parameter_definitions(&self) -> &'static [ParameterDefinition] {
        self.kind().parameter_definitions()
    }

    /// Convert the policy's parameters into lever values for the simulation models.
    ///
    /// Descriptive parameters (e.g. target groups) do not affect the models and are omitted.
    pub fn get_adjustments(&self) -> PolicyAdjustments {
        let adjustments = PolicyAdjustments::default();
        match *self {
            Self::CongestionPricing {
                price_per_entry,
                peak_multiplier,
            } => adjustments
                .with(Lever::CongestionPrice, price_per_entry)
                .with(Lever::PeakMultiplier, peak_multiplier),
            Self::PtSubsidy {
                subsidy_percent, ..
            } => adjustments.with(Lever::PtSubsidyPercent, subsidy_percent),
            Self::FuelTax { tax_percent, .. } => {
                adjustments.with(Lever::FuelTaxPercent, tax_percent)
            }
            Self::EvIncentive {
                purchase_subsidy,
                tax_reduction_percent,
            } => adjustments
                .with(Lever::EvPurchaseSubsidy, purchase_subsidy)
                .with(Lever::EvTaxReductionPercent, tax_reduction_percent),
            Self::ParkingPolicy {
                hourly_rate,
                max_hours,
            } => adjustments
                .with(Lever::ParkingHourlyRate, hourly_rate)
                .with(Lever::ParkingMaxHours, max_hours),
        }
    }

    /// Check the policy's parameters against their permitted ranges.
    ///
    /// # Returns
    ///
    /// One message for each violated bound (empty if the policy is valid)
    pub fn validate(&self) -> Vec<String> {
        let adjustments = self.get_adjustments();
        let mut errors = Vec::new();
        for definition in self.parameter_definitions() {
            let value = adjustments.get(definition.lever);
            if value.is_nan() {
                errors.push(format!("{} must be a number", definition.lever));
                continue;
            }
            if value < definition.min {
                errors.push(format!("{} must be >= {}", definition.lever, definition.min));
            }
            if value > definition.max {
                errors.push(format!("{} must be <= {}", definition.lever, definition.max));
            }
        }

        errors
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.get_adjustments())?;
        match self {
            Self::PtSubsidy { target_groups, .. } => {
                write!(f, " for {}", target_groups.iter().join(", "))
            }
            Self::FuelTax {
                revenue_for_transit: true,
                ..
            } => write!(f, " with revenue for transit"),
            _ => Ok(()),
        }
    }
}

/// List every kind of policy, with its default parameters
pub fn list_policies() -> impl Iterator<Item = Policy> {
    PolicyKind::iter().map(PolicyKind::default_policy)
}
