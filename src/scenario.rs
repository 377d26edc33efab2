//! Scenarios are combinations of policies which are simulated together.
use crate::id::{define_id_getter, define_id_type};
use crate::policy::{Policy, PolicyAdjustments, TargetGroup};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

define_id_type! {ScenarioID}

/// A map of [`Scenario`]s, keyed by scenario ID
pub type ScenarioMap = IndexMap<ScenarioID, Scenario>;

/// A named combination of policies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique name for the scenario (e.g. "green_transport")
    #[serde(rename = "name")]
    pub id: ScenarioID,
    /// A text description of the scenario
    #[serde(default)]
    pub description: String,
    /// The policies making up the scenario. Later policies take precedence.
    #[serde(default)]
    pub policies: Vec<Policy>,
}
define_id_getter! {Scenario, ScenarioID}

impl Scenario {
    /// Combine the adjustments of every policy into one.
    ///
    /// Where more than one policy sets a lever, the value from the later policy is used. Values
    /// are never added together.
    pub fn get_combined_adjustments(&self) -> PolicyAdjustments {
        let mut combined = PolicyAdjustments::default();
        for policy in &self.policies {
            combined.merge(&policy.get_adjustments());
        }

        combined
    }

    /// Validate every policy in the scenario.
    ///
    /// # Returns
    ///
    /// Error messages prefixed with the name of the offending policy (empty if valid)
    pub fn validate(&self) -> Vec<String> {
        self.policies
            .iter()
            .flat_map(|policy| {
                policy
                    .validate()
                    .into_iter()
                    .map(move |error| format!("{}: {error}", policy.name()))
            })
            .collect()
    }
}

/// Scenarios which are always available
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
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BuiltinScenario {
    /// Current conditions
    Baseline,
    /// Aggressive policies to reduce emissions
    GreenTransport,
    /// Policies prioritising affordability
    EquityFocused,
    /// Moderate policies balancing multiple objectives
    Balanced,
}

impl BuiltinScenario {
    /// Build the scenario
    pub fn scenario(self) -> Scenario {
        let (description, policies) = match self {
            Self::Baseline => ("Current conditions with no policy changes.", Vec::new()),
            Self::GreenTransport => (
                "Aggressive policies to reduce transportation emissions.",
                vec![
                    Policy::CongestionPricing {
                        price_per_entry: 8.0,
                        peak_multiplier: 1.5,
                    },
                    Policy::PtSubsidy {
                        subsidy_percent: 50.0,
                        target_groups: vec![TargetGroup::All],
                    },
                    Policy::FuelTax {
                        tax_percent: 30.0,
                        revenue_for_transit: true,
                    },
                ],
            ),
            Self::EquityFocused => (
                "Policies prioritizing transportation affordability for all.",
                vec![Policy::PtSubsidy {
                    subsidy_percent: 70.0,
                    target_groups: vec![
                        TargetGroup::LowIncome,
                        TargetGroup::Students,
                        TargetGroup::Elderly,
                    ],
                }],
            ),
            Self::Balanced => (
                "Moderate policies balancing multiple objectives.",
                vec![
                    Policy::CongestionPricing {
                        price_per_entry: 3.0,
                        peak_multiplier: 1.5,
                    },
                    Policy::PtSubsidy {
                        subsidy_percent: 25.0,
                        target_groups: vec![TargetGroup::All],
                    },
                    Policy::ParkingPolicy {
                        hourly_rate: 2.0,
                        max_hours: 4.0,
                    },
                ],
            ),
        };

        Scenario {
            id: ScenarioID::new(&self.to_string()),
            description: description.to_string(),
            policies,
        }
    }
}
