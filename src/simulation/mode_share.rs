//! Predicts how trips move between modes when prices change, using price elasticities of demand.
use super::round_dp;
use crate::mode::{Mode, ModeMap, mode_map_from_fn};
use crate::parameters::ParameterSet;
use crate::policy::{Lever, PolicyAdjustments};
use log::debug;
use serde::Serialize;

/// How much a congestion charge of one currency unit raises the price of driving (as a fraction)
const CONGESTION_PRICE_TO_PRICE_CHANGE: f64 = 0.1;

/// Cross-elasticities as (affected mode, mode whose price changes, elasticity)
const CROSS_ELASTICITIES: [(Mode, Mode, f64); 2] = [
    (Mode::PrivateCar, Mode::PublicTransit, 0.3),
    (Mode::PublicTransit, Mode::PrivateCar, 0.2),
];

/// Own-price elasticity of demand for each mode
fn own_elasticity(mode: Mode) -> f64 {
    match mode {
        Mode::PrivateCar => -0.3,
        Mode::Motorcycle | Mode::PublicTransit => -0.4,
        Mode::WalkingCycling => -0.1,
    }
}

/// The projected mode shares under a policy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeShareResult {
    /// Mode shares without any policy
    pub baseline_shares: ModeMap<f64>,
    /// Mode shares with the policy in place
    pub projected_shares: ModeMap<f64>,
    /// Percentage change in share of each mode
    pub shift_percentage: ModeMap<f64>,
    /// How the values were calculated
    pub methodology: &'static str,
}

/// Calculates shifts in mode share from policy price changes
pub struct ModeShareModel<'a> {
    params: &'a ParameterSet,
}

impl<'a> ModeShareModel<'a> {
    /// Description of the method used
    pub const METHODOLOGY: &'static str = "Mode shift based on price elasticity: dQ/Q = e x dP/P. \
        Elasticities from transit research literature. \
        Cross-elasticities capture mode substitution effects.";

    /// Create a new [`ModeShareModel`]
    pub fn new(params: &'a ParameterSet) -> Self {
        Self { params }
    }

    /// Calculate projected mode shares after a policy is applied
    pub fn calculate(&self, adjustments: &PolicyAdjustments) -> ModeShareResult {
        let baseline = self.params.mode_share.clone();
        let price_changes = price_changes(adjustments);
        debug!("Price changes by mode: {price_changes:?}");

        // No price change means no change in behaviour
        if price_changes.values().all(|change| *change == 0.0) {
            return ModeShareResult {
                shift_percentage: baseline.keys().map(|mode| (*mode, 0.0)).collect(),
                projected_shares: baseline.clone(),
                baseline_shares: baseline,
                methodology: Self::METHODOLOGY,
            };
        }

        // Own-price effects must be applied before cross-price effects
        let mut projected = baseline.clone();
        for (mode, change) in &price_changes {
            if *change != 0.0 {
                let share = baseline.get(mode).copied().unwrap_or(0.0);
                projected.insert(*mode, share * (1.0 + own_elasticity(*mode) * change));
            }
        }
        for (mode, other, cross_elasticity) in CROSS_ELASTICITIES {
            let change = price_changes[&other];
            if change == 0.0 {
                continue;
            }
            if let Some(share) = projected.get_mut(&mode) {
                *share *= 1.0 + cross_elasticity * change;
            }
        }

        // A large enough price rise would otherwise push a share below zero
        for share in projected.values_mut() {
            *share = share.max(0.0);
        }

        let projected = normalise_shares(projected);
        let shift_percentage = baseline
            .iter()
            .map(|(mode, base)| {
                let new = projected.get(mode).copied().unwrap_or(0.0);
                let shift = if *base > 0.0 {
                    round_dp((new - base) / base * 100.0, 2)
                } else {
                    0.0
                };
                (*mode, shift)
            })
            .collect();

        ModeShareResult {
            baseline_shares: baseline,
            projected_shares: projected,
            shift_percentage,
            methodology: Self::METHODOLOGY,
        }
    }
}

/// Fractional change in the price of each mode caused by a policy
pub fn price_changes(adjustments: &PolicyAdjustments) -> ModeMap<f64> {
    let fuel_tax = adjustments.get(Lever::FuelTaxPercent) / 100.0;
    let pt_subsidy = adjustments.get(Lever::PtSubsidyPercent) / 100.0;
    let congestion_price = adjustments.get(Lever::CongestionPrice);

    mode_map_from_fn(|mode| match mode {
        Mode::PrivateCar if congestion_price > 0.0 => {
            fuel_tax + congestion_price * CONGESTION_PRICE_TO_PRICE_CHANGE
        }
        Mode::PrivateCar | Mode::Motorcycle => fuel_tax,
        Mode::PublicTransit => -pt_subsidy,
        Mode::WalkingCycling => 0.0,
    })
}

/// Smallest rounding residual which is added back onto a share (half of the last decimal place)
const MIN_RESIDUAL: f64 = 0.5e-4;

/// Scale shares so they sum to one, rounded to 4 d.p.
///
/// Any rounding residual is added to the largest share so that the sum is still one. If all
/// shares are zero they are returned unchanged.
fn normalise_shares(mut shares: ModeMap<f64>) -> ModeMap<f64> {
    let total: f64 = shares.values().sum();
    if total <= 0.0 {
        return shares;
    }

    for share in shares.values_mut() {
        *share = round_dp(*share / total, 4);
    }

    // Ignore floating-point noise, which is smaller than the rounding precision
    let residual = 1.0 - shares.values().sum::<f64>();
    if residual.abs() >= MIN_RESIDUAL {
        let largest = shares
            .iter()
            .fold(None, |largest: Option<(Mode, f64)>, (mode, share)| match largest {
                Some((_, value)) if value >= *share => largest,
                _ => Some((*mode, *share)),
            });
        if let Some((mode, _)) = largest {
            shares[&mode] = round_dp(shares[&mode] + residual, 4);
        }
    }

    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{params, subsidy_and_charge};
    use float_cmp::assert_approx_eq;
    use indexmap::indexmap;
    use rstest::rstest;

    fn assert_sums_to_one(shares: &ModeMap<f64>) {
        assert_approx_eq!(f64, shares.values().sum::<f64>(), 1.0, epsilon = 1e-6);
    }

    #[rstest]
    fn test_no_adjustments(params: ParameterSet) {
        let result = ModeShareModel::new(&params).calculate(&PolicyAdjustments::default());
        assert_eq!(result.projected_shares, result.baseline_shares);
        assert_eq!(result.baseline_shares, params.mode_share);
        assert!(result.shift_percentage.values().all(|shift| *shift == 0.0));
        assert_eq!(result.methodology, ModeShareModel::METHODOLOGY);
    }

    #[rstest]
    fn test_irrelevant_levers_have_no_effect(params: ParameterSet) {
        let adjustments = PolicyAdjustments::default()
            .with(Lever::ParkingHourlyRate, 3.0)
            .with(Lever::EvPurchaseSubsidy, 5000.0);
        let result = ModeShareModel::new(&params).calculate(&adjustments);
        assert_eq!(result.projected_shares, params.mode_share);
    }

    #[test]
    fn test_price_changes() {
        let adjustments = PolicyAdjustments::default()
            .with(Lever::FuelTaxPercent, 20.0)
            .with(Lever::PtSubsidyPercent, 50.0)
            .with(Lever::CongestionPrice, 2.0);
        let changes = price_changes(&adjustments);
        assert_approx_eq!(f64, changes[&Mode::PrivateCar], 0.4);
        assert_approx_eq!(f64, changes[&Mode::Motorcycle], 0.2);
        assert_approx_eq!(f64, changes[&Mode::PublicTransit], -0.5);
        assert_eq!(changes[&Mode::WalkingCycling], 0.0);
    }

    #[rstest]
    fn test_subsidy_and_charge(params: ParameterSet, subsidy_and_charge: PolicyAdjustments) {
        let result = ModeShareModel::new(&params).calculate(&subsidy_and_charge);
        let projected = &result.projected_shares;
        assert_sums_to_one(projected);

        // car: 0.45 * (1 - 0.3 * 0.2) * (1 + 0.3 * -0.2) = 0.39762
        // transit: 0.2 * (1 - 0.4 * -0.2) * (1 + 0.2 * 0.2) = 0.22464
        // total: 0.39762 + 0.25 + 0.22464 + 0.1 = 0.97226
        assert_approx_eq!(f64, projected[&Mode::PrivateCar], 0.4090, epsilon = 1e-4);
        assert_approx_eq!(f64, projected[&Mode::Motorcycle], 0.2571, epsilon = 1e-4);
        assert_approx_eq!(f64, projected[&Mode::PublicTransit], 0.2310, epsilon = 1e-4);
        assert_approx_eq!(f64, projected[&Mode::WalkingCycling], 0.1029, epsilon = 1e-4);
        assert!(result.shift_percentage[&Mode::PrivateCar] < 0.0);
        assert!(result.shift_percentage[&Mode::PublicTransit] > 0.0);
        assert_approx_eq!(
            f64,
            result.shift_percentage[&Mode::PublicTransit],
            15.5,
            epsilon = 0.01
        );
    }

    #[rstest]
    fn test_fuel_tax_reduces_car_share(params: ParameterSet) {
        let model = ModeShareModel::new(&params);
        let mut previous = f64::INFINITY;
        for tax in (0..=100).step_by(10) {
            let adjustments = PolicyAdjustments::default().with(Lever::FuelTaxPercent, tax as f64);
            let result = model.calculate(&adjustments);
            assert_sums_to_one(&result.projected_shares);
            let car = result.projected_shares[&Mode::PrivateCar];
            assert!(car < previous, "car share did not fall at tax {tax}%");
            previous = car;
        }
    }

    #[rstest]
    fn test_extreme_charge_clamps_at_zero(params: ParameterSet) {
        let adjustments = PolicyAdjustments::default().with(Lever::CongestionPrice, 50.0);
        let result = ModeShareModel::new(&params).calculate(&adjustments);
        assert_eq!(result.projected_shares[&Mode::PrivateCar], 0.0);
        assert!(result.projected_shares.values().all(|share| *share >= 0.0));
        assert_sums_to_one(&result.projected_shares);
        assert_eq!(result.shift_percentage[&Mode::PrivateCar], -100.0);
    }

    #[rstest]
    fn test_zero_baseline_share(mut params: ParameterSet) {
        params.mode_share = indexmap! {
            Mode::PrivateCar => 0.5,
            Mode::Motorcycle => 0.0,
            Mode::PublicTransit => 0.5,
            Mode::WalkingCycling => 0.0,
        };
        let adjustments = PolicyAdjustments::default().with(Lever::FuelTaxPercent, 50.0);
        let result = ModeShareModel::new(&params).calculate(&adjustments);
        assert_eq!(result.shift_percentage[&Mode::Motorcycle], 0.0);
        assert_eq!(result.projected_shares[&Mode::Motorcycle], 0.0);
        assert_sums_to_one(&result.projected_shares);
    }

    #[rstest]
    fn test_projected_shares_are_rounded(
        params: ParameterSet,
        subsidy_and_charge: PolicyAdjustments,
    ) {
        let result = ModeShareModel::new(&params).calculate(&subsidy_and_charge);
        for share in result.projected_shares.values() {
            assert_eq!(round_dp(*share, 4), *share);
        }
        assert_eq!(result.projected_shares[&Mode::PrivateCar], 0.409);
        assert_sums_to_one(&result.projected_shares);
    }

    #[test]
    fn test_normalise_shares_all_zero() {
        let shares = mode_map_from_fn(|_| 0.0);
        assert_eq!(normalise_shares(shares.clone()), shares);
    }

    #[test]
    fn test_normalise_shares_residual() {
        let shares = mode_map_from_fn(|mode| {
            if mode == Mode::WalkingCycling {
                0.0
            } else {
                1.0
            }
        });
        let normalised = normalise_shares(shares);
        assert_approx_eq!(f64, normalised.values().sum::<f64>(), 1.0, epsilon = 1e-9);

        // The residual goes to the first of the equally large shares
        assert_approx_eq!(f64, normalised[&Mode::PrivateCar], 0.3334, epsilon = 1e-9);
        assert_approx_eq!(f64, normalised[&Mode::Motorcycle], 0.3333, epsilon = 1e-9);
    }
}
