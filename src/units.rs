//! This module defines various unit types and their conversions.
//!
//! Only the combinations of units which make physical sense have `Mul`/`Div` implementations, so
//! that e.g. a fuel cost can only be computed from a volume of fuel and a price per litre.
use serde::{Deserialize, Serialize};

/// Represents a dimensionless quantity.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    PartialOrd,
    Default,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::Sub,
)]
pub struct Dimensionless(pub f64);

impl std::ops::Mul for Dimensionless {
    type Output = Dimensionless;

    fn mul(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 * rhs.0)
    }
}

impl std::ops::Div for Dimensionless {
    type Output = Dimensionless;

    fn div(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 / rhs.0)
    }
}

impl Dimensionless {
    /// Returns the value as a f64.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Dimensionless {
    fn from(val: f64) -> Self {
        Self(val)
    }
}

impl From<Dimensionless> for f64 {
    fn from(val: Dimensionless) -> Self {
        val.0
    }
}

macro_rules! unit_struct {
    ($name:ident) => {
        /// Represents a type of quantity.
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            PartialOrd,
            Default,
            Serialize,
            Deserialize,
            derive_more::Add,
            derive_more::Sub,
        )]
        pub struct $name(pub f64);

        impl $name {
            /// Returns the value of the unit type as a f64.
            pub fn value(self) -> f64 {
                self.0
            }

            /// Whether the underlying value is finite
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl std::ops::Mul<Dimensionless> for $name {
            type Output = $name;
            fn mul(self, rhs: Dimensionless) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Mul<$name> for Dimensionless {
            type Output = $name;
            fn mul(self, rhs: $name) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Div<Dimensionless> for $name {
            type Output = $name;
            fn div(self, rhs: Dimensionless) -> $name {
                $name(self.0 / rhs.0)
            }
        }

        impl std::ops::Div for $name {
            type Output = Dimensionless;
            fn div(self, rhs: $name) -> Dimensionless {
                Dimensionless(self.0 / rhs.0)
            }
        }

        impl std::iter::Sum for $name {
            fn sum<I: Iterator<Item = $name>>(iter: I) -> $name {
                iter.fold($name(0.0), |acc, x| acc + x)
            }
        }
    };
}

macro_rules! impl_mul {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Mul<$Rhs> for $Lhs {
            type Output = $Out;
            fn mul(self, rhs: $Rhs) -> $Out {
                <$Out>::from_value(self.0 * rhs.0)
            }
        }
        impl std::ops::Mul<$Lhs> for $Rhs {
            type Output = $Out;
            fn mul(self, lhs: $Lhs) -> $Out {
                <$Out>::from_value(self.0 * lhs.0)
            }
        }
    };
}

macro_rules! impl_div {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Div<$Rhs> for $Lhs {
            type Output = $Out;
            fn div(self, rhs: $Rhs) -> $Out {
                <$Out>::from_value(self.0 / rhs.0)
            }
        }
    };
}

/// Construct a unit type from a raw value (used by the `impl_*` macros)
trait FromValue {
    fn from_value(val: f64) -> Self;
}

macro_rules! impl_from_value {
    ($($name:ident),*) => {
        $(
            impl FromValue for $name {
                fn from_value(val: f64) -> Self {
                    $name(val)
                }
            }
        )*
    };
}

// Base quantities
unit_struct!(Money);
unit_struct!(Minutes);
unit_struct!(Hours);
unit_struct!(Kilometres);
unit_struct!(Litres);
unit_struct!(KgCO2);

// Derived quantities
unit_struct!(MoneyPerLitre);
unit_struct!(MoneyPerHour);
unit_struct!(MoneyPerMinute);
unit_struct!(KilometresPerLitre);
unit_struct!(KgCO2PerKilometre);

impl_from_value!(
    Money,
    Minutes,
    Hours,
    Kilometres,
    Litres,
    KgCO2,
    MoneyPerLitre,
    MoneyPerHour,
    MoneyPerMinute,
    KilometresPerLitre,
    KgCO2PerKilometre
);

// Division rules
impl_div!(Kilometres, KilometresPerLitre, Litres);

// Multiplication rules
impl_mul!(Litres, MoneyPerLitre, Money);
impl_mul!(Minutes, MoneyPerMinute, Money);
impl_mul!(Hours, MoneyPerHour, Money);
impl_mul!(Kilometres, KgCO2PerKilometre, KgCO2);

impl MoneyPerHour {
    /// Convert an hourly rate into a per-minute rate
    pub fn per_minute(self) -> MoneyPerMinute {
        MoneyPerMinute(self.0 / 60.0)
    }
}

impl Minutes {
    /// Convert a duration in minutes into hours
    pub fn to_hours(self) -> Hours {
        Hours(self.0 / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_fuel_cost_chain() {
        let litres = Kilometres(12.0) / KilometresPerLitre(12.0);
        assert_eq!(litres, Litres(1.0));
        let cost = litres * MoneyPerLitre(1.2);
        assert_approx_eq!(f64, cost.value(), 1.2);
    }

    #[test]
    fn test_value_of_time() {
        let per_minute = (MoneyPerHour(8.0) * Dimensionless(0.5)).per_minute();
        let cost = Minutes(60.0) * per_minute;
        assert_approx_eq!(f64, cost.value(), 4.0);
    }

    #[test]
    fn test_ratio_is_dimensionless() {
        assert_eq!(Minutes(30.0) / Minutes(60.0), Dimensionless(0.5));
        assert_eq!(Minutes(90.0).to_hours(), Hours(1.5));
    }

    #[test]
    fn test_sum() {
        let total: KgCO2 = [KgCO2(1.0), KgCO2(2.5)].into_iter().sum();
        assert_eq!(total, KgCO2(3.5));
    }
}
