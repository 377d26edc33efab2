//! Transport modes represent the different ways in which trips are made.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// One of the four canonical transport modes
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
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Mode {
    /// Private cars
    PrivateCar,
    /// Motorcycles and scooters
    Motorcycle,
    /// Buses, trains and other public transport
    PublicTransit,
    /// Active travel
    WalkingCycling,
}

impl Mode {
    /// Whether vehicles of this mode use the road network (and so are affected by congestion)
    pub fn is_road_vehicle(self) -> bool {
        matches!(self, Self::PrivateCar | Self::Motorcycle)
    }
}

/// A map of values keyed by transport mode
pub type ModeMap<T> = IndexMap<Mode, T>;

/// Create a [`ModeMap`] containing every mode, with values given by `f`
pub fn mode_map_from_fn<T, F>(mut f: F) -> ModeMap<T>
where
    F: FnMut(Mode) -> T,
{
    Mode::iter().map(|mode| (mode, f(mode))).collect()
}
