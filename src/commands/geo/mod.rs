pub mod geoadd;
pub mod geodist;
pub mod geopos;
pub mod geosearch;

use crate::{
    commands::command_error::CommandError,
    geohash::{coordinates_from_score, Coordinates},
    key_value_store::KeyValueStore,
};

/// Distance units accepted by GEODIST and GEOSEARCH.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistanceUnit {
    Meters,
    Kilometers,
    Miles,
    Feet,
}

impl DistanceUnit {
    pub fn parse(input: &str) -> Result<Self, CommandError> {
        match input.to_lowercase().as_str() {
            "m" => Ok(DistanceUnit::Meters),
            "km" => Ok(DistanceUnit::Kilometers),
            "mi" => Ok(DistanceUnit::Miles),
            "ft" => Ok(DistanceUnit::Feet),
            _ => Err(CommandError::UnsupportedUnit),
        }
    }

    fn meters_per_unit(self) -> f64 {
        match self {
            DistanceUnit::Meters => 1.0,
            DistanceUnit::Kilometers => 1000.0,
            DistanceUnit::Miles => 1609.34,
            DistanceUnit::Feet => 0.3048,
        }
    }

    pub fn from_meters(self, meters: f64) -> f64 {
        meters / self.meters_per_unit()
    }

    pub fn to_meters(self, distance: f64) -> f64 {
        distance * self.meters_per_unit()
    }
}

pub fn parse_coordinate(input: &str) -> Result<f64, CommandError> {
    input
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or(CommandError::InvalidFloat)
}

/// Decoded position of `member`, if the key holds a sorted set containing it.
pub fn member_position(
    store: &mut KeyValueStore,
    key: &str,
    member: &str,
) -> Result<Option<Coordinates>, CommandError> {
    Ok(store
        .get_sorted_set(key)?
        .and_then(|set| set.score(member))
        .map(coordinates_from_score))
}
