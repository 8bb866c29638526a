//! 52-bit geohash scores and great-circle distances for the geo commands.
//!
//! A coordinate pair is turned into a score by bisecting the longitude and latitude
//! ranges 26 times each, emitting one bit per step starting with longitude, most
//! significant bit first. The resulting integer is stored as the member's sorted
//! set score, so decoding returns the centre of the final cell rather than the
//! exact input.

use thiserror::Error;

pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;
pub const MIN_LATITUDE: f64 = -85.05112878;
pub const MAX_LATITUDE: f64 = 85.05112878;

const GEOHASH_BITS: u32 = 52;
const EARTH_RADIUS_IN_METERS: f64 = 6372797.560856;

#[derive(Error, Debug, PartialEq)]
pub enum GeoError {
    #[error("invalid longitude,latitude pair {longitude:.6},{latitude:.6}")]
    InvalidCoordinates { longitude: f64, latitude: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, GeoError> {
        let valid_longitude = (MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude);
        let valid_latitude = (MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude);

        if !valid_longitude || !valid_latitude {
            return Err(GeoError::InvalidCoordinates {
                longitude,
                latitude,
            });
        }

        Ok(Coordinates {
            longitude,
            latitude,
        })
    }
}

/// Encodes a validated coordinate pair into its 52-bit interleaved geohash.
pub fn encode(coordinates: Coordinates) -> u64 {
    let mut longitude_range = (MIN_LONGITUDE, MAX_LONGITUDE);
    let mut latitude_range = (MIN_LATITUDE, MAX_LATITUDE);
    let mut hash = 0u64;

    for step in 0..GEOHASH_BITS {
        let (range, value) = if step % 2 == 0 {
            (&mut longitude_range, coordinates.longitude)
        } else {
            (&mut latitude_range, coordinates.latitude)
        };

        let middle = (range.0 + range.1) / 2.0;
        hash <<= 1;

        if value >= middle {
            hash |= 1;
            range.0 = middle;
        } else {
            range.1 = middle;
        }
    }

    hash
}

/// Decodes a geohash back into the centre of the cell it names.
pub fn decode(hash: u64) -> Coordinates {
    let mut longitude_range = (MIN_LONGITUDE, MAX_LONGITUDE);
    let mut latitude_range = (MIN_LATITUDE, MAX_LATITUDE);

    for step in 0..GEOHASH_BITS {
        let range = if step % 2 == 0 {
            &mut longitude_range
        } else {
            &mut latitude_range
        };

        let middle = (range.0 + range.1) / 2.0;
        let bit = (hash >> (GEOHASH_BITS - 1 - step)) & 1;

        if bit == 1 {
            range.0 = middle;
        } else {
            range.1 = middle;
        }
    }

    Coordinates {
        longitude: (longitude_range.0 + longitude_range.1) / 2.0,
        latitude: (latitude_range.0 + latitude_range.1) / 2.0,
    }
}

pub fn score_from_coordinates(coordinates: Coordinates) -> f64 {
    encode(coordinates) as f64
}

pub fn coordinates_from_score(score: f64) -> Coordinates {
    decode(score as u64)
}

/// Great-circle distance in meters using the haversine formula.
pub fn haversine_distance(from: Coordinates, to: Coordinates) -> f64 {
    let from_latitude = from.latitude.to_radians();
    let to_latitude = to.latitude.to_radians();
    let delta_latitude = (to.latitude - from.latitude).to_radians();
    let delta_longitude = (to.longitude - from.longitude).to_radians();

    let a = (delta_latitude / 2.0).sin().powi(2)
        + from_latitude.cos() * to_latitude.cos() * (delta_longitude / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_IN_METERS * a.sqrt().asin()
}
