use crate::{
    commands::{command_error::CommandError, geo::parse_coordinate},
    geohash::{score_from_coordinates, Coordinates},
    key_value_store::KeyValueStore,
    resp::RespValue,
};

pub struct GeoaddArguments {
    key: String,
    /// (coordinates, member) triples in the order given
    locations: Vec<(Coordinates, String)>,
}

impl GeoaddArguments {
    /// Parses `[key, longitude, latitude, member, ...]`.
    ///
    /// Every pair is validated before anything is stored, so one bad location
    /// rejects the whole command.
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() < 4 || (arguments.len() - 1) % 3 != 0 {
            return Err(CommandError::wrong_arguments("geoadd"));
        }

        let locations = arguments[1..]
            .chunks_exact(3)
            .map(|triple| {
                let longitude = parse_coordinate(&triple[0])?;
                let latitude = parse_coordinate(&triple[1])?;

                Ok((Coordinates::new(longitude, latitude)?, triple[2].clone()))
            })
            .collect::<Result<Vec<_>, CommandError>>()?;

        Ok(Self {
            key: arguments[0].clone(),
            locations,
        })
    }
}

/// Handles the Redis GEOADD command.
///
/// Stores each member in the sorted set at `key` with its 52-bit geohash as
/// score and replies with the number of new members.
pub fn geoadd(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let geoadd_arguments = GeoaddArguments::parse(arguments)?;
    let set = store.get_or_create_sorted_set(&geoadd_arguments.key)?;

    let mut added = 0;

    for (coordinates, member) in geoadd_arguments.locations {
        if set.insert(member, score_from_coordinates(coordinates)) {
            added += 1;
        }
    }

    Ok(RespValue::Integer(added))
}
