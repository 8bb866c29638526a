use crate::{
    commands::{
        command_error::CommandError,
        geo::{member_position, parse_coordinate, DistanceUnit},
    },
    geohash::{coordinates_from_score, haversine_distance, Coordinates},
    key_value_store::KeyValueStore,
    resp::RespValue,
};

enum SearchOrigin {
    LonLat(Coordinates),
    Member(String),
}

pub struct GeosearchArguments {
    key: String,
    origin: SearchOrigin,
    radius_in_meters: f64,
}

impl GeosearchArguments {
    /// Parses `key FROMLONLAT lon lat BYRADIUS radius unit` or
    /// `key FROMMEMBER member BYRADIUS radius unit`.
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let Some((key, rest)) = arguments.split_first() else {
            return Err(CommandError::wrong_arguments("geosearch"));
        };

        let (origin, rest) = match rest {
            [option, longitude, latitude, rest @ ..] if option.eq_ignore_ascii_case("fromlonlat") => {
                let coordinates =
                    Coordinates::new(parse_coordinate(longitude)?, parse_coordinate(latitude)?)?;
                (SearchOrigin::LonLat(coordinates), rest)
            }
            [option, member, rest @ ..] if option.eq_ignore_ascii_case("frommember") => {
                (SearchOrigin::Member(member.clone()), rest)
            }
            _ => return Err(CommandError::SyntaxError),
        };

        let radius_in_meters = match rest {
            [option, radius, unit] if option.eq_ignore_ascii_case("byradius") => {
                let radius = parse_coordinate(radius)?;

                if radius < 0.0 {
                    return Err(CommandError::SyntaxError);
                }

                DistanceUnit::parse(unit)?.to_meters(radius)
            }
            _ => return Err(CommandError::SyntaxError),
        };

        Ok(Self {
            key: key.clone(),
            origin,
            radius_in_meters,
        })
    }
}

/// Handles the Redis GEOSEARCH command.
///
/// Replies with the members within the radius of the origin, nearest first.
pub fn geosearch(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let geosearch_arguments = GeosearchArguments::parse(arguments)?;

    let origin = match &geosearch_arguments.origin {
        SearchOrigin::LonLat(coordinates) => *coordinates,
        SearchOrigin::Member(member) => {
            match member_position(store, &geosearch_arguments.key, member)? {
                Some(coordinates) => coordinates,
                None => return Ok(RespValue::Array(Vec::new())),
            }
        }
    };

    let Some(set) = store.get_sorted_set(&geosearch_arguments.key)? else {
        return Ok(RespValue::Array(Vec::new()));
    };

    let mut matches: Vec<(f64, &str)> = set
        .entries()
        .iter()
        .map(|entry| {
            (
                haversine_distance(origin, coordinates_from_score(entry.score)),
                entry.member.as_str(),
            )
        })
        .filter(|(distance, _)| *distance <= geosearch_arguments.radius_in_meters)
        .collect();

    matches.sort_by(|a, b| a.0.total_cmp(&b.0));

    Ok(RespValue::array_of_bulk_strings(
        matches.into_iter().map(|(_, member)| member.to_string()),
    ))
}
