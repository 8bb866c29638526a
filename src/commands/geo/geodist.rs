use crate::{
    commands::{
        command_error::CommandError,
        geo::{member_position, DistanceUnit},
    },
    geohash::haversine_distance,
    key_value_store::KeyValueStore,
    resp::RespValue,
};

pub struct GeodistArguments {
    key: String,
    from: String,
    to: String,
    unit: DistanceUnit,
}

impl GeodistArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let (key, from, to, unit) = match arguments {
            [key, from, to] => (key, from, to, DistanceUnit::Meters),
            [key, from, to, unit] => (key, from, to, DistanceUnit::parse(unit)?),
            _ => return Err(CommandError::wrong_arguments("geodist")),
        };

        Ok(Self {
            key: key.clone(),
            from: from.clone(),
            to: to.clone(),
            unit,
        })
    }
}

/// Handles the Redis GEODIST command.
///
/// Replies with the distance between two members with four decimals, or the
/// null bulk string if either member is missing.
pub fn geodist(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let geodist_arguments = GeodistArguments::parse(arguments)?;

    let from = member_position(store, &geodist_arguments.key, &geodist_arguments.from)?;
    let to = member_position(store, &geodist_arguments.key, &geodist_arguments.to)?;

    let distance = from.zip(to).map(|(from, to)| {
        format!(
            "{:.4}",
            geodist_arguments
                .unit
                .from_meters(haversine_distance(from, to))
        )
    });

    Ok(RespValue::optional_bulk_string(distance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::geo::geoadd::geoadd;

    #[test]
    fn test_geodist() {
        let mut store = KeyValueStore::new();
        geoadd(
            &mut store,
            &[
                "Sicily", "13.361389", "38.115556", "Palermo", "15.087269", "37.502669", "Catania",
            ]
            .map(String::from),
        )
        .unwrap();

        let mut distance = |arguments: &[&str]| {
            let arguments: Vec<String> = arguments.iter().map(|value| value.to_string()).collect();
            geodist(&mut store, &arguments)
        };

        let Ok(RespValue::BulkString(meters)) = distance(&["Sicily", "Palermo", "Catania"]) else {
            panic!("expected a distance");
        };
        let meters: f64 = String::from_utf8_lossy(&meters).parse().unwrap();
        assert!((meters - 166274.1516).abs() < 1.0, "distance {}", meters);

        let Ok(RespValue::BulkString(kilometers)) =
            distance(&["Sicily", "Palermo", "Catania", "km"])
        else {
            panic!("expected a distance");
        };
        assert!(String::from_utf8_lossy(&kilometers).starts_with("166.27"));

        assert_eq!(
            distance(&["Sicily", "Palermo", "Rome"]),
            Ok(RespValue::NullBulkString)
        );
        assert_eq!(
            distance(&["Sicily", "Palermo", "Catania", "yd"]),
            Err(CommandError::UnsupportedUnit)
        );
    }
}
