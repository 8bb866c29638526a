use crate::{
    commands::{command_error::CommandError, geo::member_position},
    key_value_store::KeyValueStore,
    resp::RespValue,
};

/// Handles the Redis GEOPOS command.
///
/// Replies with one `[longitude, latitude]` pair per requested member, or a
/// null array in that slot for members (or keys) that don't exist. Positions
/// are the centre of the member's geohash cell.
pub fn geopos(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let Some((key, members)) = arguments.split_first() else {
        return Err(CommandError::wrong_arguments("geopos"));
    };

    let mut positions = Vec::with_capacity(members.len());

    for member in members {
        positions.push(match member_position(store, key, member)? {
            Some(coordinates) => RespValue::array_of_bulk_strings([
                coordinates.longitude.to_string(),
                coordinates.latitude.to_string(),
            ]),
            None => RespValue::NullArray,
        });
    }

    Ok(RespValue::Array(positions))
}
