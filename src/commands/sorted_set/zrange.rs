use crate::{
    commands::{
        command_error::CommandError,
        lrange::{parse_range_indexes, validate_range_indexes},
    },
    key_value_store::KeyValueStore,
    resp::RespValue,
};

pub struct ZrangeArguments {
    key: String,
    start_index: isize,
    end_index: isize,
}

impl ZrangeArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let [key, start_index, end_index] = arguments else {
            return Err(CommandError::wrong_arguments("zrange"));
        };

        let (start_index, end_index) = parse_range_indexes(start_index, end_index)?;

        Ok(Self {
            key: key.clone(),
            start_index,
            end_index,
        })
    }
}

/// Handles the Redis ZRANGE command.
///
/// Indexes into the ordered member list with the same negative index handling
/// as LRANGE and replies with the members only.
pub fn zrange(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let zrange_arguments = ZrangeArguments::parse(arguments)?;

    let Some(set) = store.get_sorted_set(&zrange_arguments.key)? else {
        return Ok(RespValue::Array(Vec::new()));
    };

    let Ok((start, end)) = validate_range_indexes(
        set.len(),
        zrange_arguments.start_index,
        zrange_arguments.end_index,
    ) else {
        return Ok(RespValue::Array(Vec::new()));
    };

    Ok(RespValue::array_of_bulk_strings(
        set.entries()[start..=end]
            .iter()
            .map(|entry| entry.member.clone()),
    ))
}
