use crate::{commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue};

/// Handles the Redis ZCARD command. A missing key has zero members.
pub fn zcard(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let [key] = arguments else {
        return Err(CommandError::wrong_arguments("zcard"));
    };

    let count = store.get_sorted_set(key)?.map_or(0, |set| set.len());

    Ok(RespValue::Integer(count as i64))
}
