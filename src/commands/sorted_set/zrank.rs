use crate::{commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue};

/// Handles the Redis ZRANK command.
///
/// Replies with the member's zero-based position in ascending `(score, member)`
/// order, or the null bulk string if the key or member doesn't exist.
pub fn zrank(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let [key, member] = arguments else {
        return Err(CommandError::wrong_arguments("zrank"));
    };

    match store.get_sorted_set(key)?.and_then(|set| set.rank(member)) {
        Some(rank) => Ok(RespValue::Integer(rank as i64)),
        None => Ok(RespValue::NullBulkString),
    }
}
