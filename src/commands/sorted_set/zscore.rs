use crate::{
    commands::{command_error::CommandError, sorted_set::format_score},
    key_value_store::KeyValueStore,
    resp::RespValue,
};

/// Handles the Redis ZSCORE command: the member's score as a bulk string, or null.
pub fn zscore(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let [key, member] = arguments else {
        return Err(CommandError::wrong_arguments("zscore"));
    };

    let score = store
        .get_sorted_set(key)?
        .and_then(|set| set.score(member))
        .map(format_score);

    Ok(RespValue::optional_bulk_string(score))
}
