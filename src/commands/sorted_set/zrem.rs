use crate::{commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue};

/// Handles the Redis ZREM command.
///
/// Removes the given members and replies with how many existed. The key is
/// deleted once the set is empty.
pub fn zrem(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let Some((key, members)) = arguments.split_first().filter(|(_, members)| !members.is_empty())
    else {
        return Err(CommandError::wrong_arguments("zrem"));
    };

    let Some(set) = store.get_sorted_set_mut(key)? else {
        return Ok(RespValue::Integer(0));
    };

    let removed = members.iter().filter(|member| set.remove(member)).count();
    store.remove_if_empty_sorted_set(key);

    Ok(RespValue::Integer(removed as i64))
}
