use crate::{commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue};

pub struct GetArguments {
    key: String,
}

impl GetArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let [key] = arguments else {
            return Err(CommandError::wrong_arguments("get"));
        };

        Ok(Self { key: key.clone() })
    }
}

/// Handles the Redis GET command.
///
/// Retrieves the string stored under a key. Expired keys are removed on access
/// and read as missing.
///
/// # Returns
///
/// * `Ok(RespValue::BulkString)` - The stored value
/// * `Ok(RespValue::NullBulkString)` - If the key is missing or expired
/// * `Err(CommandError::InvalidDataTypeForKey)` - If the key holds a non-string value
pub fn get(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let get_arguments = GetArguments::parse(arguments)?;

    let value = store.get_string(&get_arguments.key)?;

    Ok(RespValue::optional_bulk_string(value.cloned()))
}
