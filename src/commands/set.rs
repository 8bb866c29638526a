use jiff::{SignedDuration, Timestamp};

use crate::{
    commands::command_error::CommandError,
    key_value_store::{DataType, KeyValueStore, Value},
    resp::RespValue,
};

/// Represents the parsed arguments for SET command
pub struct SetArguments {
    /// The key name to store the value under
    key: String,
    /// The value to be stored under the given key
    value: String,
    /// Expiration of key value pair
    expiration: Option<Timestamp>,
}

impl SetArguments {
    /// Parses command arguments into a SetArguments structure.
    ///
    /// This function validates and processes the arguments for the SET command,
    /// which supports both permanent and expiring key-value storage.
    ///
    /// # Arguments
    ///
    /// * `arguments` - The command arguments:
    ///   - Format 1: `[key, value]` - For permanent storage
    ///   - Format 2: `[key, value, "PX", milliseconds]` - Expires after the given milliseconds
    ///   - Format 3: `[key, value, "EX", seconds]` - Expires after the given seconds
    ///
    /// # Returns
    ///
    /// * `Ok(SetArguments)` - Successfully parsed arguments containing:
    ///   - `key`: The key name for storage
    ///   - `value`: The value to be stored
    ///   - `expiration`: Optional absolute expiration computed as `now + duration`
    /// * `Err(CommandError::WrongNumberOfArguments)` - If the number of arguments is not 2 or 4
    /// * `Err(CommandError::SyntaxError)` - If the expiration option is neither "PX" nor "EX"
    /// * `Err(CommandError::InvalidInteger)` - If the expiration time is not a valid integer
    /// * `Err(CommandError::InvalidSetCommandExpiration)` - If the expiration time is zero or too large
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // SET with expiration (expires in 1000ms)
    /// let result = SetArguments::parse(&[
    ///     "mykey".to_string(),
    ///     "hello".to_string(),
    ///     "PX".to_string(),
    ///     "1000".to_string()
    /// ]);
    /// // Returns: Ok(SetArguments { key: "mykey", value: "hello", expiration: Some(now + 1s) })
    /// ```
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 2 && arguments.len() != 4 {
            return Err(CommandError::wrong_arguments("set"));
        }

        let mut expiration: Option<Timestamp> = None;

        if arguments.len() == 4 {
            let amount = arguments[3]
                .parse::<i64>()
                .map_err(|_| CommandError::InvalidInteger)?;

            let milliseconds = match arguments[2].to_lowercase().as_str() {
                "px" => Some(amount),
                "ex" => amount.checked_mul(1000),
                _ => return Err(CommandError::SyntaxError),
            };

            let expires_at = milliseconds
                .filter(|milliseconds| *milliseconds > 0)
                .and_then(|milliseconds| {
                    Timestamp::now()
                        .checked_add(SignedDuration::from_millis(milliseconds))
                        .ok()
                })
                .ok_or(CommandError::InvalidSetCommandExpiration)?;

            expiration = Some(expires_at);
        }

        Ok(Self {
            key: arguments[0].clone(),
            value: arguments[1].clone(),
            expiration,
        })
    }
}

/// Handles the Redis SET command.
///
/// Stores a key-value pair in the key-value store with optional expiration,
/// replacing whatever the key held before, whatever its type.
///
/// # Arguments
///
/// * `store` - The key-value store
/// * `arguments` - Either `[key, value]` or `[key, value, "PX"|"EX", amount]`
///
/// # Returns
///
/// * `Ok(RespValue::SimpleString("OK"))` on success
/// * `Err(CommandError)` - If the arguments are invalid, see [`SetArguments::parse`]
pub fn set(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let set_arguments = SetArguments::parse(arguments)?;

    store.insert(
        set_arguments.key,
        Value::with_expiration(
            DataType::String(set_arguments.value),
            set_arguments.expiration,
        ),
    );

    Ok(RespValue::ok())
}
