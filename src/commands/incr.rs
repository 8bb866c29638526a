use crate::{
    commands::CommandError,
    key_value_store::{DataType, KeyValueStore, Value},
    resp::RespValue,
};

pub struct IncrArguments {
    key: String,
}

impl IncrArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let [key] = arguments else {
            return Err(CommandError::wrong_arguments("incr"));
        };

        Ok(Self { key: key.clone() })
    }
}

/// Increments the integer stored at a key, treating a missing key as 0.
///
/// The key keeps its expiration. A non-integer value or an overflow is an error.
pub fn incr(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let incr_arguments = IncrArguments::parse(arguments)?;

    let Some(value) = store.get_mut(&incr_arguments.key) else {
        store.insert(
            incr_arguments.key,
            Value::new(DataType::String("1".to_string())),
        );

        return Ok(RespValue::Integer(1));
    };

    let DataType::String(current) = &mut value.data else {
        return Err(CommandError::InvalidDataTypeForKey);
    };

    let incremented = current
        .parse::<i64>()
        .ok()
        .and_then(|number| number.checked_add(1))
        .ok_or(CommandError::InvalidInteger)?;

    *current = incremented.to_string();

    Ok(RespValue::Integer(incremented))
}
