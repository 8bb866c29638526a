use crate::{commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue};

pub struct LlenArguments {
    key: String,
}

impl LlenArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let [key] = arguments else {
            return Err(CommandError::wrong_arguments("llen"));
        };

        Ok(Self { key: key.clone() })
    }
}

/// Length of the list at a key, 0 when the key is missing.
pub fn llen(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let llen_arguments = LlenArguments::parse(arguments)?;

    let length = store
        .get_list_mut(&llen_arguments.key)?
        .map(|list| list.len())
        .unwrap_or(0);

    Ok(RespValue::Integer(length as i64))
}
