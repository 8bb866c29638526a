use crate::{commands::CommandError, key_value_store::KeyValueStore, resp::RespValue};

pub struct TypeArguments {
    key: String,
}

impl TypeArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let [key] = arguments else {
            return Err(CommandError::wrong_arguments("type"));
        };

        Ok(Self { key: key.clone() })
    }
}

/// Replies with `string`, `list`, `stream`, `zset` or `none`.
pub fn type_command(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let type_arguments = TypeArguments::parse(arguments)?;

    let type_name = store
        .get(&type_arguments.key)
        .map(|value| value.data.type_name())
        .unwrap_or("none");

    Ok(RespValue::simple_string(type_name))
}
