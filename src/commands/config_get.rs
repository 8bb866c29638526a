use crate::{commands::CommandError, resp::RespValue, server::RedisServer};

pub struct ConfigGetArguments {
    pub parameters: Vec<String>,
}

impl ConfigGetArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.is_empty() {
            return Err(CommandError::wrong_arguments("config|get"));
        }

        Ok(ConfigGetArguments {
            parameters: arguments.to_vec(),
        })
    }
}

/// Replies with a flat `[name, value, ...]` array. Unknown parameters are left out.
pub fn config_get(server: &RedisServer, arguments: &[String]) -> Result<RespValue, CommandError> {
    let config_get_arguments = ConfigGetArguments::parse(arguments)?;
    let mut response = Vec::new();

    for parameter in config_get_arguments.parameters {
        let value = match parameter.to_lowercase().as_str() {
            "dir" => server.rdb_directory.clone(),
            "dbfilename" => server.rdb_filename.clone(),
            _ => continue,
        };

        response.push(RespValue::bulk_string(parameter.to_lowercase()));
        response.push(RespValue::bulk_string(value));
    }

    Ok(RespValue::Array(response))
}
