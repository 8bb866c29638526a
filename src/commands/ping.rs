use crate::{commands::command_error::CommandError, resp::RespValue};

pub struct PingArguments {
    message: Option<String>,
}

impl PingArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        match arguments {
            [] => Ok(Self { message: None }),
            [message] => Ok(Self {
                message: Some(message.clone()),
            }),
            _ => Err(CommandError::wrong_arguments("ping")),
        }
    }
}

/// Replies `+PONG`, or echoes the optional message back as a bulk string.
pub fn ping(arguments: &[String]) -> Result<RespValue, CommandError> {
    let ping_arguments = PingArguments::parse(arguments)?;

    match ping_arguments.message {
        Some(message) => Ok(RespValue::bulk_string(message)),
        None => Ok(RespValue::simple_string("PONG")),
    }
}
