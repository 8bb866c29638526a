use crate::{commands::command_error::CommandError, resp::RespValue};

/// PING while subscribed replies `["pong", message]`, the message defaulting to "".
pub fn subscribed_ping(arguments: &[String]) -> Result<RespValue, CommandError> {
    let message = match arguments {
        [] => String::new(),
        [message] => message.clone(),
        _ => return Err(CommandError::wrong_arguments("ping")),
    };

    Ok(RespValue::array_of_bulk_strings(["pong".to_string(), message]))
}
