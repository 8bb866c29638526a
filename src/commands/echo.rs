use crate::{commands::command_error::CommandError, resp::RespValue};

/// Handles the Redis ECHO command.
///
/// The ECHO command returns the exact string provided as an argument.
/// This is commonly used for testing connectivity and ensuring the Redis
/// server is responding correctly.
///
/// # Arguments
///
/// * `arguments` - A slice containing exactly one string argument to echo back
///
/// # Returns
///
/// * `Ok(RespValue::BulkString)` - The echoed argument
/// * `Err(CommandError::WrongNumberOfArguments)` - If the number of arguments is not exactly 1
pub fn echo(arguments: &[String]) -> Result<RespValue, CommandError> {
    let [message] = arguments else {
        return Err(CommandError::wrong_arguments("echo"));
    };

    Ok(RespValue::bulk_string(message.clone()))
}
