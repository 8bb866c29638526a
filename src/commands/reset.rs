use crate::{
    commands::command_error::CommandError,
    database::{ClientId, Database},
    resp::RespValue,
};

/// Handles the Redis RESET command.
///
/// Puts the connection back into its initial state: a pending transaction is
/// discarded and every channel subscription is dropped. Replies `+RESET`.
pub fn reset(
    database: &mut Database,
    client_id: ClientId,
    arguments: &[String],
) -> Result<RespValue, CommandError> {
    if !arguments.is_empty() {
        return Err(CommandError::wrong_arguments("reset"));
    }

    // Nothing to discard is not an error here.
    let _ = database.state.remove_transaction(client_id);
    database.pub_sub.remove_client(client_id);

    Ok(RespValue::simple_string("RESET"))
}
