use tracing::debug;

use crate::{
    commands::{
        command_handler::{CommandResult, ExecutionContext},
        CommandError,
    },
    database::{ClientId, Database},
    resp::RespValue,
};

pub struct ExecArguments;

impl ExecArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if !arguments.is_empty() {
            return Err(CommandError::wrong_arguments("exec"));
        }

        Ok(Self)
    }
}

/// Handles the Redis EXEC command.
///
/// Runs every queued command in order while the caller holds the database, so
/// no other client's command can run in between. Each command fills one slot of
/// the reply array, errors included; a failing command doesn't stop the rest.
pub fn exec(database: &mut Database, client_id: ClientId, arguments: &[String]) -> Result<RespValue, CommandError> {
    ExecArguments::parse(arguments)?;

    let Ok(commands) = database.state.remove_transaction(client_id) else {
        return Err(CommandError::ExecWithoutMulti);
    };

    debug!(client_id, commands = commands.len(), "executing transaction");

    let responses = commands
        .iter()
        .map(|command| {
            match command.execute(database, client_id, ExecutionContext::Transaction) {
                Ok(CommandResult::Response(response)) | Ok(CommandResult::Quit(response)) => response,
                Ok(CommandResult::Responses(responses)) => RespValue::Array(responses),
                // Transaction context never parks and every command has a reply.
                Ok(CommandResult::NoResponse) | Ok(CommandResult::Blocked(_)) => RespValue::NullBulkString,
                Err(e) => e.as_resp(),
            }
        })
        .collect();

    Ok(RespValue::Array(responses))
}
