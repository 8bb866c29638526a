use crate::{
    commands::CommandError, database::ClientId, resp::RespValue, state::State,
};

pub struct MultiArguments;

impl MultiArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if !arguments.is_empty() {
            return Err(CommandError::wrong_arguments("multi"));
        }

        Ok(Self)
    }
}

/// Opens a transaction for the client. A second MULTI is rejected and leaves
/// the open transaction as it was.
pub fn multi(state: &mut State, client_id: ClientId, arguments: &[String]) -> Result<RespValue, CommandError> {
    MultiArguments::parse(arguments)?;

    state.start_transaction(client_id)?;

    Ok(RespValue::ok())
}
