use crate::{
    commands::CommandError, database::ClientId, resp::RespValue, state::State,
};

pub struct DiscardArguments;

impl DiscardArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if !arguments.is_empty() {
            return Err(CommandError::wrong_arguments("discard"));
        }

        Ok(Self)
    }
}

pub fn discard(state: &mut State, client_id: ClientId, arguments: &[String]) -> Result<RespValue, CommandError> {
    DiscardArguments::parse(arguments)?;

    let Ok(_) = state.remove_transaction(client_id) else {
        return Err(CommandError::DiscardWithoutMulti);
    };

    Ok(RespValue::ok())
}
