use crate::{
    commands::command_error::CommandError, database::ClientId, pub_sub::PubSub, resp::RespValue,
};

pub struct SubscribeArguments {
    pub channels: Vec<String>,
}

impl SubscribeArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.is_empty() {
            return Err(CommandError::wrong_arguments("subscribe"));
        }

        Ok(Self {
            channels: arguments.to_vec(),
        })
    }
}

/// Handles the Redis SUBSCRIBE command.
///
/// Produces one `["subscribe", channel, count]` reply per channel, where count
/// is the number of channels the client listens to after that subscription.
pub fn subscribe(
    pub_sub: &mut PubSub,
    client_id: ClientId,
    arguments: &[String],
) -> Result<Vec<RespValue>, CommandError> {
    let subscribe_arguments = SubscribeArguments::parse(arguments)?;

    Ok(subscribe_arguments
        .channels
        .into_iter()
        .map(|channel| {
            let count = pub_sub.subscribe(client_id, &channel);

            RespValue::Array(vec![
                RespValue::bulk_string("subscribe"),
                RespValue::bulk_string(channel),
                RespValue::Integer(count as i64),
            ])
        })
        .collect())
}
