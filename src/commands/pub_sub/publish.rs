use tracing::debug;

use crate::{commands::command_error::CommandError, database::Database, resp::RespValue};

pub struct PublishArguments {
    pub channel: String,
    pub message: String,
}

impl PublishArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let [channel, message] = arguments else {
            return Err(CommandError::wrong_arguments("publish"));
        };

        Ok(Self {
            channel: channel.clone(),
            message: message.clone(),
        })
    }
}

/// Handles the Redis PUBLISH command.
///
/// Queues `["message", channel, payload]` on the outbox of every subscriber and
/// replies with the number of clients it reached.
pub fn publish(database: &Database, arguments: &[String]) -> Result<RespValue, CommandError> {
    let publish_arguments = PublishArguments::parse(arguments)?;

    let message = RespValue::array_of_bulk_strings([
        "message".to_string(),
        publish_arguments.channel.clone(),
        publish_arguments.message,
    ])
    .encode();

    let delivered = database
        .pub_sub
        .subscribers(&publish_arguments.channel)
        .into_iter()
        .filter(|subscriber| database.send_to_client(*subscriber, message.clone()))
        .count();

    debug!(channel = %publish_arguments.channel, delivered, "message published");

    Ok(RespValue::Integer(delivered as i64))
}
