use crate::{database::ClientId, pub_sub::PubSub, resp::RespValue};

/// Handles the Redis UNSUBSCRIBE command.
///
/// Without arguments the client leaves every channel. Each channel left gets an
/// `["unsubscribe", channel, remaining]` reply. A client with nothing to leave
/// gets a single reply with a null channel.
pub fn unsubscribe(pub_sub: &mut PubSub, client_id: ClientId, arguments: &[String]) -> Vec<RespValue> {
    let channels = if arguments.is_empty() {
        pub_sub.channels_of(client_id)
    } else {
        arguments.to_vec()
    };

    if channels.is_empty() {
        return vec![RespValue::Array(vec![
            RespValue::bulk_string("unsubscribe"),
            RespValue::NullBulkString,
            RespValue::Integer(0),
        ])];
    }

    channels
        .into_iter()
        .map(|channel| {
            let remaining = pub_sub.unsubscribe(client_id, &channel);

            RespValue::Array(vec![
                RespValue::bulk_string("unsubscribe"),
                RespValue::bulk_string(channel),
                RespValue::Integer(remaining as i64),
            ])
        })
        .collect()
}
