use jiff::Timestamp;

use crate::{
    commands::{command_error::CommandError, stream_utils::stream_read_to_resp},
    key_value_store::KeyValueStore,
    resp::RespValue,
    state::State,
    stream::{Stream, StreamFields, StreamId, StreamIdError},
};

/// Represents the parsed arguments for XADD command
pub struct XaddArguments {
    /// The stream key
    key: String,
    /// Requested id: `*`, `<ms>-*` or `<ms>-<seq>`
    id: String,
    /// Field/value pairs in the order given
    fields: StreamFields,
}

impl XaddArguments {
    /// Parses `[key, id, field, value, ...]`. At least one field/value pair is required.
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() < 4 || arguments.len() % 2 != 0 {
            return Err(CommandError::wrong_arguments("xadd"));
        }

        let fields = arguments[2..]
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect();

        Ok(Self {
            key: arguments[0].clone(),
            id: arguments[1].clone(),
            fields,
        })
    }
}

/// Handles the Redis XADD command.
///
/// Resolves the requested id, appends the entry and replies with the id as a
/// bulk string. A rejected id leaves the keyspace untouched, so XADD on a
/// missing key with a bad id does not create the stream.
///
/// The oldest parked XREAD client whose start id is below the new id receives
/// exactly the new entry. Other parked readers stay parked.
pub fn xadd(
    store: &mut KeyValueStore,
    state: &mut State,
    arguments: &[String],
) -> Result<RespValue, CommandError> {
    let xadd_arguments = XaddArguments::parse(arguments)?;
    let now_ms = u64::try_from(Timestamp::now().as_millisecond()).unwrap_or(0);

    let (id, last_id) = match store.get_stream(&xadd_arguments.key)? {
        Some(stream) => (
            stream.resolve_id(&xadd_arguments.id, now_ms)?,
            stream.last_id(),
        ),
        None => (Stream::new().resolve_id(&xadd_arguments.id, now_ms)?, None),
    };

    if id == StreamId::MIN {
        return Err(StreamIdError::ZeroId.into());
    }

    if last_id.is_some_and(|last| id <= last) {
        return Err(StreamIdError::NotGreaterThanTop.into());
    }

    store
        .get_or_create_stream(&xadd_arguments.key)?
        .append(id, xadd_arguments.fields.clone())?;

    wake_stream_reader(state, &xadd_arguments.key, id, &xadd_arguments.fields);

    Ok(RespValue::bulk_string(id.to_string()))
}

fn wake_stream_reader(state: &mut State, key: &str, id: StreamId, fields: &StreamFields) {
    let reply = RespValue::Array(vec![stream_read_to_resp(key, &[(id, fields)])]);

    for (waiter_id, start) in state.stream_waiters(key) {
        if id > start && state.resolve(waiter_id, reply.clone()) {
            break;
        }
    }
}
