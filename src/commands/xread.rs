use std::time::Duration;

use crate::{
    commands::{
        blpop::deadline_after, command_error::CommandError, stream_utils::stream_read_to_resp,
    },
    database::ClientId,
    key_value_store::KeyValueStore,
    resp::RespValue,
    state::{Parked, State, WaiterKind},
    stream::StreamId,
};

/// Represents the parsed arguments for the XREAD command.
///
/// Format: `XREAD [BLOCK milliseconds] STREAMS key1 key2 ... id1 id2 ...`
pub struct XreadArguments {
    /// Blocking duration in milliseconds. `Some(0)` blocks without a deadline.
    blocking_duration: Option<u64>,
    /// (key, id) pairs. The id is kept raw because `$` is resolved against the
    /// stream at execution time.
    key_stream_pairs: Vec<(String, String)>,
}

impl XreadArguments {
    /// Parses command arguments into structured XreadArguments.
    ///
    /// # Returns
    ///
    /// * `Ok(XreadArguments)` - Successfully parsed arguments
    /// * `Err(CommandError::WrongNumberOfArguments)` - If fewer than 3 arguments are given
    /// * `Err(CommandError::InvalidInteger)` - If the block duration is not a number
    /// * `Err(CommandError::SyntaxError)` - If `STREAMS` is missing
    /// * `Err(CommandError::UnbalancedXReadStreams)` - If keys and ids don't pair up
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Blocking: XREAD BLOCK 1000 STREAMS mystream $
    /// let args = XreadArguments::parse(&[
    ///     "BLOCK".to_string(),
    ///     "1000".to_string(),
    ///     "STREAMS".to_string(),
    ///     "mystream".to_string(),
    ///     "$".to_string()
    /// ])?;
    /// ```
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() < 3 {
            return Err(CommandError::wrong_arguments("xread"));
        }

        let (blocking_duration, start_data_index) = match arguments[0].to_lowercase().as_str() {
            "block" => {
                let duration_ms = arguments[1]
                    .parse::<u64>()
                    .map_err(|_| CommandError::InvalidInteger)?;

                if !arguments[2].eq_ignore_ascii_case("streams") {
                    return Err(CommandError::SyntaxError);
                }

                (Some(duration_ms), 3)
            }
            "streams" => (None, 1),
            _ => return Err(CommandError::SyntaxError),
        };

        let data = &arguments[start_data_index..];

        if data.is_empty() || data.len() % 2 != 0 {
            return Err(CommandError::UnbalancedXReadStreams);
        }

        let (keys, ids) = data.split_at(data.len() / 2);
        let key_stream_pairs = keys.iter().cloned().zip(ids.iter().cloned()).collect();

        Ok(Self {
            blocking_duration,
            key_stream_pairs,
        })
    }
}

#[derive(Debug)]
pub enum XreadOutcome {
    Response(RespValue),
    Blocked(Parked),
}

/// Handles the Redis XREAD command.
///
/// Replies with `[[key, [entries...]], ...]` for every stream that has entries
/// after the given id, or a null array when none has. With `BLOCK` and nothing
/// to read, the client is parked until an XADD delivers an entry or the
/// deadline passes. `can_block` is false inside a transaction, where an empty
/// read replies with a null array straight away.
pub fn xread(
    store: &mut KeyValueStore,
    state: &mut State,
    client_id: ClientId,
    arguments: &[String],
    can_block: bool,
) -> Result<XreadOutcome, CommandError> {
    let xread_arguments = XreadArguments::parse(arguments)?;
    let starts = resolve_start_ids(store, &xread_arguments.key_stream_pairs)?;

    let mut streams = Vec::new();

    for (key, start) in &starts {
        if let Some(stream) = store.get_stream(key)? {
            let entries = stream.entries_after(*start);

            if !entries.is_empty() {
                streams.push(stream_read_to_resp(key, &entries));
            }
        }
    }

    if !streams.is_empty() {
        return Ok(XreadOutcome::Response(RespValue::Array(streams)));
    }

    match xread_arguments.blocking_duration {
        Some(duration_ms) if can_block => {
            let deadline = (duration_ms > 0)
                .then(|| deadline_after(Duration::from_millis(duration_ms)))
                .transpose()?;

            Ok(XreadOutcome::Blocked(state.park(
                client_id,
                WaiterKind::Stream { starts },
                deadline,
            )))
        }
        _ => Ok(XreadOutcome::Response(RespValue::NullArray)),
    }
}

/// Turns every requested id into a concrete exclusive start. `$` means the
/// stream's current last id, or `0-0` for a missing or empty stream.
fn resolve_start_ids(
    store: &mut KeyValueStore,
    key_stream_pairs: &[(String, String)],
) -> Result<Vec<(String, StreamId)>, CommandError> {
    key_stream_pairs
        .iter()
        .map(|(key, id)| {
            let start = match id.as_str() {
                "$" => store
                    .get_stream(key)?
                    .and_then(|stream| stream.last_id())
                    .unwrap_or(StreamId::MIN),
                _ => StreamId::parse_range_start(id)?,
            };

            Ok((key.clone(), start))
        })
        .collect()
}
