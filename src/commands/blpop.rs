use std::time::Duration;

use tokio::time::Instant;

use crate::{
    commands::command_error::CommandError,
    database::ClientId,
    key_value_store::KeyValueStore,
    state::{Parked, State, WaiterKind},
};

pub struct BlpopArguments {
    keys: Vec<String>,
    timeout: Option<Duration>,
}

impl BlpopArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let Some((timeout, keys)) = arguments.split_last() else {
            return Err(CommandError::wrong_arguments("blpop"));
        };

        if keys.is_empty() {
            return Err(CommandError::wrong_arguments("blpop"));
        }

        Ok(Self {
            keys: keys.to_vec(),
            timeout: parse_timeout_seconds(timeout)?,
        })
    }
}

/// Parses a blocking timeout given in (possibly fractional) seconds. `0` blocks forever.
pub fn parse_timeout_seconds(input: &str) -> Result<Option<Duration>, CommandError> {
    let seconds = input
        .parse::<f64>()
        .map_err(|_| CommandError::InvalidTimeout)?;

    if seconds < 0.0 {
        return Err(CommandError::NegativeTimeout);
    }

    if seconds == 0.0 {
        return Ok(None);
    }

    Duration::try_from_secs_f64(seconds)
        .map(Some)
        .map_err(|_| CommandError::InvalidTimeout)
}

/// Turns a blocking timeout into a deadline, rejecting timeouts the clock cannot represent.
pub(crate) fn deadline_after(timeout: Duration) -> Result<Instant, CommandError> {
    Instant::now()
        .checked_add(timeout)
        .ok_or(CommandError::InvalidTimeout)
}

#[derive(Debug)]
pub enum BlpopOutcome {
    Popped { key: String, value: String },
    Blocked(Parked),
    /// Nothing to pop and blocking is not allowed here.
    Empty,
}

/// Handles the Redis BLPOP command.
///
/// Pops from the first non-empty list among the given keys. When all of them are
/// empty the client is parked on every key until a push serves it or the timeout
/// elapses. Inside a transaction `can_block` is false and an empty result is
/// returned straight away.
pub fn blpop(
    store: &mut KeyValueStore,
    state: &mut State,
    client_id: ClientId,
    arguments: &[String],
    can_block: bool,
) -> Result<BlpopOutcome, CommandError> {
    let blpop_arguments = BlpopArguments::parse(arguments)?;

    for key in &blpop_arguments.keys {
        let Some(list) = store.get_list_mut(key)? else {
            continue;
        };

        if let Some(value) = list.pop_front() {
            store.remove_if_empty_list(key);

            return Ok(BlpopOutcome::Popped {
                key: key.clone(),
                value,
            });
        }
    }

    if !can_block {
        return Ok(BlpopOutcome::Empty);
    }

    let deadline = blpop_arguments.timeout.map(deadline_after).transpose()?;

    Ok(BlpopOutcome::Blocked(state.park(
        client_id,
        WaiterKind::List {
            keys: blpop_arguments.keys,
        },
        deadline,
    )))
}
