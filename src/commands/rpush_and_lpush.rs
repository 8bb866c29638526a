use std::collections::VecDeque;

use crate::{
    commands::command_error::CommandError,
    key_value_store::KeyValueStore,
    resp::RespValue,
    state::State,
};

pub struct PushArrayOperations {
    key: String,
    values: Vec<String>,
}

impl PushArrayOperations {
    pub fn parse(arguments: &[String], should_prepend: bool) -> Result<Self, CommandError> {
        if arguments.len() < 2 {
            return Err(CommandError::wrong_arguments(if should_prepend {
                "lpush"
            } else {
                "rpush"
            }));
        }

        Ok(Self {
            key: arguments[0].clone(),
            values: arguments[1..].to_vec(),
        })
    }
}

/// What a push did, beyond its reply.
#[derive(Debug, PartialEq)]
pub struct PushOutcome {
    pub key: String,
    /// Length of the list after parked BLPOP clients took their elements.
    pub length: usize,
    /// Number of elements handed straight to parked BLPOP clients.
    pub served_waiters: usize,
}

impl PushOutcome {
    pub fn response(&self) -> RespValue {
        RespValue::Integer(self.length as i64)
    }
}

pub fn rpush(
    store: &mut KeyValueStore,
    state: &mut State,
    arguments: &[String],
) -> Result<PushOutcome, CommandError> {
    push_array_operations(store, state, arguments, false)
}

pub fn lpush(
    store: &mut KeyValueStore,
    state: &mut State,
    arguments: &[String],
) -> Result<PushOutcome, CommandError> {
    push_array_operations(store, state, arguments, true)
}

/// Pushes every value, then serves parked BLPOP clients oldest first, one
/// element each, before the resulting length is measured.
fn push_array_operations(
    store: &mut KeyValueStore,
    state: &mut State,
    arguments: &[String],
    should_prepend: bool,
) -> Result<PushOutcome, CommandError> {
    let push_array_arguments = PushArrayOperations::parse(arguments, should_prepend)?;
    let key = push_array_arguments.key;

    let list = store.get_or_create_list(&key)?;
    add_values_to_list(list, &push_array_arguments.values, should_prepend);

    let served_waiters = serve_blocked_clients(&key, list, state);
    let length = list.len();

    store.remove_if_empty_list(&key);

    Ok(PushOutcome {
        key,
        length,
        served_waiters,
    })
}

fn add_values_to_list(list: &mut VecDeque<String>, values: &[String], should_prepend: bool) {
    for value in values {
        if should_prepend {
            list.push_front(value.clone());
        } else {
            list.push_back(value.clone());
        }
    }
}

fn serve_blocked_clients(key: &str, list: &mut VecDeque<String>, state: &mut State) -> usize {
    let mut served = 0;

    while let Some(waiter_id) = state.oldest_list_waiter(key) {
        let Some(value) = list.pop_front() else {
            break;
        };

        let reply = RespValue::array_of_bulk_strings([key.to_string(), value.clone()]);

        if state.resolve(waiter_id, reply) {
            served += 1;
        } else {
            list.push_front(value);
        }
    }

    served
}
