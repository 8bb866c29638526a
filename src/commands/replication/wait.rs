use std::{collections::HashSet, time::Duration};

use tracing::debug;

use crate::{
    commands::{blpop::deadline_after, CommandError},
    database::{ClientId, Database},
    resp::RespValue,
    state::{Parked, WaitRequest, WaiterKind},
};

pub struct WaitArguments {
    pub number_of_replicas: usize,
    /// `None` waits without a deadline
    pub timeout: Option<Duration>,
}

impl WaitArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let [number_of_replicas, timeout] = arguments else {
            return Err(CommandError::wrong_arguments("wait"));
        };

        let number_of_replicas = number_of_replicas
            .parse::<usize>()
            .map_err(|_| CommandError::InvalidInteger)?;

        let timeout = match timeout.parse::<u64>() {
            Ok(0) => None,
            Ok(milliseconds) => Some(Duration::from_millis(milliseconds)),
            Err(_) => return Err(CommandError::InvalidTimeout),
        };

        Ok(Self {
            number_of_replicas,
            timeout,
        })
    }
}

#[derive(Debug)]
pub enum WaitOutcome {
    Response(RespValue),
    Blocked(Parked),
}

/// Handles the Redis WAIT command.
///
/// Replies straight away with the replica count when nothing needs waiting
/// for: zero replicas requested, no replicas connected, or no write propagated
/// yet. Otherwise every replica is probed with `REPLCONF GETACK *` and the
/// client is parked until enough replicas acknowledge the current offset or
/// the timeout passes, replying with the number that did.
pub fn wait(
    database: &mut Database,
    client_id: ClientId,
    arguments: &[String],
    can_block: bool,
) -> Result<WaitOutcome, CommandError> {
    let wait_arguments = WaitArguments::parse(arguments)?;

    if !database.server.is_master() {
        return Err(CommandError::InvalidWaitCommandForReplica);
    }

    let connected = database.server.replicas.len();

    if wait_arguments.number_of_replicas == 0 || connected == 0 || database.server.repl_offset == 0
    {
        return Ok(WaitOutcome::Response(RespValue::Integer(connected as i64)));
    }

    let target_offset = database.server.repl_offset;
    let acked_by: HashSet<ClientId> = database
        .server
        .replicas_at_offset(target_offset)
        .into_iter()
        .collect();

    if acked_by.len() >= wait_arguments.number_of_replicas || !can_block {
        return Ok(WaitOutcome::Response(RespValue::Integer(acked_by.len() as i64)));
    }

    database.broadcast_to_replicas(
        RespValue::array_of_bulk_strings(["REPLCONF", "GETACK", "*"]).encode(),
    );

    debug!(
        client_id,
        target_offset,
        required = wait_arguments.number_of_replicas,
        "waiting for replica acknowledgements"
    );

    let deadline = wait_arguments.timeout.map(deadline_after).transpose()?;

    Ok(WaitOutcome::Blocked(database.state.park(
        client_id,
        WaiterKind::Replicas(WaitRequest {
            target_offset,
            required_acks: wait_arguments.number_of_replicas,
            acked_by,
        }),
        deadline,
    )))
}
