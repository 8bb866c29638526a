//! PSYNC command implementation for Redis replication synchronization.
//!
//! Only full resynchronization is supported: the master always answers with
//! `FULLRESYNC` and ships an empty snapshot.

use bytes::{BufMut, BytesMut};
use tracing::info;

use crate::{
    commands::CommandError,
    database::{ClientId, Database},
    rdb::empty_rdb_file,
    resp::RespValue,
};

/// Represents the parsed arguments for the PSYNC command.
pub struct PsyncArguments {
    /// The replication id the replica knows, "?" on first sync
    _master_repl_id: String,
    /// The replica's offset, -1 on first sync
    _offset: i64,
}

impl PsyncArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let [master_repl_id, offset] = arguments else {
            return Err(CommandError::wrong_arguments("psync"));
        };

        let offset = offset
            .parse::<i64>()
            .map_err(|_| CommandError::InvalidInteger)?;

        Ok(Self {
            _master_repl_id: master_repl_id.clone(),
            _offset: offset,
        })
    }
}

/// Handles the Redis PSYNC command.
///
/// Queues `+FULLRESYNC <repl_id> <offset>` followed by the snapshot transfer
/// (`$<len>\r\n<bytes>`, no trailing CRLF) on the client's outbox, then
/// registers the connection as a replica. From then on it receives every
/// propagated write, in order, on the same outbox.
///
/// Returns nothing to reply with: the connection's replies are already queued.
pub fn psync(database: &mut Database, client_id: ClientId, arguments: &[String]) -> Result<(), CommandError> {
    PsyncArguments::parse(arguments)?;

    if !database.server.is_master() {
        return Err(CommandError::InvalidPsyncForReplica);
    }

    let full_resync = RespValue::simple_string(format!(
        "FULLRESYNC {} {}",
        database.server.repl_id, database.server.repl_offset
    ));

    let snapshot = empty_rdb_file().map_err(|_| CommandError::SnapshotUnavailable)?;
    let mut transfer = BytesMut::with_capacity(snapshot.len() + 16);
    transfer.put_slice(format!("${}\r\n", snapshot.len()).as_bytes());
    transfer.put_slice(&snapshot);

    database.send_to_client(client_id, full_resync.encode());
    database.send_to_client(client_id, transfer.freeze());
    database.server.register_replica(client_id);

    info!(
        client_id,
        offset = database.server.repl_offset,
        "replica registered after full resync"
    );

    Ok(())
}
