//! REPLCONF command implementation for Redis replication configuration.
//!
//! The master receives `listening-port` and `capa` during the handshake and
//! `ACK <offset>` afterwards. The replica receives `GETACK *` over the
//! replication stream and answers with the offset it has applied.

use tracing::debug;

use crate::{
    commands::CommandError,
    database::{ClientId, Database},
    resp::RespValue,
};

enum ReplconfConfiguration {
    ListeningPort(u16),
    Capabilities,
    Ack(u64),
    GetAck,
}

/// Represents the parsed arguments for the REPLCONF command.
pub struct ReplconfArguments {
    configuration: ReplconfConfiguration,
}

impl ReplconfArguments {
    /// Parses and validates arguments for the REPLCONF command.
    ///
    /// # Returns
    ///
    /// * `Ok(ReplconfArguments)` - Successfully parsed arguments
    /// * `Err(CommandError::WrongNumberOfArguments)` - If fewer than 2 arguments are given
    /// * `Err(CommandError::InvalidInteger)` - If a port or offset is not a number
    /// * `Err(CommandError::InvalidReplconfOption)` - If the option is unknown
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() < 2 {
            return Err(CommandError::wrong_arguments("replconf"));
        }

        let configuration = match arguments[0].to_lowercase().as_str() {
            "listening-port" => ReplconfConfiguration::ListeningPort(
                arguments[1]
                    .parse::<u16>()
                    .map_err(|_| CommandError::InvalidInteger)?,
            ),
            "capa" => ReplconfConfiguration::Capabilities,
            "ack" => ReplconfConfiguration::Ack(
                arguments[1]
                    .parse::<u64>()
                    .map_err(|_| CommandError::InvalidInteger)?,
            ),
            "getack" => ReplconfConfiguration::GetAck,
            other => return Err(CommandError::InvalidReplconfOption(other.to_string())),
        };

        Ok(Self { configuration })
    }
}

/// Handles the Redis REPLCONF command.
///
/// # Returns
///
/// * `Ok(Some(RespValue))` - The reply to send back
/// * `Ok(None)` - For `ACK`, which a master never answers
///
/// # Examples
///
/// ```ignore
/// // On a replica that applied 37 bytes: REPLCONF GETACK *
/// // Returns: Ok(Some(["REPLCONF", "ACK", "37"]))
/// ```
pub fn replconf(
    database: &mut Database,
    client_id: ClientId,
    arguments: &[String],
) -> Result<Option<RespValue>, CommandError> {
    let replconf_arguments = ReplconfArguments::parse(arguments)?;

    match replconf_arguments.configuration {
        ReplconfConfiguration::ListeningPort(port) => {
            database.server.announce_listening_port(client_id, port);
            Ok(Some(RespValue::ok()))
        }
        ReplconfConfiguration::Capabilities => Ok(Some(RespValue::ok())),
        ReplconfConfiguration::Ack(offset) => {
            if database.server.record_ack(client_id, offset) {
                debug!(client_id, offset, "replica acknowledged offset");
                database.state.record_replica_ack(client_id, offset);
            }

            Ok(None)
        }
        ReplconfConfiguration::GetAck => Ok(Some(RespValue::array_of_bulk_strings([
            "REPLCONF".to_string(),
            "ACK".to_string(),
            database.server.repl_offset.to_string(),
        ]))),
    }
}
