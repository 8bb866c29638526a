use thiserror::Error;

use crate::geohash::GeoError;
use crate::resp::RespValue;
use crate::state::StateError;
use crate::stream::StreamIdError;

/// Errors a command can fail with. The `Display` text is the exact error line
/// sent back to the client, prefix included.
#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("ERR invalid command format")]
    InvalidCommand,
    #[error("ERR invalid command argument")]
    InvalidCommandArgument,
    #[error("ERR unknown command '{0}'")]
    UnknownCommand(String),
    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongNumberOfArguments(String),
    #[error("ERR syntax error")]
    SyntaxError,
    #[error("ERR value is not an integer or out of range")]
    InvalidInteger,
    #[error("ERR value is not a valid float")]
    InvalidFloat,
    #[error("ERR timeout is not a float or out of range")]
    InvalidTimeout,
    #[error("ERR timeout is negative")]
    NegativeTimeout,
    #[error("ERR invalid expire time in 'set' command")]
    InvalidSetCommandExpiration,
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    InvalidDataTypeForKey,
    #[error("ERR {0}")]
    InvalidStreamId(#[from] StreamIdError),
    #[error("ERR Unbalanced 'xread' list of streams: for each stream key an ID or '$' must be specified.")]
    UnbalancedXReadStreams,
    #[error("ERR {0}")]
    InvalidCoordinates(#[from] GeoError),
    #[error("ERR unsupported unit provided. please use M, KM, FT, MI")]
    UnsupportedUnit,
    #[error("ERR {0}")]
    TransactionError(#[from] StateError),
    #[error("ERR EXEC without MULTI")]
    ExecWithoutMulti,
    #[error("ERR DISCARD without MULTI")]
    DiscardWithoutMulti,
    #[error("ERR Can't execute '{0}': only (P|S)SUBSCRIBE / (P|S)UNSUBSCRIBE / PING / QUIT / RESET are allowed in this context")]
    SubscribedMode(String),
    #[error("READONLY You can't write against a read only replica.")]
    ReplicaReadOnlyCommands,
    #[error("ERR Unrecognized REPLCONF option: {0}")]
    InvalidReplconfOption(String),
    #[error("ERR PSYNC is not supported by replica instances")]
    InvalidPsyncForReplica,
    #[error("ERR WAIT cannot be used with replica instances")]
    InvalidWaitCommandForReplica,
    #[error("ERR Unknown subcommand or wrong number of arguments for '{0}'")]
    UnknownSubcommand(String),
    #[error("ERR invalid pattern '{0}'")]
    InvalidPattern(String),
    #[error("ERR failed to prepare snapshot for full resync")]
    SnapshotUnavailable,
}

impl CommandError {
    pub fn wrong_arguments(command: &str) -> Self {
        CommandError::WrongNumberOfArguments(command.to_lowercase())
    }

    pub fn as_resp(&self) -> RespValue {
        RespValue::Error(self.to_string())
    }

    pub fn as_string(&self) -> String {
        self.as_resp().encode_to_string()
    }
}
