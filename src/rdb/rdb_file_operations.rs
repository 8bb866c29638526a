use std::io::ErrorKind;
use std::path::Path;

use tracing::info;

use crate::key_value_store::Value;
use crate::rdb::rdb_parser::{parse_rdb, RdbError};

/// Snapshot sent to replicas on a full resynchronization: a valid RDB file
/// holding no keys.
const EMPTY_RDB_FILE_HEX: &str = "524544495330303131fa0972656469732d76657205372e322e30fa0a72656469732d62697473c040fa056374696d65c26d08bc65fa08757365642d6d656dc2b0c41000fa08616f662d62617365c000fff06e3bfec0ff5aa2";

pub fn empty_rdb_file() -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(EMPTY_RDB_FILE_HEX)
}

/// Reads and parses the snapshot at `path`, returning its keys.
pub async fn load_rdb_file(path: &Path) -> Result<Vec<(String, Value)>, RdbError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => RdbError::FileNotFound(path.display().to_string()),
        _ => RdbError::Io(e.to_string()),
    })?;

    let snapshot = parse_rdb(&bytes)?;
    info!(
        path = %path.display(),
        version = snapshot.version,
        keys = snapshot.entries.len(),
        "loaded snapshot"
    );

    Ok(snapshot.entries)
}
