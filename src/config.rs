use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("invalid --replicaof value '{0}', expected \"<host> <port>\"")]
    InvalidReplicaOf(String),
}

/// Command line flags of the server.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(author, version, about = "An in-memory Redis-compatible server", long_about = None)]
pub struct ServerConfig {
    /// Port to listen on
    #[arg(long, default_value_t = 6379)]
    pub port: u16,

    /// Run as a replica of the given master, written as "<host> <port>"
    #[arg(long, value_name = "HOST PORT")]
    pub replicaof: Option<String>,

    /// Directory holding the snapshot file
    #[arg(long, default_value = ".")]
    pub dir: String,

    /// Snapshot file name
    #[arg(long, default_value = "dump.rdb")]
    pub dbfilename: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: 6379,
            replicaof: None,
            dir: ".".to_string(),
            dbfilename: "dump.rdb".to_string(),
        }
    }
}

impl ServerConfig {
    /// Host and port of the master, if this server runs as a replica.
    pub fn master_address(&self) -> Result<Option<(String, u16)>, ConfigError> {
        let Some(replicaof) = &self.replicaof else {
            return Ok(None);
        };

        let invalid = || ConfigError::InvalidReplicaOf(replicaof.clone());
        let mut parts = replicaof.split_whitespace();

        let host = parts.next().ok_or_else(invalid)?;
        let port = parts
            .next()
            .and_then(|port| port.parse::<u16>().ok())
            .ok_or_else(invalid)?;

        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Some((host.to_string(), port)))
    }

    pub fn snapshot_path(&self) -> PathBuf {
        PathBuf::from(&self.dir).join(&self.dbfilename)
    }
}
