use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::connection::handle_client_connection;
use crate::database::{ClientId, SharedDatabase};

pub const DEFAULT_REPLICATION_ID: &str = "8371b4fb1155b71f4a04d3e1bc3e18c4a990aeeb";

#[derive(Debug, Clone, PartialEq)]
pub enum RedisRole {
    Master,
    Replica { host: String, port: u16 },
}

impl RedisRole {
    pub fn as_string(&self) -> &'static str {
        match self {
            RedisRole::Master => "master",
            RedisRole::Replica { .. } => "slave",
        }
    }
}

/// A replica connection that completed PSYNC, as seen by the master.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicaInfo {
    pub listening_port: Option<u16>,
    pub ack_offset: u64,
}

#[derive(Debug)]
pub struct RedisServer {
    pub port: u16,
    pub role: RedisRole,
    pub repl_id: String,
    /// On a master, bytes of write commands propagated so far. On a replica,
    /// bytes of the replication stream processed so far.
    pub repl_offset: u64,
    pub rdb_directory: String,
    pub rdb_filename: String,
    pub replicas: BTreeMap<ClientId, ReplicaInfo>,
    announced_ports: BTreeMap<ClientId, u16>,
}

impl RedisServer {
    pub fn new(config: &ServerConfig, master_address: Option<(String, u16)>) -> Self {
        let role = match master_address {
            Some((host, port)) => RedisRole::Replica { host, port },
            None => RedisRole::Master,
        };

        RedisServer {
            port: config.port,
            role,
            repl_id: DEFAULT_REPLICATION_ID.to_string(),
            repl_offset: 0,
            rdb_directory: config.dir.clone(),
            rdb_filename: config.dbfilename.clone(),
            replicas: BTreeMap::new(),
            announced_ports: BTreeMap::new(),
        }
    }

    pub fn is_master(&self) -> bool {
        self.role == RedisRole::Master
    }

    /// Remembers the port a connection announced with `REPLCONF listening-port`.
    pub fn announce_listening_port(&mut self, client_id: ClientId, port: u16) {
        self.announced_ports.insert(client_id, port);
    }

    pub fn register_replica(&mut self, client_id: ClientId) {
        let listening_port = self.announced_ports.remove(&client_id);

        self.replicas.insert(
            client_id,
            ReplicaInfo {
                listening_port,
                ack_offset: 0,
            },
        );
    }

    pub fn is_replica(&self, client_id: ClientId) -> bool {
        self.replicas.contains_key(&client_id)
    }

    /// Stores the offset a replica acknowledged. Returns `false` for unknown connections.
    pub fn record_ack(&mut self, client_id: ClientId, offset: u64) -> bool {
        match self.replicas.get_mut(&client_id) {
            Some(replica) => {
                replica.ack_offset = replica.ack_offset.max(offset);
                true
            }
            None => false,
        }
    }

    /// Replicas whose acknowledged offset is at least `offset`.
    pub fn replicas_at_offset(&self, offset: u64) -> Vec<ClientId> {
        self.replicas
            .iter()
            .filter(|(_, replica)| replica.ack_offset >= offset)
            .map(|(client_id, _)| *client_id)
            .collect()
    }

    pub fn remove_client(&mut self, client_id: ClientId) {
        self.replicas.remove(&client_id);
        self.announced_ports.remove(&client_id);
    }
}

/// Accepts connections forever, one task per client.
pub async fn run_server(listener: TcpListener, database: SharedDatabase) -> anyhow::Result<()> {
    info!(address = %listener.local_addr()?, "listening for connections");

    loop {
        match listener.accept().await {
            Ok((stream, address)) => {
                info!(%address, "accepted new connection");
                tokio::spawn(handle_client_connection(stream, Arc::clone(&database)));
            }
            Err(e) => {
                error!("failed to accept connection: {}", e);
            }
        }
    }
}
