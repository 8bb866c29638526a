use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

use crate::key_value_store::KeyValueStore;
use crate::pub_sub::PubSub;
use crate::server::RedisServer;
use crate::state::State;

pub type ClientId = u64;

/// The whole server state behind one lock. Every command runs while holding it,
/// which makes each command atomic with respect to all others.
pub type SharedDatabase = Arc<Mutex<Database>>;

/// A connected client, as far as other connections are concerned.
#[derive(Debug)]
pub struct ClientHandle {
    pub address: String,
    /// Outbox drained by the connection's writer task.
    pub sender: mpsc::UnboundedSender<Bytes>,
}

#[derive(Debug)]
pub struct Database {
    pub store: KeyValueStore,
    pub state: State,
    pub server: RedisServer,
    pub pub_sub: PubSub,
    pub clients: HashMap<ClientId, ClientHandle>,
    next_client_id: ClientId,
}

impl Database {
    pub fn new(server: RedisServer) -> Self {
        Database {
            store: KeyValueStore::new(),
            state: State::new(),
            server,
            pub_sub: PubSub::new(),
            clients: HashMap::new(),
            next_client_id: 1,
        }
    }

    pub fn into_shared(self) -> SharedDatabase {
        Arc::new(Mutex::new(self))
    }

    pub fn register_client(
        &mut self,
        address: String,
        sender: mpsc::UnboundedSender<Bytes>,
    ) -> ClientId {
        let client_id = self.next_client_id;
        self.next_client_id += 1;

        debug!(client_id, %address, "client registered");
        self.clients.insert(client_id, ClientHandle { address, sender });

        client_id
    }

    /// Queues bytes on a client's outbox. Returns `false` if the client is gone.
    pub fn send_to_client(&self, client_id: ClientId, bytes: Bytes) -> bool {
        self.clients
            .get(&client_id)
            .is_some_and(|client| client.sender.send(bytes).is_ok())
    }

    /// Forwards a write command to every replica and advances the replication offset.
    pub fn replicate(&mut self, frame: Bytes) {
        if !self.server.is_master() {
            return;
        }

        self.server.repl_offset += frame.len() as u64;

        for replica in self.server.replicas.keys() {
            if let Some(client) = self.clients.get(replica) {
                let _ = client.sender.send(frame.clone());
            }
        }
    }

    /// Sends bytes to every replica without touching the replication offset.
    pub fn broadcast_to_replicas(&self, frame: Bytes) {
        for replica in self.server.replicas.keys() {
            self.send_to_client(*replica, frame.clone());
        }
    }

    /// Forgets a client everywhere: parked commands, transaction, subscriptions
    /// and replica registration. Dropping its handle closes the outbox.
    pub fn disconnect_client(&mut self, client_id: ClientId) {
        if self.server.is_replica(client_id) {
            info!(client_id, "replica disconnected");
        }

        self.state.remove_client(client_id);
        self.pub_sub.remove_client(client_id);
        self.server.remove_client(client_id);
        self.clients.remove(&client_id);

        debug!(client_id, "client disconnected");
    }
}
