//! Per-server coordination state: parked clients and open transactions.
//!
//! Clients blocked in BLPOP, XREAD BLOCK or WAIT are registered here as waiters.
//! Each waiter owns the sending half of a oneshot channel. Whoever resolves the
//! waiter first (a push, an append, a replica ack, or the deadline) removes it from
//! every queue it sits in while holding the database lock, so a waiter is answered
//! exactly once.

use std::collections::{HashMap, HashSet, VecDeque};

use thiserror::Error;
use tokio::sync::oneshot;
use tokio::time::{self, Instant};
use tracing::debug;

use crate::commands::CommandHandler;
use crate::database::{ClientId, SharedDatabase};
use crate::resp::RespValue;
use crate::stream::StreamId;

pub type WaiterId = u64;

#[derive(Error, Debug, PartialEq)]
pub enum StateError {
    #[error("MULTI calls can not be nested")]
    NestedMulti,
    #[error("no transaction in progress")]
    NoTransaction,
}

/// What a parked client is waiting on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum WaitTarget {
    List(String),
    Stream(String),
}

#[derive(Debug)]
pub struct WaitRequest {
    pub target_offset: u64,
    pub required_acks: usize,
    pub acked_by: HashSet<ClientId>,
}

#[derive(Debug)]
pub enum WaiterKind {
    List { keys: Vec<String> },
    Stream { starts: Vec<(String, StreamId)> },
    Replicas(WaitRequest),
}

impl WaiterKind {
    fn targets(&self) -> Vec<WaitTarget> {
        match self {
            WaiterKind::List { keys } => keys.iter().cloned().map(WaitTarget::List).collect(),
            WaiterKind::Stream { starts } => starts
                .iter()
                .map(|(key, _)| WaitTarget::Stream(key.clone()))
                .collect(),
            WaiterKind::Replicas(_) => Vec::new(),
        }
    }

    /// Reply sent when the deadline passes before anything arrived.
    fn timeout_reply(&self) -> RespValue {
        match self {
            WaiterKind::List { .. } | WaiterKind::Stream { .. } => RespValue::NullArray,
            WaiterKind::Replicas(request) => RespValue::Integer(request.acked_by.len() as i64),
        }
    }
}

#[derive(Debug)]
struct Waiter {
    client_id: ClientId,
    sender: oneshot::Sender<RespValue>,
    kind: WaiterKind,
}

/// Handle returned to a connection whose command has to wait.
#[derive(Debug)]
pub struct Parked {
    pub waiter_id: WaiterId,
    pub deadline: Option<Instant>,
    receiver: oneshot::Receiver<RespValue>,
}

impl Parked {
    /// Returns the reply if the waiter has already been resolved.
    pub fn try_reply(&mut self) -> Option<RespValue> {
        self.receiver.try_recv().ok()
    }

    /// Waits until the waiter is resolved or its deadline passes.
    ///
    /// On timeout the waiter is removed under the database lock. If some other task
    /// resolved it in the meantime, that reply is already sitting in the channel.
    pub async fn wait(mut self, database: &SharedDatabase) -> RespValue {
        let resolved = match self.deadline {
            Some(deadline) => time::timeout_at(deadline, &mut self.receiver).await.ok(),
            None => Some((&mut self.receiver).await),
        };

        match resolved {
            Some(Ok(reply)) => reply,
            Some(Err(_)) => RespValue::NullArray,
            None => {
                let mut database = database.lock().await;

                match database.state.expire(self.waiter_id) {
                    Some(reply) => reply,
                    None => self.receiver.try_recv().unwrap_or(RespValue::NullArray),
                }
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct State {
    next_waiter_id: WaiterId,
    waiters: HashMap<WaiterId, Waiter>,
    queues: HashMap<WaitTarget, VecDeque<WaiterId>>,
    wait_requests: Vec<WaiterId>,
    transactions: HashMap<ClientId, Vec<CommandHandler>>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a waiter at the back of every queue it waits on.
    pub fn park(&mut self, client_id: ClientId, kind: WaiterKind, deadline: Option<Instant>) -> Parked {
        let waiter_id = self.next_waiter_id;
        self.next_waiter_id += 1;

        for target in kind.targets() {
            self.queues.entry(target).or_default().push_back(waiter_id);
        }

        if matches!(kind, WaiterKind::Replicas(_)) {
            self.wait_requests.push(waiter_id);
        }

        let (sender, receiver) = oneshot::channel();
        self.waiters.insert(
            waiter_id,
            Waiter {
                client_id,
                sender,
                kind,
            },
        );

        debug!(client_id, waiter_id, "client parked");

        Parked {
            waiter_id,
            deadline,
            receiver,
        }
    }

    fn detach(&mut self, waiter_id: WaiterId) -> Option<Waiter> {
        let waiter = self.waiters.remove(&waiter_id)?;

        for target in waiter.kind.targets() {
            if let Some(queue) = self.queues.get_mut(&target) {
                queue.retain(|id| *id != waiter_id);

                if queue.is_empty() {
                    self.queues.remove(&target);
                }
            }
        }

        self.wait_requests.retain(|id| *id != waiter_id);

        Some(waiter)
    }

    /// Answers a waiter and removes it everywhere.
    ///
    /// Returns `false` if the waiter was already gone or its connection stopped
    /// listening, in which case the reply was not delivered.
    pub fn resolve(&mut self, waiter_id: WaiterId, reply: RespValue) -> bool {
        match self.detach(waiter_id) {
            Some(waiter) => {
                debug!(client_id = waiter.client_id, waiter_id, "waiter resolved");
                waiter.sender.send(reply).is_ok()
            }
            None => false,
        }
    }

    /// Removes a waiter whose deadline passed and returns its timeout reply.
    pub fn expire(&mut self, waiter_id: WaiterId) -> Option<RespValue> {
        self.detach(waiter_id).map(|waiter| waiter.kind.timeout_reply())
    }

    /// Oldest client waiting for elements on list `key`.
    pub fn oldest_list_waiter(&self, key: &str) -> Option<WaiterId> {
        self.queues
            .get(&WaitTarget::List(key.to_string()))
            .and_then(|queue| queue.front().copied())
    }

    /// Clients waiting on stream `key` in arrival order, each with the id it reads after.
    pub fn stream_waiters(&self, key: &str) -> Vec<(WaiterId, StreamId)> {
        let Some(queue) = self.queues.get(&WaitTarget::Stream(key.to_string())) else {
            return Vec::new();
        };

        queue
            .iter()
            .filter_map(|waiter_id| {
                let waiter = self.waiters.get(waiter_id)?;

                match &waiter.kind {
                    WaiterKind::Stream { starts } => starts
                        .iter()
                        .find(|(stream_key, _)| stream_key == key)
                        .map(|(_, start)| (*waiter_id, *start)),
                    _ => None,
                }
            })
            .collect()
    }

    /// Records that `replica` has processed the stream up to `offset`, answering
    /// every WAIT whose quorum is now reached.
    pub fn record_replica_ack(&mut self, replica: ClientId, offset: u64) {
        let mut satisfied = Vec::new();

        for waiter_id in &self.wait_requests {
            if let Some(Waiter {
                kind: WaiterKind::Replicas(request),
                ..
            }) = self.waiters.get_mut(waiter_id)
            {
                if offset >= request.target_offset {
                    request.acked_by.insert(replica);
                }

                if request.acked_by.len() >= request.required_acks {
                    satisfied.push((*waiter_id, request.acked_by.len()));
                }
            }
        }

        for (waiter_id, acks) in satisfied {
            self.resolve(waiter_id, RespValue::Integer(acks as i64));
        }
    }

    /// Drops everything that belongs to a disconnected client.
    pub fn remove_client(&mut self, client_id: ClientId) {
        let owned: Vec<WaiterId> = self
            .waiters
            .iter()
            .filter(|(_, waiter)| waiter.client_id == client_id)
            .map(|(waiter_id, _)| *waiter_id)
            .collect();

        for waiter_id in owned {
            self.detach(waiter_id);
        }

        for waiter_id in &self.wait_requests {
            if let Some(Waiter {
                kind: WaiterKind::Replicas(request),
                ..
            }) = self.waiters.get_mut(waiter_id)
            {
                request.acked_by.remove(&client_id);
            }
        }

        self.transactions.remove(&client_id);
    }

    pub fn start_transaction(&mut self, client_id: ClientId) -> Result<(), StateError> {
        if self.transactions.contains_key(&client_id) {
            return Err(StateError::NestedMulti);
        }

        self.transactions.insert(client_id, Vec::new());
        Ok(())
    }

    pub fn get_transaction(&self, client_id: ClientId) -> Option<&Vec<CommandHandler>> {
        self.transactions.get(&client_id)
    }

    pub fn add_to_transaction(
        &mut self,
        client_id: ClientId,
        command: CommandHandler,
    ) -> Result<(), StateError> {
        self.transactions
            .get_mut(&client_id)
            .ok_or(StateError::NoTransaction)?
            .push(command);

        Ok(())
    }

    pub fn remove_transaction(&mut self, client_id: ClientId) -> Result<Vec<CommandHandler>, StateError> {
        self.transactions
            .remove(&client_id)
            .ok_or(StateError::NoTransaction)
    }
}
