use std::collections::{BTreeSet, HashMap, HashSet};

use crate::database::ClientId;

/// Channel subscriptions, indexed both ways.
#[derive(Debug, Default)]
pub struct PubSub {
    channels: HashMap<String, HashSet<ClientId>>,
    subscriptions: HashMap<ClientId, BTreeSet<String>>,
}

impl PubSub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `client_id` to `channel` and returns how many channels it now listens to.
    pub fn subscribe(&mut self, client_id: ClientId, channel: &str) -> usize {
        self.channels
            .entry(channel.to_string())
            .or_default()
            .insert(client_id);

        let channels = self.subscriptions.entry(client_id).or_default();
        channels.insert(channel.to_string());
        channels.len()
    }

    /// Unsubscribes `client_id` from `channel` and returns how many channels remain.
    pub fn unsubscribe(&mut self, client_id: ClientId, channel: &str) -> usize {
        if let Some(subscribers) = self.channels.get_mut(channel) {
            subscribers.remove(&client_id);

            if subscribers.is_empty() {
                self.channels.remove(channel);
            }
        }

        let remaining = match self.subscriptions.get_mut(&client_id) {
            Some(channels) => {
                channels.remove(channel);
                channels.len()
            }
            None => 0,
        };

        if remaining == 0 {
            self.subscriptions.remove(&client_id);
        }

        remaining
    }

    pub fn is_subscribed(&self, client_id: ClientId) -> bool {
        self.subscriptions.contains_key(&client_id)
    }

    pub fn channels_of(&self, client_id: ClientId) -> Vec<String> {
        self.subscriptions
            .get(&client_id)
            .map(|channels| channels.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn subscribers(&self, channel: &str) -> Vec<ClientId> {
        self.channels
            .get(channel)
            .map(|subscribers| subscribers.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn remove_client(&mut self, client_id: ClientId) {
        for channel in self.channels_of(client_id) {
            self.unsubscribe(client_id, &channel);
        }
    }
}
