use std::collections::{HashMap, VecDeque};

use jiff::Timestamp;

use crate::commands::CommandError;
use crate::sorted_set::SortedSet;
use crate::stream::Stream;

#[derive(Debug, Clone)]
pub enum DataType {
    String(String),
    List(VecDeque<String>),
    Stream(Stream),
    SortedSet(SortedSet),
}

impl DataType {
    /// Name reported by the TYPE command.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataType::String(_) => "string",
            DataType::List(_) => "list",
            DataType::Stream(_) => "stream",
            DataType::SortedSet(_) => "zset",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Value {
    pub data: DataType,
    pub expiration: Option<Timestamp>,
}

impl Value {
    pub fn new(data: DataType) -> Self {
        Value {
            data,
            expiration: None,
        }
    }

    pub fn with_expiration(data: DataType, expiration: Option<Timestamp>) -> Self {
        Value { data, expiration }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        matches!(self.expiration, Some(expiration) if now > expiration)
    }
}

/// The keyspace. Expired keys are dropped lazily whenever they are looked up.
#[derive(Debug, Default)]
pub struct KeyValueStore {
    entries: HashMap<String, Value>,
}

impl KeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn purge_if_expired(&mut self, key: &str) {
        let now = Timestamp::now();

        if self
            .entries
            .get(key)
            .is_some_and(|value| value.is_expired(now))
        {
            self.entries.remove(key);
        }
    }

    pub fn get(&mut self, key: &str) -> Option<&Value> {
        self.purge_if_expired(key);
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.purge_if_expired(key);
        self.entries.get_mut(key)
    }

    pub fn insert(&mut self, key: String, value: Value) {
        self.entries.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = (String, Value)>) {
        self.entries.extend(entries);
    }

    /// Live keys holding plain string values.
    pub fn string_keys(&self) -> Vec<String> {
        let now = Timestamp::now();

        self.entries
            .iter()
            .filter(|(_, value)| !value.is_expired(now))
            .filter(|(_, value)| matches!(value.data, DataType::String(_)))
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn get_string(&mut self, key: &str) -> Result<Option<&String>, CommandError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value {
                data: DataType::String(value),
                ..
            }) => Ok(Some(value)),
            Some(_) => Err(CommandError::InvalidDataTypeForKey),
        }
    }

    pub fn get_list_mut(&mut self, key: &str) -> Result<Option<&mut VecDeque<String>>, CommandError> {
        match self.get_mut(key) {
            None => Ok(None),
            Some(Value {
                data: DataType::List(list),
                ..
            }) => Ok(Some(list)),
            Some(_) => Err(CommandError::InvalidDataTypeForKey),
        }
    }

    pub fn get_or_create_list(&mut self, key: &str) -> Result<&mut VecDeque<String>, CommandError> {
        self.purge_if_expired(key);

        let value = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Value::new(DataType::List(VecDeque::new())));

        match &mut value.data {
            DataType::List(list) => Ok(list),
            _ => Err(CommandError::InvalidDataTypeForKey),
        }
    }

    /// Removes `key` if it holds a list that has become empty.
    pub fn remove_if_empty_list(&mut self, key: &str) {
        if matches!(self.entries.get(key), Some(Value { data: DataType::List(list), .. }) if list.is_empty())
        {
            self.entries.remove(key);
        }
    }

    pub fn get_stream(&mut self, key: &str) -> Result<Option<&Stream>, CommandError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value {
                data: DataType::Stream(stream),
                ..
            }) => Ok(Some(stream)),
            Some(_) => Err(CommandError::InvalidDataTypeForKey),
        }
    }

    pub fn get_or_create_stream(&mut self, key: &str) -> Result<&mut Stream, CommandError> {
        self.purge_if_expired(key);

        let value = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Value::new(DataType::Stream(Stream::new())));

        match &mut value.data {
            DataType::Stream(stream) => Ok(stream),
            _ => Err(CommandError::InvalidDataTypeForKey),
        }
    }

    pub fn get_sorted_set(&mut self, key: &str) -> Result<Option<&SortedSet>, CommandError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value {
                data: DataType::SortedSet(set),
                ..
            }) => Ok(Some(set)),
            Some(_) => Err(CommandError::InvalidDataTypeForKey),
        }
    }

    pub fn get_sorted_set_mut(&mut self, key: &str) -> Result<Option<&mut SortedSet>, CommandError> {
        match self.get_mut(key) {
            None => Ok(None),
            Some(Value {
                data: DataType::SortedSet(set),
                ..
            }) => Ok(Some(set)),
            Some(_) => Err(CommandError::InvalidDataTypeForKey),
        }
    }

    pub fn get_or_create_sorted_set(&mut self, key: &str) -> Result<&mut SortedSet, CommandError> {
        self.purge_if_expired(key);

        let value = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Value::new(DataType::SortedSet(SortedSet::new())));

        match &mut value.data {
            DataType::SortedSet(set) => Ok(set),
            _ => Err(CommandError::InvalidDataTypeForKey),
        }
    }

    pub fn remove_if_empty_sorted_set(&mut self, key: &str) {
        if matches!(self.entries.get(key), Some(Value { data: DataType::SortedSet(set), .. }) if set.is_empty())
        {
            self.entries.remove(key);
        }
    }
}
