use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum StreamIdError {
    #[error("The ID specified in XADD must be greater than 0-0")]
    ZeroId,
    #[error("The ID specified in XADD is equal or smaller than the target stream top item")]
    NotGreaterThanTop,
    #[error("Invalid stream ID specified as stream command argument")]
    InvalidFormat,
}

/// A stream entry id, ordered by milliseconds and then by sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreamId {
    pub ms: u64,
    pub seq: u64,
}

impl StreamId {
    pub const MIN: StreamId = StreamId { ms: 0, seq: 0 };
    pub const MAX: StreamId = StreamId {
        ms: u64::MAX,
        seq: u64::MAX,
    };

    pub fn new(ms: u64, seq: u64) -> Self {
        StreamId { ms, seq }
    }

    /// Parses a fully explicit `<ms>-<seq>` id.
    pub fn parse_explicit(input: &str) -> Result<Self, StreamIdError> {
        let (ms, seq) = input.split_once('-').ok_or(StreamIdError::InvalidFormat)?;

        Ok(StreamId {
            ms: parse_part(ms)?,
            seq: parse_part(seq)?,
        })
    }

    /// Parses the lower bound of a range: `-`, `<ms>` (sequence 0) or `<ms>-<seq>`.
    pub fn parse_range_start(input: &str) -> Result<Self, StreamIdError> {
        match input {
            "-" => Ok(StreamId::MIN),
            _ if input.contains('-') => Self::parse_explicit(input),
            _ => Ok(StreamId::new(parse_part(input)?, 0)),
        }
    }

    /// Parses the upper bound of a range: `+`, `<ms>` (every sequence) or `<ms>-<seq>`.
    pub fn parse_range_end(input: &str) -> Result<Self, StreamIdError> {
        match input {
            "+" => Ok(StreamId::MAX),
            _ if input.contains('-') => Self::parse_explicit(input),
            _ => Ok(StreamId::new(parse_part(input)?, u64::MAX)),
        }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.ms, self.seq)
    }
}

fn parse_part(part: &str) -> Result<u64, StreamIdError> {
    part.parse::<u64>().map_err(|_| StreamIdError::InvalidFormat)
}

pub type StreamFields = Vec<(String, String)>;

/// An append-only log of entries kept in ascending id order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stream {
    entries: BTreeMap<StreamId, StreamFields>,
}

impl Stream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_id(&self) -> Option<StreamId> {
        self.entries.keys().next_back().copied()
    }

    /// Resolves the id requested by XADD into a concrete id.
    ///
    /// `*` takes the larger of the current time and the last entry's milliseconds,
    /// `<ms>-*` keeps the given milliseconds, and both pick the next free sequence
    /// for those milliseconds. Anything else must be an explicit `<ms>-<seq>`.
    pub fn resolve_id(&self, requested: &str, now_ms: u64) -> Result<StreamId, StreamIdError> {
        if requested == "*" {
            let ms = match self.last_id() {
                Some(last) => now_ms.max(last.ms),
                None => now_ms,
            };

            return Ok(StreamId::new(ms, self.next_sequence(ms)?));
        }

        match requested.split_once('-') {
            Some((ms, "*")) => {
                let ms = parse_part(ms)?;
                Ok(StreamId::new(ms, self.next_sequence(ms)?))
            }
            _ => StreamId::parse_explicit(requested),
        }
    }

    fn next_sequence(&self, ms: u64) -> Result<u64, StreamIdError> {
        let highest = self
            .entries
            .range(StreamId::new(ms, 0)..=StreamId::new(ms, u64::MAX))
            .map(|(id, _)| id.seq)
            .next_back();

        match highest {
            Some(seq) => seq.checked_add(1).ok_or(StreamIdError::NotGreaterThanTop),
            None if ms == 0 => Ok(1),
            None => Ok(0),
        }
    }

    /// Appends an entry, enforcing strictly increasing ids.
    pub fn append(&mut self, id: StreamId, fields: StreamFields) -> Result<(), StreamIdError> {
        if id == StreamId::MIN {
            return Err(StreamIdError::ZeroId);
        }

        if let Some(last) = self.last_id() {
            if id <= last {
                return Err(StreamIdError::NotGreaterThanTop);
            }
        }

        self.entries.insert(id, fields);
        Ok(())
    }

    /// Entries with `start <= id <= end`, in ascending order.
    pub fn range(&self, start: StreamId, end: StreamId) -> Vec<(StreamId, &StreamFields)> {
        if start > end {
            return Vec::new();
        }

        self.entries
            .range(start..=end)
            .map(|(id, fields)| (*id, fields))
            .collect()
    }

    /// Entries with an id strictly greater than `start`, in ascending order.
    pub fn entries_after(&self, start: StreamId) -> Vec<(StreamId, &StreamFields)> {
        use std::ops::Bound::{Excluded, Unbounded};

        self.entries
            .range((Excluded(start), Unbounded))
            .map(|(id, fields)| (*id, fields))
            .collect()
    }
}
