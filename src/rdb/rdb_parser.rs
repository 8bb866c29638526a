use std::collections::HashMap;

use jiff::Timestamp;
use thiserror::Error;
use tracing::{debug, warn};

use crate::key_value_store::{DataType, Value};
use crate::rdb::encoding::{read_length, read_string, read_u32_le, read_u64_le, read_u8};
use crate::rdb::opcode::{OpCode, STRING_VALUE_TYPE};

const MAGIC_STRING: &[u8] = b"REDIS";
const VERSION_LENGTH: usize = 4;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RdbError {
    #[error("snapshot file not found: {0}")]
    FileNotFound(String),
    #[error("failed to read snapshot file: {0}")]
    Io(String),
    #[error("invalid snapshot header")]
    InvalidHeader,
    #[error("snapshot ended unexpectedly")]
    UnexpectedEof,
    #[error("invalid length encoding byte 0x{0:02X}")]
    InvalidLengthEncoding(u8),
    #[error("expected a plain length, found {0}")]
    UnexpectedEncoding(String),
    #[error("compressed strings are not supported")]
    UnsupportedCompression,
    #[error("string is not valid UTF-8")]
    InvalidString,
    #[error("unsupported value type 0x{0:02X}")]
    UnsupportedValueType(u8),
    #[error("expiration {0} is out of range")]
    InvalidExpiration(u64),
}

/// Everything a snapshot contributes to a freshly started server.
#[derive(Debug, Default)]
pub struct RdbSnapshot {
    pub version: u32,
    pub metadata: HashMap<String, String>,
    pub entries: Vec<(String, Value)>,
}

/// Walks an RDB payload section by section.
pub struct RdbParser<'a> {
    buffer: &'a [u8],
    snapshot: RdbSnapshot,
}

impl<'a> RdbParser<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        RdbParser {
            buffer,
            snapshot: RdbSnapshot::default(),
        }
    }

    pub fn parse(mut self) -> Result<RdbSnapshot, RdbError> {
        self.parse_header()?;

        loop {
            let opcode = OpCode::from(read_u8(&mut self.buffer)?);

            match opcode {
                OpCode::Metadata => {
                    let key = read_string(&mut self.buffer)?;
                    let value = read_string(&mut self.buffer)?;
                    self.snapshot.metadata.insert(key, value);
                }
                OpCode::Database => {
                    let index = read_length(&mut self.buffer)?;
                    debug!(index, "reading database section");
                }
                OpCode::ResizeDb => {
                    read_length(&mut self.buffer)?;
                    read_length(&mut self.buffer)?;
                }
                OpCode::ExpirationSeconds => {
                    let seconds = read_u32_le(&mut self.buffer)? as u64;
                    self.parse_entry_with_expiration(seconds * 1000)?;
                }
                OpCode::ExpirationMilliseconds => {
                    let milliseconds = read_u64_le(&mut self.buffer)?;
                    self.parse_entry_with_expiration(milliseconds)?;
                }
                OpCode::ValueType(value_type) => {
                    self.parse_entry(value_type, None)?;
                }
                // The trailing checksum is not verified.
                OpCode::EndOfFile => break,
            }
        }

        Ok(self.snapshot)
    }

    fn parse_header(&mut self) -> Result<(), RdbError> {
        let header_length = MAGIC_STRING.len() + VERSION_LENGTH;

        if self.buffer.len() < header_length || &self.buffer[..MAGIC_STRING.len()] != MAGIC_STRING {
            return Err(RdbError::InvalidHeader);
        }

        self.snapshot.version = std::str::from_utf8(&self.buffer[MAGIC_STRING.len()..header_length])
            .ok()
            .and_then(|version| version.parse::<u32>().ok())
            .ok_or(RdbError::InvalidHeader)?;
        self.buffer = &self.buffer[header_length..];

        Ok(())
    }

    fn parse_entry_with_expiration(&mut self, milliseconds: u64) -> Result<(), RdbError> {
        let expiration = i64::try_from(milliseconds)
            .ok()
            .and_then(|milliseconds| Timestamp::from_millisecond(milliseconds).ok())
            .ok_or(RdbError::InvalidExpiration(milliseconds))?;

        let value_type = read_u8(&mut self.buffer)?;
        self.parse_entry(value_type, Some(expiration))
    }

    fn parse_entry(&mut self, value_type: u8, expiration: Option<Timestamp>) -> Result<(), RdbError> {
        if value_type != STRING_VALUE_TYPE {
            return Err(RdbError::UnsupportedValueType(value_type));
        }

        let key = read_string(&mut self.buffer);
        let value = read_string(&mut self.buffer);

        match key.and_then(|key| value.map(|value| (key, value))) {
            Ok((key, value)) => self
                .snapshot
                .entries
                .push((key, Value::with_expiration(DataType::String(value), expiration))),
            Err(RdbError::InvalidString) => warn!("skipping snapshot entry that is not valid UTF-8"),
            Err(e) => return Err(e),
        }

        Ok(())
    }
}

/// Parses a complete RDB payload.
pub fn parse_rdb(bytes: &[u8]) -> Result<RdbSnapshot, RdbError> {
    RdbParser::new(bytes).parse()
}
