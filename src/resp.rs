//! Redis Serialization Protocol (RESP) encoding and incremental decoding.
//!
//! The decoder works over a growable [`BytesMut`] buffer that the connection keeps
//! appending to. Complete values are split off the front of the buffer together with
//! their exact wire bytes, partial values are left in place until more data arrives.

use bytes::{Bytes, BytesMut};
use thiserror::Error;

/// Largest bulk string a peer may announce, as `proto-max-bulk-len` in Redis.
const MAX_BULK_LENGTH: usize = 512 * 1024 * 1024;
/// Largest element count a peer may announce for one array.
const MAX_ARRAY_LENGTH: usize = i32::MAX as usize;
/// Arrays nested deeper than this are refused.
const MAX_NESTING_DEPTH: usize = 32;

/// Errors produced when the incoming byte stream is not valid RESP.
#[derive(Error, Debug, PartialEq)]
pub enum RespError {
    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,
    #[error("unknown RESP type '{0}'")]
    UnknownRespType(char),
    #[error("failed to parse integer")]
    FailedToParseInteger,
    #[error("invalid bulk string")]
    InvalidBulkString,
    #[error("invalid array")]
    InvalidArray,
}

impl RespError {
    pub fn as_string(&self) -> String {
        RespValue::Error(format!("ERR Protocol error: {}", self)).encode_to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    SimpleString(String),
    Error(String),
    Integer(i64),
    BulkString(Bytes),
    /// Null bulk string, `$-1\r\n`.
    NullBulkString,
    Array(Vec<RespValue>),
    /// Null array, `*-1\r\n`.
    NullArray,
}

/// A decoded value together with the exact bytes it occupied on the wire.
///
/// The raw bytes are what gets forwarded to replicas, and their length is what
/// the replication offset is advanced by.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub value: RespValue,
    pub raw: Bytes,
}

impl Frame {
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

impl RespValue {
    pub fn simple_string(value: impl Into<String>) -> Self {
        RespValue::SimpleString(value.into())
    }

    pub fn bulk_string(value: impl Into<Bytes>) -> Self {
        RespValue::BulkString(value.into())
    }

    pub fn ok() -> Self {
        RespValue::SimpleString("OK".to_string())
    }

    /// Builds an array where every element is a bulk string.
    pub fn array_of_bulk_strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Bytes>,
    {
        RespValue::Array(
            values
                .into_iter()
                .map(|value| RespValue::BulkString(value.into()))
                .collect(),
        )
    }

    /// Builds a bulk string from an optional value, mapping `None` to the null bulk string.
    pub fn optional_bulk_string(value: Option<impl Into<Bytes>>) -> Self {
        match value {
            Some(value) => RespValue::BulkString(value.into()),
            None => RespValue::NullBulkString,
        }
    }

    pub fn encode(&self) -> Bytes {
        let mut buffer = BytesMut::new();
        self.encode_into(&mut buffer);
        buffer.freeze()
    }

    pub fn encode_to_string(&self) -> String {
        String::from_utf8_lossy(&self.encode()).into_owned()
    }

    pub fn encode_into(&self, buffer: &mut BytesMut) {
        match self {
            RespValue::SimpleString(value) => {
                buffer.extend_from_slice(format!("+{}\r\n", value).as_bytes())
            }
            RespValue::Error(value) => buffer.extend_from_slice(format!("-{}\r\n", value).as_bytes()),
            RespValue::Integer(value) => {
                buffer.extend_from_slice(format!(":{}\r\n", value).as_bytes())
            }
            RespValue::BulkString(value) => {
                buffer.extend_from_slice(format!("${}\r\n", value.len()).as_bytes());
                buffer.extend_from_slice(value);
                buffer.extend_from_slice(b"\r\n");
            }
            RespValue::NullBulkString => buffer.extend_from_slice(b"$-1\r\n"),
            RespValue::Array(values) => {
                buffer.extend_from_slice(format!("*{}\r\n", values.len()).as_bytes());

                for value in values {
                    value.encode_into(buffer);
                }
            }
            RespValue::NullArray => buffer.extend_from_slice(b"*-1\r\n"),
        }
    }

    /// Returns the bulk or simple string payload as UTF-8 text, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RespValue::SimpleString(value) => Some(value),
            RespValue::BulkString(value) => std::str::from_utf8(value).ok(),
            _ => None,
        }
    }

    /// Decodes one complete value from the front of `buffer`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(frame))` - A complete value was decoded and removed from the buffer
    /// * `Ok(None)` - The buffer holds only part of a value, nothing was consumed
    /// * `Err(RespError)` - The buffer does not start with valid RESP
    pub fn decode(buffer: &mut BytesMut) -> Result<Option<Frame>, RespError> {
        match Self::parse_at(buffer, 0, 0)? {
            Some((value, end)) => {
                let raw = buffer.split_to(end).freeze();
                Ok(Some(Frame { value, raw }))
            }
            None => Ok(None),
        }
    }

    /// Decodes every complete value currently held in `buffer`, keeping any trailing partial value.
    pub fn decode_all(buffer: &mut BytesMut) -> Result<Vec<Frame>, RespError> {
        let mut frames = Vec::new();

        while let Some(frame) = Self::decode(buffer)? {
            frames.push(frame);
        }

        Ok(frames)
    }

    /// Decodes a `$<len>\r\n<payload>` transfer that carries no trailing CRLF.
    ///
    /// This is the shape a master uses to ship its snapshot after `FULLRESYNC`.
    pub fn decode_unterminated_bulk(buffer: &mut BytesMut) -> Result<Option<Bytes>, RespError> {
        if buffer.is_empty() {
            return Ok(None);
        }

        if buffer[0] != b'$' {
            return Err(RespError::InvalidBulkString);
        }

        let Some(line_end) = find_crlf(buffer, 1) else {
            return Ok(None);
        };

        let length = parse_line::<usize>(&buffer[1..line_end])
            .map_err(|_| RespError::InvalidBulkString)?;

        if length > MAX_BULK_LENGTH {
            return Err(RespError::InvalidBulkString);
        }

        let payload_start = line_end + 2;

        if buffer.len() < payload_start + length {
            return Ok(None);
        }

        let mut frame = buffer.split_to(payload_start + length);
        Ok(Some(frame.split_off(payload_start).freeze()))
    }

    fn parse_at(
        buffer: &[u8],
        position: usize,
        depth: usize,
    ) -> Result<Option<(RespValue, usize)>, RespError> {
        let Some(&type_byte) = buffer.get(position) else {
            return Ok(None);
        };

        if !matches!(type_byte, b'+' | b'-' | b':' | b'$' | b'*') {
            return Err(RespError::UnknownRespType(type_byte as char));
        }

        let Some(line_end) = find_crlf(buffer, position + 1) else {
            return Ok(None);
        };

        let line = &buffer[position + 1..line_end];
        let next = line_end + 2;

        match type_byte {
            b'+' => Ok(Some((RespValue::SimpleString(utf8(line)?), next))),
            b'-' => Ok(Some((RespValue::Error(utf8(line)?), next))),
            b':' => Ok(Some((RespValue::Integer(parse_line::<i64>(line)?), next))),
            b'$' => {
                let length = parse_line::<i64>(line).map_err(|_| RespError::InvalidBulkString)?;

                if length == -1 {
                    return Ok(Some((RespValue::NullBulkString, next)));
                }

                let length = usize::try_from(length)
                    .ok()
                    .filter(|length| *length <= MAX_BULK_LENGTH)
                    .ok_or(RespError::InvalidBulkString)?;
                let data_end = next + length;

                if buffer.len() < data_end + 2 {
                    return Ok(None);
                }

                if &buffer[data_end..data_end + 2] != b"\r\n" {
                    return Err(RespError::InvalidBulkString);
                }

                let data = Bytes::copy_from_slice(&buffer[next..data_end]);
                Ok(Some((RespValue::BulkString(data), data_end + 2)))
            }
            b'*' => {
                let length = parse_line::<i64>(line).map_err(|_| RespError::InvalidArray)?;

                if length == -1 {
                    return Ok(Some((RespValue::NullArray, next)));
                }

                let length = usize::try_from(length)
                    .ok()
                    .filter(|length| *length <= MAX_ARRAY_LENGTH)
                    .ok_or(RespError::InvalidArray)?;

                if length > 0 && depth >= MAX_NESTING_DEPTH {
                    return Err(RespError::InvalidArray);
                }

                let mut elements = Vec::with_capacity(length.min(1024));
                let mut cursor = next;

                for _ in 0..length {
                    match Self::parse_at(buffer, cursor, depth + 1)? {
                        Some((element, element_end)) => {
                            elements.push(element);
                            cursor = element_end;
                        }
                        None => return Ok(None),
                    }
                }

                Ok(Some((RespValue::Array(elements), cursor)))
            }
            other => Err(RespError::UnknownRespType(other as char)),
        }
    }
}

fn find_crlf(buffer: &[u8], from: usize) -> Option<usize> {
    if from >= buffer.len() {
        return None;
    }

    buffer[from..]
        .windows(2)
        .position(|window| window == b"\r\n")
        .map(|offset| from + offset)
}

fn utf8(line: &[u8]) -> Result<String, RespError> {
    std::str::from_utf8(line)
        .map(str::to_string)
        .map_err(|_| RespError::InvalidUtf8)
}

fn parse_line<T: std::str::FromStr>(line: &[u8]) -> Result<T, RespError> {
    std::str::from_utf8(line)
        .map_err(|_| RespError::InvalidUtf8)?
        .parse::<T>()
        .map_err(|_| RespError::FailedToParseInteger)
}
