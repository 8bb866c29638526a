//! Reading RESP frames off a connection and the replica side of the
//! replication handshake.
//!
//! A [`FrameReader`] keeps every byte it has read in one buffer, so several
//! commands arriving in a single TCP segment, or one command split over many,
//! come out as whole frames in order. The handshake reads through the same
//! buffer, which means commands the master pipelines right after the snapshot
//! are not lost.

use bytes::{Bytes, BytesMut};
use regex::Regex;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::resp::{Frame, RespError, RespValue};

const READ_BUFFER_CAPACITY: usize = 4096;

/// Errors that can occur while reading and parsing frames from network streams.
#[derive(Error, Debug, PartialEq)]
pub enum CommandReadError {
    #[error("I/O error: {0}")]
    IoError(String),
    #[error("connection closed")]
    ConnectionClosed,
    #[error("RESP parse error: {0}")]
    RespParseError(#[from] RespError),
    #[error("invalid response from master: {0}")]
    InvalidResponseFromMaster(String),
}

impl From<std::io::Error> for CommandReadError {
    fn from(e: std::io::Error) -> Self {
        CommandReadError::IoError(e.to_string())
    }
}

/// Incremental frame decoder over the read half of a connection.
#[derive(Debug)]
pub struct FrameReader<R> {
    reader: R,
    buffer: BytesMut,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        FrameReader {
            reader,
            buffer: BytesMut::with_capacity(READ_BUFFER_CAPACITY),
        }
    }

    /// Reads whatever the peer sent next into the buffer.
    ///
    /// Cancel safe: bytes are only ever appended once the read completed.
    pub async fn fill_buffer(&mut self) -> Result<(), CommandReadError> {
        let number_of_bytes = self.reader.read_buf(&mut self.buffer).await?;

        if number_of_bytes == 0 {
            return Err(CommandReadError::ConnectionClosed);
        }

        Ok(())
    }

    /// Splits off every complete frame already buffered.
    pub fn take_frames(&mut self) -> Result<Vec<Frame>, RespError> {
        RespValue::decode_all(&mut self.buffer)
    }

    /// Waits until at least one complete frame is buffered and returns all of them.
    pub async fn read_frames(&mut self) -> Result<Vec<Frame>, CommandReadError> {
        loop {
            let frames = self.take_frames()?;

            if !frames.is_empty() {
                return Ok(frames);
            }

            self.fill_buffer().await?;
        }
    }

    /// Returns exactly one frame, leaving anything after it buffered.
    pub async fn read_frame(&mut self) -> Result<Frame, CommandReadError> {
        loop {
            if let Some(frame) = RespValue::decode(&mut self.buffer)? {
                return Ok(frame);
            }

            self.fill_buffer().await?;
        }
    }

    /// Reads the `$<len>\r\n<payload>` snapshot transfer that follows `FULLRESYNC`.
    pub async fn read_snapshot(&mut self) -> Result<Bytes, CommandReadError> {
        loop {
            if let Some(snapshot) = RespValue::decode_unterminated_bulk(&mut self.buffer)? {
                return Ok(snapshot);
            }

            self.fill_buffer().await?;
        }
    }
}

/// What the master told us during the handshake.
#[derive(Debug, PartialEq)]
pub struct HandshakeOutcome {
    pub repl_id: String,
    pub offset: u64,
    pub snapshot: Bytes,
}

/// Performs the replica side of the replication handshake.
///
/// 1. `PING`, answered with `+PONG`
/// 2. `REPLCONF listening-port <port>`, answered with `+OK`
/// 3. `REPLCONF capa psync2`, answered with `+OK`
/// 4. `PSYNC ? -1`, answered with `+FULLRESYNC <replid> <offset>`
/// 5. The snapshot, sent as a bulk payload without a trailing CRLF
///
/// Any other answer aborts the handshake.
pub async fn handshake<R, W>(
    frames: &mut FrameReader<R>,
    writer: &mut W,
    listening_port: u16,
) -> Result<HandshakeOutcome, CommandReadError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    send_handshake_command(writer, ["PING"]).await?;
    expect_simple_string(frames, "PONG").await?;

    let port = listening_port.to_string();
    send_handshake_command(writer, ["REPLCONF", "listening-port", port.as_str()]).await?;
    expect_simple_string(frames, "OK").await?;

    send_handshake_command(writer, ["REPLCONF", "capa", "psync2"]).await?;
    expect_simple_string(frames, "OK").await?;

    send_handshake_command(writer, ["PSYNC", "?", "-1"]).await?;
    let frame = frames.read_frame().await?;

    let Some(line) = simple_string(&frame.value) else {
        return Err(unexpected("PSYNC", &frame.value));
    };

    let (repl_id, offset) = match line.split_whitespace().collect::<Vec<_>>().as_slice() {
        ["FULLRESYNC", repl_id, offset] if is_valid_repl_id(repl_id) => {
            let offset = offset
                .parse::<u64>()
                .map_err(|_| unexpected("PSYNC", &frame.value))?;

            (repl_id.to_string(), offset)
        }
        _ => return Err(unexpected("PSYNC", &frame.value)),
    };

    let snapshot = frames.read_snapshot().await?;
    debug!(%repl_id, offset, snapshot_bytes = snapshot.len(), "handshake completed");

    Ok(HandshakeOutcome {
        repl_id,
        offset,
        snapshot,
    })
}

async fn send_handshake_command<W, const N: usize>(
    writer: &mut W,
    arguments: [&str; N],
) -> Result<(), CommandReadError>
where
    W: AsyncWrite + Unpin,
{
    let command = RespValue::array_of_bulk_strings(arguments.map(str::to_string));

    writer.write_all(&command.encode()).await?;
    writer.flush().await?;

    Ok(())
}

async fn expect_simple_string<R>(
    frames: &mut FrameReader<R>,
    expected: &str,
) -> Result<(), CommandReadError>
where
    R: AsyncRead + Unpin,
{
    let frame = frames.read_frame().await?;

    match simple_string(&frame.value) {
        Some(value) if value == expected => Ok(()),
        _ => Err(unexpected(expected, &frame.value)),
    }
}

fn simple_string(value: &RespValue) -> Option<&str> {
    match value {
        RespValue::SimpleString(value) => Some(value),
        _ => None,
    }
}

fn unexpected(step: &str, value: &RespValue) -> CommandReadError {
    CommandReadError::InvalidResponseFromMaster(format!(
        "{} step got {:?}",
        step,
        value.encode_to_string()
    ))
}

fn is_valid_repl_id(repl_id: &str) -> bool {
    Regex::new(r"^[a-zA-Z0-9]{40}$")
        .map(|re| re.is_match(repl_id))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdb::empty_rdb_file;

    #[tokio::test]
    async fn test_frames_split_across_reads() {
        let (client, mut server) = tokio::io::duplex(64);
        let mut frames = FrameReader::new(client);

        server.write_all(b"*1\r\n$4\r\nPI").await.unwrap();
        frames.fill_buffer().await.unwrap();
        assert_eq!(frames.take_frames(), Ok(vec![]));

        server
            .write_all(b"NG\r\n*2\r\n$4\r\nECHO\r\n$2\r\nhi\r\n")
            .await
            .unwrap();

        let values: Vec<RespValue> = frames
            .read_frames()
            .await
            .unwrap()
            .into_iter()
            .map(|frame| frame.value)
            .collect();

        assert_eq!(
            values,
            vec![
                RespValue::array_of_bulk_strings(["PING".to_string()]),
                RespValue::array_of_bulk_strings(["ECHO".to_string(), "hi".to_string()]),
            ]
        );
    }

    #[tokio::test]
    async fn test_closed_connection() {
        let (client, server) = tokio::io::duplex(64);
        let mut frames = FrameReader::new(client);
        drop(server);

        assert_eq!(frames.read_frames().await, Err(CommandReadError::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_handshake_keeps_pipelined_commands() {
        let (replica, mut master) = tokio::io::duplex(4096);
        let (read_half, mut write_half) = tokio::io::split(replica);
        let mut frames = FrameReader::new(read_half);

        let snapshot = empty_rdb_file().unwrap();
        let mut replies = b"+PONG\r\n+OK\r\n+OK\r\n+FULLRESYNC 8371b4fb1155b71f4a04d3e1bc3e18c4a990aeeb 0\r\n".to_vec();
        replies.extend_from_slice(format!("${}\r\n", snapshot.len()).as_bytes());
        replies.extend_from_slice(&snapshot);
        replies.extend_from_slice(b"*3\r\n$3\r\nSET\r\n$3\r\nfoo\r\n$1\r\n1\r\n");
        master.write_all(&replies).await.unwrap();

        let outcome = handshake(&mut frames, &mut write_half, 6380).await.unwrap();

        assert_eq!(outcome.repl_id, "8371b4fb1155b71f4a04d3e1bc3e18c4a990aeeb");
        assert_eq!(outcome.offset, 0);
        assert_eq!(outcome.snapshot, Bytes::from(snapshot));

        let pipelined = frames.read_frames().await.unwrap();
        assert_eq!(pipelined.len(), 1);
        assert_eq!(pipelined[0].raw, "*3\r\n$3\r\nSET\r\n$3\r\nfoo\r\n$1\r\n1\r\n");

        let expected_requests = concat!(
            "*1\r\n$4\r\nPING\r\n",
            "*3\r\n$8\r\nREPLCONF\r\n$14\r\nlistening-port\r\n$4\r\n6380\r\n",
            "*3\r\n$8\r\nREPLCONF\r\n$4\r\ncapa\r\n$6\r\npsync2\r\n",
            "*3\r\n$5\r\nPSYNC\r\n$1\r\n?\r\n$2\r\n-1\r\n",
        );
        let mut requests = vec![0; expected_requests.len()];
        master.read_exact(&mut requests).await.unwrap();

        assert_eq!(String::from_utf8(requests).unwrap(), expected_requests);
    }

    #[tokio::test]
    async fn test_handshake_rejects_unexpected_replies() {
        let test_cases: Vec<&[u8]> = vec![
            b"-ERR nope\r\n",
            b"+PONG\r\n+OK\r\n+OK\r\n+FULLRESYNC short 0\r\n",
            b"+PONG\r\n+OK\r\n+OK\r\n+CONTINUE\r\n",
            b"+PONG\r\n$2\r\nOK\r\n",
        ];

        for replies in test_cases {
            let (replica, mut master) = tokio::io::duplex(4096);
            let (read_half, mut write_half) = tokio::io::split(replica);
            let mut frames = FrameReader::new(read_half);
            master.write_all(replies).await.unwrap();

            let result = handshake(&mut frames, &mut write_half, 6380).await;

            assert!(
                matches!(result, Err(CommandReadError::InvalidResponseFromMaster(_))),
                "replies {:?} gave {:?}",
                String::from_utf8_lossy(replies),
                result
            );
        }
    }

    #[test]
    fn test_is_valid_repl_id() {
        let test_cases = [
            (
                "8371b4fb1155b71f4a04d3e1bc3e18c4a990aeeb",
                true,
                "valid 40-char hex string",
            ),
            (
                "8371B4FB1155B71F4a04d3e1bc3e18c4a990aeeb",
                true,
                "valid with mixed case",
            ),
            (
                "ABCDEF1234567890ABCDEF1234567890ABCDEF12",
                true,
                "all uppercase hex",
            ),
            (
                "8371b4fb1155b71f4a04d3e1bc3e18c4a990aezz",
                true,
                "alphanumeric chars",
            ),
            (
                "8371b4fb1155b71f4a04d3e1bc3e18c4a990aee",
                false,
                "too short (39 chars)",
            ),
            (
                "8371b4fb1155b71f4a04d3e1bc3e18c4a990aeeba",
                false,
                "too long (41 chars)",
            ),
            (
                "8371b4fb1155b71f4a04d3e1bc3e18c4a990ae$g",
                false,
                "invalid characters ($)",
            ),
            ("", false, "empty string"),
            (
                "8371b4fb1155b71f4a04d3e1bc3e18c4a990ae g",
                false,
                "contains space",
            ),
            (
                "8371b4fb-1155-b71f-4a04-d3e1bc3e18c4a990aeeb",
                false,
                "contains hyphens",
            ),
        ];

        for (input, expected, description) in test_cases {
            assert_eq!(
                is_valid_repl_id(input),
                expected,
                "Failed for {}: '{}'",
                description,
                input
            );
        }
    }
}
