use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::commands::{CommandDispatcher, CommandHandler, ExecutionContext, NextStep};
use crate::database::{ClientId, SharedDatabase};
use crate::input::{handshake, CommandReadError, FrameReader};
use crate::key_value_store::KeyValueStore;
use crate::rdb::parse_rdb;
use crate::state::Parked;

/// Serves one client until it disconnects.
pub async fn handle_client_connection(stream: TcpStream, database: SharedDatabase) {
    let address = peer_address(&stream);
    let (reader, writer) = stream.into_split();
    let (sender, receiver) = mpsc::unbounded_channel();

    let client_id = database.lock().await.register_client(address.clone(), sender);
    let writer_task = tokio::spawn(write_outbox(writer, receiver));

    let dispatcher = CommandDispatcher::new(client_id, ExecutionContext::Client, Arc::clone(&database));
    let mut frames = FrameReader::new(reader);

    match serve(&dispatcher, &database, &mut frames).await {
        Err(CommandReadError::ConnectionClosed) => debug!(client_id, %address, "connection closed"),
        Err(e) => warn!(client_id, %address, "dropping connection: {}", e),
        Ok(()) => debug!(client_id, %address, "client quit"),
    }

    database.lock().await.disconnect_client(client_id);

    if let Err(e) = writer_task.await {
        warn!(client_id, "writer task failed: {}", e);
    }
}

async fn serve<R>(
    dispatcher: &CommandDispatcher,
    database: &SharedDatabase,
    frames: &mut FrameReader<R>,
) -> Result<(), CommandReadError>
where
    R: AsyncRead + Unpin,
{
    loop {
        let received = match frames.read_frames().await {
            Ok(received) => received,
            Err(CommandReadError::RespParseError(e)) => {
                // The stream can't be resynchronized after garbage.
                let reply = Bytes::from(e.as_string());
                database.lock().await.send_to_client(dispatcher.client_id(), reply);

                return Err(CommandReadError::RespParseError(e));
            }
            Err(e) => return Err(e),
        };

        for frame in received {
            let command = match CommandHandler::new(frame) {
                Ok(command) => command,
                Err(e) => {
                    dispatcher.reject(e).await;
                    continue;
                }
            };

            match dispatcher.dispatch(command).await {
                NextStep::ReadMore => (),
                NextStep::Park(parked) => {
                    wait_while_connected(dispatcher.client_id(), database, frames, parked).await?
                }
                NextStep::Close => return Ok(()),
            }
        }
    }
}

/// Holds the connection on a parked command. Bytes the client sends meanwhile
/// are buffered and served afterwards; a disconnect ends the wait.
async fn wait_while_connected<R>(
    client_id: ClientId,
    database: &SharedDatabase,
    frames: &mut FrameReader<R>,
    parked: Parked,
) -> Result<(), CommandReadError>
where
    R: AsyncRead + Unpin,
{
    let wait = parked.wait(database);
    tokio::pin!(wait);

    let reply = loop {
        tokio::select! {
            biased;
            reply = &mut wait => break reply,
            read = frames.fill_buffer() => read?,
        }
    };

    database.lock().await.send_to_client(client_id, reply.encode());

    Ok(())
}

/// Drains a client's outbox into its socket until the outbox closes.
async fn write_outbox(mut writer: OwnedWriteHalf, mut receiver: mpsc::UnboundedReceiver<Bytes>) {
    while let Some(bytes) = receiver.recv().await {
        if let Err(e) = writer.write_all(&bytes).await {
            debug!("failed to write to client: {}", e);
            break;
        }
    }
}

fn peer_address(stream: &TcpStream) -> String {
    stream
        .peer_addr()
        .map(|address| address.to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Connects to the master, performs the handshake, loads the snapshot and then
/// applies the replication stream until the master goes away.
pub async fn run_replica_link(
    database: SharedDatabase,
    master: (String, u16),
    listening_port: u16,
) -> anyhow::Result<()> {
    let (host, port) = master;

    let stream = TcpStream::connect((host.as_str(), port))
        .await
        .with_context(|| format!("failed to connect to master at {}:{}", host, port))?;
    let address = peer_address(&stream);
    let (reader, mut writer) = stream.into_split();
    let mut frames = FrameReader::new(reader);

    let outcome = handshake(&mut frames, &mut writer, listening_port)
        .await
        .context("replication handshake failed")?;

    info!(%address, repl_id = %outcome.repl_id, "connected to master");

    let (sender, receiver) = mpsc::unbounded_channel();

    let client_id = {
        let mut database = database.lock().await;

        match parse_rdb(&outcome.snapshot) {
            Ok(snapshot) => {
                database.store = KeyValueStore::new();
                database.store.extend(snapshot.entries);
            }
            Err(e) => warn!("ignoring snapshot from master: {}", e),
        }

        database.server.repl_id = outcome.repl_id;
        database.server.repl_offset = 0;

        database.register_client(address, sender)
    };

    let writer_task = tokio::spawn(write_outbox(writer, receiver));
    let dispatcher = CommandDispatcher::new(
        client_id,
        ExecutionContext::Replication,
        Arc::clone(&database),
    );

    let error = loop {
        let received = match frames.read_frames().await {
            Ok(received) => received,
            Err(e) => break e,
        };

        for frame in received {
            let length = frame.len() as u64;

            match CommandHandler::new(frame) {
                Ok(command) => {
                    dispatcher.dispatch(command).await;
                }
                Err(e) => {
                    warn!("skipping unreadable frame from master: {}", e);
                    database.lock().await.server.repl_offset += length;
                }
            }
        }
    };

    database.lock().await.disconnect_client(client_id);
    let _ = writer_task.await;

    match error {
        CommandReadError::ConnectionClosed => {
            info!("master closed the replication link");
            Ok(())
        }
        e => Err(e).context("replication link failed"),
    }
}
