use std::time::Duration;

use bytes::Bytes;
use redis_engine::{
    commands::{CommandDispatcher, CommandHandler, ExecutionContext, NextStep},
    config::ServerConfig,
    database::{ClientId, Database, SharedDatabase},
    resp::RespValue,
    server::RedisServer,
};
use tokio::{sync::mpsc, task::JoinHandle, time::timeout};

/// Test utilities for building expected replies
pub struct TestUtils;

impl TestUtils {
    pub fn expected_simple_string(value: &str) -> String {
        RespValue::simple_string(value).encode_to_string()
    }

    pub fn expected_integer(value: i64) -> String {
        RespValue::Integer(value).encode_to_string()
    }

    pub fn expected_bulk_string(value: &str) -> String {
        RespValue::bulk_string(value.to_string()).encode_to_string()
    }

    pub fn expected_null() -> String {
        RespValue::NullBulkString.encode_to_string()
    }

    pub fn expected_null_array() -> String {
        RespValue::NullArray.encode_to_string()
    }

    pub fn expected_array(values: &[&str]) -> String {
        RespValue::array_of_bulk_strings(values.iter().map(|value| value.to_string()))
            .encode_to_string()
    }

    pub fn expected_error(message: &str) -> String {
        RespValue::Error(message.to_string()).encode_to_string()
    }

    pub async fn sleep_ms(milliseconds: u64) {
        tokio::time::sleep(Duration::from_millis(milliseconds)).await;
    }

    /// Waits for a spawned blocking client, failing the test if it hangs.
    pub async fn wait_for_completion(task: JoinHandle<String>, limit: Duration) -> String {
        timeout(limit, task)
            .await
            .expect("blocked client did not finish in time")
            .expect("blocked client task panicked")
    }
}

/// A server state with no sockets attached
pub struct TestEnv {
    pub database: SharedDatabase,
}

impl TestEnv {
    pub fn new_master_server() -> Self {
        Self {
            database: Database::new(RedisServer::new(&ServerConfig::default(), None)).into_shared(),
        }
    }

    pub fn new_replica_server() -> Self {
        let config = ServerConfig {
            port: 6380,
            ..ServerConfig::default()
        };

        Self {
            database: Database::new(RedisServer::new(
                &config,
                Some(("127.0.0.1".to_string(), 6379)),
            ))
            .into_shared(),
        }
    }

    /// Connects a client that talks to the server directly through its dispatcher.
    pub async fn client(&self) -> TestClient {
        self.connect(ExecutionContext::Client).await
    }

    /// Connects a client whose commands are treated as the master's replication stream.
    pub async fn master_link(&self) -> TestClient {
        self.connect(ExecutionContext::Replication).await
    }

    async fn connect(&self, context: ExecutionContext) -> TestClient {
        let (sender, receiver) = mpsc::unbounded_channel();
        let client_id = self
            .database
            .lock()
            .await
            .register_client("127.0.0.1:0".to_string(), sender);

        TestClient {
            client_id,
            dispatcher: CommandDispatcher::new(client_id, context, self.database.clone()),
            database: self.database.clone(),
            receiver,
        }
    }
}

pub struct TestClient {
    pub client_id: ClientId,
    dispatcher: CommandDispatcher,
    database: SharedDatabase,
    receiver: mpsc::UnboundedReceiver<Bytes>,
}

impl TestClient {
    /// Sends a command that is expected to reply right away and returns
    /// everything written to the client since.
    pub async fn send(&mut self, arguments: &[&str]) -> String {
        let next = self.dispatch(arguments).await;
        assert!(
            !matches!(next, NextStep::Park(_)),
            "{:?} blocked unexpectedly",
            arguments
        );

        self.drain()
    }

    /// Sends a command that is expected to park and returns a task resolving to its reply.
    pub async fn send_blocking(&mut self, arguments: &[&str]) -> JoinHandle<String> {
        let NextStep::Park(parked) = self.dispatch(arguments).await else {
            panic!("{:?} did not block", arguments);
        };
        let database = self.database.clone();

        tokio::spawn(async move { parked.wait(&database).await.encode_to_string() })
    }

    /// Everything queued on the client's outbox so far, such as published messages.
    pub fn drain(&mut self) -> String {
        let mut output = String::new();

        while let Ok(bytes) = self.receiver.try_recv() {
            output.push_str(&String::from_utf8_lossy(&bytes));
        }

        output
    }

    pub async fn disconnect(self) {
        self.database.lock().await.disconnect_client(self.client_id);
    }

    async fn dispatch(&self, arguments: &[&str]) -> NextStep {
        let command = CommandHandler::from_arguments(arguments.iter().copied())
            .expect("test commands are well formed");

        self.dispatcher.dispatch(command).await
    }
}
