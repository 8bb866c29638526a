use std::time::Duration;

use redis_engine::{
    connection::run_replica_link,
    database::{Database, SharedDatabase},
    resp::RespValue,
    server::run_server,
};
use tokio::net::TcpListener;

use crate::test_utils::{TestClient, TestEnv, TestUtils};

const MASTER_REPLICATION_ID: &str = "8371b4fb1155b71f4a04d3e1bc3e18c4a990aeeb";

fn encoded(arguments: &[&str]) -> String {
    RespValue::array_of_bulk_strings(arguments.iter().map(|argument| argument.to_string()))
        .encode_to_string()
}

/// Registers a client as a replica the way the handshake does.
async fn attach_replica(env: &TestEnv) -> TestClient {
    let mut replica = env.client().await;

    assert_eq!(
        replica.send(&["REPLCONF", "listening-port", "6380"]).await,
        TestUtils::expected_simple_string("OK")
    );
    assert_eq!(
        replica.send(&["REPLCONF", "capa", "psync2"]).await,
        TestUtils::expected_simple_string("OK")
    );

    let transfer = replica.send(&["PSYNC", "?", "-1"]).await;
    assert!(
        transfer.starts_with(&format!("+FULLRESYNC {} 0\r\n$88\r\nREDIS0011", MASTER_REPLICATION_ID)),
        "unexpected transfer {:?}",
        transfer
    );

    replica
}

async fn eventually<F>(database: &SharedDatabase, mut condition: F)
where
    F: FnMut(&mut Database) -> bool,
{
    for _ in 0..100 {
        if condition(&mut *database.lock().await) {
            return;
        }

        TestUtils::sleep_ms(20).await;
    }

    panic!("condition was not met in time");
}

#[tokio::test]
async fn test_writes_are_propagated_to_replicas() {
    let env = TestEnv::new_master_server();
    let mut replica = attach_replica(&env).await;
    let mut client = env.client().await;

    client.send(&["SET", "foo", "1"]).await;
    client.send(&["GET", "foo"]).await;
    client.send(&["INCR", "foo"]).await;
    client.send(&["INCR", "visits"]).await;

    assert_eq!(
        replica.drain(),
        [
            encoded(&["SET", "foo", "1"]),
            encoded(&["INCR", "foo"]),
            encoded(&["INCR", "visits"]),
        ]
        .concat()
    );
}

#[tokio::test]
async fn test_blocking_pops_are_propagated_as_lpop() {
    let env = TestEnv::new_master_server();
    let mut replica = attach_replica(&env).await;
    let mut blocked = env.client().await;
    let mut client = env.client().await;

    let task = blocked.send_blocking(&["BLPOP", "queue", "0"]).await;
    client.send(&["RPUSH", "queue", "job"]).await;
    TestUtils::wait_for_completion(task, Duration::from_secs(1)).await;

    client.send(&["RPUSH", "queue", "next"]).await;
    client.send(&["BLPOP", "queue", "0"]).await;

    assert_eq!(
        replica.drain(),
        [
            encoded(&["RPUSH", "queue", "job"]),
            encoded(&["LPOP", "queue"]),
            encoded(&["RPUSH", "queue", "next"]),
            encoded(&["LPOP", "queue"]),
        ]
        .concat()
    );
}

#[tokio::test]
async fn test_wait_without_writes_counts_replicas() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    assert_eq!(client.send(&["WAIT", "1", "100"]).await, TestUtils::expected_integer(0));

    let _first = attach_replica(&env).await;
    let _second = attach_replica(&env).await;

    assert_eq!(client.send(&["WAIT", "3", "100"]).await, TestUtils::expected_integer(2));
}

#[tokio::test]
async fn test_wait_is_released_by_acknowledgements() {
    let env = TestEnv::new_master_server();
    let mut first = attach_replica(&env).await;
    let mut second = attach_replica(&env).await;
    let mut client = env.client().await;

    let set = encoded(&["SET", "foo", "bar"]);
    client.send(&["SET", "foo", "bar"]).await;

    let task = client.send_blocking(&["WAIT", "2", "5000"]).await;

    let getack = encoded(&["REPLCONF", "GETACK", "*"]);
    assert_eq!(first.drain(), [set.clone(), getack.clone()].concat());
    assert_eq!(second.drain(), [set.clone(), getack].concat());

    let offset = set.len().to_string();
    assert_eq!(first.send(&["REPLCONF", "ACK", offset.as_str()]).await, "");
    assert_eq!(second.send(&["REPLCONF", "ACK", offset.as_str()]).await, "");

    assert_eq!(
        TestUtils::wait_for_completion(task, Duration::from_secs(1)).await,
        TestUtils::expected_integer(2)
    );
}

#[tokio::test]
async fn test_wait_times_out_with_partial_count() {
    let env = TestEnv::new_master_server();
    let mut first = attach_replica(&env).await;
    let _silent = attach_replica(&env).await;
    let mut client = env.client().await;

    client.send(&["SET", "foo", "bar"]).await;
    let offset = encoded(&["SET", "foo", "bar"]).len().to_string();

    let task = client.send_blocking(&["WAIT", "2", "100"]).await;
    first.send(&["REPLCONF", "ACK", offset.as_str()]).await;

    assert_eq!(
        TestUtils::wait_for_completion(task, Duration::from_secs(1)).await,
        TestUtils::expected_integer(1)
    );
}

#[tokio::test]
async fn test_replica_applies_master_stream() {
    let env = TestEnv::new_replica_server();
    let mut master = env.master_link().await;
    let mut client = env.client().await;

    let set = encoded(&["SET", "foo", "1"]);
    let push = encoded(&["RPUSH", "list", "a", "b"]);

    assert_eq!(master.send(&["SET", "foo", "1"]).await, "");
    assert_eq!(master.send(&["RPUSH", "list", "a", "b"]).await, "");

    let offset = (set.len() + push.len()).to_string();
    assert_eq!(
        master.send(&["REPLCONF", "GETACK", "*"]).await,
        TestUtils::expected_array(&["REPLCONF", "ACK", offset.as_str()])
    );

    assert_eq!(client.send(&["GET", "foo"]).await, TestUtils::expected_bulk_string("1"));
    assert_eq!(client.send(&["LLEN", "list"]).await, TestUtils::expected_integer(2));
    assert_eq!(
        client.send(&["SET", "foo", "2"]).await,
        TestUtils::expected_error("READONLY You can't write against a read only replica.")
    );

    let info = client.send(&["INFO", "replication"]).await;
    assert!(info.contains("role:slave"), "unexpected info {:?}", info);
}

#[tokio::test]
async fn test_replica_link_over_tcp() {
    let master = TestEnv::new_master_server();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(run_server(listener, master.database.clone()));

    let replica = TestEnv::new_replica_server();
    tokio::spawn(run_replica_link(
        replica.database.clone(),
        ("127.0.0.1".to_string(), port),
        6380,
    ));

    eventually(&master.database, |database| database.server.replicas.len() == 1).await;

    let mut client = master.client().await;
    client.send(&["SET", "fruit", "mango"]).await;
    client.send(&["RPUSH", "basket", "apple", "pear"]).await;

    eventually(&replica.database, |database| {
        database.store.get_string("fruit") == Ok(Some(&"mango".to_string()))
    })
    .await;

    let task = client.send_blocking(&["WAIT", "1", "2000"]).await;
    assert_eq!(
        TestUtils::wait_for_completion(task, Duration::from_secs(3)).await,
        TestUtils::expected_integer(1)
    );

    let replica_database = replica.database.lock().await;
    assert_eq!(replica_database.server.repl_id, MASTER_REPLICATION_ID);
    assert!(replica_database.server.replicas.is_empty());
}
