use std::time::Duration;

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_multi_exec() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    let test_cases = vec![
        (vec!["MULTI"], TestUtils::expected_simple_string("OK")),
        (vec!["SET", "foo", "1"], TestUtils::expected_simple_string("QUEUED")),
        (vec!["INCR", "foo"], TestUtils::expected_simple_string("QUEUED")),
        (vec!["EXEC"], "*2\r\n+OK\r\n:2\r\n".to_string()),
        (vec!["GET", "foo"], TestUtils::expected_bulk_string("2")),
    ];

    for (input, expected) in test_cases {
        assert_eq!(client.send(&input).await, expected, "sending {:?}", input);
    }
}

#[tokio::test]
async fn test_failing_command_does_not_abort_exec() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    client.send(&["SET", "name", "text"]).await;
    client.send(&["MULTI"]).await;
    client.send(&["INCR", "name"]).await;
    client.send(&["SET", "other", "1"]).await;

    assert_eq!(
        client.send(&["EXEC"]).await,
        "*2\r\n-ERR value is not an integer or out of range\r\n+OK\r\n"
    );
    assert_eq!(client.send(&["GET", "other"]).await, TestUtils::expected_bulk_string("1"));
}

#[tokio::test]
async fn test_discard_and_errors() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    let test_cases = vec![
        (vec!["EXEC"], TestUtils::expected_error("ERR EXEC without MULTI")),
        (vec!["DISCARD"], TestUtils::expected_error("ERR DISCARD without MULTI")),
        (vec!["MULTI"], TestUtils::expected_simple_string("OK")),
        (vec!["SET", "foo", "1"], TestUtils::expected_simple_string("QUEUED")),
        (
            vec!["MULTI"],
            TestUtils::expected_error("ERR MULTI calls can not be nested"),
        ),
        (vec!["DISCARD"], TestUtils::expected_simple_string("OK")),
        (vec!["GET", "foo"], TestUtils::expected_null()),
        (vec!["MULTI"], TestUtils::expected_simple_string("OK")),
        (vec!["EXEC"], "*0\r\n".to_string()),
    ];

    for (input, expected) in test_cases {
        assert_eq!(client.send(&input).await, expected, "sending {:?}", input);
    }
}

#[tokio::test]
async fn test_blpop_inside_exec_does_not_block() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    client.send(&["MULTI"]).await;
    client.send(&["BLPOP", "empty", "0"]).await;

    assert_eq!(client.send(&["EXEC"]).await, "*1\r\n*-1\r\n");
}

#[tokio::test]
async fn test_exec_hands_pushes_to_parked_clients() {
    let env = TestEnv::new_master_server();
    let mut blocked = env.client().await;
    let mut client = env.client().await;

    let task = blocked.send_blocking(&["BLPOP", "queue", "0"]).await;

    client.send(&["MULTI"]).await;
    client.send(&["RPUSH", "queue", "a", "b"]).await;
    assert_eq!(client.send(&["EXEC"]).await, "*1\r\n:1\r\n");

    assert_eq!(
        TestUtils::wait_for_completion(task, Duration::from_secs(1)).await,
        TestUtils::expected_array(&["queue", "a"])
    );
}
