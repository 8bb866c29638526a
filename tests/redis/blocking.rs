use std::time::Duration;

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_blpop_is_served_by_push() {
    let env = TestEnv::new_master_server();
    let mut blocked = env.client().await;
    let mut pusher = env.client().await;

    let task = blocked.send_blocking(&["BLPOP", "queue", "0"]).await;

    assert_eq!(
        pusher.send(&["RPUSH", "queue", "job"]).await,
        TestUtils::expected_integer(0)
    );
    assert_eq!(
        TestUtils::wait_for_completion(task, Duration::from_secs(1)).await,
        TestUtils::expected_array(&["queue", "job"])
    );
    assert_eq!(pusher.send(&["LLEN", "queue"]).await, TestUtils::expected_integer(0));
}

#[tokio::test]
async fn test_blpop_waiters_are_served_first_come_first_served() {
    let env = TestEnv::new_master_server();
    let mut first = env.client().await;
    let mut second = env.client().await;
    let mut pusher = env.client().await;

    let first_task = first.send_blocking(&["BLPOP", "queue", "0"]).await;
    let second_task = second.send_blocking(&["BLPOP", "queue", "0"]).await;

    pusher.send(&["RPUSH", "queue", "one"]).await;
    pusher.send(&["RPUSH", "queue", "two"]).await;

    assert_eq!(
        TestUtils::wait_for_completion(first_task, Duration::from_secs(1)).await,
        TestUtils::expected_array(&["queue", "one"])
    );
    assert_eq!(
        TestUtils::wait_for_completion(second_task, Duration::from_secs(1)).await,
        TestUtils::expected_array(&["queue", "two"])
    );
}

#[tokio::test]
async fn test_blpop_times_out() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    let task = client.send_blocking(&["BLPOP", "queue", "0.05"]).await;

    assert_eq!(
        TestUtils::wait_for_completion(task, Duration::from_secs(1)).await,
        TestUtils::expected_null_array()
    );

    // The expired waiter must not swallow the next push.
    assert_eq!(client.send(&["RPUSH", "queue", "late"]).await, TestUtils::expected_integer(1));
}

#[tokio::test]
async fn test_disconnected_waiter_is_skipped() {
    let env = TestEnv::new_master_server();
    let mut gone = env.client().await;
    let mut waiting = env.client().await;
    let mut pusher = env.client().await;

    let _abandoned = gone.send_blocking(&["BLPOP", "queue", "0"]).await;
    let task = waiting.send_blocking(&["BLPOP", "queue", "0"]).await;
    gone.disconnect().await;

    pusher.send(&["RPUSH", "queue", "job"]).await;

    assert_eq!(
        TestUtils::wait_for_completion(task, Duration::from_secs(1)).await,
        TestUtils::expected_array(&["queue", "job"])
    );
}

#[tokio::test]
async fn test_xread_block_is_woken_by_xadd() {
    let env = TestEnv::new_master_server();
    let mut reader = env.client().await;
    let mut writer = env.client().await;

    writer.send(&["XADD", "sensor", "1-1", "temperature", "20"]).await;

    let task = reader
        .send_blocking(&["XREAD", "BLOCK", "0", "STREAMS", "sensor", "$"])
        .await;

    writer.send(&["XADD", "sensor", "2-1", "temperature", "25"]).await;

    assert_eq!(
        TestUtils::wait_for_completion(task, Duration::from_secs(1)).await,
        "*1\r\n*2\r\n$6\r\nsensor\r\n*1\r\n*2\r\n$3\r\n2-1\r\n*2\r\n$11\r\ntemperature\r\n$2\r\n25\r\n"
    );
}

#[tokio::test]
async fn test_xread_block_times_out() {
    let env = TestEnv::new_master_server();
    let mut reader = env.client().await;

    let task = reader
        .send_blocking(&["XREAD", "BLOCK", "50", "STREAMS", "sensor", "0-0"])
        .await;

    assert_eq!(
        TestUtils::wait_for_completion(task, Duration::from_secs(1)).await,
        TestUtils::expected_null_array()
    );
}
