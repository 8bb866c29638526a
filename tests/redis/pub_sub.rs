use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_publish_reaches_subscribers() {
    let env = TestEnv::new_master_server();
    let mut subscriber = env.client().await;
    let mut other = env.client().await;
    let mut publisher = env.client().await;

    assert_eq!(
        subscriber.send(&["SUBSCRIBE", "news", "sport"]).await,
        concat!(
            "*3\r\n$9\r\nsubscribe\r\n$4\r\nnews\r\n:1\r\n",
            "*3\r\n$9\r\nsubscribe\r\n$5\r\nsport\r\n:2\r\n",
        )
    );
    other.send(&["SUBSCRIBE", "sport"]).await;

    assert_eq!(
        publisher.send(&["PUBLISH", "sport", "goal"]).await,
        TestUtils::expected_integer(2)
    );
    assert_eq!(
        publisher.send(&["PUBLISH", "weather", "rain"]).await,
        TestUtils::expected_integer(0)
    );

    let message = TestUtils::expected_array(&["message", "sport", "goal"]);
    assert_eq!(subscriber.drain(), message);
    assert_eq!(other.drain(), message);
}

#[tokio::test]
async fn test_subscribed_mode_restricts_commands() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    client.send(&["SUBSCRIBE", "news"]).await;

    let test_cases = vec![
        (
            vec!["SET", "k", "v"],
            TestUtils::expected_error("ERR Can't execute 'set': only (P|S)SUBSCRIBE / (P|S)UNSUBSCRIBE / PING / QUIT / RESET are allowed in this context"),
        ),
        (vec!["PING"], TestUtils::expected_array(&["pong", ""])),
        (
            vec!["UNSUBSCRIBE", "news"],
            "*3\r\n$11\r\nunsubscribe\r\n$4\r\nnews\r\n:0\r\n".to_string(),
        ),
        (vec!["PING"], TestUtils::expected_simple_string("PONG")),
        (vec!["SET", "k", "v"], TestUtils::expected_simple_string("OK")),
    ];

    for (input, expected) in test_cases {
        assert_eq!(client.send(&input).await, expected, "sending {:?}", input);
    }
}

#[tokio::test]
async fn test_disconnected_subscriber_is_forgotten() {
    let env = TestEnv::new_master_server();
    let mut subscriber = env.client().await;
    let mut publisher = env.client().await;

    subscriber.send(&["SUBSCRIBE", "news"]).await;
    subscriber.disconnect().await;

    assert_eq!(
        publisher.send(&["PUBLISH", "news", "hello"]).await,
        TestUtils::expected_integer(0)
    );
}

#[tokio::test]
async fn test_reset_and_quit_in_subscribed_mode() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;
    let mut publisher = env.client().await;

    client.send(&["SUBSCRIBE", "news"]).await;

    assert_eq!(
        client.send(&["RESET"]).await,
        TestUtils::expected_simple_string("RESET")
    );
    assert_eq!(
        publisher.send(&["PUBLISH", "news", "hello"]).await,
        TestUtils::expected_integer(0)
    );
    assert_eq!(client.send(&["GET", "k"]).await, TestUtils::expected_null());

    client.send(&["SUBSCRIBE", "news"]).await;
    assert_eq!(client.send(&["QUIT"]).await, TestUtils::expected_simple_string("OK"));
}
