use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_string_commands() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    let test_cases = vec![
        (vec!["PING"], TestUtils::expected_simple_string("PONG")),
        (vec!["ECHO", "hey"], TestUtils::expected_bulk_string("hey")),
        (vec!["GET", "fruit"], TestUtils::expected_null()),
        (vec!["SET", "fruit", "mango"], TestUtils::expected_simple_string("OK")),
        (vec!["GET", "fruit"], TestUtils::expected_bulk_string("mango")),
        (vec!["TYPE", "fruit"], TestUtils::expected_simple_string("string")),
        (vec!["TYPE", "missing"], TestUtils::expected_simple_string("none")),
        (vec!["INCR", "counter"], TestUtils::expected_integer(1)),
        (vec!["INCR", "counter"], TestUtils::expected_integer(2)),
        (
            vec!["INCR", "fruit"],
            TestUtils::expected_error("ERR value is not an integer or out of range"),
        ),
        (
            vec!["GET"],
            TestUtils::expected_error("ERR wrong number of arguments for 'get' command"),
        ),
        (
            vec!["FLUSHALL"],
            TestUtils::expected_error("ERR unknown command 'flushall'"),
        ),
    ];

    for (input, expected) in test_cases {
        assert_eq!(client.send(&input).await, expected, "sending {:?}", input);
    }
}

#[tokio::test]
async fn test_set_with_expiry() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    client.send(&["SET", "temporary", "value", "PX", "60"]).await;
    assert_eq!(
        client.send(&["GET", "temporary"]).await,
        TestUtils::expected_bulk_string("value")
    );

    TestUtils::sleep_ms(120).await;

    assert_eq!(client.send(&["GET", "temporary"]).await, TestUtils::expected_null());
    assert_eq!(
        client.send(&["KEYS", "*"]).await,
        TestUtils::expected_array(&[])
    );
}

#[tokio::test]
async fn test_list_commands() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    let test_cases = vec![
        (vec!["RPUSH", "list", "a", "b", "c"], TestUtils::expected_integer(3)),
        (vec!["LPUSH", "list", "z"], TestUtils::expected_integer(4)),
        (vec!["LLEN", "list"], TestUtils::expected_integer(4)),
        (
            vec!["LRANGE", "list", "0", "-1"],
            TestUtils::expected_array(&["z", "a", "b", "c"]),
        ),
        (
            vec!["LRANGE", "list", "-2", "10"],
            TestUtils::expected_array(&["b", "c"]),
        ),
        (vec!["LPOP", "list"], TestUtils::expected_bulk_string("z")),
        (vec!["LPOP", "list", "2"], TestUtils::expected_array(&["a", "b"])),
        (vec!["LPOP", "list", "5"], TestUtils::expected_array(&["c"])),
        (vec!["LLEN", "list"], TestUtils::expected_integer(0)),
        (vec!["TYPE", "list"], TestUtils::expected_simple_string("none")),
        (vec!["LPOP", "list"], TestUtils::expected_null()),
    ];

    for (input, expected) in test_cases {
        assert_eq!(client.send(&input).await, expected, "sending {:?}", input);
    }
}

#[tokio::test]
async fn test_stream_commands() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    let test_cases = vec![
        (
            vec!["XADD", "stream", "1-1", "temperature", "20"],
            TestUtils::expected_bulk_string("1-1"),
        ),
        (
            vec!["XADD", "stream", "1-1", "temperature", "21"],
            TestUtils::expected_error(
                "ERR The ID specified in XADD is equal or smaller than the target stream top item",
            ),
        ),
        (
            vec!["XADD", "stream", "0-0", "temperature", "21"],
            TestUtils::expected_error("ERR The ID specified in XADD must be greater than 0-0"),
        ),
        (
            vec!["XADD", "stream", "1-*", "temperature", "22"],
            TestUtils::expected_bulk_string("1-2"),
        ),
        (vec!["TYPE", "stream"], TestUtils::expected_simple_string("stream")),
        (
            vec!["XRANGE", "stream", "-", "+", "COUNT", "1"],
            "*1\r\n*2\r\n$3\r\n1-1\r\n*2\r\n$11\r\ntemperature\r\n$2\r\n20\r\n".to_string(),
        ),
        (
            vec!["XREAD", "streams", "stream", "1-1"],
            "*1\r\n*2\r\n$6\r\nstream\r\n*1\r\n*2\r\n$3\r\n1-2\r\n*2\r\n$11\r\ntemperature\r\n$2\r\n22\r\n"
                .to_string(),
        ),
        (
            vec!["XREAD", "streams", "stream", "1-2"],
            TestUtils::expected_null_array(),
        ),
    ];

    for (input, expected) in test_cases {
        assert_eq!(client.send(&input).await, expected, "sending {:?}", input);
    }
}

#[tokio::test]
async fn test_sorted_set_commands() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    let test_cases = vec![
        (
            vec!["ZADD", "racers", "2.5", "bob", "1", "alice", "2.5", "amy"],
            TestUtils::expected_integer(3),
        ),
        (vec!["ZADD", "racers", "3", "alice"], TestUtils::expected_integer(0)),
        (
            vec!["ZRANGE", "racers", "0", "-1"],
            TestUtils::expected_array(&["amy", "bob", "alice"]),
        ),
        (vec!["ZRANK", "racers", "alice"], TestUtils::expected_integer(2)),
        (vec!["ZRANK", "racers", "nobody"], TestUtils::expected_null()),
        (vec!["ZSCORE", "racers", "bob"], TestUtils::expected_bulk_string("2.5")),
        (vec!["ZCARD", "racers"], TestUtils::expected_integer(3)),
        (vec!["ZREM", "racers", "bob", "nobody"], TestUtils::expected_integer(1)),
        (vec!["ZCARD", "racers"], TestUtils::expected_integer(2)),
        (
            vec!["ZADD", "racers", "fast", "carl"],
            TestUtils::expected_error("ERR value is not a valid float"),
        ),
    ];

    for (input, expected) in test_cases {
        assert_eq!(client.send(&input).await, expected, "sending {:?}", input);
    }
}

#[tokio::test]
async fn test_geo_commands() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    assert_eq!(
        client
            .send(&[
                "GEOADD", "Sicily", "13.361389", "38.115556", "Palermo", "15.087269", "37.502669",
                "Catania",
            ])
            .await,
        TestUtils::expected_integer(2)
    );
    assert_eq!(
        client.send(&["GEOADD", "Sicily", "200", "10", "Nowhere"]).await,
        TestUtils::expected_error("ERR invalid longitude,latitude pair 200.000000,10.000000")
    );
    assert_eq!(
        client
            .send(&["GEOSEARCH", "Sicily", "FROMLONLAT", "15", "37", "BYRADIUS", "200", "km"])
            .await,
        TestUtils::expected_array(&["Catania", "Palermo"])
    );

    let distance = client.send(&["GEODIST", "Sicily", "Palermo", "Catania", "km"]).await;
    assert!(distance.starts_with("$8\r\n166.27"), "unexpected distance {:?}", distance);

    let position = client.send(&["GEOPOS", "Sicily", "Palermo"]).await;
    assert!(position.starts_with("*1\r\n*2\r\n"), "unexpected position {:?}", position);
    assert!(position.contains("13.36138"), "unexpected position {:?}", position);
}

#[tokio::test]
async fn test_wrong_type_errors() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;
    let wrong_type = TestUtils::expected_error(
        "WRONGTYPE Operation against a key holding the wrong kind of value",
    );

    client.send(&["SET", "name", "value"]).await;

    for input in [
        vec!["RPUSH", "name", "a"],
        vec!["LRANGE", "name", "0", "1"],
        vec!["XADD", "name", "1-1", "a", "b"],
        vec!["ZADD", "name", "1", "a"],
    ] {
        assert_eq!(client.send(&input).await, wrong_type, "sending {:?}", input);
    }
}

#[tokio::test]
async fn test_config_get_and_info() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    assert_eq!(
        client.send(&["CONFIG", "GET", "dbfilename"]).await,
        TestUtils::expected_array(&["dbfilename", "dump.rdb"])
    );

    let info = client.send(&["INFO", "replication"]).await;
    assert!(info.contains("role:master"), "unexpected info {:?}", info);
    assert!(info.contains("master_repl_offset:0"), "unexpected info {:?}", info);
}
