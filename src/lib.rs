//! An in-memory Redis-compatible server.
//!
//! Supported functionality:
//!
//! - Strings with optional expiry (GET, SET, INCR, KEYS, TYPE)
//! - Lists, including blocking pops (LPUSH, RPUSH, LPOP, BLPOP, LRANGE, LLEN)
//! - Streams, including blocking reads (XADD, XRANGE, XREAD)
//! - Sorted sets and the geo commands built on them
//! - Transactions (MULTI, EXEC, DISCARD) and publish/subscribe
//! - Master-replica replication with WAIT
//! - Loading an RDB snapshot at startup
//!
//! The whole server state lives in one [`database::Database`] behind a single
//! async mutex, so every command runs atomically with respect to all others.

pub mod commands;
pub mod config;
pub mod connection;
pub mod database;
pub mod geohash;
pub mod input;
pub mod key_value_store;
pub mod pub_sub;
pub mod rdb;
pub mod resp;
pub mod server;
pub mod sorted_set;
pub mod state;
pub mod stream;
