use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use redis_engine::config::ServerConfig;
use redis_engine::connection::run_replica_link;
use redis_engine::database::Database;
use redis_engine::rdb::load_rdb_file;
use redis_engine::server::{run_server, RedisServer};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ServerConfig::parse();
    let master_address = config.master_address()?;

    let mut database = Database::new(RedisServer::new(&config, master_address.clone()));

    match load_rdb_file(&config.snapshot_path()).await {
        Ok(entries) => database.store.extend(entries),
        Err(e) => warn!("starting with an empty keyspace: {}", e),
    }

    let database = database.into_shared();
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;

    if let Some(master) = master_address {
        let database = database.clone();
        let port = config.port;

        tokio::spawn(async move {
            if let Err(e) = run_replica_link(database, master, port).await {
                error!("replication link failed: {:#}", e);
            }
        });
    }

    run_server(listener, database).await
}
