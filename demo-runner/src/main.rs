//! Walks a running broker through the store API: create a store, set, read
//! and delete a key, then drop the store.

use anyhow::Result;
use clap::Parser;
use kv_client::StoreClient;
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Store collection url of the broker
    #[arg(long, default_value = "http://localhost:8080/db")]
    url: String,

    /// Broker admin user (leave empty when auth is disabled)
    #[arg(short, long, default_value = "")]
    user: String,

    /// Broker admin password
    #[arg(short = 'w', long, default_value = "")]
    password: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let client = StoreClient::new(args.url).with_credentials(args.user, args.password);
    let store = client.create().await?;
    info!("Created store {} at {}", store.id(), store.url);

    store.set("foo", "hello").await?;
    info!("Getting 'foo': {:?}", store.get("foo").await?);

    store.set("foo", "").await?;
    info!("Getting 'foo' after empty set: {:?}", store.get_bytes("foo").await?);

    store.delete_key("foo").await?;
    match store.get("foo").await {
        Ok(v) => info!("Getting 'foo' after delete: {:?}", v),
        Err(e) => info!("Getting 'foo' after delete: {}", e),
    }

    store.delete().await?;
    info!("Deleted store {}", store.id());

    if let Err(e) = store.get("foo").await {
        info!("Store is gone: {}", e);
    }
    Ok(())
}
