//! Runs the lab analyzer: binds the inbound order listener and serves until
//! the process is killed. The review workflow drives result composition and
//! sending through the library API; this binary only hosts the ingest path.

use std::sync::Arc;

use log::info;
use tokio::net::TcpListener;

use hl7_lab_analyzer::config::Config;
use hl7_lab_analyzer::ids::UuidIds;
use hl7_lab_analyzer::listener::Listener;
use hl7_lab_analyzer::store::OrderStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    let store = Arc::new(OrderStore::new());

    let socket = TcpListener::bind(&config.listen_addr).await?;
    info!("dummy HL7 lab analyzer listening on {}", config.listen_addr);
    info!("results will be sent to {}", config.downstream_addr);
    info!("waiting for lab orders...");

    Listener::new(store, Arc::new(UuidIds))
        .serve(socket)
        .await?;
    Ok(())
}
