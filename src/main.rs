//! # Airdrop Operator Console - Main Entrypoint
//!
//! This file is the orchestrator of the application. It is responsible
//! for:
//! 1. Initializing the logging infrastructure.
//! 2. Loading configuration and constructing the backend client, the
//!    wallet, the session manager, and the lifecycle controller.
//! 3. Wiring the stdin reader to the dispatch loop over a `tokio::mpsc`
//!    channel.
//! 4. Ensuring the reader task is torn down when the console exits.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

mod config;
mod console;
mod core;
mod error;
mod form;
mod lifecycle;
mod session;
mod state;
mod view;
mod wallet;

use crate::{
    config::Config,
    console::Console,
    core::api_client::ApiClient,
    lifecycle::LifecycleController,
    session::SessionManager,
    wallet::KeystoreWallet,
};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    info!("🚀 Initializing Airdrop Operator Console...");

    let config = Config::load();
    info!("Backend: {}", config.api_base_url);

    let api = Arc::new(ApiClient::new(&config.api_base_url)?);
    let wallet = Arc::new(KeystoreWallet::new(&config.private_key_path));
    let session = Arc::new(SessionManager::new(api.clone(), wallet.clone()));
    let controller = Arc::new(LifecycleController::new(api.clone(), session.clone()));

    let (command_tx, command_rx) = mpsc::channel(64);
    let reader_handle = console::spawn_command_reader(command_tx);

    Console::new(wallet, session, controller, command_rx)
        .run()
        .await;

    reader_handle.abort();
    info!("✅ Shutdown complete.");
    Ok(())
}
