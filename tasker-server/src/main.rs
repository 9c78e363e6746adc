//! `tasker-server`: in-memory task store for local development.
//!
//! Serves the `/tasks` collection the `tasker` client talks to.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 127.0.0.1:3000
//! cargo run --bin tasker-server
//!
//! # Custom address, preloaded with tasks
//! cargo run --bin tasker-server -- --bind 0.0.0.0:8080 --seed tasks.json
//!
//! # Or via environment variable
//! TASKER_SERVER_ADDR=127.0.0.1:8080 cargo run --bin tasker-server
//! ```

use std::sync::Arc;

use clap::Parser;
use tasker_server::api;
use tasker_server::config::{ServerCliArgs, ServerConfig};
use tasker_server::store::TaskStore;

#[tokio::main]
async fn main() {
    let cli = ServerCliArgs::parse();

    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let seed = match config.load_seed() {
        Ok(tasks) => tasks,
        Err(e) => {
            eprintln!("Error loading seed tasks: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(addr = %config.bind_addr, seeded = seed.len(), "starting task server");
    let store = Arc::new(TaskStore::with_tasks(seed));

    match api::start_server_with_state(&config.bind_addr, store).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "task server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "task server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start task server");
            std::process::exit(1);
        }
    }
}
