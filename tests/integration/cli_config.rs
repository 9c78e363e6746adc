//! Integration tests for configuration loading.
//!
//! Covers the layering of CLI flags over an explicit TOML file, and an
//! engine built from the resolved configuration.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tasker::config::{CliArgs, CliCommand, ClientConfig, ConfigError};
use tasker::notify::NotificationCenter;
use tasker::store::StateStore;
use tasker::sync::SyncEngine;
use tasker_proto::task::{NewTask, Priority};
use tasker_server::api;
use tasker_server::store::TaskStore;

/// Writes `contents` to a per-test config file and returns its path.
fn write_config(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "tasker-{name}-{}.toml",
        std::process::id()
    ));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn explicit_file_is_layered_under_cli() {
    let path = write_config(
        "layered",
        r#"
[remote]
base_url = "http://file.example:3000"
request_timeout_ms = 1500

[notifications]
success_ttl_ms = 0

[paging]
page_size = 10
"#,
    );
    let cli = CliArgs::try_parse_from([
        "tasker",
        "--config",
        path.to_str().unwrap(),
        "--page-size",
        "3",
        "rm",
        "7",
    ])
    .unwrap();
    let config = ClientConfig::load(&cli).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.base_url, "http://file.example:3000");
    assert_eq!(config.request_timeout, Duration::from_millis(1500));
    assert_eq!(config.notification_ttls.success, Duration::ZERO);
    assert_eq!(config.page_size, 3);
    assert_eq!(cli.command, Some(CliCommand::Rm { id: "7".to_string() }));
}

#[test]
fn explicit_missing_file_is_an_error() {
    let cli = CliArgs::try_parse_from(["tasker", "--config", "/nonexistent/tasker.toml"]).unwrap();
    assert!(matches!(
        ClientConfig::load(&cli),
        Err(ConfigError::ReadFile { .. })
    ));
}

#[test]
fn malformed_file_is_an_error() {
    let path = write_config("malformed", "[remote\nbase_url = ");
    let cli = CliArgs::try_parse_from(["tasker", "--config", path.to_str().unwrap()]).unwrap();
    let result = ClientConfig::load(&cli);
    std::fs::remove_file(&path).unwrap();
    assert!(matches!(result, Err(ConfigError::ParseToml(_))));
}

#[tokio::test]
async fn engine_built_from_config_reaches_server() {
    let store = Arc::new(TaskStore::new());
    store.create(NewTask::new("Buy milk", Priority::High)).await;
    let (addr, _handle) = api::start_server_with_state("127.0.0.1:0", Arc::clone(&store))
        .await
        .expect("failed to start task server");

    let config = ClientConfig {
        base_url: format!("http://{addr}"),
        ..Default::default()
    };
    let engine = SyncEngine::with_parts(
        Arc::new(config.http_remote().unwrap()),
        Arc::new(StateStore::with_intent_buffer(config.intent_buffer)),
        NotificationCenter::with_ttls(config.notification_ttls.clone()),
    );

    engine.load();
    engine.settle().await;

    let state = engine.state();
    assert_eq!(state.tasks.len(), 1);
    assert_eq!(state.tasks[0].priority, Priority::High);
}
