//! Configuration system for the `tasker` client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/tasker/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;
use std::time::Duration;

use tasker_proto::task::Priority;

use crate::notify::NotificationTtls;
use crate::paging::DEFAULT_PAGE_SIZE;
use crate::remote::RemoteError;
use crate::remote::http::{DEFAULT_REQUEST_TIMEOUT, HttpRemote};
use crate::store::DEFAULT_INTENT_BUFFER;
use crate::views::TaskFilter;

/// Remote store used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    remote: RemoteFileConfig,
    notifications: NotificationsFileConfig,
    paging: PagingFileConfig,
    engine: EngineFileConfig,
}

/// `[remote]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct RemoteFileConfig {
    base_url: Option<String>,
    request_timeout_ms: Option<u64>,
}

/// `[notifications]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct NotificationsFileConfig {
    info_ttl_ms: Option<u64>,
    success_ttl_ms: Option<u64>,
    warning_ttl_ms: Option<u64>,
    error_ttl_ms: Option<u64>,
}

/// `[paging]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct PagingFileConfig {
    page_size: Option<usize>,
}

/// `[engine]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct EngineFileConfig {
    intent_buffer: Option<usize>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -- Remote --
    /// Base URL of the remote store; the collection lives at `{base}/tasks`.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,

    // -- Notifications --
    /// Default lifetimes of the per-severity notification helpers.
    pub notification_ttls: NotificationTtls,

    // -- Paging --
    /// Tasks per page when listing.
    pub page_size: usize,

    // -- Engine --
    /// Capacity of the applied-intent broadcast channel.
    pub intent_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            notification_ttls: NotificationTtls::default(),
            page_size: DEFAULT_PAGE_SIZE,
            intent_buffer: DEFAULT_INTENT_BUFFER,
        }
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// If no `--config` is given, the default path
    /// (`~/.config/tasker/config.toml`) is tried and silently ignored if
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Resolve a `ClientConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    #[must_use]
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();
        let ttl = |value: Option<u64>, default: Duration| value.map_or(default, Duration::from_millis);
        let notifications = &file.notifications;

        Self {
            base_url: cli
                .base_url
                .clone()
                .or_else(|| file.remote.base_url.clone())
                .unwrap_or(defaults.base_url),
            request_timeout: cli
                .timeout_ms
                .or(file.remote.request_timeout_ms)
                .map_or(defaults.request_timeout, Duration::from_millis),
            notification_ttls: NotificationTtls {
                info: ttl(notifications.info_ttl_ms, defaults.notification_ttls.info),
                success: ttl(notifications.success_ttl_ms, defaults.notification_ttls.success),
                warning: ttl(notifications.warning_ttl_ms, defaults.notification_ttls.warning),
                error: ttl(notifications.error_ttl_ms, defaults.notification_ttls.error),
            },
            page_size: cli
                .page_size
                .or(file.paging.page_size)
                .unwrap_or(defaults.page_size)
                .max(1),
            intent_buffer: file
                .engine
                .intent_buffer
                .unwrap_or(defaults.intent_buffer),
        }
    }

    /// Build the HTTP client for the configured remote store.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the base URL is unusable.
    pub fn http_remote(&self) -> Result<HttpRemote, RemoteError> {
        HttpRemote::new(&self.base_url, self.request_timeout)
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Task list client for a remote task store")]
pub struct CliArgs {
    /// Base URL of the remote task store.
    #[arg(long, env = "TASKER_URL")]
    pub base_url: Option<String>,

    /// Per-request timeout in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Tasks per page when listing.
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Path to config file (default: `~/.config/tasker/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn", env = "TASKER_LOG")]
    pub log_level: String,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// What to do (default: `list`).
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

/// Subcommands of the `tasker` binary.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Show one page of tasks.
    List {
        /// Which tasks to show (all, outstanding, completed).
        #[arg(long, short, default_value = "all")]
        filter: TaskFilter,
        /// 1-based page number.
        #[arg(long, short, default_value_t = 1)]
        page: usize,
    },
    /// Create a task.
    Add {
        /// Task title (3 to 100 characters).
        title: String,
        /// Task priority (low, medium, high).
        #[arg(long, short, default_value = "medium")]
        priority: Priority,
    },
    /// Mark a task as done.
    Done {
        /// Task id.
        id: String,
    },
    /// Mark a task as not done.
    Undo {
        /// Task id.
        id: String,
    },
    /// Change a task's title or priority.
    Edit {
        /// Task id.
        id: String,
        /// New title.
        #[arg(long, short)]
        title: Option<String>,
        /// New priority.
        #[arg(long, short)]
        priority: Option<Priority>,
    },
    /// Delete a task.
    Rm {
        /// Task id.
        id: String,
    },
}

impl Default for CliCommand {
    fn default() -> Self {
        Self::List {
            filter: TaskFilter::All,
            page: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("tasker").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
