//! `tasker`: command-line client for a remote task store.
//!
//! Every command goes through the sync engine: it dispatches one intent,
//! waits for the outcome, prints the notifications it produced and exits
//! non-zero if the outcome was a failure.
//!
//! ```bash
//! # List the first page of open tasks
//! cargo run --bin tasker -- list --filter outstanding
//!
//! # Against another store
//! TASKER_URL=http://127.0.0.1:3000 cargo run --bin tasker -- add "Buy milk" -p high
//! ```

use std::fmt::Write as _;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing_appender::non_blocking::WorkerGuard;

use tasker::config::{CliArgs, CliCommand, ClientConfig};
use tasker::intent::Intent;
use tasker::notify::{Notification, NotificationCenter};
use tasker::paging::{PageItem, Pager};
use tasker::remote::http::HttpRemote;
use tasker::store::StateStore;
use tasker::sync::SyncEngine;
use tasker::views;
use tasker_proto::task::{Task, TaskId, TaskPatch};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    let remote = match config.http_remote() {
        Ok(remote) => remote,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    tracing::debug!(url = %remote.collection_url(), "using remote store");

    let engine = SyncEngine::with_parts(
        Arc::new(remote),
        Arc::new(StateStore::with_intent_buffer(config.intent_buffer)),
        NotificationCenter::with_ttls(config.notification_ttls.clone()),
    );

    match run(&engine, cli.command.unwrap_or_default(), config.page_size).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(message) => {
            eprintln!("Error: {message}");
            ExitCode::from(2)
        }
    }
}

/// Initialize logging.
///
/// Logs go to stderr unless a file is given, so stdout only carries command
/// output. Returns a [`WorkerGuard`] for file logging that must be held until
/// shutdown to flush buffered entries.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let Some(log_path) = file_path else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .init();
        return None;
    };

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Runs one command to completion.
///
/// Returns `Ok(false)` when the remote operation failed and `Err` when the
/// input was rejected before anything was sent.
async fn run(
    engine: &SyncEngine<HttpRemote>,
    command: CliCommand,
    page_size: usize,
) -> Result<bool, String> {
    let mut applied = engine.subscribe_intents();
    match command {
        CliCommand::List { filter, page } => {
            engine.load();
            engine.settle().await;
            print_notifications(&engine.notifications().notifications());

            let state = engine.state();
            if views::last_error(&state).is_some() {
                return Ok(false);
            }
            let tasks = filter.apply(&state);
            let mut pager = Pager::new(tasks.len(), page_size);
            if page != 1 && !pager.go_to(page) {
                return Err(format!(
                    "page {page} does not exist ({} pages)",
                    pager.total_pages()
                ));
            }
            print!("{}", render_page(&tasks, &pager));
            return Ok(true);
        }
        CliCommand::Add { title, priority } => {
            engine.create(&title, priority).map_err(|e| e.to_string())?;
        }
        CliCommand::Done { id } => {
            engine
                .update(TaskId::new(id), TaskPatch::default().done(true))
                .map_err(|e| e.to_string())?;
        }
        CliCommand::Undo { id } => {
            engine
                .update(TaskId::new(id), TaskPatch::default().done(false))
                .map_err(|e| e.to_string())?;
        }
        CliCommand::Edit {
            id,
            title,
            priority,
        } => {
            let patch = TaskPatch {
                title,
                is_done: None,
                priority,
            };
            if patch.is_empty() {
                return Err("nothing to change: pass --title or --priority".to_string());
            }
            engine
                .update(TaskId::new(id), patch)
                .map_err(|e| e.to_string())?;
        }
        CliCommand::Rm { id } => engine.delete(TaskId::new(id)),
    }

    engine.settle().await;
    print_notifications(&engine.notifications().notifications());
    match collect_outcomes(&mut applied) {
        Ok(tasks) => {
            for task in &tasks {
                println!("{}", render_task(task));
            }
        }
        Err(error) => {
            tracing::debug!(error, "command failed");
            return Ok(false);
        }
    }
    Ok(views::last_error(&engine.state()).is_none())
}

/// Drains the applied intents, returning the tasks written by successful
/// outcomes or the first failure.
///
/// Intents dropped from an overflowing buffer are skipped, not treated as
/// the end of the stream.
fn collect_outcomes(applied: &mut broadcast::Receiver<Intent>) -> Result<Vec<Task>, String> {
    let mut tasks = Vec::new();
    loop {
        match applied.try_recv() {
            Ok(Intent::CreateSucceeded { task } | Intent::UpdateSucceeded { task }) => {
                tasks.push(task);
            }
            Ok(intent) => {
                if let Some(error) = intent.error() {
                    return Err(error.to_string());
                }
            }
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "intent backlog overflowed");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return Ok(tasks),
        }
    }
}

fn print_notifications(notifications: &[Notification]) {
    for n in notifications {
        eprintln!("[{}] {}", n.severity, n.message);
    }
}

fn render_task(task: &Task) -> String {
    let mark = if task.is_done { 'x' } else { ' ' };
    format!(
        "[{mark}] {:>4}  {:<6}  {}",
        task.id.as_str(),
        task.priority.as_str(),
        task.title
    )
}

/// The current page of `tasks` followed by the page window.
fn render_page(tasks: &[&Task], pager: &Pager) -> String {
    if tasks.is_empty() {
        return "No tasks.\n".to_string();
    }
    let mut out = String::new();
    for task in pager.page_slice(tasks) {
        let _ = writeln!(out, "{}", render_task(task));
    }
    if pager.total_pages() > 1 {
        let window: Vec<String> = pager
            .window()
            .into_iter()
            .map(|item| match item {
                PageItem::Page(n) if n == pager.current_page() => format!("[{n}]"),
                other => other.to_string(),
            })
            .collect();
        let _ = writeln!(
            out,
            "page {} of {}: {}",
            pager.current_page(),
            pager.total_pages(),
            window.join(" ")
        );
    }
    out
}
