//! TaskList - task-list editor
//!
//! CLI entry point. Without a subcommand the terminal UI is launched.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use keystore::{FileStore, MemoryStore};
use tasklist::cli::{Cli, Command, OutputFormat, join_text, resolve_task_ref};
use tasklist::config::Config;
use tasklist::domain::Task;
use tasklist::editor::{Action, Filter};
use tasklist::persistence::{LoadStatus, TaskRepository};
use tasklist::session::Session;
use tasklist::tui;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tasklist")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("tasklist.log"))
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let mut session = open_session(&cli, &config)?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        None => {
            debug!("main: no subcommand, launching TUI");
            tui::run(session, &config.ui).await
        }
        Some(command) => {
            report_load_failure(session.load_status());
            match command {
                Command::List { filter, format } => cmd_list(&session, filter.to_filter(), format),
                Command::Add { text } => cmd_add(&mut session, &join_text(&text)),
                Command::Toggle { task } => cmd_toggle(&mut session, &task),
                Command::Edit { task, text } => cmd_edit(&mut session, &task, &join_text(&text)),
                Command::Delete { task } => cmd_delete(&mut session, &task),
                Command::ClearCompleted => cmd_clear_completed(&mut session),
                Command::Stats { format } => cmd_stats(&session, format),
            }
        }
    }
}

/// Open the configured store and load the session from it
fn open_session(cli: &Cli, config: &Config) -> Result<Session> {
    let key = config.storage.key.clone();
    keystore::validate_key(&key).context(format!("Invalid storage key '{}' in config", key))?;
    let repo = if cli.ephemeral {
        info!(%key, "TaskList starting with an in-memory store");
        TaskRepository::new(MemoryStore::new().with_quota(config.storage.quota_bytes), key)
    } else {
        let store_dir = cli.store.clone().unwrap_or_else(|| config.storage.resolved_dir());
        info!(?store_dir, %key, "TaskList starting");
        let store = FileStore::open(&store_dir)
            .context(format!("Failed to open store at {}", store_dir.display()))?
            .with_quota(config.storage.quota_bytes);
        TaskRepository::new(store, key)
    };
    Ok(Session::open(repo))
}

/// Warn on stderr when the stored list could not be used
fn report_load_failure(status: &LoadStatus) {
    match status {
        LoadStatus::Unavailable(reason) => {
            eprintln!("{} Store unavailable, starting empty: {}", "!".yellow(), reason);
        }
        LoadStatus::Corrupt(reason) => {
            eprintln!(
                "{} Stored tasks were unreadable and have been set aside: {}",
                "!".yellow(),
                reason
            );
        }
        LoadStatus::Loaded { dropped, .. } if *dropped > 0 => {
            eprintln!("{} Skipped {} invalid stored task(s)", "!".yellow(), dropped);
        }
        _ => {}
    }
}

/// Dispatch an action and turn a failed write into a command error
fn apply(session: &mut Session, action: Action) -> Result<bool> {
    let change = session.dispatch(action);
    if let Some(err) = session.take_error() {
        warn!(%err, "apply: write-through failed");
        return Err(eyre::eyre!(err));
    }
    Ok(change.is_tasks())
}

fn task_label(task: &Task) -> String {
    format!("{} ({})", task.text, task.short_id().dimmed())
}

fn cmd_list(session: &Session, filter: Filter, format: OutputFormat) -> Result<()> {
    debug!(?filter, ?format, "cmd_list: called");
    let editor = session.editor();
    let tasks: Vec<(usize, &Task)> = editor
        .tasks()
        .iter()
        .enumerate()
        .filter(|(_, t)| filter.matches(t))
        .map(|(i, t)| (i + 1, t))
        .collect();

    match format {
        OutputFormat::Json => {
            let list: Vec<&Task> = tasks.iter().map(|(_, t)| *t).collect();
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
        OutputFormat::Text => {
            if tasks.is_empty() {
                if editor.total_count() == 0 {
                    println!("No tasks yet");
                } else {
                    println!("No {} tasks", filter);
                }
                return Ok(());
            }
            for (position, task) in tasks {
                let text = if task.completed {
                    format!("[x] {}", task.text.strikethrough().dimmed())
                } else {
                    format!("[ ] {}", task.text)
                };
                println!("{:>3}. {}  {}", position, text, task.short_id().dimmed());
            }
        }
    }
    Ok(())
}

fn cmd_add(session: &mut Session, text: &str) -> Result<()> {
    debug!(%text, "cmd_add: called");
    if !apply(session, Action::AddTask(text.to_string()))? {
        eprintln!("{} Nothing added: task text is empty", "!".yellow());
        return Ok(());
    }
    let task = &session.editor().tasks()[0];
    println!("{} Added {}", "✓".green(), task_label(task));
    Ok(())
}

fn cmd_toggle(session: &mut Session, reference: &str) -> Result<()> {
    debug!(%reference, "cmd_toggle: called");
    let id = resolve_task_ref(session.editor(), reference)?;
    apply(session, Action::ToggleTask(id.clone()))?;

    if let Some(task) = session.editor().task(&id) {
        let state = if task.completed { "completed".green() } else { "active".yellow() };
        println!("{} Marked {} as {}", "✓".green(), task_label(task), state);
    }
    Ok(())
}

fn cmd_edit(session: &mut Session, reference: &str, text: &str) -> Result<()> {
    debug!(%reference, %text, "cmd_edit: called");
    let id = resolve_task_ref(session.editor(), reference)?;
    apply(
        session,
        Action::StartEdit {
            id: id.clone(),
            text: text.to_string(),
        },
    )?;

    if apply(session, Action::CommitEdit(id.clone()))? {
        if let Some(task) = session.editor().task(&id) {
            println!("{} Updated {}", "✓".green(), task_label(task));
        }
    } else {
        println!("Task unchanged");
    }
    Ok(())
}

fn cmd_delete(session: &mut Session, reference: &str) -> Result<()> {
    debug!(%reference, "cmd_delete: called");
    let id = resolve_task_ref(session.editor(), reference)?;
    let label = session.editor().task(&id).map(task_label).unwrap_or_else(|| id.clone());
    apply(session, Action::DeleteTask(id))?;
    println!("{} Deleted {}", "✓".green(), label);
    Ok(())
}

fn cmd_clear_completed(session: &mut Session) -> Result<()> {
    debug!("cmd_clear_completed: called");
    let completed = session.editor().completed_count();
    if completed == 0 {
        println!("No completed tasks");
        return Ok(());
    }
    apply(session, Action::ClearCompleted)?;
    println!("{} Cleared {} completed task(s)", "✓".green(), completed);
    Ok(())
}

fn cmd_stats(session: &Session, format: OutputFormat) -> Result<()> {
    debug!(?format, "cmd_stats: called");
    let editor = session.editor();
    match format {
        OutputFormat::Json => {
            let stats = serde_json::json!({
                "total": editor.total_count(),
                "completed": editor.completed_count(),
                "active": editor.active_count(),
            });
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Text => {
            println!("{}", editor.summary());
        }
    }
    Ok(())
}
