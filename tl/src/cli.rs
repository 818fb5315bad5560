//! CLI command definitions and subcommands

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::debug;

use crate::domain::{IdResolver, TaskId};
use crate::editor::{Editor, Filter};

/// TaskList - terminal task-list editor
#[derive(Parser)]
#[command(
    name = "tl",
    about = "Task-list editor with state kept in a local store",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Store directory (overrides config)
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// Keep tasks in memory only; nothing is read from or written to disk
    #[arg(long, global = true, conflicts_with = "store")]
    pub ephemeral: bool,

    /// Subcommand to execute (launches the TUI when omitted)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List tasks
    List {
        #[command(flatten)]
        filter: FilterArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a task
    Add {
        /// Task text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Toggle a task's completed flag
    Toggle {
        /// Task position (as shown by `list`), ID, or ID prefix/suffix
        task: String,
    },

    /// Replace a task's text
    Edit {
        /// Task position (as shown by `list`), ID, or ID prefix/suffix
        task: String,

        /// New text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Delete a task
    Delete {
        /// Task position (as shown by `list`), ID, or ID prefix/suffix
        task: String,
    },

    /// Remove all completed tasks
    ClearCompleted,

    /// Show completion counts
    Stats {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Mutually exclusive list filters
#[derive(Debug, Clone, Copy, Default, Args)]
#[group(multiple = false)]
pub struct FilterArgs {
    /// Show all tasks (default)
    #[arg(long)]
    pub all: bool,

    /// Show only tasks not yet completed
    #[arg(long)]
    pub active: bool,

    /// Show only completed tasks
    #[arg(long)]
    pub completed: bool,
}

impl FilterArgs {
    pub fn to_filter(self) -> Filter {
        if self.active {
            Filter::Active
        } else if self.completed {
            Filter::Completed
        } else {
            Filter::All
        }
    }
}

/// Output format for list and stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Join multi-word text arguments
pub fn join_text(words: &[String]) -> String {
    words.join(" ")
}

/// Resolve a task reference from the command line
///
/// Tried in order: exact ID, 1-based position in the full list, unique ID
/// prefix or suffix.
pub fn resolve_task_ref(editor: &Editor, reference: &str) -> eyre::Result<TaskId> {
    debug!(%reference, "resolve_task_ref: called");
    if let Some(task) = editor.task(reference) {
        return Ok(task.id.clone());
    }

    if let Ok(position) = reference.parse::<usize>()
        && (1..=editor.total_count()).contains(&position)
    {
        return Ok(editor.tasks()[position - 1].id.clone());
    }

    let resolver = IdResolver::new(editor.tasks().iter().map(|t| t.id.as_str()));
    match resolver.resolve(reference) {
        Ok(Some(id)) => Ok(id),
        Ok(None) => Err(eyre::eyre!("No task matches '{}'", reference)),
        Err(candidates) => Err(eyre::eyre!(
            "'{}' is ambiguous, matches {} tasks: {}",
            reference,
            candidates.len(),
            candidates.join(", ")
        )),
    }
}
