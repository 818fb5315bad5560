//! TaskList - task-list editor with local persistence
//!
//! A single user's list of tasks, edited from a full-screen terminal UI or
//! one-shot subcommands. The list is mirrored into a local key-value store
//! after every change and reloaded on the next start.
//!
//! # Modules
//!
//! - [`domain`] - Task record and ID helpers
//! - [`editor`] - In-memory list, its operations and derived counts
//! - [`persistence`] - Stored layout and guarded load/save
//! - [`session`] - Editor plus write-through persistence
//! - [`tui`] - Terminal user interface
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod editor;
pub mod persistence;
pub mod session;
pub mod tui;

pub use domain::{Task, TaskId};
pub use editor::{Action, Change, Editor, Filter};
pub use persistence::{LoadStatus, TaskRepository};
pub use session::Session;
