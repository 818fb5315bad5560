//! Session - editor plus its persistence mirror
//!
//! The in-memory list is authoritative. After every action that changes the
//! task list the full list is written through; a failed write is logged and
//! remembered but never interrupts the session.

use tracing::{debug, warn};

use crate::editor::{Action, Change, Editor};
use crate::persistence::{LoadStatus, PersistError, TaskRepository};

#[derive(Debug)]
pub struct Session {
    editor: Editor,
    repo: TaskRepository,
    load_status: LoadStatus,
    last_error: Option<String>,
}

impl Session {
    /// Load the stored list once and start a session over it
    pub fn open(mut repo: TaskRepository) -> Self {
        let (tasks, load_status) = repo.load();
        debug!(count = tasks.len(), ?load_status, "Session::open: loaded");
        Self {
            editor: Editor::with_tasks(tasks),
            repo,
            load_status,
            last_error: None,
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Outcome of the startup load
    pub fn load_status(&self) -> &LoadStatus {
        &self.load_status
    }

    /// Most recent write failure, if any
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Take the most recent write failure, clearing it
    pub fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    /// Apply an action and mirror the list if it changed
    pub fn dispatch(&mut self, action: Action) -> Change {
        let change = self.editor.apply(action);
        if change.is_tasks()
            && let Err(e) = self.persist()
        {
            warn!(error = %e, "Failed to persist tasks, continuing in memory");
            self.last_error = Some(format!("Failed to save tasks: {}", e));
        }
        change
    }

    /// Write the current list immediately
    pub fn persist(&mut self) -> Result<(), PersistError> {
        self.repo.save(self.editor.tasks())
    }
}
