//! Editor actions
//!
//! Every user intent is an `Action` value. `Editor::apply` maps
//! (state, action) to the next state and reports a `Change`.

use crate::domain::TaskId;

use super::Filter;

/// A single user intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // New-task input
    SetInput(String),
    PushInput(char),
    PopInput,
    /// Add the current input as a task
    SubmitInput,
    /// Add the given text as a task
    AddTask(String),

    // Per-task
    DeleteTask(TaskId),
    ToggleTask(TaskId),

    // Editing
    StartEdit { id: TaskId, text: String },
    SetEditBuffer(String),
    PushEdit(char),
    PopEdit,
    CommitEdit(TaskId),
    CancelEdit,

    // Bulk
    ClearCompleted,

    // View
    SetFilter(Filter),
    CycleFilter,
}

/// What an applied action changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Change {
    /// Nothing changed
    #[default]
    None,
    /// Only transient UI state changed (input, edit buffer, filter)
    Ui,
    /// The task list changed and must be persisted
    Tasks,
}

impl Change {
    /// Check if the task list changed
    pub fn is_tasks(self) -> bool {
        self == Change::Tasks
    }
}
