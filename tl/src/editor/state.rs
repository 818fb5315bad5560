//! Editor - explicit state container for a task list
//!
//! Owns the ordered task list (newest first), the new-task input, the
//! current edit session and the view filter. Every operation is local,
//! synchronous and infallible; invalid input is silently ignored.

use tracing::{debug, info};

use crate::domain::{Task, TaskId};

use super::{Action, Change, Filter};

/// Header line shown when the list is empty
pub const EMPTY_SUMMARY: &str = "No tasks yet. Add one below!";

/// An in-progress edit of one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    /// Task being edited
    pub id: TaskId,
    /// Edit buffer, seeded with the task's text
    pub buffer: String,
}

/// Task list editor state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Editor {
    tasks: Vec<Task>,
    input: String,
    editing: Option<EditSession>,
    filter: Filter,
}

impl Editor {
    /// Create an empty editor
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an editor over previously stored tasks
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        debug!(count = tasks.len(), "Editor::with_tasks: called");
        Self {
            tasks,
            ..Self::default()
        }
    }

    /// All tasks in list order (newest first)
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Look up a task by ID
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Position of a task in the full list
    pub fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Current new-task input text
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Current edit session, if any
    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    /// Check if the given task is under edit
    pub fn is_editing(&self, id: &str) -> bool {
        self.editing.as_ref().is_some_and(|e| e.id == id)
    }

    /// Current view filter
    pub fn filter(&self) -> Filter {
        self.filter
    }

    // === Derived values ===

    /// Number of completed tasks
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Number of tasks not yet completed
    pub fn active_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    /// Total number of tasks
    pub fn total_count(&self) -> usize {
        self.tasks.len()
    }

    /// Progress line for headers
    pub fn summary(&self) -> String {
        let total = self.total_count();
        if total == 0 {
            EMPTY_SUMMARY.to_string()
        } else {
            format!("{} of {} tasks completed", self.completed_count(), total)
        }
    }

    /// Tasks passing the current filter, in list order
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| self.filter.matches(t)).collect()
    }

    // === Operations ===

    /// Add a task; no-op when the trimmed text is empty
    ///
    /// On success the task is prepended and the input is cleared.
    pub fn add_task(&mut self, text: &str) -> Option<TaskId> {
        if text.trim().is_empty() {
            debug!("Editor::add_task: empty text, ignoring");
            return None;
        }

        let task = Task::new(text);
        let id = task.id.clone();
        self.tasks.insert(0, task);
        self.input.clear();
        info!(%id, total = self.tasks.len(), "Added task");
        Some(id)
    }

    /// Add the current input as a task
    pub fn submit_input(&mut self) -> Option<TaskId> {
        let text = self.input.clone();
        self.add_task(&text)
    }

    /// Remove a task; silent no-op when absent
    pub fn delete_task(&mut self, id: &str) -> bool {
        let Some(idx) = self.position(id) else {
            debug!(id, "Editor::delete_task: not found");
            return false;
        };

        self.tasks.remove(idx);
        if self.is_editing(id) {
            self.editing = None;
        }
        info!(id, total = self.tasks.len(), "Deleted task");
        true
    }

    /// Flip a task's completion flag; no-op when absent
    pub fn toggle_task(&mut self, id: &str) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.toggle();
                debug!(id, completed = task.completed, "Editor::toggle_task: toggled");
                true
            }
            None => {
                debug!(id, "Editor::toggle_task: not found");
                false
            }
        }
    }

    /// Enter edit mode for `id`, seeding the buffer with `current_text`
    pub fn start_edit(&mut self, id: &str, current_text: &str) {
        debug!(id, "Editor::start_edit: called");
        self.editing = Some(EditSession {
            id: id.to_string(),
            buffer: current_text.to_string(),
        });
    }

    /// Apply the edit buffer to `id` and leave edit mode
    ///
    /// An empty (after trim) buffer leaves the text untouched. Edit mode is
    /// exited either way. Returns whether the task's text changed.
    pub fn commit_edit(&mut self, id: &str) -> bool {
        let buffer = self.editing.take().map(|e| e.buffer).unwrap_or_default();
        let trimmed = buffer.trim();
        if trimmed.is_empty() {
            debug!(id, "Editor::commit_edit: empty buffer, discarding edit");
            return false;
        }

        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) if task.text != trimmed => {
                task.text = trimmed.to_string();
                info!(id, "Edited task");
                true
            }
            Some(_) => {
                debug!(id, "Editor::commit_edit: text unchanged");
                false
            }
            None => {
                debug!(id, "Editor::commit_edit: not found");
                false
            }
        }
    }

    /// Leave edit mode without mutation; returns whether an edit was open
    pub fn cancel_edit(&mut self) -> bool {
        self.editing.take().is_some()
    }

    /// Remove every completed task, keeping the order of the rest
    ///
    /// Returns the number of tasks removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        let removed = before - self.tasks.len();

        if let Some(edit) = &self.editing
            && self.position(&edit.id).is_none()
        {
            self.editing = None;
        }
        if removed > 0 {
            info!(removed, total = self.tasks.len(), "Cleared completed tasks");
        }
        removed
    }

    // === Input buffers ===

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn push_input(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_input(&mut self) -> bool {
        self.input.pop().is_some()
    }

    /// Replace the edit buffer; ignored outside edit mode
    pub fn set_edit_buffer(&mut self, text: impl Into<String>) -> bool {
        match &mut self.editing {
            Some(edit) => {
                edit.buffer = text.into();
                true
            }
            None => false,
        }
    }

    pub fn push_edit(&mut self, c: char) -> bool {
        match &mut self.editing {
            Some(edit) => {
                edit.buffer.push(c);
                true
            }
            None => false,
        }
    }

    pub fn pop_edit(&mut self) -> bool {
        self.editing.as_mut().is_some_and(|e| e.buffer.pop().is_some())
    }

    // === Filter ===

    pub fn set_filter(&mut self, filter: Filter) -> bool {
        let changed = self.filter != filter;
        self.filter = filter;
        changed
    }

    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
    }

    /// Apply an action, reporting what changed
    pub fn apply(&mut self, action: Action) -> Change {
        debug!(?action, "Editor::apply: called");
        let ui = |changed: bool| if changed { Change::Ui } else { Change::None };
        let tasks = |changed: bool| if changed { Change::Tasks } else { Change::None };

        match action {
            Action::SetInput(text) => {
                let changed = self.input != text;
                self.set_input(text);
                ui(changed)
            }
            Action::PushInput(c) => {
                self.push_input(c);
                Change::Ui
            }
            Action::PopInput => ui(self.pop_input()),
            Action::SubmitInput => tasks(self.submit_input().is_some()),
            Action::AddTask(text) => tasks(self.add_task(&text).is_some()),
            Action::DeleteTask(id) => tasks(self.delete_task(&id)),
            Action::ToggleTask(id) => tasks(self.toggle_task(&id)),
            Action::StartEdit { id, text } => {
                self.start_edit(&id, &text);
                Change::Ui
            }
            Action::SetEditBuffer(text) => ui(self.set_edit_buffer(text)),
            Action::PushEdit(c) => ui(self.push_edit(c)),
            Action::PopEdit => ui(self.pop_edit()),
            Action::CommitEdit(id) => {
                let was_editing = self.editing.is_some();
                if self.commit_edit(&id) {
                    Change::Tasks
                } else {
                    ui(was_editing)
                }
            }
            Action::CancelEdit => ui(self.cancel_edit()),
            Action::ClearCompleted => tasks(self.clear_completed() > 0),
            Action::SetFilter(filter) => ui(self.set_filter(filter)),
            Action::CycleFilter => {
                self.cycle_filter();
                Change::Ui
            }
        }
    }
}
