//! TUI application state
//!
//! Pure data structures for the TUI. No rendering logic here. Task data
//! lives in the session's editor; this holds only what the terminal adds on
//! top of it (selection, modal mode, transient messages).

use tracing::debug;

/// Interaction mode (modal)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InteractionMode {
    /// Normal navigation mode
    #[default]
    Normal,
    /// Typing into the new-task input
    Input,
    /// Editing the selected task inline
    Edit,
    /// Confirmation dialog
    Confirm(ConfirmDialog),
    /// Help overlay
    Help,
}

/// Confirmation dialog state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDialog {
    pub action: ConfirmAction,
    pub message: String,
}

impl ConfirmDialog {
    pub fn new(action: ConfirmAction, message: impl Into<String>) -> Self {
        Self {
            action,
            message: message.into(),
        }
    }

    pub fn clear_completed(count: usize) -> Self {
        let noun = if count == 1 { "task" } else { "tasks" };
        Self::new(
            ConfirmAction::ClearCompleted,
            format!("Clear {} completed {}?", count, noun),
        )
    }
}

/// Actions that require confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    ClearCompleted,
}

/// Selection state for the task list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub selected_index: usize,
}

impl SelectionState {
    pub fn select_next(&mut self, max_items: usize) {
        if max_items > 0 && self.selected_index < max_items - 1 {
            self.selected_index += 1;
        }
    }

    pub fn select_prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self, max_items: usize) {
        if max_items > 0 {
            self.selected_index = max_items - 1;
        }
    }

    /// Ensure selection is within bounds
    pub fn clamp(&mut self, max_items: usize) {
        if max_items == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= max_items {
            self.selected_index = max_items - 1;
        }
    }
}

/// Main application state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    /// Current interaction mode
    pub interaction_mode: InteractionMode,
    /// Selection over the visible tasks
    pub selection: SelectionState,
    /// Transient error message (cleared on next key press)
    pub error_message: Option<String>,
    /// Should the application quit
    pub should_quit: bool,
    /// Ask before clearing completed tasks
    pub confirm_clear: bool,
    /// Show task creation times
    pub show_created: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            interaction_mode: InteractionMode::Normal,
            selection: SelectionState::default(),
            error_message: None,
            should_quit: false,
            confirm_clear: false,
            show_created: true,
        }
    }
}

impl AppState {
    /// Create a new AppState
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an error message
    pub fn set_error(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        debug!(%msg, "AppState::set_error: called");
        self.error_message = Some(msg);
    }

    /// Clear the error message
    pub fn clear_error(&mut self) {
        self.error_message = None;
    }
}
