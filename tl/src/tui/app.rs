//! TUI application - event handling and state management
//!
//! The App owns the Session and the AppState and turns keyboard events into
//! editor actions. It does not do any rendering - that's delegated to the
//! views module.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::config::UiConfig;
use crate::domain::TaskId;
use crate::editor::{Action, Change, Editor};
use crate::session::Session;

use super::state::{AppState, ConfirmAction, ConfirmDialog, InteractionMode};

/// Shown when the startup load fell back to an empty list
const LOAD_FAILURE_NOTICE: &str = "Stored tasks could not be read; starting with an empty list";

/// TUI application
#[derive(Debug)]
pub struct App {
    /// Editor plus persistence
    session: Session,
    /// Application state
    state: AppState,
}

impl App {
    /// Create a new application over a loaded session
    pub fn new(session: Session, ui: &UiConfig) -> Self {
        let mut state = AppState::new();
        state.confirm_clear = ui.confirm_clear;
        state.show_created = ui.show_created;
        if session.load_status().is_failure() {
            state.set_error(LOAD_FAILURE_NOTICE);
        }
        Self { session, state }
    }

    /// Get reference to state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get mutable reference to state
    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Get reference to the editor
    pub fn editor(&self) -> &Editor {
        self.session.editor()
    }

    /// ID of the selected visible task
    pub fn selected_task_id(&self) -> Option<TaskId> {
        self.editor()
            .visible_tasks()
            .get(self.state.selection.selected_index)
            .map(|t| t.id.clone())
    }

    /// Dispatch an action, surface write failures, keep selection in range
    fn dispatch(&mut self, action: Action) -> Change {
        let change = self.session.dispatch(action);
        if let Some(err) = self.session.take_error() {
            self.state.set_error(err);
        }
        let visible = self.editor().visible_tasks().len();
        self.state.selection.clamp(visible);
        change
    }

    /// Handle a key event
    ///
    /// Returns true if the application should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        debug!(?key, mode = ?self.state.interaction_mode, "App::handle_key: called");
        // Clear any transient error message on key press
        self.state.clear_error();

        // Ctrl+C always quits, whatever the mode
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        // Handle based on interaction mode
        match &self.state.interaction_mode {
            InteractionMode::Normal => self.handle_normal_key(key),
            InteractionMode::Input => self.handle_input_key(key),
            InteractionMode::Edit => self.handle_edit_key(key),
            InteractionMode::Confirm(_) => self.handle_confirm_key(key),
            InteractionMode::Help => self.handle_help_key(key),
        }

        self.state.should_quit
    }

    /// Handle key in normal mode
    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            // === Quit ===
            KeyCode::Char('q') => {
                self.state.should_quit = true;
            }

            // === Help ===
            KeyCode::Char('?') | KeyCode::F(1) => {
                self.state.interaction_mode = InteractionMode::Help;
            }

            // === Focus new-task input ===
            KeyCode::Char('a') | KeyCode::Char('i') | KeyCode::Char('n') => {
                self.state.interaction_mode = InteractionMode::Input;
            }

            // === Navigation ===
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.selection.select_prev();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let max = self.editor().visible_tasks().len();
                self.state.selection.select_next(max);
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.state.selection.select_first();
            }
            KeyCode::End | KeyCode::Char('G') => {
                let max = self.editor().visible_tasks().len();
                self.state.selection.select_last(max);
            }

            // === Per-task actions ===
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                if let Some(id) = self.selected_task_id() {
                    self.dispatch(Action::ToggleTask(id));
                }
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                self.handle_start_edit();
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_task_id() {
                    self.dispatch(Action::DeleteTask(id));
                }
            }

            // === Bulk ===
            KeyCode::Char('C') => {
                self.handle_clear_completed();
            }

            // === Filter ===
            KeyCode::Char('f') | KeyCode::Tab => {
                self.dispatch(Action::CycleFilter);
            }

            _ => {}
        }
    }

    /// Enter edit mode for the selected task
    fn handle_start_edit(&mut self) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        let text = self.editor().task(&id).map(|t| t.text.clone()).unwrap_or_default();
        self.dispatch(Action::StartEdit { id, text });
        self.state.interaction_mode = InteractionMode::Edit;
    }

    /// Clear completed tasks, asking first when configured
    fn handle_clear_completed(&mut self) {
        let completed = self.editor().completed_count();
        if completed == 0 {
            return;
        }
        if self.state.confirm_clear {
            self.state.interaction_mode = InteractionMode::Confirm(ConfirmDialog::clear_completed(completed));
        } else {
            self.dispatch(Action::ClearCompleted);
        }
    }

    /// Handle key while typing a new task
    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                if self.dispatch(Action::SubmitInput).is_tasks() {
                    // Newest task is first; follow it when it is visible
                    self.state.selection.select_first();
                }
            }
            KeyCode::Esc => {
                self.state.interaction_mode = InteractionMode::Normal;
            }
            KeyCode::Backspace => {
                self.dispatch(Action::PopInput);
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.dispatch(Action::SetInput(String::new()));
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.dispatch(Action::PushInput(c));
            }
            _ => {}
        }
    }

    /// Handle key while editing a task inline
    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                if let Some(id) = self.editor().editing().map(|e| e.id.clone()) {
                    self.dispatch(Action::CommitEdit(id));
                }
                self.state.interaction_mode = InteractionMode::Normal;
            }
            KeyCode::Esc => {
                self.dispatch(Action::CancelEdit);
                self.state.interaction_mode = InteractionMode::Normal;
            }
            KeyCode::Backspace => {
                self.dispatch(Action::PopEdit);
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.dispatch(Action::SetEditBuffer(String::new()));
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.dispatch(Action::PushEdit(c));
            }
            _ => {}
        }

        // The edited task may have vanished underneath us
        if self.editor().editing().is_none() {
            self.state.interaction_mode = InteractionMode::Normal;
        }
    }

    /// Handle key in confirmation dialog
    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let InteractionMode::Confirm(dialog) = &self.state.interaction_mode else {
            return;
        };
        let action = dialog.action;

        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.state.interaction_mode = InteractionMode::Normal;
                match action {
                    ConfirmAction::ClearCompleted => {
                        self.dispatch(Action::ClearCompleted);
                    }
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.state.interaction_mode = InteractionMode::Normal;
            }
            _ => {}
        }
    }

    /// Handle key in help mode
    fn handle_help_key(&mut self, _key: KeyEvent) {
        // Any key closes help
        self.state.interaction_mode = InteractionMode::Normal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{DEFAULT_KEY, TaskRepository};
    use keystore::{FileStore, KeyValueStore, MemoryStore};
    use tempfile::TempDir;

    fn app() -> App {
        let session = Session::open(TaskRepository::new(MemoryStore::new(), DEFAULT_KEY));
        App::new(session, &UiConfig::default())
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::from(code))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn add(app: &mut App, text: &str) {
        press(app, KeyCode::Char('a'));
        type_text(app, text);
        press(app, KeyCode::Enter);
        press(app, KeyCode::Esc);
    }

    fn texts(app: &App) -> Vec<String> {
        app.editor().tasks().iter().map(|t| t.text.clone()).collect()
    }

    #[test]
    fn test_app_new() {
        let app = app();
        assert!(matches!(app.state().interaction_mode, InteractionMode::Normal));
        assert_eq!(app.editor().total_count(), 0);
        assert!(app.state().error_message.is_none());
    }

    #[test]
    fn test_app_quit_keys() {
        let mut app = app();
        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));

        let mut app = self::app();
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn test_q_while_typing_is_text() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.editor().input(), "q");
    }

    #[test]
    fn test_app_help_toggle() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(matches!(app.state().interaction_mode, InteractionMode::Help));
        press(&mut app, KeyCode::Char('x'));
        assert!(matches!(app.state().interaction_mode, InteractionMode::Normal));
    }

    #[test]
    fn test_add_on_enter_keeps_input_focus() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "buy milk");
        press(&mut app, KeyCode::Enter);

        assert_eq!(texts(&app), vec!["buy milk"]);
        assert_eq!(app.editor().input(), "");
        assert!(matches!(app.state().interaction_mode, InteractionMode::Input));
    }

    #[test]
    fn test_empty_input_adds_nothing() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.editor().total_count(), 0);
    }

    #[test]
    fn test_backspace_and_clear_line() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "abc");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.editor().input(), "ab");

        app.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(app.editor().input(), "");
    }

    #[test]
    fn test_toggle_and_delete_selected() {
        let mut app = app();
        add(&mut app, "first");
        add(&mut app, "second");

        // Selection starts at the newest task
        press(&mut app, KeyCode::Char(' '));
        assert!(app.editor().tasks()[0].completed);

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(texts(&app), vec!["second"]);
        assert_eq!(app.state().selection.selected_index, 0);
    }

    #[test]
    fn test_edit_commit_and_cancel() {
        let mut app = app();
        add(&mut app, "draft");

        press(&mut app, KeyCode::Char('e'));
        assert!(matches!(app.state().interaction_mode, InteractionMode::Edit));
        for _ in 0.."draft".len() {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "final");
        press(&mut app, KeyCode::Enter);
        assert_eq!(texts(&app), vec!["final"]);
        assert!(matches!(app.state().interaction_mode, InteractionMode::Normal));

        press(&mut app, KeyCode::Enter);
        type_text(&mut app, " nope");
        press(&mut app, KeyCode::Esc);
        assert_eq!(texts(&app), vec!["final"]);
        assert!(app.editor().editing().is_none());
    }

    #[test]
    fn test_edit_to_empty_discards() {
        let mut app = app();
        add(&mut app, "keep");

        press(&mut app, KeyCode::Char('e'));
        app.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        press(&mut app, KeyCode::Enter);

        assert_eq!(texts(&app), vec!["keep"]);
        assert!(matches!(app.state().interaction_mode, InteractionMode::Normal));
    }

    #[test]
    fn test_clear_completed_without_confirmation() {
        let mut app = app();
        add(&mut app, "a");
        add(&mut app, "b");
        press(&mut app, KeyCode::Char('x'));

        press(&mut app, KeyCode::Char('C'));
        assert_eq!(texts(&app), vec!["a"]);
    }

    #[test]
    fn test_clear_completed_with_confirmation() {
        let mut app = app();
        app.state_mut().confirm_clear = true;
        add(&mut app, "a");
        press(&mut app, KeyCode::Char('x'));

        press(&mut app, KeyCode::Char('C'));
        assert!(matches!(app.state().interaction_mode, InteractionMode::Confirm(_)));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.editor().total_count(), 1);

        press(&mut app, KeyCode::Char('C'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.editor().total_count(), 0);
    }

    #[test]
    fn test_clear_completed_noop_when_none_completed() {
        let mut app = app();
        app.state_mut().confirm_clear = true;
        add(&mut app, "a");
        press(&mut app, KeyCode::Char('C'));
        assert!(matches!(app.state().interaction_mode, InteractionMode::Normal));
    }

    #[test]
    fn test_filter_changes_selection_target() {
        let mut app = app();
        add(&mut app, "old");
        add(&mut app, "new");
        press(&mut app, KeyCode::Char('x')); // complete "new"

        press(&mut app, KeyCode::Char('f')); // active only
        let selected = app.selected_task_id().unwrap();
        assert_eq!(app.editor().task(&selected).unwrap().text, "old");
    }

    #[test]
    fn test_write_failure_shows_error_but_keeps_task() {
        let session = Session::open(TaskRepository::new(MemoryStore::new().with_quota(0), DEFAULT_KEY));
        let mut app = App::new(session, &UiConfig::default());

        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "unsaved");
        press(&mut app, KeyCode::Enter);

        assert_eq!(texts(&app), vec!["unsaved"]);
        assert!(app.state().error_message.as_deref().unwrap().contains("Failed to save"));
    }

    #[test]
    fn test_corrupt_store_shows_notice() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::open(temp.path()).unwrap();
        store.set(DEFAULT_KEY, "nonsense").unwrap();

        let session = Session::open(TaskRepository::new(store, DEFAULT_KEY));
        let app = App::new(session, &UiConfig::default());
        assert_eq!(app.state().error_message.as_deref(), Some(LOAD_FAILURE_NOTICE));
    }
}
