//! TUI views and rendering
//!
//! All rendering logic is contained here. The views module draws the UI from
//! the App's state and editor, but never modifies either.

use chrono::Local;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use tracing::trace;

use crate::domain::Task;
use crate::editor::{Editor, Filter};

use super::app::App;
use super::state::{AppState, ConfirmDialog, InteractionMode};

/// Shown in the empty input field
pub const INPUT_PLACEHOLDER: &str = "Add a new task...";

/// Footer action shown while completed tasks exist
pub const CLEAR_COMPLETED_HINT: &str = "Clear completed tasks (C)";

mod colors {
    use ratatui::style::Color;

    pub const HEADER: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const KEYBIND: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const COMPLETE: Color = Color::Rgb(50, 205, 50); // Lime green
    pub const ERROR: Color = Color::Rgb(220, 20, 60); // Crimson
    pub const FOCUS: Color = Color::Rgb(255, 215, 0); // Gold
    pub const SELECTED_BG: Color = Color::Rgb(40, 40, 40);
    pub const DIM: Color = Color::DarkGray;
}

/// Main render function
pub fn render(app: &App, frame: &mut Frame) {
    let state = app.state();
    let editor = app.editor();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // New-task input
            Constraint::Min(3),    // Task list
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(editor, frame, chunks[0]);
    render_input(state, editor, frame, chunks[1]);
    render_task_list(state, editor, frame, chunks[2]);
    render_footer(state, editor, frame, chunks[3]);

    match &state.interaction_mode {
        InteractionMode::Help => render_help_overlay(frame, frame.area()),
        InteractionMode::Confirm(dialog) => render_confirm_dialog(dialog, frame, frame.area()),
        _ => {}
    }
}

/// Render the title and completion summary
fn render_header(editor: &Editor, frame: &mut Frame, area: Rect) {
    trace!("render_header: called");
    let summary_style = if editor.total_count() > 0 && editor.active_count() == 0 {
        Style::default().fg(colors::COMPLETE)
    } else {
        Style::default()
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "Task List ",
            Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::styled(editor.summary(), summary_style),
    ]))
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

/// Render the new-task input field
fn render_input(state: &AppState, editor: &Editor, frame: &mut Frame, area: Rect) {
    trace!("render_input: called");
    let focused = matches!(state.interaction_mode, InteractionMode::Input);

    let content = if editor.input().is_empty() {
        Line::from(Span::styled(INPUT_PLACEHOLDER, Style::default().fg(colors::DIM)))
    } else {
        Line::from(editor.input())
    };

    let border_style = if focused {
        Style::default().fg(colors::FOCUS)
    } else {
        Style::default().fg(colors::DIM)
    };

    let input = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" New task "),
    );
    frame.render_widget(input, area);

    if focused {
        let width = Line::from(editor.input()).width() as u16;
        let x = (area.x + 1 + width).min(area.right().saturating_sub(2));
        frame.set_cursor_position(Position::new(x, area.y + 1));
    }
}

/// Render the task list, or the empty state
fn render_task_list(state: &AppState, editor: &Editor, frame: &mut Frame, area: Rect) {
    trace!("render_task_list: called");
    let title = match editor.filter() {
        Filter::All => format!(" Tasks ({}) ", editor.total_count()),
        filter => format!(" Tasks: {} ({}) ", filter, editor.visible_tasks().len()),
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    let visible = editor.visible_tasks();
    if visible.is_empty() {
        frame.render_widget(block, area);
        render_empty_message(editor, frame, area);
        return;
    }

    let items: Vec<ListItem> = visible
        .iter()
        .map(|task| ListItem::new(task_line(task, editor, state.show_created)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(colors::SELECTED_BG).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut list_state = ListState::default().with_selected(Some(state.selection.selected_index));
    frame.render_stateful_widget(list, area, &mut list_state);

    // Cursor at the end of the inline edit field
    if let (InteractionMode::Edit, Some(session)) = (&state.interaction_mode, editor.editing())
        && let Some(row) = visible.iter().position(|t| t.id == session.id)
        && row >= list_state.offset()
    {
        let y = area.y + 1 + (row - list_state.offset()) as u16;
        // Highlight symbol plus checkbox
        let prefix = 2 + 4;
        let width = Line::from(session.buffer.as_str()).width() as u16;
        let x = (area.x + 1 + prefix + width).min(area.right().saturating_sub(2));
        if y < area.bottom().saturating_sub(1) {
            frame.set_cursor_position(Position::new(x, y));
        }
    }
}

/// Build the display line for one task
fn task_line<'a>(task: &'a Task, editor: &'a Editor, show_created: bool) -> Line<'a> {
    let marker = if task.completed { "[x] " } else { "[ ] " };
    let marker_style = if task.completed {
        Style::default().fg(colors::COMPLETE)
    } else {
        Style::default()
    };

    let mut spans = vec![Span::styled(marker, marker_style)];

    match editor.editing() {
        Some(session) if session.id == task.id => {
            spans.push(Span::styled(
                session.buffer.as_str(),
                Style::default().fg(colors::FOCUS).add_modifier(Modifier::UNDERLINED),
            ));
        }
        _ => {
            let text_style = if task.completed {
                Style::default().fg(colors::DIM).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            spans.push(Span::styled(task.text.as_str(), text_style));
        }
    }

    if show_created {
        let created = task.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
        spans.push(Span::styled(format!("  {}", created), Style::default().fg(colors::DIM)));
    }

    Line::from(spans)
}

/// Render empty state message
fn render_empty_message(editor: &Editor, frame: &mut Frame, area: Rect) {
    trace!("render_empty_message: called");
    let inner = area.inner(Margin {
        horizontal: 2,
        vertical: 1,
    });

    let lines = if editor.total_count() == 0 {
        vec![
            Line::from(Span::styled("No tasks yet", Style::default().add_modifier(Modifier::BOLD))),
            Line::from("Add your first task above to get started!"),
        ]
    } else {
        vec![Line::from(format!("No {} tasks", editor.filter()))]
    };

    let empty = Paragraph::new(lines)
        .style(Style::default().fg(colors::DIM))
        .alignment(Alignment::Center);

    frame.render_widget(empty, inner);
}

/// Render the footer: error line or key hints, plus the clear action
///
/// The clear action gets its own right-aligned column so long hints or
/// errors clip on the left side instead of pushing it off screen.
fn render_footer(state: &AppState, editor: &Editor, frame: &mut Frame, area: Rect) {
    trace!("render_footer: called");
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let spans = match &state.error_message {
        Some(msg) => vec![Span::styled(msg.as_str(), Style::default().fg(colors::ERROR))],
        None => mode_hints(&state.interaction_mode),
    };

    let hints_area = if editor.completed_count() > 0 {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(CLEAR_COMPLETED_HINT.chars().count() as u16 + 2),
            ])
            .split(inner);
        let clear = Paragraph::new(Span::styled(CLEAR_COMPLETED_HINT, Style::default().fg(colors::FOCUS)))
            .alignment(Alignment::Right);
        frame.render_widget(clear, columns[1]);
        columns[0]
    } else {
        inner
    };

    frame.render_widget(Paragraph::new(Line::from(spans)), hints_area);
}

/// Short key hints for the current mode
fn mode_hints(mode: &InteractionMode) -> Vec<Span<'static>> {
    let pairs: &[(&str, &str)] = match mode {
        InteractionMode::Input => &[("Enter", "add"), ("Esc", "done")],
        InteractionMode::Edit => &[("Enter", "save"), ("Esc", "cancel")],
        InteractionMode::Confirm(_) => &[("y", "yes"), ("n", "no")],
        InteractionMode::Help => &[("any key", "close")],
        InteractionMode::Normal => &[
            ("a", "add"),
            ("space", "toggle"),
            ("e", "edit"),
            ("d", "delete"),
            ("f", "filter"),
            ("?", "help"),
            ("q", "quit"),
        ],
    };

    let mut spans = Vec::with_capacity(pairs.len() * 2);
    for (key, desc) in pairs {
        spans.push(Span::styled(*key, Style::default().fg(colors::KEYBIND)));
        spans.push(Span::raw(format!(" {} ", desc)));
    }
    spans
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, area: Rect) {
    trace!("render_help_overlay: called");
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)))
    };

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                .fg(colors::HEADER),
        )),
        Line::from(""),
        section("Tasks"),
        key_line("a/i/n", "Type a new task"),
        key_line("space/x", "Toggle completed"),
        key_line("e/Enter", "Edit selected"),
        key_line("d/Del", "Delete selected"),
        key_line("C", "Clear completed tasks"),
        Line::from(""),
        section("Navigation"),
        key_line("j/↓", "Move down"),
        key_line("k/↑", "Move up"),
        key_line("g", "Go to top"),
        key_line("G", "Go to bottom"),
        key_line("f/Tab", "Cycle filter (all, active, completed)"),
        Line::from(""),
        section("Editing"),
        key_line("Enter", "Add / save"),
        key_line("Esc", "Leave input / cancel edit"),
        key_line("Ctrl-U", "Clear the line"),
        Line::from(""),
        key_line("?", "Toggle help"),
        key_line("q/Ctrl-C", "Quit"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help (any key to close) ")
                .style(Style::default().bg(Color::Black)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(help, popup_area);
}

/// Helper to create a key binding line
fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<12}", key), Style::default().fg(colors::KEYBIND)),
        Span::raw(desc),
    ])
}

/// Render confirmation dialog
fn render_confirm_dialog(dialog: &ConfirmDialog, frame: &mut Frame, area: Rect) {
    trace!("render_confirm_dialog: called");
    let popup_area = centered_rect(50, 30, area);
    frame.render_widget(Clear, popup_area);

    let content = vec![
        Line::from(""),
        Line::from(dialog.message.as_str()),
        Line::from(""),
        Line::from(vec![
            Span::styled(" y ", Style::default().fg(Color::Black).bg(Color::Green)),
            Span::raw(" confirm    "),
            Span::styled(" n ", Style::default().fg(Color::Black).bg(Color::Red)),
            Span::raw(" cancel"),
        ]),
    ];

    let dialog_widget = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Confirm ")
                .style(Style::default().bg(Color::Black)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(dialog_widget, popup_area);
}

/// Helper to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;
    use crate::persistence::{DEFAULT_KEY, TaskRepository};
    use crate::session::Session;
    use crossterm::event::{KeyCode, KeyEvent};
    use keystore::MemoryStore;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn app() -> App {
        let session = Session::open(TaskRepository::new(MemoryStore::new(), DEFAULT_KEY));
        let ui = UiConfig {
            show_created: false,
            ..UiConfig::default()
        };
        App::new(session, &ui)
    }

    fn screen(app: &App) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();

        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::from(code));
    }

    fn add(app: &mut App, text: &str) {
        press(app, KeyCode::Char('a'));
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
        press(app, KeyCode::Enter);
        press(app, KeyCode::Esc);
    }

    #[test]
    fn test_empty_state() {
        let out = screen(&app());
        assert!(out.contains("No tasks yet. Add one below!"));
        assert!(out.contains("Add your first task above to get started!"));
        assert!(out.contains(INPUT_PLACEHOLDER));
        assert!(!out.contains(CLEAR_COMPLETED_HINT));
    }

    #[test]
    fn test_list_and_summary() {
        let mut app = app();
        add(&mut app, "buy milk");
        add(&mut app, "walk dog");
        press(&mut app, KeyCode::Char('x'));

        let out = screen(&app);
        assert!(out.contains("1 of 2 tasks completed"));
        assert!(out.contains("[x] walk dog"));
        assert!(out.contains("[ ] buy milk"));
        assert!(out.contains(CLEAR_COMPLETED_HINT));
        assert!(!out.contains("No tasks yet"));
    }

    #[test]
    fn test_clear_action_fits_footer_row() {
        let mut app = app();
        add(&mut app, "done");
        press(&mut app, KeyCode::Char('x'));

        // Footer text sits on the row above the bottom border
        let out = screen(&app);
        let footer_row = out.lines().nth(22).unwrap();
        assert!(footer_row.contains(CLEAR_COMPLETED_HINT));
        assert!(footer_row.contains("add"));

        // A long error clips on the left, the action stays visible
        app.state_mut().set_error("Failed to save tasks: ".repeat(6));
        let out = screen(&app);
        let footer_row = out.lines().nth(22).unwrap();
        assert!(footer_row.contains("Failed to save tasks"));
        assert!(footer_row.contains(CLEAR_COMPLETED_HINT));
    }

    #[test]
    fn test_completed_text_is_crossed_out() {
        let mut app = app();
        add(&mut app, "done");
        press(&mut app, KeyCode::Char('x'));

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(&app, frame)).unwrap();

        let buffer = terminal.backend().buffer();
        let crossed = (0..buffer.area.height).any(|y| {
            (0..buffer.area.width).any(|x| {
                let cell = &buffer[(x, y)];
                cell.symbol() == "d" && cell.modifier.contains(Modifier::CROSSED_OUT)
            })
        });
        assert!(crossed);
    }

    #[test]
    fn test_inline_edit_shows_buffer() {
        let mut app = app();
        add(&mut app, "old text");
        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Char('!'));

        let out = screen(&app);
        assert!(out.contains("[ ] old text!"));
    }

    #[test]
    fn test_filter_empty_message() {
        let mut app = app();
        add(&mut app, "open");
        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.editor().filter(), Filter::Completed);

        let out = screen(&app);
        assert!(out.contains("No completed tasks"));
    }

    #[test]
    fn test_help_and_confirm_overlays() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(screen(&app).contains("Keyboard Shortcuts"));
        press(&mut app, KeyCode::Esc);

        app.state_mut().confirm_clear = true;
        add(&mut app, "x");
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Char('C'));
        assert!(screen(&app).contains("Clear 1 completed task?"));
    }

    #[test]
    fn test_error_replaces_hints() {
        let mut app = app();
        app.state_mut().set_error("Failed to save tasks: disk full");
        let out = screen(&app);
        assert!(out.contains("Failed to save tasks: disk full"));
    }

    #[test]
    fn test_created_time_shown_when_enabled() {
        let session = Session::open(TaskRepository::new(MemoryStore::new(), DEFAULT_KEY));
        let mut app = App::new(session, &UiConfig::default());
        add(&mut app, "stamped");

        let task = &app.editor().tasks()[0];
        let year = task.created_at.with_timezone(&Local).format("%Y-").to_string();
        assert!(screen(&app).contains(&year));
    }

    #[test]
    fn test_centered_rect_is_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(50, 20, area);
        assert!(popup.x >= area.x && popup.right() <= area.right());
        assert!(popup.y >= area.y && popup.bottom() <= area.bottom());
        assert_eq!(popup.width, 50);
    }
}
