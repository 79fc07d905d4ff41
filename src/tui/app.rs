//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which owns the board state, turns
//! key presses into board actions, and renders the single screen: a header,
//! the task form, the task list and a status bar, with help and delete
//! confirmation drawn on top when active.
//!
//! Network calls run on a private current-thread runtime; the UI blocks on
//! each action (request, then list re-fetch) before drawing again.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use tokio::runtime::Runtime;

use crate::client::TaskClient;
use crate::db::{format_created, truncate};
use crate::task::Task;
use crate::tui::{
    board::Board,
    colors::{ACCENT_BLUE, DARK_RED, DONE_GREEN, EDIT_ORANGE},
    enums::{AppState, InputMode},
    input::InputField,
    utils::centered_rect,
};

/// Main application state for the terminal user interface.
pub struct App {
    state: AppState,
    input_mode: InputMode,
    board: Board,
    client: TaskClient,
    runtime: Runtime,
    task_list_state: TableState,
    status_message: String,
    confirm_task: Option<u64>,
}

impl App {
    /// Create the app and fetch the task list once.
    pub fn new(client: TaskClient) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        let mut app = App {
            state: AppState::TaskList,
            input_mode: InputMode::None,
            board: Board::new(),
            client,
            runtime,
            task_list_state: TableState::default(),
            status_message: String::new(),
            confirm_task: None,
        };
        app.refresh_tasks();
        Ok(app)
    }

    /// Re-fetch the list from the API.
    fn refresh_tasks(&mut self) {
        let selected = self.selected_task().map(|t| t.id);
        self.runtime.block_on(self.board.fetch_tasks(&self.client));
        self.restore_selection(selected);
    }

    /// Keep the same task selected after the list was replaced, or fall back
    /// to the nearest row.
    fn restore_selection(&mut self, previous: Option<u64>) {
        let len = self.board.tasks.len();
        if len == 0 {
            self.task_list_state.select(None);
            return;
        }
        let by_id = previous.and_then(|id| self.board.tasks.iter().position(|t| t.id == id));
        let idx = by_id.unwrap_or_else(|| self.task_list_state.selected().unwrap_or(0).min(len - 1));
        self.task_list_state.select(Some(idx));
    }

    fn selected_task(&self) -> Option<&Task> {
        self.task_list_state.selected().and_then(|i| self.board.tasks.get(i))
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    fn focus_form(&mut self) {
        self.state = AppState::Form;
        self.input_mode = InputMode::Text;
    }

    fn focus_list(&mut self) {
        self.state = AppState::TaskList;
        self.input_mode = InputMode::None;
    }

    /// Dispatch a key press to the handler for the current state.
    ///
    /// Returns true if the application should quit.
    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> io::Result<bool> {
        if key == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }
        self.clear_status_message();
        match self.state {
            AppState::TaskList => self.handle_task_list_input(key),
            AppState::Form => self.handle_form_input(key),
            AppState::Help => self.handle_help_input(key),
            AppState::Confirm => self.handle_confirm_input(key),
        }
    }

    /// Handle keyboard input when the task list has focus.
    fn handle_task_list_input(&mut self, key: KeyCode) -> io::Result<bool> {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Up | KeyCode::Char('k') => {
                if let Some(selected) = self.task_list_state.selected() {
                    if selected > 0 {
                        self.task_list_state.select(Some(selected - 1));
                    }
                } else if !self.board.tasks.is_empty() {
                    self.task_list_state.select(Some(0));
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if let Some(selected) = self.task_list_state.selected() {
                    if selected + 1 < self.board.tasks.len() {
                        self.task_list_state.select(Some(selected + 1));
                    }
                } else if !self.board.tasks.is_empty() {
                    self.task_list_state.select(Some(0));
                }
            }
            KeyCode::Char('a') | KeyCode::Tab => self.focus_form(),
            KeyCode::Char('n') => {
                self.board.reset_form();
                self.focus_form();
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(task) = self.selected_task().cloned() {
                    self.board.edit(&task);
                    self.focus_form();
                    self.set_status_message(format!("Editing task #{}", task.id));
                }
            }
            KeyCode::Char('c') | KeyCode::Char(' ') => {
                if let Some(task) = self.selected_task().cloned() {
                    let done = self.runtime.block_on(self.board.toggle_complete(&self.client, &task));
                    self.restore_selection(Some(task.id));
                    if done {
                        self.set_status_message(if task.completed {
                            "Task reopened"
                        } else {
                            "Task completed"
                        });
                    }
                }
            }
            KeyCode::Char('d') => {
                if let Some(task) = self.selected_task() {
                    self.confirm_task = Some(task.id);
                    self.state = AppState::Confirm;
                }
            }
            KeyCode::Char('r') => {
                self.refresh_tasks();
                self.set_status_message("Tasks refreshed");
            }
            KeyCode::Char('h') | KeyCode::F(1) => self.state = AppState::Help,
            _ => {}
        }
        Ok(false)
    }

    /// Handle keyboard input when the form has focus.
    fn handle_form_input(&mut self, key: KeyCode) -> io::Result<bool> {
        match key {
            KeyCode::Esc => self.focus_list(),
            KeyCode::Tab | KeyCode::Down => self.board.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.board.form.prev_field(),
            KeyCode::Left => self.board.form.handle_left_right(false),
            KeyCode::Right => self.board.form.handle_left_right(true),
            KeyCode::Home => self.board.form.active_field_mut().move_cursor_home(),
            KeyCode::End => self.board.form.active_field_mut().move_cursor_end(),
            KeyCode::Backspace => self.board.form.handle_backspace(),
            KeyCode::Delete => self.board.form.active_field_mut().handle_delete(),
            KeyCode::Enter => {
                if self.board.form.title_is_blank() {
                    self.set_status_message("Title is required");
                    return Ok(false);
                }
                let was_editing = self.board.is_editing();
                let selected = self.selected_task().map(|t| t.id);
                if self.runtime.block_on(self.board.submit(&self.client)) {
                    self.restore_selection(selected);
                    self.focus_list();
                    self.set_status_message(if was_editing { "Task updated" } else { "Task created" });
                }
            }
            KeyCode::Char(c) => self.board.form.handle_char(c),
            _ => {}
        }
        Ok(false)
    }

    /// Handle keyboard input in the delete confirmation dialog.
    fn handle_confirm_input(&mut self, key: KeyCode) -> io::Result<bool> {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some(id) = self.confirm_task.take() {
                    if self.runtime.block_on(self.board.delete(&self.client, id)) {
                        if self.board.editing_task.as_ref().is_some_and(|t| t.id == id) {
                            self.board.reset_form();
                        }
                        self.restore_selection(None);
                        self.set_status_message(format!("Deleted task #{id}"));
                    }
                }
                self.state = AppState::TaskList;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_task = None;
                self.state = AppState::TaskList;
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_help_input(&mut self, key: KeyCode) -> io::Result<bool> {
        if matches!(key, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h')) {
            self.state = AppState::TaskList;
        }
        Ok(false)
    }

    /// Poll for and handle one keyboard event.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return self.handle_key(key.code, key.modifiers);
                }
            }
        }
        Ok(false)
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let mode = match &self.board.editing_task {
            Some(task) => Span::styled(format!("Editing #{}", task.id), Style::default().fg(EDIT_ORANGE)),
            None => Span::styled("New task", Style::default().fg(Color::Cyan)),
        };
        let header = Paragraph::new(Line::from(vec![
            Span::styled("TASK BOARD", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(self.client.base_url().to_string(), Style::default().add_modifier(Modifier::ITALIC)),
            Span::raw("  "),
            mode,
        ]))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_input(&self, f: &mut Frame, area: Rect, label: &str, field: &InputField) {
        let focused = self.state == AppState::Form && field.active;
        let border = if focused { Style::default().fg(ACCENT_BLUE) } else { Style::default() };
        let input = Paragraph::new(field.value.as_str())
            .block(Block::default().borders(Borders::ALL).title(label).border_style(border));
        f.render_widget(input, area);
    }

    /// Render the title/description form.
    fn render_task_form(&self, f: &mut Frame, area: Rect) {
        let (title, color) = match &self.board.editing_task {
            Some(task) => (format!("Edit Task #{} - Enter to save", task.id), EDIT_ORANGE),
            None => ("Add Task - Enter to save".to_string(), ACCENT_BLUE),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(if self.state == AppState::Form { Style::default().fg(color) } else { Style::default() });
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(3)])
            .split(inner);
        let form = &self.board.form;
        self.render_input(f, chunks[0], "Title", &form.title);
        self.render_input(f, chunks[1], "Description", &form.description);

        if self.input_mode == InputMode::Text {
            let chunk = if form.description.active { chunks[1] } else { chunks[0] };
            let cursor = form.active_field().cursor as u16;
            f.set_cursor_position((chunk.x + cursor + 1, chunk.y + 1));
        }
    }

    /// Render the task table.
    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let header = Row::new(["ID", "Done", "Title", "Description", "Created"].map(|h| {
            Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD))
        }))
        .style(Style::default().bg(ACCENT_BLUE).fg(Color::White));

        let rows: Vec<Row> = self
            .board
            .tasks
            .iter()
            .map(|task| {
                let style = if task.completed {
                    Style::default().fg(DONE_GREEN)
                } else {
                    Style::default().fg(Color::White)
                };
                Row::new(vec![
                    Cell::from(task.id.to_string()),
                    Cell::from(if task.completed { "[x]" } else { "[ ]" }),
                    Cell::from(task.title.clone()),
                    Cell::from(task.description.as_deref().map(|d| truncate(d, 60)).unwrap_or_default()),
                    Cell::from(format_created(task.created_at)),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Min(20),
            Constraint::Min(20),
            Constraint::Length(11),
        ];

        let border = if self.state == AppState::TaskList { Style::default().fg(ACCENT_BLUE) } else { Style::default() };
        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(format!("Tasks ({}) - Press 'h' for help", self.board.tasks.len())),
            )
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.task_list_state);
    }

    /// Render the help screen with keyboard shortcuts.
    fn render_help(&self, f: &mut Frame, area: Rect) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(Span::styled("Task Board Help", bold)),
            Line::from(""),
            Line::from(Span::styled("Task List:", bold)),
            Line::from("  Up/Down, k/j   Select task"),
            Line::from("  a, Tab         Focus the form"),
            Line::from("  n              New task (leave edit mode, clear form)"),
            Line::from("  e, Enter       Edit selected task"),
            Line::from("  c, Space       Toggle completed"),
            Line::from("  d              Delete selected task"),
            Line::from("  r              Refresh task list"),
            Line::from("  h, F1          Show this help"),
            Line::from("  q, Esc, Ctrl+C Quit"),
            Line::from(""),
            Line::from(Span::styled("Form:", bold)),
            Line::from("  Tab, Up/Down   Switch between title and description"),
            Line::from("  Left/Right     Move cursor"),
            Line::from("  Enter          Save (create or update)"),
            Line::from("  Esc            Back to the list, keeping what you typed"),
        ];

        let area = centered_rect(70, 80, area);
        f.render_widget(Clear, area);
        let paragraph = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Help - Esc to return"))
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    /// Render the delete confirmation dialog.
    fn render_confirm(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Confirm Delete")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 30, area);
        f.render_widget(Clear, area);

        let target = self
            .confirm_task
            .and_then(|id| self.board.tasks.iter().find(|t| t.id == id))
            .map(|t| format!("#{} {}", t.id, truncate(&t.title, 40)))
            .unwrap_or_default();
        let text = vec![
            Line::from(""),
            Line::from(Span::styled("Delete this task?", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(target),
            Line::from(""),
            Line::from("This action cannot be undone."),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::TaskList => format!("Tasks: {} | Press 'h' for help", self.board.tasks.len()),
                AppState::Form if self.board.is_editing() => "Edit Task".to_string(),
                AppState::Form => "Add New Task".to_string(),
                AppState::Help => "Help".to_string(),
                AppState::Confirm => "Confirm Action".to_string(),
            }
        };
        let status = Paragraph::new(text).style(Style::default().bg(ACCENT_BLUE).fg(Color::White));
        f.render_widget(status, area);
    }

    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(8),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_task_form(f, chunks[1]);
        self.render_task_list(f, chunks[2]);
        match self.state {
            AppState::Help => self.render_help(f, chunks[2]),
            AppState::Confirm => self.render_confirm(f, chunks[2]),
            AppState::TaskList | AppState::Form => {}
        }
        self.render_status_bar(f, chunks[3]);
    }

    /// Main event loop for the TUI application.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}
