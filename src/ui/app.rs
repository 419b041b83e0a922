//! Main TUI application state and logic

use crate::controller::Controller;
use crate::replay::{self, Cursor, Entry};
use crate::snapshot::Snapshot;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Timeline,
    Grammar,
    Structures,
}

impl FocusedPane {
    /// Move focus to the next pane (timeline -> grammar -> structures)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Timeline => FocusedPane::Grammar,
            FocusedPane::Grammar => FocusedPane::Structures,
            FocusedPane::Structures => FocusedPane::Timeline,
        }
    }

    /// Move focus to the previous pane
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Timeline => FocusedPane::Structures,
            FocusedPane::Grammar => FocusedPane::Timeline,
            FocusedPane::Structures => FocusedPane::Grammar,
        }
    }
}

/// The main application state
pub struct App {
    /// The finished run being explored
    pub controller: Controller,

    /// Active step
    pub cursor: Cursor,

    /// Step list, computed once
    pub entries: Vec<Entry>,

    /// State recorded by the active step (None if it could not be restored)
    pub snapshot: Option<Snapshot>,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub timeline_scroll: usize,
    pub grammar_scroll: usize,
    pub structures_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,
}

impl App {
    /// Create a new app over a finished controller
    pub fn new(controller: Controller) -> Self {
        let cursor = Cursor::new(controller.timeline());
        let entries = replay::entries(controller.timeline());
        let mut app = App {
            controller,
            cursor,
            entries,
            snapshot: None,
            focused_pane: FocusedPane::Timeline,
            timeline_scroll: 0,
            grammar_scroll: 0,
            structures_scroll: 0,
            should_quit: false,
            status_message: String::from("Ready!"),
        };
        app.open_active_step();
        app
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Index of the active step in the step list
    pub fn position(&self) -> usize {
        self.entries
            .iter()
            .position(|entry| entry.id == self.cursor.active())
            .unwrap_or(0)
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Panes on top, status bar at the bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        // Left column: step list | Right column: grammar (top), structures (bottom)
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(main_chunks[0]);

        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[1]);

        super::panes::render_timeline_pane(
            frame,
            columns[0],
            &self.entries,
            self.cursor.active(),
            self.focused_pane == FocusedPane::Timeline,
            &mut self.timeline_scroll,
        );

        super::panes::render_grammar_pane(
            frame,
            right_rows[0],
            self.snapshot.as_ref().map(|s| &s.grammar),
            self.focused_pane == FocusedPane::Grammar,
            &mut self.grammar_scroll,
        );

        super::panes::render_structures_pane(
            frame,
            right_rows[1],
            self.snapshot.as_ref().map(|s| &s.structures),
            self.focused_pane == FocusedPane::Structures,
            &mut self.structures_scroll,
        );

        let breadcrumbs = self.cursor.breadcrumbs(self.controller.timeline());
        super::panes::render_status_bar(
            frame,
            main_chunks[1],
            &self.status_message,
            &breadcrumbs,
            self.position(),
            self.entries.len(),
        );
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        let timeline = self.controller.timeline();
        let moved = match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
                false
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
                false
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
                false
            }
            KeyCode::Left => self.cursor.go_backward(timeline),
            KeyCode::Right => self.cursor.go_forward(timeline),
            KeyCode::Up => self.cursor.go_prev(timeline),
            KeyCode::Down => self.cursor.go_next(timeline),
            KeyCode::Enter => self.cursor.go_end(timeline),
            KeyCode::Backspace => self.cursor.go_start(timeline),
            KeyCode::PageUp => {
                self.scroll_focused(|offset| offset.saturating_sub(5));
                false
            }
            KeyCode::PageDown => {
                self.scroll_focused(|offset| offset.saturating_add(5));
                false
            }
            _ => false,
        };

        if moved {
            self.open_active_step();
        }
    }

    fn scroll_focused(&mut self, change: impl Fn(usize) -> usize) {
        let offset = match self.focused_pane {
            FocusedPane::Timeline => &mut self.timeline_scroll,
            FocusedPane::Grammar => &mut self.grammar_scroll,
            FocusedPane::Structures => &mut self.structures_scroll,
        };
        *offset = change(*offset);
    }

    /// Restore the state recorded by the active step
    fn open_active_step(&mut self) {
        match self.controller.snapshot_at(self.cursor.active()) {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot);
                self.status_message = "Ready!".to_string();
            }
            Err(e) => {
                self.snapshot = None;
                self.status_message = format!("Cannot open step: {}", e);
            }
        }
        self.grammar_scroll = 0;
        self.structures_scroll = 0;
    }
}
