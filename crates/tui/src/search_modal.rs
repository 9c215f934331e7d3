//! Terminal rendering and input handling for the station search modal.

use std::cmp;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        block::Title, Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap,
    },
    Frame,
};
use stations_core::{Applied, FetchTag, FetchTicket, ListView, SearchModal, Station, StationRow};
use tracing::debug;

use crate::{input::QueryInput, theme::Theme};

const PANEL_WIDTH: u16 = 64;
const PANEL_HEIGHT: u16 = 22;
const CLOSE_LABEL: &str = "[x]";
pub const FAVORITE_GLYPH: &str = "★";
pub const NOT_FAVORITE_GLYPH: &str = "☆";
/// Width of the glyph column that toggles the favorite on click.
const GLYPH_COLUMNS: u16 = 2;
const SPINNER: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Screen areas recorded at the last draw, used to route mouse clicks.
#[derive(Debug, Clone, Copy, Default)]
struct HitAreas {
    panel: Rect,
    close: Rect,
    rows: Rect,
}

/// A mounted search modal plus its terminal-side state.
pub struct ModalScreen {
    modal: SearchModal,
    input: QueryInput,
    cursor: usize,
    offset: usize,
    list_height: usize,
    hit: HitAreas,
}

impl ModalScreen {
    pub fn new(modal: SearchModal) -> Self {
        Self {
            modal,
            input: QueryInput::default(),
            cursor: 0,
            offset: 0,
            list_height: 1,
            hit: HitAreas::default(),
        }
    }

    pub fn modal(&self) -> &SearchModal {
        &self.modal
    }

    pub fn apply(
        &mut self,
        tag: FetchTag,
        outcome: Result<Vec<Station>, impl std::fmt::Display>,
    ) -> Applied {
        let applied = self.modal.apply(tag, outcome);
        if applied == Applied::Current {
            self.cursor = 0;
            self.offset = 0;
        }
        applied
    }

    /// Handle a key press; returns a request to dispatch when the query changed.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<FetchTicket> {
        match key.code {
            KeyCode::Esc => {
                self.modal.back_requested();
                None
            }
            KeyCode::Enter => {
                self.modal.select(self.cursor);
                None
            }
            KeyCode::Up => {
                self.move_cursor(-1);
                None
            }
            KeyCode::Down => {
                self.move_cursor(1);
                None
            }
            KeyCode::PageUp => {
                self.move_cursor(-(self.list_height.max(1) as isize));
                None
            }
            KeyCode::PageDown => {
                self.move_cursor(self.list_height.max(1) as isize);
                None
            }
            KeyCode::Char('f') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.modal.toggle_favorite(self.cursor);
                None
            }
            _ if !self.modal.accepts_text_input() => None,
            KeyCode::Left => {
                self.input.move_cursor(-1);
                None
            }
            KeyCode::Right => {
                self.input.move_cursor(1);
                None
            }
            KeyCode::Home => {
                self.input.move_home();
                None
            }
            KeyCode::End => {
                self.input.move_end();
                None
            }
            KeyCode::Backspace => self.edited(|input| input.backspace()),
            KeyCode::Delete => self.edited(|input| input.delete()),
            KeyCode::Char(ch)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                self.edited(|input| input.insert(ch))
            }
            _ => None,
        }
    }

    /// Handle a left click at terminal cell (`column`, `row`).
    pub fn handle_click(&mut self, column: u16, row: u16) {
        if contains(self.hit.close, column, row) {
            self.modal.close();
            return;
        }
        if !contains(self.hit.panel, column, row) {
            self.modal.backdrop_tapped();
            return;
        }
        if !contains(self.hit.rows, column, row) {
            return;
        }
        let index = self.offset + (row - self.hit.rows.y) as usize;
        if index >= self.modal.row_count() {
            return;
        }
        if column < self.hit.rows.x + GLYPH_COLUMNS {
            self.modal.toggle_favorite(index);
        } else {
            self.cursor = index;
            self.modal.select(index);
        }
    }

    fn edited(&mut self, edit: impl FnOnce(&mut QueryInput) -> bool) -> Option<FetchTicket> {
        if !edit(&mut self.input) {
            return None;
        }
        debug!(query = self.input.value(), "Query changed");
        Some(self.modal.on_text_change(self.input.value()))
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.modal.row_count();
        if len == 0 {
            return;
        }
        self.cursor = (self.cursor as isize + delta).clamp(0, len as isize - 1) as usize;
        self.ensure_cursor_visible();
    }

    fn ensure_cursor_visible(&mut self) {
        let len = self.modal.row_count();
        if len == 0 || self.list_height == 0 {
            self.offset = 0;
            return;
        }
        if self.cursor >= len {
            self.cursor = len - 1;
        }
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + self.list_height {
            self.offset = self.cursor + 1 - self.list_height;
        }
        self.offset = self.offset.min(len.saturating_sub(self.list_height));
    }

    pub fn render(&mut self, frame: &mut Frame, theme: &Theme, tick: usize) {
        let area = frame.size();
        frame.render_widget(Clear, area);
        frame.render_widget(
            Block::default().style(Style::default().bg(theme.backdrop).fg(theme.muted)),
            area,
        );

        let width = cmp::min(PANEL_WIDTH, area.width.saturating_sub(4)).max(24);
        let height = cmp::min(PANEL_HEIGHT, area.height.saturating_sub(2)).max(8);
        let panel = centered_rect(width, height, area);
        frame.render_widget(Clear, panel);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent))
            .title(" Search stations ")
            .title(
                Title::from(Span::styled(
                    CLOSE_LABEL,
                    Style::default().fg(theme.danger).add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Right),
            );
        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        self.hit = HitAreas {
            panel,
            close: Rect::new(
                panel.x + panel.width.saturating_sub(CLOSE_LABEL.len() as u16 + 1),
                panel.y,
                CLOSE_LABEL.len() as u16,
                1,
            ),
            rows: Rect::default(),
        };

        let view = self.modal.view();
        if view.full_screen_loading {
            render_loading(frame, inner, theme, tick);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(inner);

        self.render_input(frame, chunks[0], theme);
        match &view.list {
            ListView::Loading => render_loading(frame, chunks[1], theme, tick),
            ListView::Error(message) => {
                let paragraph = Paragraph::new(Line::from(Span::styled(
                    message.clone(),
                    Style::default().fg(theme.danger).add_modifier(Modifier::BOLD),
                )))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Results"))
                .wrap(Wrap { trim: true });
                frame.render_widget(paragraph, chunks[1]);
            }
            ListView::Empty => {
                let paragraph = Paragraph::new(Line::from(Span::styled(
                    "No stations found",
                    Style::default().fg(theme.muted),
                )))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Results"));
                frame.render_widget(paragraph, chunks[1]);
            }
            ListView::Rows(rows) => self.render_rows(frame, chunks[1], rows, theme),
        }

        let help = Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" select  "),
            Span::styled("Ctrl-F", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" favorite  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" close"),
        ]);
        frame.render_widget(
            Paragraph::new(help).style(Style::default().fg(theme.muted)),
            chunks[2],
        );
    }

    fn render_input(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        // Borders plus the "> " prompt.
        let visible = area.width.saturating_sub(4).max(1) as usize;
        let scroll = self.input.cursor().saturating_sub(visible - 1);
        let shown: String = self.input.value().chars().skip(scroll).take(visible).collect();
        let line = Line::from(vec![
            Span::styled("> ", Style::default().fg(theme.accent)),
            Span::raw(shown),
        ]);
        let paragraph =
            Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Station name"));
        frame.render_widget(paragraph, area);

        let cursor_x = area.x + 3 + (self.input.cursor() - scroll) as u16;
        frame.set_cursor(cursor_x, area.y + 1);
    }

    fn render_rows(&mut self, frame: &mut Frame, area: Rect, rows: &[StationRow], theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Results ({})", rows.len()));
        let rows_area = block.inner(area);
        self.hit.rows = rows_area;
        self.list_height = rows_area.height as usize;
        self.ensure_cursor_visible();

        let end = (self.offset + self.list_height).min(rows.len());
        let visible = &rows[self.offset..end];
        let items: Vec<ListItem> = visible
            .iter()
            .map(|row| {
                let glyph = if row.is_favorite {
                    Span::styled(FAVORITE_GLYPH, Style::default().fg(theme.favorite))
                } else {
                    Span::styled(NOT_FAVORITE_GLYPH, Style::default().fg(theme.muted))
                };
                ListItem::new(Line::from(vec![
                    glyph,
                    Span::raw(" "),
                    Span::styled(
                        row.station.name.clone(),
                        Style::default().fg(theme.primary_fg),
                    ),
                ]))
            })
            .collect();

        let mut list_state = ListState::default();
        if !visible.is_empty() {
            list_state.select(Some(self.cursor.saturating_sub(self.offset)));
        }
        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(theme.selection_bg)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_stateful_widget(list, area, &mut list_state);
    }
}

fn render_loading(frame: &mut Frame, area: Rect, theme: &Theme, tick: usize) {
    let spinner = SPINNER[tick % SPINNER.len()];
    let top_padding = area.height.saturating_sub(1) / 2;
    let mut lines = vec![Line::from(""); top_padding as usize];
    lines.push(Line::from(vec![
        Span::styled(spinner, Style::default().fg(theme.accent)),
        Span::raw(" Loading stations…"),
    ]));
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.x + area.width && row >= area.y && row < area.y + area.height
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
