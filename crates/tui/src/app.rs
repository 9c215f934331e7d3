use std::{io, sync::Arc, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use stations_core::{
    config::ModalConfig, Applied, CatalogError, Collaborators, FavoritesStore, FetchTag,
    FetchTicket, Favorites, ModalRegistry, ModalVisibility, SearchModal, SelectedStation,
    SelectionSink, Station, StationCatalog, SEARCH_MODAL_NAME,
};
use tokio::{spawn, sync::mpsc};
use tracing::{debug, error, info};

use crate::{
    search_modal::{ModalScreen, FAVORITE_GLYPH},
    theme::Theme,
};

const TICK_RATE: Duration = Duration::from_millis(250);

pub enum AppEvent {
    Input(Event),
    Tick,
    CatalogLoaded {
        tag: FetchTag,
        result: Result<Vec<Station>, CatalogError>,
    },
}

/// Terminal front end: a home screen plus the station search modal.
pub struct StationsApp<C> {
    catalog: C,
    modal_options: ModalConfig,
    selection: SelectedStation,
    registry: ModalVisibility,
    favorites: FavoritesStore,
    modal: Option<ModalScreen>,
    next_mount_id: u64,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    state: UiState,
    theme: Theme,
}

impl<C> StationsApp<C>
where
    C: StationCatalog + Clone + 'static,
{
    pub fn new(catalog: C, modal_options: ModalConfig, favorites: FavoritesStore) -> Self {
        Self {
            catalog,
            modal_options,
            selection: SelectedStation::new(),
            registry: ModalVisibility::new(),
            favorites,
            modal: None,
            next_mount_id: 0,
            event_tx: None,
            state: UiState::default(),
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let favorites = self.favorites.favorite_stations().len();
        self.state
            .set_status(format!("{favorites} favorites, press / to search"));

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = match Terminal::new(backend) {
            Ok(terminal) => terminal,
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
                return Err(err).context("failed to create terminal");
            }
        };

        let (event_tx, event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx);

        let outcome = self.event_loop(&mut terminal, event_rx).await;
        let restored = restore_terminal(&mut terminal);
        self.event_tx = None;
        if let Err(err) = &outcome {
            error!(?err, "Event loop failed");
        }
        outcome.and(restored)
    }

    async fn event_loop<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        mut event_rx: mpsc::Receiver<AppEvent>,
    ) -> Result<()> {
        terminal.hide_cursor()?;
        terminal.clear()?;
        loop {
            self.sync_modal();
            terminal
                .draw(|frame| self.draw(frame))
                .context("failed to draw frame")?;
            if self.state.should_quit {
                return Ok(());
            }

            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) {
                return Ok(());
            }
        }
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                self.handle_input(event);
                true
            }
            Some(AppEvent::Tick) => {
                self.state.tick = self.state.tick.wrapping_add(1);
                true
            }
            Some(AppEvent::CatalogLoaded { tag, result }) => {
                self.handle_catalog_loaded(tag, result);
                true
            }
            None => false,
        }
    }

    /// Mount the modal when the registry shows it, drop it when hidden.
    fn sync_modal(&mut self) {
        let showing = self.registry.is_showing(SEARCH_MODAL_NAME);
        match (showing, self.modal.is_some()) {
            (true, false) => self.mount_modal(),
            (false, true) => {
                self.modal = None;
                info!("Search modal unmounted");
                match self.selection.current() {
                    Some(station) if self.state.last_selection.as_ref() != Some(&station) => {
                        self.state.set_status(format!("Selected {}", station.name));
                        self.state.last_selection = Some(station);
                    }
                    _ => self.state.set_status("Search closed".to_string()),
                }
            }
            _ => {}
        }
    }

    fn mount_modal(&mut self) {
        self.next_mount_id += 1;
        let stores = Collaborators {
            selection: Arc::new(self.selection.clone()),
            registry: Arc::new(self.registry.clone()),
            favorites: Arc::new(self.favorites.clone()),
        };
        let (modal, ticket) = SearchModal::mount(self.next_mount_id, stores, self.modal_options);
        self.modal = Some(ModalScreen::new(modal));
        self.dispatch(ticket);
    }

    fn dispatch(&self, ticket: FetchTicket) {
        let Some(sender) = self.event_tx.clone() else {
            error!("event_channel_missing");
            return;
        };
        let catalog = self.catalog.clone();
        spawn(async move {
            let result = catalog.fetch(&ticket.query).await;
            let _ = sender
                .send(AppEvent::CatalogLoaded {
                    tag: ticket.tag,
                    result,
                })
                .await;
        });
    }

    fn handle_catalog_loaded(&mut self, tag: FetchTag, result: Result<Vec<Station>, CatalogError>) {
        if let Ok(stations) = &result {
            self.favorites.remember(stations);
        }
        let Some(screen) = self.modal.as_mut() else {
            debug!(seq = tag.seq, "Catalog response arrived after the modal closed");
            return;
        };
        if screen.apply(tag, result) == Applied::Current {
            let session = screen.modal().session();
            let status = match session.error() {
                Some(message) => format!("Error: {message}"),
                None => format!("{} stations", session.results().len()),
            };
            self.state.set_status(status);
        }
    }

    fn handle_input(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
                {
                    self.state.should_quit = true;
                    return;
                }
                if let Some(screen) = self.modal.as_mut() {
                    if let Some(ticket) = screen.handle_key(key) {
                        self.dispatch(ticket);
                    }
                } else {
                    self.handle_home_key(key);
                }
            }
            Event::Mouse(mouse) => {
                if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                    if let Some(screen) = self.modal.as_mut() {
                        screen.handle_click(mouse.column, mouse.row);
                    }
                }
            }
            Event::Key(_) | Event::Resize(_, _) => {}
            Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) {
        let favorites = self.favorites.favorite_stations();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.state.should_quit = true,
            KeyCode::Char('/') | KeyCode::Char('s') => {
                self.registry.open(SEARCH_MODAL_NAME);
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.state.move_favorite_cursor(1, favorites.len());
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.move_favorite_cursor(-1, favorites.len());
            }
            KeyCode::Enter => {
                if let Some(station) = favorites.get(self.state.favorite_cursor).cloned() {
                    self.state.set_status(format!("Selected {}", station.name));
                    self.state.last_selection = Some(station.clone());
                    self.selection.publish(station);
                }
            }
            KeyCode::Char('d') => {
                if let Some(station) = favorites.get(self.state.favorite_cursor) {
                    self.favorites.toggle_favorite(&station.id);
                    self.state
                        .set_status(format!("Removed {} from favorites", station.name));
                    self.state
                        .move_favorite_cursor(0, favorites.len().saturating_sub(1));
                }
            }
            _ => {}
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        self.draw_home(frame);
        if let Some(screen) = self.modal.as_mut() {
            screen.render(frame, &self.theme, self.state.tick);
        }
    }

    fn draw_home(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(4),
            ])
            .split(frame.size());

        let selected = match self.selection.current() {
            Some(station) => Line::from(vec![
                Span::styled(
                    station.name,
                    Style::default()
                        .fg(self.theme.accent)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  ({})", station.id), Style::default().fg(self.theme.muted)),
            ]),
            None => Line::from(Span::styled(
                "No station selected",
                Style::default().fg(self.theme.muted),
            )),
        };
        frame.render_widget(
            Paragraph::new(selected)
                .block(Block::default().borders(Borders::ALL).title("Selected station")),
            chunks[0],
        );

        self.render_favorites(frame, chunks[1]);
        self.render_status(frame, chunks[2]);
    }

    fn render_favorites(&self, frame: &mut Frame, area: Rect) {
        let favorites = self.favorites.favorite_stations();
        let items: Vec<ListItem> = favorites
            .iter()
            .map(|station| {
                ListItem::new(Line::from(vec![
                    Span::styled(FAVORITE_GLYPH, Style::default().fg(self.theme.favorite)),
                    Span::raw(" "),
                    Span::styled(station.name.clone(), Style::default().fg(self.theme.primary_fg)),
                ]))
            })
            .collect();

        let mut list_state = ListState::default();
        if !favorites.is_empty() {
            list_state.select(Some(self.state.favorite_cursor.min(favorites.len() - 1)));
        }
        let title = match self.favorites.updated_at() {
            Some(at) => format!(
                "Favorites ({}), updated {}",
                favorites.len(),
                at.format("%Y-%m-%d %H:%M UTC")
            ),
            None => format!("Favorites ({})", favorites.len()),
        };
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().bg(self.theme.selection_bg));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let help = Line::from(vec![
            Span::styled("/", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" search  "),
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" select favorite  "),
            Span::styled("d", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" unfavorite  "),
            Span::styled("q", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" quit"),
        ]);
        let paragraph = Paragraph::new(vec![Line::from(self.state.status.clone()), help])
            .block(Block::default().borders(Borders::ALL).title("Status"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

struct UiState {
    status: String,
    should_quit: bool,
    favorite_cursor: usize,
    last_selection: Option<Station>,
    tick: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            status: "Ready".to_string(),
            should_quit: false,
            favorite_cursor: 0,
            last_selection: None,
            tick: 0,
        }
    }
}

impl UiState {
    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn move_favorite_cursor(&mut self, delta: isize, total: usize) {
        if total == 0 {
            self.favorite_cursor = 0;
            return;
        }
        let idx = (self.favorite_cursor as isize + delta).clamp(0, total as isize - 1);
        self.favorite_cursor = idx as usize;
    }
}
