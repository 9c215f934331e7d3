//! Headless search modal: query controller, favorite overlay and selection.
//!
//! The modal owns a [`SearchSession`] for as long as it is mounted and talks
//! to the rest of the application only through the interfaces in
//! [`crate::stores`]. Front ends render [`SearchModal::view`] and forward
//! user intents; they run the [`FetchTicket`]s it hands out and report the
//! outcome back through [`SearchModal::apply`].

use std::{fmt::Display, sync::Arc};

use tracing::{debug, info};

use crate::{
    config::{BackdropAction, LoadingIndicator, ModalConfig},
    models::Station,
    search::{Applied, FetchTag, FetchTicket, ResultState, SearchSession},
    stores::{Favorites, ModalRegistry, SelectionSink},
};

/// Registry name of the station search modal.
pub const SEARCH_MODAL_NAME: &str = "searchModal";

/// External state the modal reads and writes.
#[derive(Clone)]
pub struct Collaborators {
    /// Where a picked station goes.
    pub selection: Arc<dyn SelectionSink>,
    /// Named modal visibility registry.
    pub registry: Arc<dyn ModalRegistry>,
    /// Favorites list and toggle requests.
    pub favorites: Arc<dyn Favorites>,
}

/// One result row with its favorite flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationRow {
    /// Station shown in the row.
    pub station: Station,
    /// Whether the station is in the favorites list.
    pub is_favorite: bool,
}

/// What the list region shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    /// A fetch is in flight.
    Loading,
    /// The latest fetch failed; no rows are shown alongside the message.
    Error(String),
    /// The latest fetch returned nothing.
    Empty,
    /// Rows in server order.
    Rows(Vec<StationRow>),
}

/// Render model for the modal body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalView {
    /// Input text as typed.
    pub query: String,
    /// The loading indicator replaces the whole body, input included.
    pub full_screen_loading: bool,
    /// List region contents.
    pub list: ListView,
}

/// A mounted station search modal.
pub struct SearchModal {
    session: SearchSession,
    stores: Collaborators,
    options: ModalConfig,
}

impl SearchModal {
    /// Mount the modal and return the initial full-catalog request.
    pub fn mount(mount_id: u64, stores: Collaborators, options: ModalConfig) -> (Self, FetchTicket) {
        let (session, ticket) = SearchSession::mount(mount_id);
        info!(mount_id, "Search modal mounted");
        (
            Self {
                session,
                stores,
                options,
            },
            ticket,
        )
    }

    /// Whether the registry currently shows this modal.
    pub fn is_visible(&self) -> bool {
        self.stores.registry.state().shows(SEARCH_MODAL_NAME)
    }

    /// Search state of this mount.
    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    /// Input text changed; returns the request to run.
    pub fn on_text_change(&mut self, text: impl Into<String>) -> FetchTicket {
        self.session.on_text_change(text)
    }

    /// Report the outcome of a request handed out by this modal.
    pub fn apply<E: Display>(&mut self, tag: FetchTag, outcome: Result<Vec<Station>, E>) -> Applied {
        self.session.apply(tag, outcome)
    }

    /// Whether the input is on screen and can take keystrokes.
    pub fn accepts_text_input(&self) -> bool {
        !(self.session.is_loading() && self.options.loading == LoadingIndicator::FullScreen)
    }

    /// Build the render model, reading the favorites list as it is now.
    pub fn view(&self) -> ModalView {
        let list = match self.session.state() {
            ResultState::Loading => ListView::Loading,
            ResultState::Error(message) => ListView::Error(message.clone()),
            ResultState::Success(stations) if stations.is_empty() => ListView::Empty,
            ResultState::Success(stations) => {
                let favorites = self.stores.favorites.favorite_stations();
                ListView::Rows(
                    stations
                        .iter()
                        .map(|station| StationRow {
                            station: station.clone(),
                            is_favorite: is_favorite(&favorites, station),
                        })
                        .collect(),
                )
            }
        };

        ModalView {
            query: self.session.search_term().to_string(),
            full_screen_loading: !self.accepts_text_input(),
            list,
        }
    }

    /// Number of rows currently listed.
    pub fn row_count(&self) -> usize {
        self.session.results().len()
    }

    /// Station at `index` in the current result set.
    pub fn station_at(&self, index: usize) -> Option<&Station> {
        self.session.results().get(index)
    }

    /// Publish the station at `index` as the selection, then close the modal.
    pub fn select(&self, index: usize) -> Option<Station> {
        let station = self.station_at(index)?.clone();
        self.stores.selection.publish(station.clone());
        self.stores.registry.close(SEARCH_MODAL_NAME);
        Some(station)
    }

    /// Ask for the favorite flag of the station at `index` to flip.
    ///
    /// The row only changes once the favorites list reflects the request.
    pub fn toggle_favorite(&self, index: usize) -> bool {
        let Some(station) = self.station_at(index) else {
            return false;
        };
        debug!(id = %station.id, "Requesting favorite toggle");
        self.stores.favorites.toggle_favorite(&station.id);
        true
    }

    /// Close control: hide the modal, selection untouched.
    pub fn close(&self) {
        self.stores.registry.close(SEARCH_MODAL_NAME);
    }

    /// Platform back request; same effect as the close control.
    pub fn back_requested(&self) {
        self.close();
    }

    /// Tap outside the content panel.
    pub fn backdrop_tapped(&self) {
        match self.options.backdrop {
            BackdropAction::Open => self.stores.registry.open(SEARCH_MODAL_NAME),
            BackdropAction::Close => self.close(),
            BackdropAction::Ignore => {}
        }
    }
}

/// Favorite membership is decided by station id alone.
pub fn is_favorite(favorites: &[Station], station: &Station) -> bool {
    favorites.iter().any(|favorite| favorite.id == station.id)
}
