//! Narrow interfaces to state the search modal reads and writes but does not own.
//!
//! Each interface has a single writer path. Implementations are cheap to
//! clone handles over shared state so the surrounding application keeps its
//! own copy.

mod favorites;
mod selection;
mod visibility;

pub use favorites::FavoritesStore;
pub use selection::SelectedStation;
pub use visibility::ModalVisibility;

use crate::models::Station;

/// Receives the station the user picked.
pub trait SelectionSink: Send + Sync {
    /// Replace the selected station.
    fn publish(&self, station: Station);
}

/// Snapshot of the named modal registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalState {
    /// Name of the modal most recently opened.
    pub active_name: Option<String>,
    /// Whether that modal is shown.
    pub is_visible: bool,
}

impl ModalState {
    /// Whether the modal called `name` is currently shown.
    pub fn shows(&self, name: &str) -> bool {
        self.is_visible && self.active_name.as_deref() == Some(name)
    }
}

/// Named registry deciding which modal is on screen.
pub trait ModalRegistry: Send + Sync {
    /// Current registry state.
    fn state(&self) -> ModalState;
    /// Make `name` the active, visible modal.
    fn open(&self, name: &str);
    /// Hide `name` if it is the active modal.
    fn close(&self, name: &str);
}

/// Externally tracked favorites.
pub trait Favorites: Send + Sync {
    /// Current favorites list.
    fn favorite_stations(&self) -> Vec<Station>;
    /// Ask for the favorite flag of station `id` to flip.
    fn toggle_favorite(&self, id: &str);
}
