#![warn(clippy::all, missing_docs)]

//! Core logic for the station search terminal app.
//!
//! This crate hosts the station model, configuration handling, the catalog
//! HTTP client, the search session state machine, the interfaces to the
//! selection/visibility/favorites stores and the headless search modal used
//! by the terminal UI and any future frontends.

pub mod catalog;
pub mod config;
pub mod modal;
pub mod models;
pub mod search;
pub mod stores;

pub use catalog::{CatalogError, StationCatalog, StationClient};
pub use config::AppConfig;
pub use modal::{Collaborators, ListView, ModalView, SearchModal, StationRow, SEARCH_MODAL_NAME};
pub use models::Station;
pub use search::{Applied, FetchTag, FetchTicket, ResultState, SearchSession, StationQuery};
pub use stores::{
    Favorites, FavoritesStore, ModalRegistry, ModalState, ModalVisibility, SelectedStation,
    SelectionSink,
};
