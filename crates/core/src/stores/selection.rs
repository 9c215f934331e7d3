use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use super::SelectionSink;
use crate::models::Station;

/// Single-slot holder of the application's selected station.
#[derive(Debug, Clone, Default)]
pub struct SelectedStation {
    inner: Arc<RwLock<Option<Station>>>,
}

impl SelectedStation {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected station, if any.
    pub fn current(&self) -> Option<Station> {
        self.inner.read().clone()
    }
}

impl SelectionSink for SelectedStation {
    fn publish(&self, station: Station) {
        info!(id = %station.id, name = %station.name, "Station selected");
        *self.inner.write() = Some(station);
    }
}
