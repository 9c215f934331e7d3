use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::{ModalRegistry, ModalState};

/// In-process modal registry shared between the screen and its modals.
#[derive(Debug, Clone, Default)]
pub struct ModalVisibility {
    inner: Arc<RwLock<ModalState>>,
}

impl ModalVisibility {
    /// Create a registry with nothing shown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the modal called `name` is on screen.
    pub fn is_showing(&self, name: &str) -> bool {
        self.inner.read().shows(name)
    }
}

impl ModalRegistry for ModalVisibility {
    fn state(&self) -> ModalState {
        self.inner.read().clone()
    }

    fn open(&self, name: &str) {
        let mut state = self.inner.write();
        state.active_name = Some(name.to_string());
        state.is_visible = true;
        debug!(modal = name, "Modal opened");
    }

    fn close(&self, name: &str) {
        let mut state = self.inner.write();
        if state.active_name.as_deref() != Some(name) {
            debug!(modal = name, active = ?state.active_name, "Ignoring close for inactive modal");
            return;
        }
        state.is_visible = false;
        debug!(modal = name, "Modal closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_then_close_by_name() {
        let registry = ModalVisibility::new();
        assert!(!registry.is_showing("searchModal"));

        registry.open("searchModal");
        assert!(registry.is_showing("searchModal"));
        assert!(!registry.is_showing("settingsModal"));

        registry.close("searchModal");
        assert!(!registry.is_showing("searchModal"));
        assert_eq!(registry.state().active_name.as_deref(), Some("searchModal"));
    }

    #[test]
    fn close_of_other_modal_is_ignored() {
        let registry = ModalVisibility::new();
        registry.open("searchModal");
        registry.close("settingsModal");
        assert!(registry.is_showing("searchModal"));
    }

    #[test]
    fn opening_another_modal_replaces_the_active_one() {
        let registry = ModalVisibility::new();
        registry.open("searchModal");
        registry.open("settingsModal");
        assert!(!registry.is_showing("searchModal"));
        assert!(registry.is_showing("settingsModal"));
    }
}
