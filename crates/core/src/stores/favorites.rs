//! File-backed favorites list.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::Favorites;
use crate::models::Station;

/// Serialized representation of the favorites file.
#[derive(Debug, Serialize, Deserialize)]
struct FavoritesFile {
    updated_at: DateTime<Utc>,
    #[serde(default)]
    stations: Vec<Station>,
}

/// Favorites persisted as JSON, shared between the modal and the home screen.
///
/// Toggling only knows a station id, so the store keeps an index of stations
/// seen in catalog responses (see [`FavoritesStore::remember`]) to add the
/// full record.
#[derive(Debug, Clone)]
pub struct FavoritesStore {
    inner: Arc<RwLock<Inner>>,
    /// Serializes file writes so the last toggle is the last write.
    disk: Arc<Mutex<()>>,
}

#[derive(Debug)]
struct Inner {
    path: PathBuf,
    favorites: Vec<Station>,
    known: HashMap<String, Station>,
    updated_at: Option<DateTime<Utc>>,
}

impl FavoritesStore {
    /// Open the favorites file at `path`.
    ///
    /// A missing file starts an empty list; an unreadable one is logged and
    /// also starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (favorites, updated_at) = match load_file(&path) {
            Ok(Some(file)) => {
                info!(path = %path.display(), count = file.stations.len(), "Favorites loaded");
                (file.stations, Some(file.updated_at))
            }
            Ok(None) => (Vec::new(), None),
            Err(err) => {
                warn!(?err, path = %path.display(), "Ignoring unreadable favorites file");
                (Vec::new(), None)
            }
        };
        let known = favorites
            .iter()
            .map(|station| (station.id.clone(), station.clone()))
            .collect();

        Self {
            inner: Arc::new(RwLock::new(Inner {
                path,
                favorites,
                known,
                updated_at,
            })),
            disk: Arc::new(Mutex::new(())),
        }
    }

    /// Record stations from a catalog response so they can be favorited by id.
    pub fn remember(&self, stations: &[Station]) {
        let mut inner = self.inner.write();
        for station in stations {
            inner.known.insert(station.id.clone(), station.clone());
        }
    }

    /// Whether station `id` is a favorite.
    pub fn contains(&self, id: &str) -> bool {
        self.inner.read().favorites.iter().any(|station| station.id == id)
    }

    /// When the list last changed, if it ever did.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().updated_at
    }

    /// Location of the favorites file.
    pub fn path(&self) -> PathBuf {
        self.inner.read().path.clone()
    }
}

impl Favorites for FavoritesStore {
    fn favorite_stations(&self) -> Vec<Station> {
        self.inner.read().favorites.clone()
    }

    fn toggle_favorite(&self, id: &str) {
        let _disk = self.disk.lock();
        let (path, snapshot, now) = {
            let mut inner = self.inner.write();
            if let Some(pos) = inner.favorites.iter().position(|station| station.id == id) {
                let removed = inner.favorites.remove(pos);
                info!(id, name = %removed.name, "Favorite removed");
            } else if let Some(station) = inner.known.get(id).cloned() {
                info!(id, name = %station.name, "Favorite added");
                inner.favorites.push(station);
            } else {
                warn!(id, "Cannot favorite unknown station");
                return;
            }
            let now = Utc::now();
            inner.updated_at = Some(now);
            (inner.path.clone(), inner.favorites.clone(), now)
        };

        // Readers are not blocked while the file is written.
        if let Err(err) = persist(&path, &snapshot, now) {
            error!(?err, "Failed to persist favorites");
        }
    }
}

fn load_file(path: &Path) -> Result<Option<FavoritesFile>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read favorites {}", path.display()))?;
    let file = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse favorites {}", path.display()))?;
    Ok(Some(file))
}

fn persist(path: &Path, stations: &[Station], updated_at: DateTime<Utc>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("failed to create favorites directory {}", parent.display())
        })?;
    }
    let file = FavoritesFile {
        updated_at,
        stations: stations.to_vec(),
    };
    let serialized = serde_json::to_string_pretty(&file).context("failed to serialize favorites")?;
    fs::write(path, serialized)
        .with_context(|| format!("failed to write favorites {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn toggle_adds_known_station_and_persists() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("favorites.json");
        let store = FavoritesStore::open(&path);
        store.remember(&[Station::new("1", "Main St"), Station::new("2", "Oak Ave")]);

        store.toggle_favorite("2");
        assert!(store.contains("2"));
        assert_eq!(store.favorite_stations(), vec![Station::new("2", "Oak Ave")]);
        assert!(store.updated_at().is_some());

        let reopened = FavoritesStore::open(&path);
        assert_eq!(reopened.favorite_stations(), vec![Station::new("2", "Oak Ave")]);
        Ok(())
    }

    #[test]
    fn toggle_twice_removes() -> Result<()> {
        let dir = tempdir()?;
        let store = FavoritesStore::open(dir.path().join("favorites.json"));
        store.remember(&[Station::new("1", "Main St")]);

        store.toggle_favorite("1");
        store.toggle_favorite("1");
        assert!(store.favorite_stations().is_empty());

        let reopened = FavoritesStore::open(store.path());
        assert!(reopened.favorite_stations().is_empty());
        Ok(())
    }

    #[test]
    fn unknown_id_is_ignored() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("favorites.json");
        let store = FavoritesStore::open(&path);

        store.toggle_favorite("404");
        assert!(store.favorite_stations().is_empty());
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn loaded_favorites_can_be_removed_without_remembering() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("favorites.json");
        persist(&path, &[Station::new("9", "Elm Rd")], Utc::now())?;

        let store = FavoritesStore::open(&path);
        assert!(store.contains("9"));
        store.toggle_favorite("9");
        assert!(!store.contains("9"));
        store.toggle_favorite("9");
        assert!(store.contains("9"));
        Ok(())
    }

    #[test]
    fn corrupt_file_starts_empty() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("favorites.json");
        fs::write(&path, "not json")?;

        let store = FavoritesStore::open(&path);
        assert!(store.favorite_stations().is_empty());
        assert!(store.updated_at().is_none());
        Ok(())
    }

    #[test]
    fn concurrent_toggles_leave_file_matching_list() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("favorites.json");
        let store = FavoritesStore::open(&path);
        store.remember(&[Station::new("1", "Main St"), Station::new("2", "Oak Ave")]);

        let handles: Vec<_> = ["1", "2"]
            .into_iter()
            .map(|id| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store.toggle_favorite(id);
                    store.favorite_stations().len()
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().expect("toggle thread panicked") >= 1);
        }

        assert_eq!(store.favorite_stations().len(), 2);
        let contents = fs::read_to_string(&path)?;
        let file: FavoritesFile = serde_json::from_str(&contents)?;
        assert_eq!(file.stations.len(), 2);
        assert_eq!(Some(file.updated_at), store.updated_at());
        Ok(())
    }
}
