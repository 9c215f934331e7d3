//! Application configuration.
//!
//! Settings are read from `<config_dir>/stations/config.toml` when present and
//! can be overridden with `STATIONS__SECTION__KEY` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Directory name used under the platform config and data roots.
pub const APP_DIR: &str = "stations";

const DEFAULT_ANDROID_URL: &str = "http://10.0.2.2:3000";
const DEFAULT_URL: &str = "http://localhost:3000";

const DEFAULT_CONFIG: &str = r#"# Station search configuration.

[catalog]
# Host used when running on Android (the emulator's loopback alias).
android_url = "http://10.0.2.2:3000"
# Host used everywhere else.
default_url = "http://localhost:3000"
# Force a platform instead of detecting it: "android" or "default".
# platform = "default"

[modal]
# What clicking outside the search panel does: "open", "close" or "ignore".
backdrop = "open"
# Loading indicator granularity: "full_screen" or "list_only".
loading = "full_screen"
"#;

/// Runtime platform used to pick the catalog host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Android devices and emulators.
    Android,
    /// Every other target.
    Default,
}

impl Platform {
    /// Platform of the running binary.
    pub fn current() -> Self {
        if std::env::consts::OS == "android" {
            Platform::Android
        } else {
            Platform::Default
        }
    }
}

/// What a tap on the backdrop outside the modal panel does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackdropAction {
    /// Re-open the modal by name. Matches the long-standing behaviour.
    #[default]
    Open,
    /// Close the modal by name.
    Close,
    /// Do nothing.
    Ignore,
}

/// How much of the modal the loading indicator covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingIndicator {
    /// Replace the whole modal body, input included.
    #[default]
    FullScreen,
    /// Keep the input usable and show the indicator in the list region.
    ListOnly,
}

/// Station catalog endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL used on Android.
    pub android_url: String,
    /// Base URL used on every other platform.
    pub default_url: String,
    /// Explicit platform override; detected when unset.
    pub platform: Option<Platform>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            android_url: DEFAULT_ANDROID_URL.to_string(),
            default_url: DEFAULT_URL.to_string(),
            platform: None,
        }
    }
}

impl CatalogConfig {
    /// Base URL for the configured (or detected) platform.
    pub fn base_url(&self) -> &str {
        match self.platform.unwrap_or_else(Platform::current) {
            Platform::Android => &self.android_url,
            Platform::Default => &self.default_url,
        }
    }
}

/// Behaviour switches for the search modal.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalConfig {
    /// Backdrop tap behaviour.
    pub backdrop: BackdropAction,
    /// Loading indicator granularity.
    pub loading: LoadingIndicator,
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Catalog service settings.
    pub catalog: CatalogConfig,
    /// Search modal settings.
    pub modal: ModalConfig,
    /// JSON file holding the favorites list.
    pub favorites_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            modal: ModalConfig::default(),
            favorites_path: default_data_dir().join("favorites.json"),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration from `path` (optional) plus environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("STATIONS").separator("__"))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }
}

/// Location of the user configuration file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

/// Directory for application data such as favorites.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Write the commented default configuration if no file exists yet.
pub fn ensure_default_config() -> Result<()> {
    write_default_config(config_path())
}

fn write_default_config(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(())
}
