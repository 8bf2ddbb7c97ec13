/// Application paths and user settings
///
/// Everything lives under one directory in the user's data folder:
/// - Linux: ~/.local/share/game-shelf/
/// - macOS: ~/Library/Application Support/game-shelf/
/// - Windows: %APPDATA%\game-shelf\
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

const APP_DIR: &str = "game-shelf";
const DB_FILENAME: &str = "games.db";
const COVERS_DIR: &str = "covers";
const SETTINGS_FILENAME: &str = "settings.json";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    #[default]
    Dark,
    Light,
}

/// User-editable settings stored as JSON next to the database
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub theme: ThemeChoice,
    /// Hold a global lock across each mutation and its reload
    pub serialize_mutations: bool,
    /// Longest edge, in pixels, of an imported cover
    pub cover_max_edge: u32,
    /// How long a notice stays on screen
    pub notice_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: ThemeChoice::Dark,
            serialize_mutations: false,
            cover_max_edge: 512,
            notice_seconds: 3,
        }
    }
}

impl Settings {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Resolved locations plus loaded settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub root: PathBuf,
    pub settings: Settings,
}

impl AppConfig {
    /// Load the configuration from the platform data directory
    pub fn load() -> Result<Self, ConfigError> {
        let root = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or(ConfigError::NoDataDir)?
            .join(APP_DIR);
        Self::load_from(root)
    }

    /// Load the configuration rooted at `root`, writing default settings
    /// on first run
    pub fn load_from(root: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&root)?;
        let settings = load_or_init_settings(&root.join(SETTINGS_FILENAME))?;
        Ok(Self { root, settings })
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join(DB_FILENAME)
    }

    pub fn covers_dir(&self) -> PathBuf {
        self.root.join(COVERS_DIR)
    }
}

fn load_or_init_settings(path: &Path) -> Result<Settings, ConfigError> {
    if path.exists() {
        let raw = fs::read_to_string(path)?;
        return Ok(Settings::from_json(&raw)?);
    }

    let settings = Settings::default();
    fs::write(path, settings.to_json()?)?;
    tracing::info!("Wrote default settings to {}", path.display());
    Ok(settings)
}
