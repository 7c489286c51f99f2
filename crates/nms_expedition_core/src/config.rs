//! Application configuration and cache directory resolution.
//!
//! The configuration lives in `~/.nms-utils/config.json`. It is re-read on
//! every access through [`CacheDirSource`], so the detector and swap engine
//! always act on whatever the user last saved.

use crate::error::ConfigError;
use camino::{Utf8Path, Utf8PathBuf};
use directories_next::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;

pub const CONFIG_DIR_NAME: &str = ".nms-utils";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Supplies the cache directory to the detector and the swap engine.
pub trait CacheDirSource {
    /// The configured cache directory, or `None` when unset.
    fn cache_dir(&self) -> Option<Utf8PathBuf>;
}

impl CacheDirSource for Utf8PathBuf {
    fn cache_dir(&self) -> Option<Utf8PathBuf> {
        Some(self.clone())
    }
}

impl CacheDirSource for Option<Utf8PathBuf> {
    fn cache_dir(&self) -> Option<Utf8PathBuf> {
        self.clone()
    }
}

/// Store front the game was bought from. Determines the cache directory layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Steam,
    #[serde(rename = "msstore")]
    MsStore,
    Gog,
    #[serde(rename = "gamepass")]
    GamePass,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Steam => "steam",
            Platform::MsStore => "msstore",
            Platform::Gog => "gog",
            Platform::GamePass => "gamepass",
        }
    }
}

/// Persisted application configuration.
///
/// Missing keys fall back to their defaults when loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub platform: Option<Platform>,
    pub steam_id: Option<String>,
    pub first_setup: bool,
    pub cache_path: Option<Utf8PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            platform: None,
            steam_id: None,
            first_setup: true,
            cache_path: None,
        }
    }
}

impl CacheDirSource for AppConfig {
    fn cache_dir(&self) -> Option<Utf8PathBuf> {
        self.cache_path.clone()
    }
}

/// Reads and writes [`AppConfig`] at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: Utf8PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.nms-utils/config.json`.
    pub fn default_location() -> Result<Self, ConfigError> {
        let home = home_dir().ok_or(ConfigError::HomeDirUnavailable)?;
        Ok(Self::new(home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)))
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Loads the configuration.
    /// Returns defaults if the file doesn't exist or cannot be parsed.
    pub fn load(&self) -> AppConfig {
        if !self.path.as_std_path().exists() {
            return AppConfig::default();
        }

        match fs::read_to_string(self.path.as_std_path()) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    tracing::error!("Failed to parse config file {}: {}", self.path, e);
                    AppConfig::default()
                }
            },
            Err(e) => {
                tracing::error!("Failed to read config file {}: {}", self.path, e);
                AppConfig::default()
            }
        }
    }

    /// Writes the configuration as pretty JSON, creating the directory if needed.
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent.as_std_path())?;
        }

        let contents = serde_json::to_string_pretty(config)?;
        fs::write(self.path.as_std_path(), contents)?;
        tracing::info!("Saved config to {}", self.path);
        Ok(())
    }

    /// Loads, applies `edit`, saves, and returns the saved configuration.
    pub fn update(&self, edit: impl FnOnce(&mut AppConfig)) -> Result<AppConfig, ConfigError> {
        let mut config = self.load();
        edit(&mut config);
        self.save(&config)?;
        Ok(config)
    }
}

impl CacheDirSource for ConfigStore {
    fn cache_dir(&self) -> Option<Utf8PathBuf> {
        self.load().cache_path
    }
}

/// The current user's home directory.
pub fn home_dir() -> Option<Utf8PathBuf> {
    let dirs = BaseDirs::new()?;
    Utf8PathBuf::from_path_buf(dirs.home_dir().to_path_buf()).ok()
}

/// Base directory that contains `HelloGames/NMS`.
///
/// `%APPDATA%` (Roaming) on Windows, `~/Library/Application Support` elsewhere.
pub fn app_data_root() -> Option<Utf8PathBuf> {
    let home = home_dir()?;
    if cfg!(target_os = "windows") {
        Some(home.join("AppData").join("Roaming"))
    } else {
        Some(home.join("Library").join("Application Support"))
    }
}

/// `HelloGames/NMS` under the given app data root.
pub fn nms_root(app_data: &Utf8Path) -> Utf8PathBuf {
    app_data.join("HelloGames").join("NMS")
}

/// Builds the cache directory for a platform on this machine.
pub fn build_cache_path(platform: Platform, steam_id: Option<&str>) -> Option<Utf8PathBuf> {
    let app_data = app_data_root()?;
    cache_path_under(&app_data, platform, steam_id, cfg!(target_os = "macos"))
}

/// Builds the cache directory under an explicit app data root.
///
/// Steam keeps one cache per account (`NMS/<steam id>/cache`) except on macOS,
/// where a single shared cache is used. Other stores always share one cache.
/// Returns `None` for Steam when no account id is given.
pub fn cache_path_under(
    app_data: &Utf8Path,
    platform: Platform,
    steam_id: Option<&str>,
    shared_steam_cache: bool,
) -> Option<Utf8PathBuf> {
    let root = nms_root(app_data);
    match platform {
        Platform::Steam if shared_steam_cache => Some(root.join("cache")),
        Platform::Steam => {
            let id = steam_id.map(str::trim).filter(|id| !id.is_empty())?;
            Some(root.join(id).join("cache"))
        }
        Platform::MsStore | Platform::Gog | Platform::GamePass => Some(root.join("cache")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> ConfigStore {
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        ConfigStore::new(root.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    #[test]
    fn test_load_missing_returns_defaults() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        let config = store.load();
        assert_eq!(config, AppConfig::default());
        assert!(config.first_setup);
        assert!(store.cache_dir().is_none());
    }

    #[test]
    fn test_save_creates_directory_and_round_trips() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        let config = AppConfig {
            platform: Some(Platform::Steam),
            steam_id: Some("st_76561198000000000".to_string()),
            first_setup: false,
            cache_path: Some(Utf8PathBuf::from("/nms/cache")),
        };
        store.save(&config).unwrap();

        assert_eq!(store.load(), config);
        assert_eq!(store.cache_dir(), Some(Utf8PathBuf::from("/nms/cache")));
    }

    #[test]
    fn test_load_merges_missing_keys_with_defaults() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), r#"{ "platform": "gog" }"#).unwrap();

        let config = store.load();
        assert_eq!(config.platform, Some(Platform::Gog));
        assert!(config.first_setup);
        assert!(config.cache_path.is_none());
    }

    #[test]
    fn test_load_invalid_json_returns_defaults() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();

        assert_eq!(store.load(), AppConfig::default());
    }

    #[test]
    fn test_update_applies_edit() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        let updated = store
            .update(|c| {
                c.platform = Some(Platform::GamePass);
                c.first_setup = false;
            })
            .unwrap();

        assert_eq!(updated.platform, Some(Platform::GamePass));
        assert_eq!(store.load(), updated);
    }

    #[test]
    fn test_serialization_format() {
        let config = AppConfig {
            platform: Some(Platform::MsStore),
            ..AppConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();

        assert!(json.contains("\"platform\":\"msstore\""));
        assert!(json.contains("\"firstSetup\":true"));
        assert!(json.contains("\"cachePath\":null"));
    }

    #[test]
    fn test_cache_path_steam_per_account() {
        let root = Utf8Path::new("/home/u/AppData/Roaming");
        let path = cache_path_under(root, Platform::Steam, Some("st_1"), false).unwrap();
        assert_eq!(path, "/home/u/AppData/Roaming/HelloGames/NMS/st_1/cache");
    }

    #[test]
    fn test_cache_path_steam_requires_account() {
        let root = Utf8Path::new("/r");
        assert!(cache_path_under(root, Platform::Steam, None, false).is_none());
        assert!(cache_path_under(root, Platform::Steam, Some("  "), false).is_none());
    }

    #[test]
    fn test_cache_path_shared_caches() {
        let root = Utf8Path::new("/r");
        let shared = Utf8PathBuf::from("/r/HelloGames/NMS/cache");
        assert_eq!(
            cache_path_under(root, Platform::Steam, None, true),
            Some(shared.clone())
        );
        for platform in [Platform::MsStore, Platform::Gog, Platform::GamePass] {
            assert_eq!(
                cache_path_under(root, platform, Some("ignored"), false),
                Some(shared.clone())
            );
        }
    }
}
