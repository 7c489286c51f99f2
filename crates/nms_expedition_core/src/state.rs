//! Cache state detection.
//!
//! The state is never stored. Each call to
//! [`CacheStateDetector::current_state`] re-derives it from the files on disk:
//!
//! | cache dir | active | backup | state        |
//! |-----------|--------|--------|--------------|
//! | unset/missing | -  | -      | `Error`      |
//! | present   | absent | -      | `NoCache`    |
//! | present   | present| absent | `Online`     |
//! | present   | present| present| `Expedition` |
//!
//! In the `Expedition` state the active file is compared byte-for-byte with
//! every catalog dataset to find out which expedition is loaded.

use crate::catalog::{ExpeditionCatalog, ExpeditionDescriptor};
use crate::config::CacheDirSource;
use crate::location::CacheLocation;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use std::fs;

/// Discriminant of [`CacheState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    Error,
    NoCache,
    Online,
    Expedition,
}

/// Paths of the cache files, as reported with a state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheFiles {
    pub season_file: Utf8PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_file: Option<Utf8PathBuf>,
}

/// What the cache directory currently contains.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum CacheState {
    /// The cache directory is not configured or does not exist.
    Error {
        error: String,
        cache_path: Option<Utf8PathBuf>,
    },
    /// The game has never written its season cache.
    NoCache {
        error: String,
        cache_path: Utf8PathBuf,
    },
    /// The original season data is active.
    Online {
        cache_path: Utf8PathBuf,
        files: CacheFiles,
    },
    /// An expedition dataset is active and the original is in the backup.
    /// `current_expedition` is `None` when the active file matches no dataset.
    Expedition {
        cache_path: Utf8PathBuf,
        current_expedition: Option<ExpeditionDescriptor>,
        files: CacheFiles,
    },
}

impl CacheState {
    pub fn mode(&self) -> CacheMode {
        match self {
            CacheState::Error { .. } => CacheMode::Error,
            CacheState::NoCache { .. } => CacheMode::NoCache,
            CacheState::Online { .. } => CacheMode::Online,
            CacheState::Expedition { .. } => CacheMode::Expedition,
        }
    }

    /// The identified expedition, if one is active and recognised.
    pub fn current_expedition(&self) -> Option<&ExpeditionDescriptor> {
        match self {
            CacheState::Expedition {
                current_expedition, ..
            } => current_expedition.as_ref(),
            _ => None,
        }
    }
}

/// Classifies the configured cache directory.
pub struct CacheStateDetector<'a> {
    config: &'a dyn CacheDirSource,
    catalog: &'a ExpeditionCatalog,
}

impl<'a> CacheStateDetector<'a> {
    pub fn new(config: &'a dyn CacheDirSource, catalog: &'a ExpeditionCatalog) -> Self {
        Self { config, catalog }
    }

    pub fn current_state(&self) -> CacheState {
        let configured = self.config.cache_dir();
        let Some(cache_path) = configured
            .as_ref()
            .filter(|dir| dir.as_std_path().exists())
        else {
            return CacheState::Error {
                error: "Cache path not found or invalid".to_string(),
                cache_path: configured,
            };
        };

        let location = CacheLocation::new(cache_path.clone());
        let has_active = location.active().as_std_path().exists();
        let has_backup = location.backup().as_std_path().exists();

        if !has_active {
            return CacheState::NoCache {
                error: format!("{} not found", location.active_name()),
                cache_path: cache_path.clone(),
            };
        }

        if !has_backup {
            return CacheState::Online {
                cache_path: cache_path.clone(),
                files: CacheFiles {
                    season_file: location.active().to_path_buf(),
                    backup_file: None,
                },
            };
        }

        CacheState::Expedition {
            cache_path: cache_path.clone(),
            current_expedition: self.identify(location.active()),
            files: CacheFiles {
                season_file: location.active().to_path_buf(),
                backup_file: Some(location.backup().to_path_buf()),
            },
        }
    }

    /// Finds the catalog dataset whose bytes equal the active file.
    fn identify(&self, active: &Utf8Path) -> Option<ExpeditionDescriptor> {
        let content = match fs::read(active.as_std_path()) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Could not read {} for identification: {}", active, e);
                return None;
            }
        };

        match self.catalog.find_by_content(&content) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("Could not identify current expedition: {}", e);
                None
            }
        }
    }
}
