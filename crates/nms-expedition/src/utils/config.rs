//! Resolution of the configuration file and the expedition data directory.

use crate::errors::CliError;
use camino::{Utf8Path, Utf8PathBuf};
use nms_expedition_core::{ConfigStore, ExpeditionCatalog};
use std::env;

/// Data directory used when neither `--data-dir` nor `NMS_EXPEDITIONS_DIR` is set,
/// relative to the executable.
pub const DEFAULT_DATA_SUBDIR: &str = "data/expeditions";

/// Returns the directory where the current executable resides.
pub fn install_dir() -> Option<Utf8PathBuf> {
    let exe = env::current_exe().ok()?;
    let parent = exe.parent()?;
    Utf8PathBuf::from_path_buf(parent.to_path_buf()).ok()
}

/// Expedition data directory: the override if given, otherwise next to the executable.
pub fn data_dir(override_dir: Option<&Utf8Path>) -> Utf8PathBuf {
    match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => install_dir()
            .unwrap_or_else(|| Utf8PathBuf::from("."))
            .join(DEFAULT_DATA_SUBDIR),
    }
}

pub fn catalog(override_dir: Option<&Utf8Path>) -> ExpeditionCatalog {
    let dir = data_dir(override_dir);
    tracing::debug!("Using expedition data directory {}", dir);
    ExpeditionCatalog::new(dir)
}

/// The config store at the override path, or `~/.nms-utils/config.json`.
pub fn config_store(override_path: Option<&Utf8Path>) -> Result<ConfigStore, CliError> {
    let store = match override_path {
        Some(path) => ConfigStore::new(path),
        None => ConfigStore::default_location()?,
    };
    tracing::debug!("Using config file {}", store.path());
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_prefers_override() {
        let dir = Utf8PathBuf::from("/srv/expeditions");
        assert_eq!(data_dir(Some(&dir)), dir);
    }

    #[test]
    fn data_dir_defaults_next_to_executable() {
        let dir = data_dir(None);
        assert!(dir.ends_with("data/expeditions"));
    }

    #[test]
    fn config_store_uses_override() {
        let path = Utf8PathBuf::from("/tmp/nms/config.json");
        let store = config_store(Some(&path)).unwrap();
        assert_eq!(store.path(), path);
    }
}
