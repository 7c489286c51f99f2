//! Names and paths of the files inside the game's cache directory.

use camino::{Utf8Path, Utf8PathBuf};

/// The file No Man's Sky reads its season data from.
pub const ACTIVE_FILE_NAME: &str = "SEASON_DATA_CACHE.JSON";

/// Inserted before the extension of the active file name to form the backup name.
pub const BACKUP_SUFFIX: &str = "_original";

/// The two significant files of a cache directory.
///
/// `backup` only exists while an expedition dataset is swapped in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLocation {
    dir: Utf8PathBuf,
    active: Utf8PathBuf,
    backup: Utf8PathBuf,
}

impl CacheLocation {
    /// Location using the standard season cache file names.
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self::with_active_name(dir, ACTIVE_FILE_NAME)
    }

    /// Location with a custom active file name; the backup name is derived from it.
    pub fn with_active_name(dir: impl Into<Utf8PathBuf>, active_name: &str) -> Self {
        let dir = dir.into();
        let active = dir.join(active_name);
        let backup = dir.join(backup_file_name(active_name));
        Self {
            dir,
            active,
            backup,
        }
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    pub fn active(&self) -> &Utf8Path {
        &self.active
    }

    pub fn backup(&self) -> &Utf8Path {
        &self.backup
    }

    /// File name of the active file, for messages.
    pub fn active_name(&self) -> &str {
        self.active.file_name().unwrap_or(ACTIVE_FILE_NAME)
    }
}

/// Derives the backup file name: `NAME.EXT` becomes `NAME_original.EXT`.
///
/// Names without an extension get the suffix appended.
pub fn backup_file_name(active_name: &str) -> String {
    let path = Utf8Path::new(active_name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => format!("{stem}{BACKUP_SUFFIX}.{ext}"),
        _ => format!("{active_name}{BACKUP_SUFFIX}"),
    }
}
