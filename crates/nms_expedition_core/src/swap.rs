//! Backup, activation and restoration of the season cache file.
//!
//! [`SwapEngine`] is the only writer of the cache directory. Every write is
//! followed by a read-back and a byte comparison against the source:
//!
//! - **Backup**: `active` is copied to `backup` at most once. A second backup
//!   attempt reports `already_exists` and leaves the original untouched.
//! - **Activate**: a backup is confirmed before `active` is overwritten. If the
//!   write fails or does not verify, the original is still in `backup`.
//! - **Restore**: `backup` is copied over `active` and only deleted after the
//!   copy verifies. A failed restore keeps `backup` so it can be retried.
//!
//! The engine does not know about the game process. Callers must check
//! [`ProcessGate`](crate::ProcessGate) first, or go through
//! [`ExpeditionService`](crate::ExpeditionService) which does.

use crate::catalog::{ExpeditionCatalog, ExpeditionMetadata};
use crate::config::CacheDirSource;
use crate::error::{Result, SwapError};
use crate::fs::{CacheFs, StdFs};
use crate::location::CacheLocation;
use camino::{Utf8Path, Utf8PathBuf};
use serde::de::IgnoredAny;
use serde::Serialize;

/// Outcome of [`SwapEngine::create_backup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupOutcome {
    /// `true` when a backup was already present and was left as is.
    pub already_exists: bool,
    pub backup_path: Utf8PathBuf,
    pub message: String,
}

/// Outcome of [`SwapEngine::activate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activation {
    pub expedition_id: String,
    pub metadata: ExpeditionMetadata,
    /// `false` when the backup came from an earlier activation.
    pub backup_created: bool,
    pub message: String,
}

impl Activation {
    pub fn display_name(&self) -> &str {
        self.metadata
            .display_name
            .as_deref()
            .unwrap_or(&self.expedition_id)
    }
}

/// Outcome of [`SwapEngine::restore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Restoration {
    pub restored_path: Utf8PathBuf,
    pub message: String,
}

/// Swaps expedition datasets in and out of the cache directory.
pub struct SwapEngine<'a, F = StdFs> {
    config: &'a dyn CacheDirSource,
    catalog: &'a ExpeditionCatalog,
    fs: F,
}

impl<'a> SwapEngine<'a> {
    pub fn new(config: &'a dyn CacheDirSource, catalog: &'a ExpeditionCatalog) -> Self {
        Self::with_fs(config, catalog, StdFs)
    }
}

impl<'a, F: CacheFs> SwapEngine<'a, F> {
    /// Engine with a custom filesystem implementation.
    pub fn with_fs(
        config: &'a dyn CacheDirSource,
        catalog: &'a ExpeditionCatalog,
        fs: F,
    ) -> Self {
        Self {
            config,
            catalog,
            fs,
        }
    }

    /// Copies the active file to the backup file unless a backup already exists.
    pub fn create_backup(&self) -> Result<BackupOutcome> {
        let location = self.location()?;
        self.backup_in(&location)
    }

    /// Replaces the active file with the dataset for `id`.
    ///
    /// The dataset is validated before anything is written, and the active
    /// file is only overwritten once a backup is confirmed.
    pub fn activate(&self, id: &str) -> Result<Activation> {
        let location = self.location()?;

        let dataset_path = self
            .catalog
            .dataset_path(id)
            .filter(|path| self.fs.exists(path))
            .ok_or_else(|| {
                SwapError::NotFound(format!("Expedition file not found: {id}.json"))
            })?;
        let content = self.fs.read(&dataset_path)?;
        validate_json(&dataset_path, &content)?;

        let backup = self.backup_in(&location)?;

        self.fs.replace(location.active(), &content)?;
        let written = self.fs.read(location.active())?;
        if written != content {
            tracing::error!(
                "Activation of {} did not verify; original remains in {}",
                id,
                location.backup()
            );
            return Err(SwapError::ActivationVerification);
        }

        let metadata = self.catalog.metadata(id);
        let display_name = metadata.display_name.as_deref().unwrap_or(id);
        let message = format!("Expedition \"{display_name}\" activated");
        tracing::info!("{} (backup created: {})", message, !backup.already_exists);

        Ok(Activation {
            expedition_id: id.to_string(),
            metadata,
            backup_created: !backup.already_exists,
            message,
        })
    }

    /// Copies the backup over the active file, then deletes the backup.
    pub fn restore(&self) -> Result<Restoration> {
        let location = self.location()?;

        if !self.fs.exists(location.backup()) {
            return Err(SwapError::NoBackup);
        }

        let content = self.fs.read(location.backup())?;
        validate_json(location.backup(), &content)?;

        self.fs.replace(location.active(), &content)?;
        let written = self.fs.read(location.active())?;
        if written != content {
            tracing::error!(
                "Restore did not verify; keeping backup at {}",
                location.backup()
            );
            return Err(SwapError::RestorationVerification);
        }

        self.fs.remove(location.backup())?;

        let message = format!("Original {} restored successfully", location.active_name());
        tracing::info!("{}", message);
        Ok(Restoration {
            restored_path: location.active().to_path_buf(),
            message,
        })
    }

    fn location(&self) -> Result<CacheLocation> {
        self.config
            .cache_dir()
            .map(CacheLocation::new)
            .ok_or(SwapError::Configuration)
    }

    fn backup_in(&self, location: &CacheLocation) -> Result<BackupOutcome> {
        let active = location.active();
        let backup = location.backup();

        if !self.fs.exists(active) {
            return Err(SwapError::NotFound(format!(
                "{} not found",
                location.active_name()
            )));
        }

        let content = self.fs.read(active)?;
        validate_json(active, &content)?;

        if self.fs.exists(backup) {
            tracing::debug!("Backup already exists at {}", backup);
            return Ok(BackupOutcome {
                already_exists: true,
                backup_path: backup.to_path_buf(),
                message: "Backup already exists".to_string(),
            });
        }

        self.fs.create_new(backup, &content)?;

        match self.fs.read(backup) {
            Ok(written) if written == content => {}
            outcome => {
                tracing::error!("Backup at {} did not verify, removing it", backup);
                if let Err(e) = self.fs.remove(backup) {
                    tracing::error!("Failed to remove unverified backup {}: {}", backup, e);
                }
                return Err(match outcome {
                    Err(e) => SwapError::Io(e),
                    Ok(_) => SwapError::BackupVerification,
                });
            }
        }

        tracing::info!("Created backup at {}", backup);
        Ok(BackupOutcome {
            already_exists: false,
            backup_path: backup.to_path_buf(),
            message: "Backup created successfully".to_string(),
        })
    }
}

fn validate_json(path: &Utf8Path, content: &[u8]) -> Result<()> {
    serde_json::from_slice::<IgnoredAny>(content)
        .map(|_| ())
        .map_err(|source| SwapError::Validation {
            path: path.to_path_buf(),
            source,
        })
}
