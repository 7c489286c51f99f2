//! Error types for cache switching operations.
//!
//! Each concern has its own error enum so callers can tell a failed
//! precondition apart from a failed post-copy verification. External error
//! types (`std::io::Error`, `serde_json::Error`) convert via `From` impls.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used by the swap engine.
pub type Result<T> = std::result::Result<T, SwapError>;

/// Errors produced by [`SwapEngine`](crate::SwapEngine) operations.
#[derive(Error, Debug)]
pub enum SwapError {
    /// No cache directory is configured.
    #[error("Cache path not configured")]
    Configuration,

    /// A required file (active cache file or expedition dataset) is missing.
    #[error("{0}")]
    NotFound(String),

    /// A file exists but does not contain valid JSON.
    #[error("Invalid JSON in {path}: {source}")]
    Validation {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The freshly written backup did not match the active file.
    #[error("Backup verification failed - content mismatch")]
    BackupVerification,

    /// The active file did not match the dataset after activation.
    /// The original is still present in the backup file.
    #[error("Expedition activation verification failed")]
    ActivationVerification,

    /// The active file did not match the backup after restoring.
    /// The backup file is kept so the restore can be retried.
    #[error("Restoration verification failed")]
    RestorationVerification,

    /// Restore was requested but there is no backup file.
    #[error("No backup file found - cannot restore")]
    NoBackup,

    /// Filesystem I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SwapError {
    /// Whether this error came from a post-write content comparison.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            SwapError::BackupVerification
                | SwapError::ActivationVerification
                | SwapError::RestorationVerification
        )
    }
}

/// Errors produced while reading the expedition catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The dataset directory could not be listed.
    #[error("Failed to read expedition directory {path}: {source}")]
    ReadDir {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors produced while enumerating OS processes.
///
/// These never reach the UI: [`ProcessGate`](crate::ProcessGate) resolves them
/// to "not running".
#[derive(Error, Debug)]
pub enum ProcessQueryError {
    /// The OS process table could not be read.
    #[error("Process list unavailable: {0}")]
    Unavailable(String),
}

/// Errors produced while reading or writing the application configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The user's home directory could not be determined.
    #[error("Could not determine home directory")]
    HomeDirUnavailable,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors produced by the gated [`ExpeditionService`](crate::ExpeditionService).
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The game is running, so the cache file may be held open.
    #[error("No Man's Sky must be closed before changing expeditions (pid {pid})")]
    GameRunning { pid: u32 },

    /// The process listing failed and the gate policy refuses to guess.
    #[error("Could not determine whether No Man's Sky is running: {0}")]
    LivenessUnknown(#[source] ProcessQueryError),

    #[error(transparent)]
    Swap(#[from] SwapError),
}
