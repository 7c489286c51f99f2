use camino::Utf8PathBuf;
use miette::Diagnostic;
use nms_expedition_core::{CatalogError, ConfigError, ServiceError, SwapError};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Cache path not configured")]
    #[diagnostic(
        code(config::cache_path_missing),
        help("Run `nms-expedition config set-platform <platform>` to configure the game cache")
    )]
    CachePathMissing,

    #[error("{message}")]
    #[diagnostic(
        code(expedition::not_found),
        help("Run `nms-expedition list` to see the available expeditions")
    )]
    NotFound { message: String },

    #[error("Invalid JSON in {path}")]
    #[diagnostic(
        code(expedition::invalid_json),
        help("The file is corrupt. Nothing was changed")
    )]
    InvalidJson {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    #[diagnostic(
        code(cache::verification_failed),
        help("The original season data was kept. Run `nms-expedition status`, then `nms-expedition restore` if an expedition is active")
    )]
    VerificationFailed(SwapError),

    #[error("No backup file found - cannot restore")]
    #[diagnostic(
        code(cache::no_backup),
        help("The online season data is already active")
    )]
    NoBackup,

    #[error("No Man's Sky is running (pid {pid})")]
    #[diagnostic(
        code(game::running),
        help("Close the game before switching expeditions")
    )]
    GameRunning { pid: u32 },

    #[error("Could not determine whether No Man's Sky is running")]
    #[diagnostic(code(game::liveness_unknown))]
    LivenessUnknown {
        #[source]
        source: ServiceError,
    },

    #[error("Failed to read expedition data")]
    #[diagnostic(
        code(expedition::catalog),
        help("Set --data-dir or NMS_EXPEDITIONS_DIR to the folder containing the expedition files")
    )]
    Catalog {
        #[source]
        source: CatalogError,
    },

    #[error("Configuration error")]
    #[diagnostic(code(config::io))]
    Config {
        #[source]
        source: ConfigError,
    },

    #[error("No Steam account found")]
    #[diagnostic(
        code(steam::no_account),
        help("Start the game once through Steam, or pass --steam-id st_<17 digits>")
    )]
    NoSteamAccount,

    #[error("Could not determine the game cache directory on this system")]
    #[diagnostic(code(config::no_app_data))]
    NoAppDataDir,

    #[error("Command failed")]
    #[diagnostic(code(cli::failed))]
    Reported,

    #[error("IO operation failed")]
    #[diagnostic(code(io::operation_failed))]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl From<SwapError> for CliError {
    fn from(error: SwapError) -> Self {
        match error {
            SwapError::Configuration => Self::CachePathMissing,
            SwapError::NotFound(message) => Self::NotFound { message },
            SwapError::Validation { path, source } => Self::InvalidJson { path, source },
            SwapError::NoBackup => Self::NoBackup,
            SwapError::Io(source) => Self::IoError { source },
            e @ (SwapError::BackupVerification
            | SwapError::ActivationVerification
            | SwapError::RestorationVerification) => Self::VerificationFailed(e),
        }
    }
}

impl From<ServiceError> for CliError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::GameRunning { pid } => Self::GameRunning { pid },
            ServiceError::Swap(e) => e.into(),
            e @ ServiceError::LivenessUnknown(_) => Self::LivenessUnknown { source: e },
        }
    }
}

impl From<CatalogError> for CliError {
    fn from(source: CatalogError) -> Self {
        Self::Catalog { source }
    }
}

impl From<ConfigError> for CliError {
    fn from(source: ConfigError) -> Self {
        Self::Config { source }
    }
}
