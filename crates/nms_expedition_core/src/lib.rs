//! Core logic for switching No Man's Sky between its online season data and
//! offline expedition datasets.
//!
//! This crate provides the cache state machine and the verified swap engine
//! used by the `nms-expedition` CLI. Mutations are only safe while the game is
//! closed; [`ExpeditionService`] enforces that with a [`ProcessGate`].

mod catalog;
mod config;
mod error;
mod fs;
mod location;
mod process;
mod response;
mod service;
mod state;
mod steam;
mod swap;
mod watch;

pub use catalog::{ExpeditionCatalog, ExpeditionDescriptor, ExpeditionMetadata, METADATA_FILE_NAME};
pub use config::{
    app_data_root, build_cache_path, cache_path_under, home_dir, nms_root, AppConfig,
    CacheDirSource, ConfigStore, Platform, CONFIG_DIR_NAME, CONFIG_FILE_NAME,
};
pub use error::{CatalogError, ConfigError, ProcessQueryError, Result, ServiceError, SwapError};
pub use fs::{CacheFs, StdFs};
pub use location::{backup_file_name, CacheLocation, ACTIVE_FILE_NAME, BACKUP_SUFFIX};
pub use process::{
    default_process_names, process_names_for, Liveness, ProcessEntry, ProcessGate, ProcessInfo,
    ProcessSource, SystemProcesses,
};
pub use response::{ErrorCode, ErrorResponse, Response};
pub use service::{ExpeditionService, GatePolicy};
pub use state::{CacheFiles, CacheMode, CacheState, CacheStateDetector};
pub use steam::{
    default_steam_roots, detect_steam_accounts, main_steam_account, steam_offline_status,
    steam_status, SteamAccount, SteamStatus,
};
pub use swap::{Activation, BackupOutcome, Restoration, SwapEngine};
pub use watch::{ProcessWatcher, DEFAULT_WATCH_INTERVAL};
