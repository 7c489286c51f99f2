//! Steam account discovery and offline-mode detection.

use crate::config::home_dir;
use crate::location::ACTIVE_FILE_NAME;
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::sync::LazyLock;
use std::time::SystemTime;

static STEAM_DIR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^st_\d{17}$").expect("Failed to compile Steam directory regex")
});

static OFFLINE_MODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""WantsOfflineMode"\s+"(\d+)""#).expect("Failed to compile offline mode regex")
});

/// A Steam account directory under `HelloGames/NMS` with a season cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SteamAccount {
    /// Directory name, e.g. `st_76561198000000000`.
    pub steam_id: String,
    pub cache_path: Utf8PathBuf,
}

/// Finds Steam account directories that hold a season cache file.
pub fn detect_steam_accounts(nms_root: &Utf8Path) -> Vec<SteamAccount> {
    let entries = match nms_root.read_dir_utf8() {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("No Steam accounts under {}: {}", nms_root, e);
            return Vec::new();
        }
    };

    let mut accounts: Vec<SteamAccount> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter(|entry| STEAM_DIR_PATTERN.is_match(entry.file_name()))
        .filter_map(|entry| {
            let cache_path = entry.path().join("cache");
            cache_path
                .join(ACTIVE_FILE_NAME)
                .is_file()
                .then(|| SteamAccount {
                    steam_id: entry.file_name().to_string(),
                    cache_path,
                })
        })
        .collect();

    accounts.sort_by(|a, b| a.steam_id.cmp(&b.steam_id));
    accounts
}

/// The account whose season cache was written most recently.
///
/// Ties go to the first account in id order. Accounts whose cache cannot be
/// stat'ed only win when no other account can be.
pub fn main_steam_account(nms_root: &Utf8Path) -> Option<SteamAccount> {
    detect_steam_accounts(nms_root)
        .into_iter()
        .map(|account| {
            let time = modified(&account.cache_path.join(ACTIVE_FILE_NAME));
            (account, time)
        })
        .fold(
            None,
            |best: Option<(SteamAccount, Option<SystemTime>)>, (account, time)| match best {
                Some((_, best_time)) if time <= best_time => best,
                _ => Some((account, time)),
            },
        )
        .map(|(account, _)| account)
}

fn modified(path: &Utf8Path) -> Option<SystemTime> {
    match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(time) => Some(time),
        Err(e) => {
            tracing::warn!("Could not stat {}: {}", path, e);
            None
        }
    }
}

/// Offline-mode status of the Steam client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SteamStatus {
    pub available: bool,
    pub offline: Option<bool>,
    pub message: String,
}

impl SteamStatus {
    pub fn from_offline(offline: Option<bool>) -> Self {
        match offline {
            None => Self {
                available: false,
                offline: None,
                message: "Steam status unavailable".to_string(),
            },
            Some(true) => Self {
                available: true,
                offline: Some(true),
                message: "Steam: Offline mode".to_string(),
            },
            Some(false) => Self {
                available: true,
                offline: Some(false),
                message: "Steam: Online mode".to_string(),
            },
        }
    }
}

/// Usual Steam install directories for this OS.
pub fn default_steam_roots() -> Vec<Utf8PathBuf> {
    if cfg!(target_os = "windows") {
        return vec![
            Utf8PathBuf::from(r"C:\Program Files (x86)\Steam"),
            Utf8PathBuf::from(r"C:\Program Files\Steam"),
        ];
    }

    let Some(home) = home_dir() else {
        return Vec::new();
    };
    if cfg!(target_os = "macos") {
        vec![home.join("Library/Application Support/Steam")]
    } else {
        vec![home.join(".steam/steam"), home.join(".local/share/Steam")]
    }
}

/// Reads `config/loginusers.vdf` from the first root that has one.
///
/// Returns `None` when no file is found or it cannot be read.
pub fn steam_offline_status(steam_roots: &[Utf8PathBuf]) -> Option<bool> {
    let login_users = steam_roots
        .iter()
        .map(|root| root.join("config").join("loginusers.vdf"))
        .find(|path| path.is_file())?;

    match fs::read_to_string(&login_users) {
        Ok(content) => Some(parse_offline_mode(&content)),
        Err(e) => {
            tracing::warn!("Could not read {}: {}", login_users, e);
            None
        }
    }
}

pub fn steam_status(steam_roots: &[Utf8PathBuf]) -> SteamStatus {
    SteamStatus::from_offline(steam_offline_status(steam_roots))
}

/// Whether the first user block that sets `WantsOfflineMode` sets it to 1.
fn parse_offline_mode(vdf: &str) -> bool {
    let mut in_user = false;
    for line in vdf.lines().map(str::trim) {
        if line.contains('{') && !line.contains("\"users\"") {
            in_user = true;
            continue;
        }
        if in_user && line.contains('}') {
            in_user = false;
            continue;
        }
        if in_user {
            if let Some(caps) = OFFLINE_MODE_PATTERN.captures(line) {
                return &caps[1] == "1";
            }
        }
    }
    false
}
