//! Detection of a running No Man's Sky process.
//!
//! The swap engine never checks this itself. Callers consult a [`ProcessGate`]
//! before mutating the cache, because the game keeps the season cache open
//! while it runs.

use crate::error::ProcessQueryError;
use chrono::{DateTime, Local};
use serde::Serialize;
use sysinfo::System;

/// A process as reported by a [`ProcessSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub name: String,
    pub pid: u32,
    /// Resident memory in bytes, when known.
    pub memory_bytes: Option<u64>,
    /// Start time in seconds since the Unix epoch, when known.
    pub start_time: Option<u64>,
}

/// Details about the running game, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInfo {
    pub name: String,
    pub pid: u32,
    pub platform: String,
    pub memory_usage: String,
    pub start_time: String,
}

impl ProcessInfo {
    fn from_entry(entry: &ProcessEntry) -> Self {
        Self {
            name: entry.name.clone(),
            pid: entry.pid,
            platform: std::env::consts::OS.to_string(),
            memory_usage: entry
                .memory_bytes
                .map(format_memory)
                .unwrap_or_else(|| "Unknown".to_string()),
            start_time: entry
                .start_time
                .and_then(format_start_time)
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

fn format_memory(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
}

fn format_start_time(secs: u64) -> Option<String> {
    let secs = i64::try_from(secs).ok()?;
    let utc = DateTime::from_timestamp(secs, 0)?;
    Some(
        utc.with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    )
}

/// Something that can enumerate OS processes.
pub trait ProcessSource {
    fn processes(&self) -> Result<Vec<ProcessEntry>, ProcessQueryError>;
}

/// Enumerates processes with `sysinfo`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcesses;

impl ProcessSource for SystemProcesses {
    fn processes(&self) -> Result<Vec<ProcessEntry>, ProcessQueryError> {
        let system = System::new_all();
        let entries: Vec<ProcessEntry> = system
            .processes()
            .iter()
            .map(|(pid, process)| ProcessEntry {
                name: process.name().to_string_lossy().into_owned(),
                pid: pid.as_u32(),
                memory_bytes: Some(process.memory()),
                start_time: Some(process.start_time()).filter(|t| *t > 0),
            })
            .collect();

        // A visible process table always contains at least this process.
        if entries.is_empty() {
            return Err(ProcessQueryError::Unavailable(
                "no processes visible".to_string(),
            ));
        }

        tracing::debug!("Enumerated {} processes", entries.len());
        Ok(entries)
    }
}

/// Executable names of the game for the current OS family.
pub fn default_process_names() -> Vec<String> {
    process_names_for(std::env::consts::OS)
}

/// Executable names of the game for `os` (as in [`std::env::consts::OS`]).
/// Unknown systems fall back to the Windows names.
pub fn process_names_for(os: &str) -> Vec<String> {
    let names: &[&str] = match os {
        "macos" => &["No Man's Sky", "NMS"],
        "linux" => &["NMS.x64", "NoMansSky"],
        _ => &["NMS.exe", "NoMansSky.exe"],
    };
    names.iter().map(|s| s.to_string()).collect()
}

/// Result of a liveness query that keeps the failure case.
#[derive(Debug)]
pub enum Liveness {
    Running(ProcessEntry),
    NotRunning,
    Unknown(ProcessQueryError),
}

/// Answers whether the game is running.
#[derive(Debug, Clone)]
pub struct ProcessGate<S = SystemProcesses> {
    source: S,
    names: Vec<String>,
    case_insensitive: bool,
}

impl ProcessGate {
    pub fn new() -> Self {
        Self::with_source(SystemProcesses)
    }
}

impl Default for ProcessGate {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ProcessSource> ProcessGate<S> {
    /// Gate over a custom process source, matching the current OS's names.
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            names: default_process_names(),
            case_insensitive: cfg!(windows),
        }
    }

    /// Replaces the executable names to match.
    pub fn with_names(mut self, names: Vec<String>, case_insensitive: bool) -> Self {
        self.names = names;
        self.case_insensitive = case_insensitive;
        self
    }

    fn matches(&self, name: &str, process_name: &str) -> bool {
        if self.case_insensitive {
            name.eq_ignore_ascii_case(process_name)
        } else {
            name == process_name
        }
    }

    /// Looks for the game in the process table.
    ///
    /// Names are tried in configured order, so the primary executable wins
    /// over a launcher or helper when both are running.
    pub fn liveness(&self) -> Liveness {
        let processes = match self.source.processes() {
            Ok(processes) => processes,
            Err(e) => return Liveness::Unknown(e),
        };
        self.names
            .iter()
            .find_map(|name| processes.iter().find(|p| self.matches(name, &p.name)))
            .cloned()
            .map_or(Liveness::NotRunning, Liveness::Running)
    }

    /// Whether the game is running. A failed query counts as not running.
    pub fn is_running(&self) -> bool {
        match self.liveness() {
            Liveness::Running(_) => true,
            Liveness::NotRunning => false,
            Liveness::Unknown(e) => {
                tracing::warn!("Process check failed, assuming not running: {}", e);
                false
            }
        }
    }

    /// Details of the matching process, if any.
    pub fn process_info(&self) -> Option<ProcessInfo> {
        match self.liveness() {
            Liveness::Running(entry) => Some(ProcessInfo::from_entry(&entry)),
            Liveness::NotRunning => None,
            Liveness::Unknown(e) => {
                tracing::warn!("Process check failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Process source returning a scripted listing.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct FakeProcesses {
        listing: Arc<Mutex<Option<Vec<ProcessEntry>>>>,
    }

    impl FakeProcesses {
        pub(crate) fn with(names: &[&str]) -> Self {
            let fake = Self::default();
            fake.set(names);
            fake
        }

        pub(crate) fn failing() -> Self {
            Self::default()
        }

        pub(crate) fn set(&self, names: &[&str]) {
            let entries = names
                .iter()
                .enumerate()
                .map(|(i, name)| entry(name, 100 + i as u32))
                .collect();
            *self.listing.lock().unwrap() = Some(entries);
        }

        pub(crate) fn fail(&self) {
            *self.listing.lock().unwrap() = None;
        }
    }

    impl ProcessSource for FakeProcesses {
        fn processes(&self) -> Result<Vec<ProcessEntry>, ProcessQueryError> {
            self.listing
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| ProcessQueryError::Unavailable("scripted failure".to_string()))
        }
    }

    fn entry(name: &str, pid: u32) -> ProcessEntry {
        ProcessEntry {
            name: name.to_string(),
            pid,
            memory_bytes: None,
            start_time: None,
        }
    }

    pub(crate) fn gate(source: FakeProcesses) -> ProcessGate<FakeProcesses> {
        ProcessGate::with_source(source).with_names(process_names_for("linux"), false)
    }

    #[test]
    fn test_exact_name_match() {
        assert!(gate(FakeProcesses::with(&["bash", "NMS.x64"])).is_running());
        assert!(!gate(FakeProcesses::with(&["bash", "NMS.x64-helper"])).is_running());
        assert!(!gate(FakeProcesses::with(&["MyNoMansSkyTool"])).is_running());
        assert!(!gate(FakeProcesses::with(&["nms.x64"])).is_running());
    }

    #[test]
    fn test_case_insensitive_names() {
        let gate = ProcessGate::with_source(FakeProcesses::with(&["nomanssky.EXE"]))
            .with_names(process_names_for("windows"), true);
        assert!(gate.is_running());
    }

    #[test]
    fn test_query_failure_is_fail_open() {
        let gate = gate(FakeProcesses::failing());
        assert!(!gate.is_running());
        assert!(gate.process_info().is_none());
        assert!(matches!(gate.liveness(), Liveness::Unknown(_)));
    }

    #[test]
    fn test_first_configured_name_wins() {
        let source = FakeProcesses::default();
        *source.listing.lock().unwrap() = Some(vec![
            entry("NoMansSky", 4242),
            entry("bash", 1),
            entry("NMS.x64", 7),
            entry("NMS.x64", 8),
        ]);

        match gate(source).liveness() {
            Liveness::Running(entry) => {
                assert_eq!(entry.name, "NMS.x64");
                assert_eq!(entry.pid, 7);
            }
            other => panic!("unexpected liveness: {other:?}"),
        }
    }

    #[test]
    fn test_process_info_for_match() {
        let source = FakeProcesses::default();
        *source.listing.lock().unwrap() = Some(vec![
            entry("bash", 1),
            ProcessEntry {
                name: "NoMansSky".to_string(),
                pid: 4242,
                memory_bytes: Some(512 * 1024 * 1024),
                start_time: None,
            },
        ]);

        let info = gate(source).process_info().unwrap();
        assert_eq!(info.name, "NoMansSky");
        assert_eq!(info.pid, 4242);
        assert_eq!(info.memory_usage, "512.0 MB");
        assert_eq!(info.start_time, "Unknown");
        assert_eq!(info.platform, std::env::consts::OS);
    }

    #[test]
    fn test_not_running_has_no_info() {
        assert!(gate(FakeProcesses::with(&["bash"])).process_info().is_none());
    }

    #[test]
    fn test_names_per_os() {
        assert_eq!(process_names_for("macos"), vec!["No Man's Sky", "NMS"]);
        assert_eq!(process_names_for("freebsd"), process_names_for("windows"));
    }

    #[test]
    fn test_format_start_time() {
        assert!(format_start_time(1_700_000_000).unwrap().starts_with("2023-11-1"));
        assert!(format_start_time(u64::MAX).is_none());
    }

    #[test]
    fn test_system_processes_sees_something() {
        let processes = SystemProcesses.processes().unwrap();
        assert!(processes.iter().any(|p| p.pid == std::process::id()));
    }
}
