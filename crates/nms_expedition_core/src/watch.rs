//! Background polling of game liveness.

use crate::process::{ProcessGate, ProcessSource};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default interval between liveness checks.
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(5);

const STOP_POLL_STEP: Duration = Duration::from_millis(50);

/// Handle to a thread that polls a [`ProcessGate`] and reports each result.
///
/// Dropping the handle signals the thread to stop without waiting for it.
pub struct ProcessWatcher {
    stop_flag: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl ProcessWatcher {
    /// Starts polling. `callback` receives the liveness result of every check,
    /// the first one immediately.
    pub fn spawn<S, F>(
        gate: ProcessGate<S>,
        interval: Duration,
        mut callback: F,
    ) -> io::Result<Self>
    where
        S: ProcessSource + Send + 'static,
        F: FnMut(bool) + Send + 'static,
    {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop_flag);

        let handle = thread::Builder::new()
            .name("nms-process-watcher".to_string())
            .spawn(move || {
                tracing::debug!("Process watcher started ({:?} interval)", interval);
                while !thread_stop.load(Ordering::SeqCst) {
                    callback(gate.is_running());
                    sleep_unless_stopped(interval, &thread_stop);
                }
                tracing::debug!("Process watcher exiting");
            })?;

        Ok(Self {
            stop_flag,
            thread_handle: Some(handle),
        })
    }

    pub fn is_active(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Signals the thread to stop and waits for it.
    pub fn stop(mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                tracing::error!("Process watcher thread panicked");
            }
        }
    }
}

impl Drop for ProcessWatcher {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }
}

fn sleep_unless_stopped(total: Duration, stop_flag: &AtomicBool) {
    let deadline = Instant::now() + total;
    loop {
        if stop_flag.load(Ordering::SeqCst) {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        thread::sleep(STOP_POLL_STEP.min(deadline - now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::tests::{gate, FakeProcesses};
    use std::sync::mpsc;

    #[test]
    fn test_reports_liveness_changes() {
        let source = FakeProcesses::with(&["bash"]);
        let (tx, rx) = mpsc::channel();
        let watcher = ProcessWatcher::spawn(
            gate(source.clone()),
            Duration::from_millis(10),
            move |running| {
                let _ = tx.send(running);
            },
        )
        .unwrap();

        assert!(!rx.recv_timeout(Duration::from_secs(5)).unwrap());
        source.set(&["NMS.x64"]);
        let saw_running = (0..500)
            .filter_map(|_| rx.recv_timeout(Duration::from_secs(5)).ok())
            .any(|running| running);
        assert!(saw_running);

        assert!(watcher.is_active());
        watcher.stop();
    }

    #[test]
    fn test_stop_interrupts_long_interval() {
        let (tx, rx) = mpsc::channel();
        let watcher = ProcessWatcher::spawn(
            gate(FakeProcesses::failing()),
            Duration::from_secs(3600),
            move |running| {
                let _ = tx.send(running);
            },
        )
        .unwrap();

        assert!(!rx.recv_timeout(Duration::from_secs(5)).unwrap());
        let started = Instant::now();
        watcher.stop();
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
