//! The facade that UIs talk to.
//!
//! [`ExpeditionService`] owns the configuration source, the catalog and a
//! process gate, and refuses to touch the cache while the game is running.

use crate::catalog::{ExpeditionCatalog, ExpeditionDescriptor};
use crate::config::CacheDirSource;
use crate::error::{CatalogError, ServiceError};
use crate::process::{Liveness, ProcessGate, ProcessInfo, ProcessSource, SystemProcesses};
use crate::state::{CacheState, CacheStateDetector};
use crate::swap::{Activation, Restoration, SwapEngine};
use crate::watch::ProcessWatcher;
use std::io;
use std::time::Duration;

/// What to do when the process table cannot be read before a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatePolicy {
    /// Assume the game is not running and proceed.
    #[default]
    FailOpen,
    /// Refuse with [`ServiceError::LivenessUnknown`].
    FailClosed,
}

pub struct ExpeditionService<C, S = SystemProcesses> {
    config: C,
    catalog: ExpeditionCatalog,
    gate: ProcessGate<S>,
    policy: GatePolicy,
}

impl<C: CacheDirSource> ExpeditionService<C> {
    pub fn new(config: C, catalog: ExpeditionCatalog) -> Self {
        Self::with_gate(config, catalog, ProcessGate::new())
    }
}

impl<C: CacheDirSource, S: ProcessSource> ExpeditionService<C, S> {
    pub fn with_gate(config: C, catalog: ExpeditionCatalog, gate: ProcessGate<S>) -> Self {
        Self {
            config,
            catalog,
            gate,
            policy: GatePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: GatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn catalog(&self) -> &ExpeditionCatalog {
        &self.catalog
    }

    pub fn detector(&self) -> CacheStateDetector<'_> {
        CacheStateDetector::new(&self.config, &self.catalog)
    }

    pub fn engine(&self) -> SwapEngine<'_> {
        SwapEngine::new(&self.config, &self.catalog)
    }

    pub fn current_state(&self) -> CacheState {
        self.detector().current_state()
    }

    pub fn list_available(&self) -> Result<Vec<ExpeditionDescriptor>, CatalogError> {
        self.catalog.list_available()
    }

    pub fn activate(&self, id: &str) -> Result<Activation, ServiceError> {
        self.ensure_game_closed()?;
        Ok(self.engine().activate(id)?)
    }

    pub fn restore(&self) -> Result<Restoration, ServiceError> {
        self.ensure_game_closed()?;
        Ok(self.engine().restore()?)
    }

    pub fn is_running(&self) -> bool {
        self.gate.is_running()
    }

    pub fn process_info(&self) -> Option<ProcessInfo> {
        self.gate.process_info()
    }

    /// Polls liveness in the background until the returned handle is stopped
    /// or dropped.
    pub fn watch<F>(&self, interval: Duration, callback: F) -> io::Result<ProcessWatcher>
    where
        S: Clone + Send + 'static,
        F: FnMut(bool) + Send + 'static,
    {
        ProcessWatcher::spawn(self.gate.clone(), interval, callback)
    }

    fn ensure_game_closed(&self) -> Result<(), ServiceError> {
        match self.gate.liveness() {
            Liveness::NotRunning => Ok(()),
            Liveness::Running(process) => {
                tracing::warn!("Refusing to modify cache: {} is running", process.name);
                Err(ServiceError::GameRunning { pid: process.pid })
            }
            Liveness::Unknown(e) => match self.policy {
                GatePolicy::FailOpen => {
                    tracing::warn!("Process check failed, proceeding anyway: {}", e);
                    Ok(())
                }
                GatePolicy::FailClosed => Err(ServiceError::LivenessUnknown(e)),
            },
        }
    }
}
