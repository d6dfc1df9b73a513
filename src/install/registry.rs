// src/install/registry.rs

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

/// Names of the targets successfully installed during the current run.
///
/// Shared (behind an `Arc`) by every concurrently running install. Reads take
/// a consistent snapshot; inserts and resets are exclusive. Entries are only
/// ever removed by [`InstallRegistry::reset`].
#[derive(Debug, Default)]
pub struct InstallRegistry {
    installed: RwLock<HashSet<String>>,
}

impl InstallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_installed(&self, name: impl Into<String>) {
        let name = name.into();
        let mut installed = self.installed.write().unwrap_or_else(PoisonError::into_inner);
        if installed.insert(name.clone()) {
            debug!(target = %name, "recorded installed target");
        }
    }

    /// Snapshot of the installed set.
    pub fn list_installed(&self) -> HashSet<String> {
        self.installed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.installed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }

    pub fn reset(&self) {
        self.installed
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        debug!("install registry reset");
    }
}
