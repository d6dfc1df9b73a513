// src/build/mod.rs

//! Build targets and the build-necessity evaluator.
//!
//! - [`target`] defines [`Target`] and the directory-link listing used to
//!   discover targets.
//! - [`necessity`] decides whether a target must be compiled/installed.

pub mod necessity;
pub mod target;

use std::sync::Arc;

use crate::config::ConfigFile;
use crate::exec::{CommandRunner, PackageQuery};
use crate::fs::FileSystem;

pub use necessity::{build_reason, should_build, BuildReason};
pub use target::{list_targets, Target};

/// Collaborators every engine operation needs, passed explicitly.
#[derive(Clone)]
pub struct BuildContext {
    pub fs: Arc<dyn FileSystem>,
    pub runner: Arc<dyn CommandRunner>,
    pub packages: Arc<dyn PackageQuery>,
    pub config: Arc<ConfigFile>,
}

impl BuildContext {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        runner: Arc<dyn CommandRunner>,
        packages: Arc<dyn PackageQuery>,
        config: ConfigFile,
    ) -> Self {
        Self {
            fs,
            runner,
            packages,
            config: Arc::new(config),
        }
    }

    pub fn target(&self, name: &str) -> Target {
        self.config.target(name)
    }
}
