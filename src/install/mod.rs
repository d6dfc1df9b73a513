// src/install/mod.rs

//! Install orchestration and install-state tracking.
//!
//! - [`orchestrator`] sequences generator and compiler invocations.
//! - [`registry`] remembers which targets were installed during this run.

pub mod orchestrator;
pub mod registry;

pub use orchestrator::{InstallOptions, Installer};
pub use registry::InstallRegistry;
