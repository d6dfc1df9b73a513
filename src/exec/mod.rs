// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] provides the `CommandRunner` trait, the `CommandSpec` /
//!   `CommandOutput` value types and [`run_checked`].
//! - [`process`] is the `tokio::process` implementation used in production.
//! - [`packages`] answers package-metadata questions (executable or library,
//!   in-module dependencies) by asking the toolchain.

pub mod backend;
pub mod packages;
pub mod process;

pub use backend::{run_checked, BoxFuture, CommandOutput, CommandRunner, CommandSpec};
pub use packages::{discover_install_root, GoPackageQuery, PackageQuery};
pub use process::ProcessRunner;
