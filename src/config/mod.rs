// src/config/mod.rs

//! Configuration loading and validation for freshbuild.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and apply environment overrides (`loader.rs`).
//! - Validate the generator table, toolchain and source patterns (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    default_config_path, load_and_validate, load_from_path, load_or_default, EnvOverrides,
};
pub use model::{
    ConfigFile, ConfigSection, GeneratorSection, RawConfigFile, ToolchainSection,
};
