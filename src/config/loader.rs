// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "FRESHBUILD_CONFIG";
/// Environment variable overriding `[config].install_root`.
pub const INSTALL_ROOT_ENV: &str = "FRESHBUILD_INSTALL_ROOT";
/// Environment variable overriding `[config].build_tags`.
pub const BUILD_TAGS_ENV: &str = "FRESHBUILD_BUILD_TAGS";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Resolves `[config].root` against the config file's directory.
/// - Checks the generator table, toolchain and source patterns.
///
/// Environment overrides are **not** applied here; see [`EnvOverrides`].
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let mut raw = load_from_path(path)?;
    let base = config_dir(path);
    raw.config.root = Some(match raw.config.root.take() {
        Some(root) if root.is_relative() => base.join(root),
        Some(root) => root,
        None => base,
    });
    ConfigFile::try_from(raw)
}

/// Like [`load_and_validate`], but a missing file yields the built-in
/// defaults rooted at the current directory.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    if path.exists() {
        return load_and_validate(path);
    }
    debug!(path = ?path, "no config file; using defaults");
    ConfigFile::try_from(RawConfigFile::default())
}

/// Helper to resolve a default config path.
///
/// `FRESHBUILD_CONFIG` if set, otherwise `Freshbuild.toml` in the current
/// working directory.
pub fn default_config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("Freshbuild.toml"))
}

/// Directory containing the config file, or `.`.
fn config_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Settings taken from the environment, which win over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub install_root: Option<PathBuf>,
    pub build_tags: Option<String>,
}

impl EnvOverrides {
    /// Read `FRESHBUILD_INSTALL_ROOT` / `FRESHBUILD_BUILD_TAGS`. Empty
    /// values count as unset.
    pub fn from_env() -> Self {
        Self {
            install_root: std::env::var_os(INSTALL_ROOT_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            build_tags: std::env::var(BUILD_TAGS_ENV).ok().filter(|v| !v.is_empty()),
        }
    }

    pub fn apply(self, mut config: ConfigFile) -> ConfigFile {
        if let Some(install_root) = self.install_root {
            debug!(install_root = ?install_root, "install root overridden from environment");
            config.install_root = Some(install_root);
        }
        if let Some(build_tags) = self.build_tags {
            debug!(%build_tags, "build tags overridden from environment");
            config.build_tags = Some(build_tags);
        }
        config
    }
}
