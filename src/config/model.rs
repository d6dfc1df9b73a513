// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use globset::GlobSet;
use serde::Deserialize;

use crate::build::Target;
use crate::generator::GeneratorSpec;
use crate::types::GeneratorKind;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// install_root = "/home/me/go/bin"
/// build_tags = "cus"
/// manifest = "go.mod"
/// sources = ["*.go"]
///
/// [toolchain]
/// program = "go"
///
/// [generator.modern]
/// program = "templ"
/// args = ["generate"]
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Global settings from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// Compiler/installer invocation from `[toolchain]`.
    #[serde(default)]
    pub toolchain: ToolchainSection,

    /// Per-kind overrides from `[generator.<kind>]`.
    #[serde(default)]
    pub generator: BTreeMap<GeneratorKind, GeneratorSection>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Workspace root; relative paths are resolved against the config file's
    /// directory. Defaults to that directory.
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Directory where installed artifacts live (`GOBIN`).
    ///
    /// `FRESHBUILD_INSTALL_ROOT` overrides it; if both are absent the CLI asks
    /// the toolchain.
    #[serde(default)]
    pub install_root: Option<PathBuf>,

    /// Build tags passed as `-tags=<value>` (`FRESHBUILD_BUILD_TAGS` overrides).
    #[serde(default)]
    pub build_tags: Option<String>,

    /// Build-declaration file, relative to the root. A change to it
    /// invalidates every installed artifact.
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    /// File-name globs selecting a target's compilable sources.
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,

    /// Module path prefix used to filter `deps` output.
    #[serde(default)]
    pub module_prefix: Option<String>,
}

fn default_manifest() -> PathBuf {
    PathBuf::from("go.mod")
}

fn default_sources() -> Vec<String> {
    vec!["*.go".to_string()]
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            root: None,
            install_root: None,
            build_tags: None,
            manifest: default_manifest(),
            sources: default_sources(),
            module_prefix: None,
        }
    }
}

/// `[toolchain]` section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ToolchainSection {
    #[serde(default = "default_toolchain_program")]
    pub program: String,

    /// Arguments placed before the optional `-tags=` flag and the target path.
    #[serde(default = "default_install_args")]
    pub install_args: Vec<String>,

    /// Environment variable telling the toolchain where to install.
    #[serde(default = "default_install_root_env")]
    pub install_root_env: String,
}

fn default_toolchain_program() -> String {
    "go".to_string()
}

fn default_install_args() -> Vec<String> {
    vec!["install".to_string(), "-ldflags=-s -w".to_string()]
}

fn default_install_root_env() -> String {
    "GOBIN".to_string()
}

impl Default for ToolchainSection {
    fn default() -> Self {
        Self {
            program: default_toolchain_program(),
            install_args: default_install_args(),
            install_root_env: default_install_root_env(),
        }
    }
}

/// `[generator.<kind>]` section; every field falls back to the built-in
/// default for that kind.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratorSection {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default)]
    pub output_suffix: Option<String>,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub args: Option<Vec<String>>,
    #[serde(default)]
    pub install_ref: Option<String>,
}

impl GeneratorSection {
    /// Merge onto the defaults for `kind`; `None` when disabled.
    pub fn apply(&self, kind: GeneratorKind) -> Option<GeneratorSpec> {
        if self.enabled == Some(false) {
            return None;
        }
        let mut spec = GeneratorSpec::default_for(kind);
        if let Some(ref suffix) = self.suffix {
            spec.suffix = suffix.clone();
        }
        if let Some(ref output_suffix) = self.output_suffix {
            spec.output_suffix = output_suffix.clone();
        }
        if let Some(ref program) = self.program {
            spec.program = program.clone();
        }
        if let Some(ref args) = self.args {
            spec.args = args.clone();
        }
        if let Some(ref install_ref) = self.install_ref {
            spec.install_ref = install_ref.clone();
        }
        Some(spec)
    }
}

/// Validated configuration used by the rest of the crate.
///
/// Built from a [`RawConfigFile`] via `TryFrom` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub root: PathBuf,
    pub install_root: Option<PathBuf>,
    pub build_tags: Option<String>,
    pub manifest: PathBuf,
    pub source_patterns: Vec<String>,
    pub sources: GlobSet,
    pub module_prefix: Option<String>,
    pub toolchain: ToolchainSection,
    /// Generator table, in kind order.
    pub generators: Vec<GeneratorSpec>,
}

impl ConfigFile {
    /// Absolute-or-root-relative path of the build-declaration file.
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.manifest)
    }

    /// Where `target`'s installed artifact lives (`<install_root>/<name>`), if
    /// the install root is known. Distinct targets never share an artifact.
    pub fn artifact_path(&self, target: &Target) -> Option<PathBuf> {
        self.install_root.as_ref().map(|root| root.join(&target.name))
    }

    pub fn generator(&self, kind: GeneratorKind) -> Option<&GeneratorSpec> {
        self.generators.iter().find(|g| g.kind == kind)
    }

    /// Build tags, if set and not blank.
    pub fn effective_build_tags(&self) -> Option<&str> {
        self.build_tags
            .as_deref()
            .map(str::trim)
            .filter(|tags| !tags.is_empty())
    }

    pub fn target(&self, name: &str) -> Target {
        Target::new(&self.root, name)
    }

    /// Replace the workspace root (used by the loader once the config path is
    /// known).
    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        self.root = root.as_ref().to_path_buf();
        self
    }
}
