// src/generator/mod.rs

//! Code generators that must run before compilation.
//!
//! Both generator families share one code path; what differs between them is
//! captured by a [`GeneratorSpec`] table entry:
//!
//! | kind     | suffix   | program | args         |
//! |----------|----------|---------|--------------|
//! | `legacy` | `.qtpl`  | `qtc`   |              |
//! | `modern` | `.templ` | `templ` | `generate`   |
//!
//! - [`staleness`] walks a target tree and reports the first stale kind.

pub mod staleness;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::types::GeneratorKind;

pub use staleness::generator_staleness;

/// One row of the generator table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorSpec {
    pub kind: GeneratorKind,
    /// File suffix of generator sources, including the dot (e.g. `.qtpl`).
    pub suffix: String,
    /// Appended to the full source path to name the generated file.
    pub output_suffix: String,
    /// Executable name, resolved on `PATH`.
    pub program: String,
    pub args: Vec<String>,
    /// Module reference used to self-install `program` when it is missing.
    pub install_ref: String,
}

impl GeneratorSpec {
    /// Built-in defaults for a kind.
    pub fn default_for(kind: GeneratorKind) -> Self {
        match kind {
            GeneratorKind::Legacy => GeneratorSpec {
                kind,
                suffix: ".qtpl".to_string(),
                output_suffix: ".go".to_string(),
                program: "qtc".to_string(),
                args: Vec::new(),
                install_ref: "github.com/valyala/quicktemplate/qtc@latest".to_string(),
            },
            GeneratorKind::Modern => GeneratorSpec {
                kind,
                suffix: ".templ".to_string(),
                output_suffix: ".go".to_string(),
                program: "templ".to_string(),
                args: vec!["generate".to_string()],
                install_ref: "github.com/a-h/templ/cmd/templ@latest".to_string(),
            },
        }
    }

    /// The default table, in kind order.
    pub fn defaults() -> Vec<Self> {
        GeneratorKind::ALL.into_iter().map(Self::default_for).collect()
    }

    /// Whether `path` names a source file of this generator.
    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.len() > self.suffix.len() && name.ends_with(&self.suffix))
    }

    /// Companion generated file for `source`: `<source><output_suffix>`.
    pub fn output_for(&self, source: &Path) -> PathBuf {
        let mut name = OsString::from(source.as_os_str());
        name.push(&self.output_suffix);
        PathBuf::from(name)
    }
}

/// First spec in `generators` whose suffix matches `path`.
pub fn spec_for<'a>(generators: &'a [GeneratorSpec], path: &Path) -> Option<&'a GeneratorSpec> {
    generators.iter().find(|g| g.matches(path))
}
