use std::path::PathBuf;

use freshbuild::config::{ConfigFile, GeneratorSection, RawConfigFile};
use freshbuild::types::GeneratorKind;

/// Builder for `ConfigFile` to simplify test setup.
///
/// Defaults: root `.`, install root `/gobin`, manifest `go.mod`, sources
/// `*.go`, both generators enabled.
pub struct ConfigBuilder {
    config: RawConfigFile,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.config.root = Some(PathBuf::from("."));
        config.config.install_root = Some(PathBuf::from("/gobin"));
        Self { config }
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.config.root = Some(root.into());
        self
    }

    pub fn install_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.config.install_root = Some(root.into());
        self
    }

    pub fn no_install_root(mut self) -> Self {
        self.config.config.install_root = None;
        self
    }

    pub fn build_tags(mut self, tags: &str) -> Self {
        self.config.config.build_tags = Some(tags.to_string());
        self
    }

    pub fn sources(mut self, patterns: &[&str]) -> Self {
        self.config.config.sources = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn generator(mut self, kind: GeneratorKind, section: GeneratorSection) -> Self {
        self.config.generator.insert(kind, section);
        self
    }

    pub fn disable_generator(self, kind: GeneratorKind) -> Self {
        self.generator(
            kind,
            GeneratorSection {
                enabled: Some(false),
                ..GeneratorSection::default()
            },
        )
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
