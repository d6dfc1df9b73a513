// src/config/validate.rs

use std::collections::HashSet;
use std::path::PathBuf;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{FreshbuildError, Result};
use crate::generator::GeneratorSpec;
use crate::types::GeneratorKind;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = FreshbuildError;

    fn try_from(raw: RawConfigFile) -> Result<Self> {
        let generators = resolve_generators(&raw);
        validate_generators(&generators)?;
        validate_toolchain(&raw)?;

        if raw.config.manifest.as_os_str().is_empty() {
            return Err(FreshbuildError::ConfigError(
                "[config].manifest must not be empty".to_string(),
            ));
        }

        let sources = compile_sources(&raw.config.sources)?;

        Ok(ConfigFile {
            root: raw.config.root.unwrap_or_else(|| PathBuf::from(".")),
            install_root: raw.config.install_root,
            build_tags: raw.config.build_tags,
            manifest: raw.config.manifest,
            source_patterns: raw.config.sources,
            sources,
            module_prefix: raw.config.module_prefix,
            toolchain: raw.toolchain,
            generators,
        })
    }
}

fn resolve_generators(raw: &RawConfigFile) -> Vec<GeneratorSpec> {
    GeneratorKind::ALL
        .into_iter()
        .filter_map(|kind| match raw.generator.get(&kind) {
            Some(section) => section.apply(kind),
            None => Some(GeneratorSpec::default_for(kind)),
        })
        .collect()
}

fn validate_generators(generators: &[GeneratorSpec]) -> Result<()> {
    let mut seen = HashSet::new();
    for g in generators {
        if g.suffix.len() < 2 || !g.suffix.starts_with('.') {
            return Err(FreshbuildError::ConfigError(format!(
                "[generator.{}].suffix must start with '.' and name an extension (got {:?})",
                g.kind, g.suffix
            )));
        }
        if g.output_suffix.is_empty() {
            return Err(FreshbuildError::ConfigError(format!(
                "[generator.{}].output_suffix must not be empty",
                g.kind
            )));
        }
        if g.program.trim().is_empty() {
            return Err(FreshbuildError::ConfigError(format!(
                "[generator.{}].program must not be empty",
                g.kind
            )));
        }
        if !seen.insert(g.suffix.as_str()) {
            return Err(FreshbuildError::ConfigError(format!(
                "generator suffix {:?} is used by more than one generator",
                g.suffix
            )));
        }
    }
    Ok(())
}

fn validate_toolchain(raw: &RawConfigFile) -> Result<()> {
    if raw.toolchain.program.trim().is_empty() {
        return Err(FreshbuildError::ConfigError(
            "[toolchain].program must not be empty".to_string(),
        ));
    }
    if raw.toolchain.install_root_env.trim().is_empty() {
        return Err(FreshbuildError::ConfigError(
            "[toolchain].install_root_env must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn compile_sources(patterns: &[String]) -> Result<GlobSet> {
    if patterns.is_empty() {
        return Err(FreshbuildError::ConfigError(
            "[config].sources must contain at least one pattern".to_string(),
        ));
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            FreshbuildError::ConfigError(format!("invalid source pattern {pattern:?}: {e}"))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| FreshbuildError::ConfigError(format!("building source patterns: {e}")))
}
