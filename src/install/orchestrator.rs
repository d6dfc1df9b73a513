// src/install/orchestrator.rs

//! Install orchestration: regenerate (if needed), then compile/install (if
//! needed), then record the outcome.

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::build::{should_build, BuildContext, Target};
use crate::errors::{FreshbuildError, Result};
use crate::exec::{run_checked, CommandSpec};
use crate::generator::{generator_staleness, GeneratorSpec};
use crate::install::registry::InstallRegistry;

/// Per-call install switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallOptions {
    /// Compile/install even when the target looks up to date.
    pub force: bool,
    /// Treat every generator source as stale.
    pub force_regenerate: bool,
}

/// Drives generator and compiler invocations for targets.
///
/// Cheap to clone; clones share the registry.
#[derive(Clone)]
pub struct Installer {
    ctx: BuildContext,
    registry: Arc<InstallRegistry>,
}

impl Installer {
    pub fn new(ctx: BuildContext, registry: Arc<InstallRegistry>) -> Self {
        Self { ctx, registry }
    }

    pub fn context(&self) -> &BuildContext {
        &self.ctx
    }

    pub fn registry(&self) -> &Arc<InstallRegistry> {
        &self.registry
    }

    /// Bring `target` up to date. Returns whether the compiler ran.
    ///
    /// Running a generator always leads to a compile.
    ///
    /// Any failure (stat error, generator or compiler exit, cancellation) is
    /// returned as-is; a generator that ran before a failing compile leaves
    /// its output on disk, which the next attempt picks up.
    pub async fn install(
        &self,
        target: &Target,
        opts: InstallOptions,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        debug!(target = %target.name, ?opts, "checking target");

        let stale = generator_staleness(
            self.ctx.fs.as_ref(),
            &target.dir,
            &self.ctx.config.generators,
            opts.force_regenerate,
            cancel,
        )?;

        if let Some(kind) = stale {
            let spec = self.ctx.config.generator(kind).ok_or_else(|| {
                FreshbuildError::ConfigError(format!("no generator configured for kind {kind}"))
            })?;
            self.regenerate(target, spec, cancel).await?;
        }

        // Fresh generated code is not yet in the artifact, and may live in a
        // subdirectory the source comparison never looks at.
        let regenerated = stale.is_some();
        if !regenerated && !opts.force && !should_build(&self.ctx, target, cancel).await? {
            debug!(target = %target.name, "nothing to do");
            return Ok(false);
        }

        self.compile(target, cancel).await?;
        self.registry.record_installed(target.name.clone());
        info!(target = %target.name, "installed");
        Ok(true)
    }

    async fn regenerate(
        &self,
        target: &Target,
        spec: &GeneratorSpec,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let program = self.resolve_generator(spec, cancel).await?;
        let cmd = CommandSpec::new(program.to_string_lossy())
            .args(spec.args.iter().cloned())
            .current_dir(&target.dir);

        info!(target = %target.name, kind = %spec.kind, cmd = %cmd, "regenerating");
        run_checked(self.ctx.runner.as_ref(), &cmd, cancel).await?;
        Ok(())
    }

    async fn compile(&self, target: &Target, cancel: &CancellationToken) -> Result<()> {
        let config = &self.ctx.config;
        let mut cmd = CommandSpec::new(&config.toolchain.program)
            .args(config.toolchain.install_args.iter().cloned());
        if let Some(tags) = config.effective_build_tags() {
            cmd = cmd.arg(format!("-tags={tags}"));
        }
        cmd = self
            .with_install_root_env(cmd.arg(target.package_arg()))
            .current_dir(&config.root);

        info!(target = %target.name, cmd = %cmd, "compiling");
        run_checked(self.ctx.runner.as_ref(), &cmd, cancel).await?;
        Ok(())
    }

    /// Find the generator executable, installing it from its module
    /// reference when it is missing.
    async fn resolve_generator(
        &self,
        spec: &GeneratorSpec,
        cancel: &CancellationToken,
    ) -> Result<PathBuf> {
        if let Some(path) = self.locate(&spec.program) {
            return Ok(path);
        }

        info!(
            program = %spec.program,
            reference = %spec.install_ref,
            "generator not found; installing it"
        );
        let config = &self.ctx.config;
        let cmd = self
            .with_install_root_env(
                CommandSpec::new(&config.toolchain.program)
                    .arg("install")
                    .arg(&spec.install_ref),
            )
            .current_dir(&config.root);

        let out = self.ctx.runner.run(&cmd, cancel).await?;
        if !out.success {
            return Err(FreshbuildError::GeneratorUnavailable {
                program: spec.program.clone(),
                reference: spec.install_ref.clone(),
                output: out.output,
            });
        }

        self.locate(&spec.program)
            .ok_or_else(|| FreshbuildError::GeneratorUnavailable {
                program: spec.program.clone(),
                reference: spec.install_ref.clone(),
                output: format!(
                    "installation succeeded but `{}` is still not on PATH or in the install root\n{}",
                    spec.program, out.output
                ),
            })
    }

    /// `PATH` first, then the install root (where a self-install lands).
    fn locate(&self, program: &str) -> Option<PathBuf> {
        self.ctx.runner.lookup(program).or_else(|| {
            self.ctx
                .config
                .install_root
                .as_ref()
                .map(|root| root.join(program))
                .filter(|candidate| self.ctx.fs.is_file(candidate))
        })
    }

    fn with_install_root_env(&self, cmd: CommandSpec) -> CommandSpec {
        let config = &self.ctx.config;
        match config.install_root {
            Some(ref root) => cmd.env(
                config.toolchain.install_root_env.clone(),
                root.to_string_lossy().into_owned(),
            ),
            None => cmd,
        }
    }
}
