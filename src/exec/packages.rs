// src/exec/packages.rs

//! Package-metadata introspection, treated as a black box by the engine.

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::build::Target;
use crate::errors::Result;
use crate::exec::backend::{run_checked, BoxFuture, CommandRunner, CommandSpec};

/// Questions the engine asks about a target's package.
pub trait PackageQuery: Send + Sync {
    /// Whether the target builds an executable (as opposed to a library).
    fn is_executable<'a>(
        &'a self,
        target: &'a Target,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<bool>>;

    /// In-module packages the target depends on, relative to the module
    /// prefix.
    fn dependencies<'a>(
        &'a self,
        target: &'a Target,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Vec<String>>>;
}

/// [`PackageQuery`] backed by `go list`.
pub struct GoPackageQuery {
    runner: Arc<dyn CommandRunner>,
    program: String,
    root: PathBuf,
    module_prefix: Option<String>,
}

impl GoPackageQuery {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        program: impl Into<String>,
        root: impl Into<PathBuf>,
        module_prefix: Option<String>,
    ) -> Self {
        Self {
            runner,
            program: program.into(),
            root: root.into(),
            module_prefix,
        }
    }

    fn list(&self, format: &str, target: &Target) -> CommandSpec {
        CommandSpec::new(&self.program)
            .args(["list", "-f", format])
            .arg(target.package_arg())
            .current_dir(&self.root)
    }
}

impl PackageQuery for GoPackageQuery {
    fn is_executable<'a>(
        &'a self,
        target: &'a Target,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            let spec = self.list("{{.Name}}", target);
            let out = run_checked(self.runner.as_ref(), &spec, cancel).await?;
            let executable = out.output.trim() == "main";
            debug!(target = %target.name, executable, "queried package kind");
            Ok(executable)
        })
    }

    fn dependencies<'a>(
        &'a self,
        target: &'a Target,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Vec<String>>> {
        Box::pin(async move {
            let spec = self.list("{{range .Deps}}{{.}}\n{{end}}", target);
            let out = run_checked(self.runner.as_ref(), &spec, cancel).await?;
            Ok(filter_module_deps(&out.output, self.module_prefix.as_deref()))
        })
    }
}

/// Keep dependency lines under `prefix` and strip it; without a prefix keep
/// every non-empty line.
pub fn filter_module_deps(listing: &str, prefix: Option<&str>) -> Vec<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match prefix {
            Some(prefix) => line.strip_prefix(prefix),
            None => Some(line),
        })
        .filter(|dep| !dep.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ask the toolchain where it installs binaries: `go env GOBIN`, falling back
/// to `$(go env GOPATH)/bin`. `Ok(None)` when neither is set.
pub async fn discover_install_root(
    runner: &dyn CommandRunner,
    program: &str,
    cancel: &CancellationToken,
) -> Result<Option<PathBuf>> {
    let gobin = run_checked(runner, &CommandSpec::new(program).args(["env", "GOBIN"]), cancel)
        .await?
        .output;
    let gobin = gobin.trim();
    if !gobin.is_empty() {
        return Ok(Some(PathBuf::from(gobin)));
    }

    let gopath = run_checked(runner, &CommandSpec::new(program).args(["env", "GOPATH"]), cancel)
        .await?
        .output;
    // GOPATH may be a list; binaries go to the first entry.
    match std::env::split_paths(gopath.trim()).find(|p| !p.as_os_str().is_empty()) {
        Some(first) => Ok(Some(first.join("bin"))),
        None => {
            warn!(program, "toolchain reports neither GOBIN nor GOPATH");
            Ok(None)
        }
    }
}
