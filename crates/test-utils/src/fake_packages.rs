use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use freshbuild::build::Target;
use freshbuild::errors::{FreshbuildError, Result};
use freshbuild::exec::{BoxFuture, PackageQuery};
use tokio_util::sync::CancellationToken;

/// A fake `PackageQuery` answering from in-memory tables.
///
/// Targets are libraries unless marked executable.
#[derive(Default)]
pub struct FakePackages {
    executables: HashSet<String>,
    broken: HashSet<String>,
    deps: HashMap<String, Vec<String>>,
    queried: Mutex<Vec<String>>,
}

impl FakePackages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn executable(mut self, name: &str) -> Self {
        self.executables.insert(name.to_string());
        self
    }

    /// Queries about `name` fail.
    pub fn broken(mut self, name: &str) -> Self {
        self.broken.insert(name.to_string());
        self
    }

    pub fn with_deps(mut self, name: &str, deps: &[&str]) -> Self {
        self.deps
            .insert(name.to_string(), deps.iter().map(|d| d.to_string()).collect());
        self
    }

    /// Names passed to `is_executable`, in order.
    pub fn queried(&self) -> Vec<String> {
        self.queried.lock().unwrap().clone()
    }

    fn check(&self, target: &Target) -> Result<()> {
        if self.broken.contains(&target.name) {
            return Err(FreshbuildError::CommandFailed {
                command: format!("\"go\" \"list\" \"{}\"", target.package_arg()),
                code: Some(1),
                output: "no Go files".to_string(),
            });
        }
        Ok(())
    }
}

impl PackageQuery for FakePackages {
    fn is_executable<'a>(
        &'a self,
        target: &'a Target,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            if cancel.is_cancelled() {
                return Err(FreshbuildError::Cancelled);
            }
            self.queried.lock().unwrap().push(target.name.clone());
            self.check(target)?;
            Ok(self.executables.contains(&target.name))
        })
    }

    fn dependencies<'a>(
        &'a self,
        target: &'a Target,
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Vec<String>>> {
        Box::pin(async move {
            self.check(target)?;
            Ok(self.deps.get(&target.name).cloned().unwrap_or_default())
        })
    }
}
