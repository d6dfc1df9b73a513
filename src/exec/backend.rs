// src/exec/backend.rs

//! Pluggable subprocess backend.
//!
//! The engine never spawns processes directly; it hands a [`CommandSpec`] to a
//! [`CommandRunner`]. Production code uses [`super::ProcessRunner`]; tests can
//! provide their own implementation that records invocations and simulates
//! the effect of a generator or compiler on a mock filesystem.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::errors::{FreshbuildError, Result};

/// Boxed future returned by the dyn-compatible traits in this module.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A fully resolved subprocess invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory; inherit ours when `None`.
    pub dir: Option<PathBuf>,
    /// Extra environment variables.
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            dir: None,
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// File name of the program, for matching in logs and tests.
    pub fn program_name(&self) -> &str {
        Path::new(&self.program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.program)
    }
}

/// Quoted argv, e.g. `"go" "install" "./foo"`.
impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.program)?;
        for arg in &self.args {
            write!(f, " {:?}", arg)?;
        }
        Ok(())
    }
}

/// Exit status plus combined stdout/stderr of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub output: String,
}

impl CommandOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            output: output.into(),
        }
    }

    pub fn failure(code: i32, output: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            output: output.into(),
        }
    }
}

/// Trait abstracting how subprocesses are run.
pub trait CommandRunner: Send + Sync {
    /// Run `spec` to completion, capturing combined output.
    ///
    /// Must return [`FreshbuildError::Cancelled`] promptly (killing the
    /// process) when `cancel` fires. A non-zero exit is **not** an error at
    /// this level; see [`run_checked`].
    fn run<'a>(
        &'a self,
        spec: &'a CommandSpec,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<CommandOutput>>;

    /// Resolve `program` on the execution path.
    fn lookup(&self, program: &str) -> Option<PathBuf>;
}

/// Run `spec` and turn a non-zero exit into [`FreshbuildError::CommandFailed`]
/// carrying the captured output.
pub async fn run_checked(
    runner: &dyn CommandRunner,
    spec: &CommandSpec,
    cancel: &CancellationToken,
) -> Result<CommandOutput> {
    let out = runner.run(spec, cancel).await?;
    if out.success {
        Ok(out)
    } else {
        Err(FreshbuildError::CommandFailed {
            command: spec.to_string(),
            code: out.code,
            output: out.output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_every_argument() {
        let spec = CommandSpec::new("go")
            .args(["install", "-ldflags=-s -w"])
            .arg("./foo");
        assert_eq!(spec.to_string(), r#""go" "install" "-ldflags=-s -w" "./foo""#);
    }

    #[test]
    fn program_name_strips_directories() {
        assert_eq!(CommandSpec::new("/usr/local/bin/qtc").program_name(), "qtc");
        assert_eq!(CommandSpec::new("templ").program_name(), "templ");
    }
}
