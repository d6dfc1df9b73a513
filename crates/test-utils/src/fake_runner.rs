use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

use freshbuild::errors::{FreshbuildError, Result};
use freshbuild::exec::{BoxFuture, CommandOutput, CommandRunner, CommandSpec};
use tokio_util::sync::CancellationToken;

type Effect = Box<dyn Fn(&CommandSpec) + Send + Sync>;

/// A fake `CommandRunner` that:
/// - records every invocation
/// - answers with canned outputs (success by default)
/// - can run side effects (e.g. touch generated files on a mock filesystem)
/// - can block until cancelled, to exercise cancellation paths.
///
/// Commands are matched by a key against `"<program-name> <args...>"`: the
/// key matches when it equals that line or is a prefix of it ending at an
/// argument boundary (`"go install"` matches `go install ./foo`).
#[derive(Default)]
pub struct FakeRunner {
    calls: Mutex<Vec<CommandSpec>>,
    on_path: Mutex<HashSet<String>>,
    responses: Mutex<Vec<(String, CommandOutput)>>,
    effects: Mutex<Vec<(String, Effect)>>,
    installs: Mutex<Vec<(String, String)>>,
    hanging: Mutex<Vec<String>>,
}

/// `"<program-name> <args...>"` for a spec.
pub fn command_line(spec: &CommandSpec) -> String {
    std::iter::once(spec.program_name())
        .chain(spec.args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

fn matches(key: &str, line: &str) -> bool {
    line == key || line.starts_with(&format!("{key} "))
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `program` resolvable as `/usr/bin/<program>`.
    pub fn with_on_path(self, program: &str) -> Self {
        self.on_path.lock().unwrap().insert(program.to_string());
        self
    }

    /// Answer commands matching `key` with `output` (first match wins).
    pub fn respond(self, key: &str, output: CommandOutput) -> Self {
        self.responses.lock().unwrap().push((key.to_string(), output));
        self
    }

    /// Commands matching `key` exit with `code` and print `output`.
    pub fn fail(self, key: &str, code: i32, output: &str) -> Self {
        self.respond(key, CommandOutput::failure(code, output))
    }

    /// Run `effect` whenever a command matching `key` succeeds.
    pub fn on_run<F>(self, key: &str, effect: F) -> Self
    where
        F: Fn(&CommandSpec) + Send + Sync + 'static,
    {
        self.effects
            .lock()
            .unwrap()
            .push((key.to_string(), Box::new(effect)));
        self
    }

    /// A successful command matching `key` puts `program` on the path.
    pub fn installs(self, key: &str, program: &str) -> Self {
        self.installs
            .lock()
            .unwrap()
            .push((key.to_string(), program.to_string()));
        self
    }

    /// Commands matching `key` never finish on their own.
    pub fn hang(self, key: &str) -> Self {
        self.hanging.lock().unwrap().push(key.to_string());
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// Command lines of every invocation, in order.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(command_line).collect()
    }

    pub fn ran(&self, key: &str) -> bool {
        self.command_lines().iter().any(|line| matches(key, line))
    }

    fn respond_to(&self, spec: &CommandSpec) -> CommandOutput {
        let line = command_line(spec);

        let response = self
            .responses
            .lock()
            .unwrap()
            .iter()
            .find(|(key, _)| matches(key, &line))
            .map(|(_, out)| out.clone())
            .unwrap_or_else(|| CommandOutput::success(""));

        if response.success {
            for (key, effect) in self.effects.lock().unwrap().iter() {
                if matches(key, &line) {
                    effect(spec);
                }
            }
            let installed: Vec<String> = self
                .installs
                .lock()
                .unwrap()
                .iter()
                .filter(|(key, _)| matches(key, &line))
                .map(|(_, program)| program.clone())
                .collect();
            self.on_path.lock().unwrap().extend(installed);
        }

        response
    }
}

impl CommandRunner for FakeRunner {
    fn run<'a>(
        &'a self,
        spec: &'a CommandSpec,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<CommandOutput>> {
        Box::pin(async move {
            if cancel.is_cancelled() {
                return Err(FreshbuildError::Cancelled);
            }
            self.calls.lock().unwrap().push(spec.clone());

            let line = command_line(spec);
            let hangs = self
                .hanging
                .lock()
                .unwrap()
                .iter()
                .any(|key| matches(key, &line));
            if hangs {
                cancel.cancelled().await;
                return Err(FreshbuildError::Cancelled);
            }

            Ok(self.respond_to(spec))
        })
    }

    fn lookup(&self, program: &str) -> Option<PathBuf> {
        self.on_path
            .lock()
            .unwrap()
            .contains(program)
            .then(|| PathBuf::from("/usr/bin").join(program))
    }
}
