// src/exec/process.rs

//! Real subprocess runner on top of `tokio::process`.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::{FreshbuildError, Result};
use crate::exec::backend::{BoxFuture, CommandOutput, CommandRunner, CommandSpec};

/// Runs commands as child processes.
///
/// stdout and stderr are read line by line into one buffer in arrival order
/// (the "combined output"), and echoed at debug level as they arrive.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run<'a>(
        &'a self,
        spec: &'a CommandSpec,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<CommandOutput>> {
        Box::pin(async move {
            if cancel.is_cancelled() {
                return Err(FreshbuildError::Cancelled);
            }

            info!(cmd = %spec, dir = ?spec.dir, "running command");

            let mut cmd = Command::new(&spec.program);
            cmd.args(&spec.args)
                .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);
            if let Some(ref dir) = spec.dir {
                cmd.current_dir(dir);
            }

            let mut child = cmd
                .spawn()
                .with_context(|| format!("spawning {spec}"))?;

            let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
            if let Some(stdout) = child.stdout.take() {
                forward_lines(stdout, "stdout", spec.program_name().to_string(), line_tx.clone());
            }
            if let Some(stderr) = child.stderr.take() {
                forward_lines(stderr, "stderr", spec.program_name().to_string(), line_tx.clone());
            }
            drop(line_tx);

            let status = tokio::select! {
                status_res = child.wait() => {
                    status_res.with_context(|| format!("waiting for {spec}"))?
                }

                _ = cancel.cancelled() => {
                    info!(cmd = %spec, "cancellation requested; killing process");
                    if let Err(e) = child.kill().await {
                        warn!(cmd = %spec, error = %e, "failed to kill child process on cancellation");
                    }
                    return Err(FreshbuildError::Cancelled);
                }
            };

            let mut output = String::new();
            while let Some(line) = line_rx.recv().await {
                output.push_str(&line);
                output.push('\n');
            }

            debug!(
                cmd = %spec,
                exit_code = ?status.code(),
                success = status.success(),
                "command exited"
            );

            Ok(CommandOutput {
                success: status.success(),
                code: status.code(),
                output,
            })
        })
    }

    fn lookup(&self, program: &str) -> Option<PathBuf> {
        let candidate = Path::new(program);
        if candidate.components().count() > 1 {
            return candidate.is_file().then(|| candidate.to_path_buf());
        }
        let path = std::env::var_os("PATH")?;
        std::env::split_paths(&path)
            .map(|dir| dir.join(program))
            .find(|p| p.is_file())
    }
}

/// Consume `reader` line by line, logging each line and forwarding it to the
/// collector. Ends at EOF or on a read error.
///
/// Lines are split on raw bytes; invalid UTF-8 is replaced rather than
/// ending the stream, so nothing after a bad byte is lost.
fn forward_lines<R>(
    reader: R,
    stream: &'static str,
    program: String,
    tx: mpsc::UnboundedSender<String>,
) where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end_matches(['\n', '\r']).to_string();
                    debug!(program = %program, stream, "{}", line);
                    // Keep draining even if the collector is gone, so the
                    // child never sees a closed pipe.
                    let _ = tx.send(line);
                }
                Err(err) => {
                    warn!(program = %program, stream, error = %err, "reading process output failed");
                    break;
                }
            }
        }
    });
}
