// src/errors.rs

//! Crate-wide error type.
//!
//! Library code returns [`Result`]; the binary layer (`main.rs`, [`crate::run`])
//! works with `anyhow` and converts at the edge.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FreshbuildError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// The caller's cancellation token fired. Never a "clean" negative result.
    #[error("operation cancelled")]
    Cancelled,

    /// A generator source listed by the directory walk could not be stat'ed.
    #[error("cannot stat generator source {path:?}: {source}")]
    Probe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} failed with {}:\n{output}", describe_exit(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        output: String,
    },

    #[error("generator `{program}` is not available (tried installing {reference}):\n{output}")]
    GeneratorUnavailable {
        program: String,
        reference: String,
        output: String,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FreshbuildError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FreshbuildError::Cancelled)
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (killed by signal)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, FreshbuildError>;
