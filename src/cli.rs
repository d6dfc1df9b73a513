// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `freshbuild`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "freshbuild",
    version,
    about = "Regenerate and reinstall build targets only when their inputs changed.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `FRESHBUILD_CONFIG`, else `Freshbuild.toml` in the current
    /// working directory. A missing default file means built-in defaults.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FRESHBUILD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Regenerate and install the given targets where needed.
    Install {
        #[command(flatten)]
        targets: TargetArgs,

        /// Compile and install even if the target looks up to date.
        #[arg(long)]
        force: bool,

        /// Run the generators even if their output looks up to date.
        #[arg(long)]
        force_regenerate: bool,
    },

    /// Report what `install` would do, without running anything.
    Status {
        #[command(flatten)]
        targets: TargetArgs,
    },

    /// List the in-module packages a target depends on.
    Deps {
        #[arg(value_name = "TARGET")]
        target: String,
    },

    /// List the target links found in a directory.
    Targets {
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,
    },
}

/// Target selection shared by `install` and `status`.
#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Targets (directories relative to the workspace root).
    #[arg(value_name = "TARGET")]
    pub names: Vec<String>,

    /// Also take every entry of this directory as a target (`DIR/<entry>`).
    #[arg(long, value_name = "DIR")]
    pub all: Option<PathBuf>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_flags_parse() {
        let args = CliArgs::try_parse_from([
            "freshbuild",
            "install",
            "foo",
            "cmd/bar",
            "--force-regenerate",
            "--log-level",
            "debug",
        ])
        .unwrap();
        match args.command {
            Command::Install {
                targets,
                force,
                force_regenerate,
            } => {
                assert_eq!(targets.names, vec!["foo", "cmd/bar"]);
                assert!(targets.all.is_none());
                assert!(!force);
                assert!(force_regenerate);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    }
}
