// src/lib.rs

pub mod build;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod generator;
pub mod install;
pub mod logging;
pub mod probe;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::build::{build_reason, list_targets, BuildContext, Target};
use crate::cli::{CliArgs, Command, TargetArgs};
use crate::config::{
    default_config_path, load_and_validate, load_or_default, ConfigFile, EnvOverrides,
};
use crate::exec::{discover_install_root, CommandRunner, GoPackageQuery, ProcessRunner};
use crate::fs::{FileSystem, RealFileSystem};
use crate::generator::generator_staleness;
use crate::install::{InstallOptions, InstallRegistry, Installer};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + environment overrides
/// - install-root discovery
/// - the real filesystem / process runner / package query
/// - Ctrl-C handling (cancels every in-flight target)
pub async fn run(args: CliArgs) -> Result<()> {
    let config = load_config(&args)?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("interrupted; cancelling");
            cancel.cancel();
        });
    }

    let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner::new());
    let config = with_install_root(config, runner.as_ref(), &cancel).await;
    let packages = Arc::new(GoPackageQuery::new(
        Arc::clone(&runner),
        config.toolchain.program.clone(),
        config.root.clone(),
        config.module_prefix.clone(),
    ));
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let ctx = BuildContext::new(fs, runner, packages, config);

    match args.command {
        Command::Install {
            targets,
            force,
            force_regenerate,
        } => {
            let targets = resolve_targets(&ctx, &targets)?;
            let installer = Installer::new(ctx, Arc::new(InstallRegistry::new()));
            let opts = InstallOptions {
                force,
                force_regenerate,
            };
            install_all(&installer, targets, opts, &cancel).await
        }
        Command::Status { targets } => {
            let targets = resolve_targets(&ctx, &targets)?;
            print_status(&ctx, &targets, &cancel).await
        }
        Command::Deps { target } => {
            let target = ctx.target(&target);
            for dep in ctx.packages.dependencies(&target, &cancel).await? {
                println!("{dep}");
            }
            Ok(())
        }
        Command::Targets { dir } => {
            for name in list_targets(ctx.fs.as_ref(), &ctx.config.root.join(dir))? {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn load_config(args: &CliArgs) -> Result<ConfigFile> {
    let config = match args.config {
        // An explicitly named config file must exist.
        Some(ref path) => load_and_validate(path)?,
        None => load_or_default(default_config_path())?,
    };
    Ok(EnvOverrides::from_env().apply(config))
}

/// Fill in the install root from the toolchain when neither the config nor
/// the environment named one.
async fn with_install_root(
    mut config: ConfigFile,
    runner: &dyn CommandRunner,
    cancel: &CancellationToken,
) -> ConfigFile {
    if config.install_root.is_none() {
        match discover_install_root(runner, &config.toolchain.program, cancel).await {
            Ok(root) => config.install_root = root,
            Err(err) => error!(error = %err, "cannot determine install root; treating artifacts as missing"),
        }
    }
    debug!(install_root = ?config.install_root, root = ?config.root, "resolved workspace");
    config
}

fn resolve_targets(ctx: &BuildContext, args: &TargetArgs) -> Result<Vec<Target>> {
    let mut names = args.names.clone();
    if let Some(ref dir) = args.all {
        let listed = list_targets(ctx.fs.as_ref(), &ctx.config.root.join(dir))?;
        names.extend(listed.into_iter().map(|name| join_name(dir, &name)));
    }
    if names.is_empty() {
        return Err(anyhow!("no targets given (pass target names or --all DIR)"));
    }
    names.sort();
    names.dedup();
    Ok(names.iter().map(|name| ctx.target(name)).collect())
}

fn join_name(dir: &Path, name: &str) -> String {
    dir.join(name).to_string_lossy().into_owned()
}

/// Install every target concurrently; report failures verbatim, then the
/// installed set.
async fn install_all(
    installer: &Installer,
    targets: Vec<Target>,
    opts: InstallOptions,
    cancel: &CancellationToken,
) -> Result<()> {
    let total = targets.len();
    let mut set = JoinSet::new();
    for target in targets {
        let installer = installer.clone();
        let cancel = cancel.clone();
        set.spawn(async move {
            let res = installer.install(&target, opts, &cancel).await;
            (target, res)
        });
    }

    let mut failed = 0usize;
    while let Some(joined) = set.join_next().await {
        let (target, res) = joined?;
        match res {
            Ok(true) => {}
            Ok(false) => debug!(target = %target.name, "already up to date"),
            Err(err) => {
                failed += 1;
                eprintln!("{}: {err}", target.name);
            }
        }
    }

    let mut installed: Vec<String> = installer.registry().list_installed().into_iter().collect();
    installed.sort();
    for name in &installed {
        println!("installed {name}");
    }

    if failed > 0 {
        return Err(anyhow!("{failed} of {total} targets failed"));
    }
    Ok(())
}

async fn print_status(
    ctx: &BuildContext,
    targets: &[Target],
    cancel: &CancellationToken,
) -> Result<()> {
    for target in targets {
        let generated = match generator_staleness(
            ctx.fs.as_ref(),
            &target.dir,
            &ctx.config.generators,
            false,
            cancel,
        ) {
            Ok(Some(kind)) => format!("regenerate ({kind})"),
            Ok(None) => "generated code fresh".to_string(),
            Err(err) if err.is_cancelled() => return Err(err.into()),
            Err(err) => format!("generator check failed: {err}"),
        };
        let reason = build_reason(ctx, target, cancel).await?;
        let verdict = if reason.requires_build() { "build" } else { "skip" };
        println!(
            "{}: {generated}; {verdict} ({})",
            target.name,
            reason.as_str()
        );
    }
    Ok(())
}
