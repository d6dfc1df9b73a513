// src/build/necessity.rs

//! Build-necessity evaluation: a make-style rule over three timestamp
//! anchors (generated code, the global manifest, the target's own sources).

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::build::{BuildContext, Target};
use crate::errors::{FreshbuildError, Result};
use crate::generator::generator_staleness;
use crate::probe::{latest_mod_time, source_files};
use crate::types::Timestamp;

/// Why a target does or does not need to be (re)built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildReason {
    /// Generated code is stale (or could not be checked).
    StaleGenerated,
    /// Executable with nothing installed yet.
    NotInstalled,
    /// The manifest changed after the artifact was installed.
    ManifestNewer,
    /// A source file changed after the artifact was installed.
    SourcesNewer,
    /// Library with nothing installed: there is no artifact to compare against.
    LibraryWithoutArtifact,
    UpToDate,
}

impl BuildReason {
    pub fn requires_build(&self) -> bool {
        matches!(
            self,
            BuildReason::StaleGenerated
                | BuildReason::NotInstalled
                | BuildReason::ManifestNewer
                | BuildReason::SourcesNewer
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildReason::StaleGenerated => "generated code is stale",
            BuildReason::NotInstalled => "executable is not installed",
            BuildReason::ManifestNewer => "manifest is newer than the installed artifact",
            BuildReason::SourcesNewer => "sources are newer than the installed artifact",
            BuildReason::LibraryWithoutArtifact => "library without installed artifact",
            BuildReason::UpToDate => "up to date",
        }
    }
}

/// Whether `target` must be compiled/installed.
///
/// Only cancellation is reported as an error; any other failure along the way
/// resolves to "build", since skipping a needed build is the worse mistake.
pub async fn should_build(
    ctx: &BuildContext,
    target: &Target,
    cancel: &CancellationToken,
) -> Result<bool> {
    Ok(build_reason(ctx, target, cancel).await?.requires_build())
}

/// Like [`should_build`] but says which rule decided.
pub async fn build_reason(
    ctx: &BuildContext,
    target: &Target,
    cancel: &CancellationToken,
) -> Result<BuildReason> {
    let fs = ctx.fs.as_ref();
    let config = ctx.config.as_ref();

    match generator_staleness(fs, &target.dir, &config.generators, false, cancel) {
        Ok(None) => {}
        Ok(Some(kind)) => {
            debug!(target = %target.name, %kind, "build required: generated code is stale");
            return Ok(BuildReason::StaleGenerated);
        }
        Err(FreshbuildError::Cancelled) => return Err(FreshbuildError::Cancelled),
        Err(err) => {
            warn!(target = %target.name, error = %err, "generator check failed; assuming rebuild");
            return Ok(BuildReason::StaleGenerated);
        }
    }

    let dest_time = config
        .artifact_path(target)
        .map(|path| latest_mod_time(fs, [path]))
        .unwrap_or(Timestamp::MISSING);

    if dest_time.is_missing() {
        let executable = match ctx.packages.is_executable(target, cancel).await {
            Ok(executable) => executable,
            Err(FreshbuildError::Cancelled) => return Err(FreshbuildError::Cancelled),
            Err(err) => {
                warn!(
                    target = %target.name,
                    error = %err,
                    "cannot tell executable from library; assuming executable"
                );
                true
            }
        };
        let reason = if executable {
            BuildReason::NotInstalled
        } else {
            BuildReason::LibraryWithoutArtifact
        };
        debug!(target = %target.name, reason = reason.as_str(), "no installed artifact");
        return Ok(reason);
    }

    let manifest_time = latest_mod_time(fs, [config.manifest_path()]);
    if manifest_time > dest_time {
        debug!(
            target = %target.name,
            %manifest_time,
            %dest_time,
            "build required: manifest is newer than artifact"
        );
        return Ok(BuildReason::ManifestNewer);
    }

    let sources = source_files(fs, &target.dir, &config.sources);
    let sources_time = latest_mod_time(fs, &sources);
    if sources_time > dest_time {
        debug!(
            target = %target.name,
            %sources_time,
            %dest_time,
            "build required: sources are newer than artifact"
        );
        return Ok(BuildReason::SourcesNewer);
    }

    debug!(target = %target.name, "up to date");
    Ok(BuildReason::UpToDate)
}
