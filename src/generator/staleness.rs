// src/generator/staleness.rs

//! Generator staleness detection.

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::errors::{FreshbuildError, Result};
use crate::fs::{EntryKind, FileSystem};
use crate::generator::{spec_for, GeneratorSpec};
use crate::probe::latest_mod_time;
use crate::types::{GeneratorKind, Timestamp};

/// Walk `root` and report the first generator kind whose source is newer
/// than its generated companion (or the first source found at all when
/// `force_regenerate` is set).
///
/// - Traversal is pre-order with children in lexical order, so the reported
///   kind is reproducible. It stops at the first offender: when both kinds
///   are stale only the one encountered first is returned.
/// - `Ok(None)` means no regeneration is required.
/// - `cancel` is checked on every visited entry; a fired token yields
///   [`FreshbuildError::Cancelled`].
/// - A generator source that cannot be stat'ed aborts the scan with
///   [`FreshbuildError::Probe`]. Unreadable directories are logged and skipped.
pub fn generator_staleness(
    fs: &dyn FileSystem,
    root: &Path,
    generators: &[GeneratorSpec],
    force_regenerate: bool,
    cancel: &CancellationToken,
) -> Result<Option<GeneratorKind>> {
    let scan = Scan {
        fs,
        generators,
        force_regenerate,
        cancel,
    };
    let found = scan.walk(root)?;
    match found {
        Some(kind) => debug!(root = ?root, %kind, force_regenerate, "generator output is stale"),
        None => trace!(root = ?root, "generated code is up to date"),
    }
    Ok(found)
}

struct Scan<'a> {
    fs: &'a dyn FileSystem,
    generators: &'a [GeneratorSpec],
    force_regenerate: bool,
    cancel: &'a CancellationToken,
}

impl Scan<'_> {
    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(FreshbuildError::Cancelled);
        }
        Ok(())
    }

    fn walk(&self, dir: &Path) -> Result<Option<GeneratorKind>> {
        self.check_cancelled()?;

        let entries = match self.fs.read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(dir = ?dir, error = %err, "skipping unreadable directory");
                return Ok(None);
            }
        };

        for entry in entries {
            self.check_cancelled()?;

            let found = match entry.kind {
                EntryKind::Dir => self.walk(&entry.path)?,
                EntryKind::File => self.inspect(&entry.path)?,
                EntryKind::Other => None,
            };
            if found.is_some() {
                return Ok(found);
            }
        }

        Ok(None)
    }

    fn inspect(&self, path: &Path) -> Result<Option<GeneratorKind>> {
        let Some(spec) = spec_for(self.generators, path) else {
            return Ok(None);
        };

        let source_time = self
            .fs
            .modified(path)
            .map(Timestamp::from)
            .map_err(|source| FreshbuildError::Probe {
                path: path.to_path_buf(),
                source,
            })?;

        if self.force_regenerate {
            return Ok(Some(spec.kind));
        }

        let output = spec.output_for(path);
        let output_time = latest_mod_time(self.fs, [&output]);
        trace!(
            source = ?path,
            %source_time,
            %output_time,
            kind = %spec.kind,
            "compared generator source with its output"
        );

        Ok((source_time > output_time).then_some(spec.kind))
    }
}
