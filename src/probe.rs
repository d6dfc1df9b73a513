// src/probe.rs

//! Timestamp probing.
//!
//! This is the one place where filesystem errors are deliberately swallowed:
//! callers only ask about files they expect to exist, and a missing one simply
//! has not been built yet.

use std::path::{Path, PathBuf};

use globset::GlobSet;
use tracing::{debug, trace};

use crate::fs::{EntryKind, FileSystem};
use crate::types::Timestamp;

/// Latest modification time among `paths`.
///
/// Paths that cannot be stat'ed (missing, permission denied, ...) are skipped.
/// Returns [`Timestamp::MISSING`] when none of them could be stat'ed.
pub fn latest_mod_time<I, P>(fs: &dyn FileSystem, paths: I) -> Timestamp
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    paths
        .into_iter()
        .filter_map(|p| match fs.modified(p.as_ref()) {
            Ok(time) => Some(Timestamp::from(time)),
            Err(err) => {
                trace!(path = ?p.as_ref(), error = %err, "skipping unreadable path");
                None
            }
        })
        .max()
        .unwrap_or(Timestamp::MISSING)
}

/// Regular files directly inside `dir` whose file name matches `patterns`,
/// in lexical order.
///
/// An unreadable or missing directory yields no files.
pub fn source_files(fs: &dyn FileSystem, dir: &Path, patterns: &GlobSet) -> Vec<PathBuf> {
    let entries = match fs.read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(dir = ?dir, error = %err, "cannot list source directory");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .filter(|e| e.kind == EntryKind::File)
        .filter(|e| e.file_name().is_some_and(|name| patterns.is_match(name)))
        .map(|e| e.path)
        .collect()
}
