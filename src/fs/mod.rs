// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::warn;

pub mod mock;

/// What a directory entry is, as reported by the listing itself
/// (symlinks are not followed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Other,
}

/// A single directory entry: full path plus kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// Abstract filesystem interface.
///
/// Everything the engine learns about the disk goes through this trait, so
/// decisions can be tested against a [`mock::MockFileSystem`] with explicit
/// modification times.
pub trait FileSystem: Send + Sync + Debug {
    /// Modification time of `path` (follows symlinks, like `stat`).
    fn modified(&self, path: &Path) -> io::Result<SystemTime>;

    /// Entries of a directory, sorted lexically by file name.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    fn is_file(&self, path: &Path) -> bool;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        fs::metadata(path)?.modified()
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries: Vec<DirEntry> = fs::read_dir(path)?
            .filter_map(|entry| classify(path, entry))
            .collect();
        entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        Ok(entries)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Turn one listing result into an entry. A failing entry is logged and
/// dropped so its siblings are still listed.
fn classify(dir: &Path, entry: io::Result<fs::DirEntry>) -> Option<DirEntry> {
    let entry = match entry {
        Ok(entry) => entry,
        Err(err) => {
            warn!(dir = ?dir, error = %err, "skipping unreadable directory entry");
            return None;
        }
    };
    let kind = match entry.file_type() {
        Ok(t) if t.is_file() => EntryKind::File,
        Ok(t) if t.is_dir() => EntryKind::Dir,
        Ok(_) => EntryKind::Other,
        Err(err) => {
            warn!(path = ?entry.path(), error = %err, "cannot determine entry type; skipping");
            return None;
        }
    };
    Some(DirEntry {
        path: entry.path(),
        kind,
    })
}
