// src/fs/mock.rs

use super::{DirEntry, EntryKind, FileSystem};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(SystemTime),
    /// Listed as a regular file by its parent, but `stat` fails.
    Broken,
    Dir(Vec<String>), // List of child names
    /// A directory whose listing fails.
    Unreadable,
    /// Named by its parent, but the listing cannot describe it (its type
    /// lookup fails). Dropped from listings like the real filesystem does.
    Unlistable,
}

/// In-memory filesystem with explicit modification times.
///
/// Clones share the same underlying tree, so a test can keep a handle and
/// "touch" files from inside a fake subprocess.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

/// Convenience: a `SystemTime` `secs` seconds after the epoch.
pub fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut files = HashMap::new();
        // Ensure root exists
        files.insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            files: Arc::new(Mutex::new(files)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, MockEntry>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create or update a file with the given modification time.
    pub fn add_file(&self, path: impl AsRef<Path>, modified: SystemTime) {
        self.insert(path.as_ref(), MockEntry::File(modified));
    }

    /// Add a file that shows up in listings but cannot be stat'ed.
    pub fn add_broken_file(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::Broken);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut files = self.lock();
        ensure_dir_entry(&mut files, &normalize(path.as_ref()));
    }

    /// Add an entry whose type cannot be determined while listing its parent.
    pub fn add_unlistable_entry(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::Unlistable);
    }

    /// Add (or turn) a directory into one whose listing fails.
    pub fn add_unreadable_dir(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::Unreadable);
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let path = normalize(path);
        let mut files = self.lock();
        let parent = parent_of(&path);
        ensure_dir_entry(&mut files, parent);
        link_child(&mut files, parent, &path);
        files.insert(path, entry);
    }
}

/// Treat `./foo` and `foo` as the same entry.
fn normalize(path: &Path) -> PathBuf {
    match path.strip_prefix(".") {
        Ok(rest) if rest.as_os_str().is_empty() => PathBuf::from("."),
        Ok(rest) => rest.to_path_buf(),
        Err(_) => path.to_path_buf(),
    }
}

fn parent_of(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn ensure_dir_entry(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if files.contains_key(path) {
        return;
    }
    files.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
    let parent = parent_of(path);
    if parent != path {
        // Avoid infinite loop at root
        ensure_dir_entry(files, parent);
        link_child(files, parent, path);
    }
}

fn link_child(files: &mut HashMap<PathBuf, MockEntry>, parent: &Path, child: &Path) {
    if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
        if let Some(name) = child.file_name().and_then(|n| n.to_str()) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("not found: {:?}", path))
}

impl FileSystem for MockFileSystem {
    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        let files = self.lock();
        match files.get(&normalize(path)) {
            Some(MockEntry::File(modified)) => Ok(*modified),
            Some(MockEntry::Dir(_)) | Some(MockEntry::Unreadable) => Ok(UNIX_EPOCH),
            Some(MockEntry::Broken) | Some(MockEntry::Unlistable) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {:?}", path),
            )),
            None => Err(not_found(path)),
        }
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let files = self.lock();
        let key = normalize(path);
        let children = match files.get(&key) {
            Some(MockEntry::Dir(children)) => children,
            Some(MockEntry::Unreadable) => {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    format!("cannot read directory {:?}", path),
                ));
            }
            Some(_) => {
                return Err(io::Error::other(format!("not a directory: {:?}", path)));
            }
            None => return Err(not_found(path)),
        };

        let mut entries: Vec<DirEntry> = children
            .iter()
            .filter_map(|name| {
                let child = path.join(name);
                let kind = match files.get(&normalize(&key.join(name))) {
                    Some(MockEntry::Dir(_)) | Some(MockEntry::Unreadable) => EntryKind::Dir,
                    Some(MockEntry::File(_)) | Some(MockEntry::Broken) => EntryKind::File,
                    Some(MockEntry::Unlistable) => return None,
                    None => EntryKind::Other,
                };
                Some(DirEntry { path: child, kind })
            })
            .collect();
        entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        Ok(entries)
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.lock().get(&normalize(path)), Some(MockEntry::File(_)))
    }
}
