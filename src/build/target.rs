// src/build/target.rs

use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::fs::FileSystem;

/// A named, directory-scoped compilable unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    /// Path of the unit relative to the workspace root, e.g. `cmd/foo`.
    pub name: String,
    /// `root.join(name)`.
    pub dir: PathBuf,
}

impl Target {
    /// Build a target from a user-supplied name; `./foo/` and `foo` are the
    /// same target.
    pub fn new(root: &Path, name: &str) -> Self {
        let name = name.trim_start_matches("./").trim_end_matches('/').to_string();
        let dir = root.join(&name);
        Self { name, dir }
    }

    /// Package path argument for the toolchain: `./<name>`.
    pub fn package_arg(&self) -> String {
        format!("./{}", self.name)
    }
}

/// Names of the entries of `dir` (one target link per entry), sorted.
pub fn list_targets(fs: &dyn FileSystem, dir: &Path) -> Result<Vec<String>> {
    let entries = fs.read_dir(dir)?;
    Ok(entries
        .iter()
        .filter_map(|e| e.file_name())
        .filter(|name| !name.starts_with('.'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::{at, MockFileSystem};

    #[test]
    fn target_names_are_normalised() {
        let t = Target::new(Path::new("/ws"), "./cmd/foo/");
        assert_eq!(t.name, "cmd/foo");
        assert_eq!(t.dir, PathBuf::from("/ws/cmd/foo"));
        assert_eq!(t.package_arg(), "./cmd/foo");
    }

    #[test]
    fn list_targets_skips_hidden_entries() -> Result<()> {
        let fs = MockFileSystem::new();
        fs.add_dir("bin/foo");
        fs.add_dir("bin/bar");
        fs.add_file("bin/.keep", at(1));

        assert_eq!(list_targets(&fs, Path::new("bin"))?, vec!["bar", "foo"]);
        Ok(())
    }
}
