mod common;

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::SystemTime;

use freshbuild::errors::FreshbuildError;
use freshbuild::fs::mock::{at, MockFileSystem};
use freshbuild::fs::{DirEntry, FileSystem};
use freshbuild::generator::{generator_staleness, GeneratorSpec};
use freshbuild::types::GeneratorKind;
use tokio_util::sync::CancellationToken;

use crate::common::{init_tracing, ConfigBuilder, TestResult};

fn scan(fs: &dyn FileSystem, root: &str, force: bool) -> freshbuild::errors::Result<Option<GeneratorKind>> {
    generator_staleness(
        fs,
        Path::new(root),
        &GeneratorSpec::defaults(),
        force,
        &CancellationToken::new(),
    )
}

#[test]
fn source_newer_than_companion_is_stale() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("foo/views/page.qtpl", at(20));
    fs.add_file("foo/views/page.qtpl.go", at(10));

    assert_eq!(scan(&fs, "foo", false)?, Some(GeneratorKind::Legacy));
    Ok(())
}

#[test]
fn companion_at_least_as_new_is_fresh() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("foo/page.templ", at(10));
    fs.add_file("foo/page.templ.go", at(10));
    fs.add_file("foo/other.qtpl", at(10));
    fs.add_file("foo/other.qtpl.go", at(11));

    assert_eq!(scan(&fs, "foo", false)?, None);
    Ok(())
}

#[test]
fn missing_companion_is_stale() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("foo/page.templ", at(1));

    assert_eq!(scan(&fs, "foo", false)?, Some(GeneratorKind::Modern));
    Ok(())
}

#[test]
fn force_reports_fresh_sources() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("foo/page.qtpl", at(1));
    fs.add_file("foo/page.qtpl.go", at(50));

    assert_eq!(scan(&fs, "foo", true)?, Some(GeneratorKind::Legacy));
    Ok(())
}

#[test]
fn no_generator_sources_means_none() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("foo/main.go", at(5));
    fs.add_file("foo/page.qtpl.go", at(5));

    assert_eq!(scan(&fs, "foo", false)?, None);
    assert_eq!(scan(&fs, "foo", true)?, None);
    assert_eq!(scan(&fs, "does-not-exist", false)?, None);
    Ok(())
}

#[test]
fn first_offender_in_lexical_preorder_wins() -> TestResult {
    let fs = MockFileSystem::new();
    // `a` sorts before `b.qtpl`, so the nested modern source is seen first.
    fs.add_file("foo/b.qtpl", at(9));
    fs.add_file("foo/a/deep/page.templ", at(9));

    assert_eq!(scan(&fs, "foo", false)?, Some(GeneratorKind::Modern));

    fs.add_file("foo/a/deep/page.templ.go", at(10));
    assert_eq!(scan(&fs, "foo", false)?, Some(GeneratorKind::Legacy));
    Ok(())
}

#[test]
fn disabled_kinds_are_ignored() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("foo/page.qtpl", at(9));

    let config = ConfigBuilder::new()
        .disable_generator(GeneratorKind::Legacy)
        .build();
    let found = generator_staleness(
        &fs,
        Path::new("foo"),
        &config.generators,
        false,
        &CancellationToken::new(),
    )?;
    assert_eq!(found, None);
    Ok(())
}

#[test]
fn unstatable_source_is_an_error() {
    let fs = MockFileSystem::new();
    fs.add_broken_file("foo/page.qtpl");

    match scan(&fs, "foo", false) {
        Err(FreshbuildError::Probe { path, .. }) => {
            assert!(path.ends_with("page.qtpl"), "unexpected path {path:?}");
        }
        other => panic!("expected a probe error, got {other:?}"),
    }
}

#[test]
fn unreadable_directory_is_skipped() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_unreadable_dir("foo/a_private");
    fs.add_file("foo/b/page.templ", at(3));

    assert_eq!(scan(&fs, "foo", false)?, Some(GeneratorKind::Modern));
    Ok(())
}

#[test]
fn bad_sibling_entry_does_not_hide_stale_source() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_unlistable_entry("foo/a_bad");
    fs.add_file("foo/b.qtpl", at(4));
    fs.add_file("foo/b.qtpl.go", at(2));

    assert_eq!(scan(&fs, "foo", false)?, Some(GeneratorKind::Legacy));
    Ok(())
}

#[test]
fn fired_token_stops_before_any_work() {
    let fs = MockFileSystem::new();
    fs.add_file("foo/page.qtpl", at(3));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let res = generator_staleness(&fs, Path::new("foo"), &GeneratorSpec::defaults(), false, &cancel);
    assert!(matches!(res, Err(FreshbuildError::Cancelled)));
}

/// Fires the token once `budget` directories have been listed.
#[derive(Debug)]
struct CancelAfterListings {
    inner: MockFileSystem,
    cancel: CancellationToken,
    budget: AtomicUsize,
    listed: AtomicUsize,
}

impl FileSystem for CancelAfterListings {
    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        self.inner.modified(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let listed = self.listed.fetch_add(1, Ordering::SeqCst) + 1;
        if listed >= self.budget.load(Ordering::SeqCst) {
            self.cancel.cancel();
        }
        self.inner.read_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.inner.is_file(path)
    }
}

#[test]
fn cancellation_mid_traversal_is_reported() {
    init_tracing();
    let inner = MockFileSystem::new();
    // Many fresh generator sources; none of them is an offender, so only
    // cancellation can end the walk early.
    for i in 0..50 {
        inner.add_file(format!("foo/d{i:02}/page.qtpl"), at(1));
        inner.add_file(format!("foo/d{i:02}/page.qtpl.go"), at(2));
    }
    // A stale source at the very end must not be reached.
    inner.add_file("foo/zz/page.templ", at(9));

    let cancel = CancellationToken::new();
    let fs = CancelAfterListings {
        inner,
        cancel: cancel.clone(),
        budget: AtomicUsize::new(3),
        listed: AtomicUsize::new(0),
    };

    let res = generator_staleness(&fs, Path::new("foo"), &GeneratorSpec::defaults(), false, &cancel);
    assert!(
        matches!(res, Err(FreshbuildError::Cancelled)),
        "expected cancellation, got {res:?}"
    );
    assert!(fs.listed.load(Ordering::SeqCst) < 10);
}
