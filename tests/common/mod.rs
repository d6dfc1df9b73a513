#![allow(dead_code)]

use std::sync::Arc;

use freshbuild::build::BuildContext;
use freshbuild::config::ConfigFile;
use freshbuild::exec::{CommandRunner, PackageQuery};
use freshbuild::fs::mock::MockFileSystem;
use freshbuild::fs::FileSystem;
use freshbuild_test_utils::fake_packages::FakePackages;
use freshbuild_test_utils::fake_runner::FakeRunner;

pub use freshbuild_test_utils::builders::ConfigBuilder;
pub use freshbuild_test_utils::init_tracing;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Everything a decision or install test needs, over in-memory doubles.
pub struct Harness {
    pub fs: MockFileSystem,
    pub runner: Arc<FakeRunner>,
    pub packages: Arc<FakePackages>,
    pub ctx: BuildContext,
}

impl Harness {
    pub fn new(fs: MockFileSystem, runner: FakeRunner, packages: FakePackages) -> Self {
        Self::with_config(fs, runner, packages, ConfigBuilder::new().build())
    }

    pub fn with_config(
        fs: MockFileSystem,
        runner: FakeRunner,
        packages: FakePackages,
        config: ConfigFile,
    ) -> Self {
        let runner = Arc::new(runner);
        let packages = Arc::new(packages);
        let ctx = BuildContext::new(
            Arc::new(fs.clone()) as Arc<dyn FileSystem>,
            Arc::clone(&runner) as Arc<dyn CommandRunner>,
            Arc::clone(&packages) as Arc<dyn PackageQuery>,
            config,
        );
        Self {
            fs,
            runner,
            packages,
            ctx,
        }
    }
}
