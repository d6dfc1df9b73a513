mod common;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use freshbuild::build::Target;
use freshbuild::errors::FreshbuildError;
use freshbuild::exec::{discover_install_root, CommandOutput, CommandRunner, GoPackageQuery, PackageQuery};
use freshbuild_test_utils::fake_runner::FakeRunner;
use tokio_util::sync::CancellationToken;

use crate::common::{init_tracing, TestResult};

fn query(runner: FakeRunner) -> (Arc<FakeRunner>, GoPackageQuery) {
    let runner = Arc::new(runner);
    let query = GoPackageQuery::new(
        Arc::clone(&runner) as Arc<dyn CommandRunner>,
        "go",
        ".",
        Some("example.com/tools/".to_string()),
    );
    (runner, query)
}

#[tokio::test]
async fn main_package_is_executable() -> TestResult {
    let (runner, query) = query(
        FakeRunner::new()
            .respond("go list -f {{.Name}} ./cmd/foo", CommandOutput::success("main\n"))
            .respond("go list -f {{.Name}} ./lib", CommandOutput::success("lib\n")),
    );
    let cancel = CancellationToken::new();

    assert!(query.is_executable(&Target::new(Path::new("."), "cmd/foo"), &cancel).await?);
    assert!(!query.is_executable(&Target::new(Path::new("."), "lib"), &cancel).await?);
    assert_eq!(runner.calls()[0].dir, Some(PathBuf::from(".")));
    Ok(())
}

#[tokio::test]
async fn failing_listing_is_an_error() {
    let (_, query) = query(FakeRunner::new().fail("go list", 1, "no Go files in /src/empty"));

    let res = query
        .is_executable(&Target::new(Path::new("."), "empty"), &CancellationToken::new())
        .await;
    match res {
        Err(FreshbuildError::CommandFailed { output, .. }) => {
            assert!(output.contains("no Go files"))
        }
        other => panic!("expected command failure, got {other:?}"),
    }
}

#[tokio::test]
async fn dependencies_are_limited_to_the_module() -> TestResult {
    let listing = "context\nexample.com/tools/internal/log\ngithub.com/x/y\nexample.com/tools/pkg/db\n";
    let (_, query) = query(FakeRunner::new().respond("go list", CommandOutput::success(listing)));

    let deps = query
        .dependencies(&Target::new(Path::new("."), "foo"), &CancellationToken::new())
        .await?;
    assert_eq!(deps, vec!["internal/log", "pkg/db"]);
    Ok(())
}

#[tokio::test]
async fn install_root_prefers_gobin() -> TestResult {
    let runner = FakeRunner::new().respond("go env GOBIN", CommandOutput::success("/home/me/bin\n"));
    let root = discover_install_root(&runner, "go", &CancellationToken::new()).await?;
    assert_eq!(root, Some(PathBuf::from("/home/me/bin")));
    assert_eq!(runner.command_lines(), vec!["go env GOBIN"]);
    Ok(())
}

#[tokio::test]
async fn install_root_falls_back_to_first_gopath_entry() -> TestResult {
    let runner = FakeRunner::new()
        .respond("go env GOBIN", CommandOutput::success("\n"))
        .respond("go env GOPATH", CommandOutput::success("/home/me/go:/opt/go\n"));
    let root = discover_install_root(&runner, "go", &CancellationToken::new()).await?;
    assert_eq!(root, Some(PathBuf::from("/home/me/go/bin")));

    let empty = FakeRunner::new();
    assert_eq!(discover_install_root(&empty, "go", &CancellationToken::new()).await?, None);
    Ok(())
}

#[cfg(unix)]
mod process {
    use std::time::{Duration, Instant};

    use freshbuild::errors::FreshbuildError;
    use freshbuild::exec::{run_checked, CommandRunner, CommandSpec, ProcessRunner};
    use freshbuild_test_utils::with_timeout;
    use tokio_util::sync::CancellationToken;

    use super::{init_tracing, TestResult};

    #[tokio::test]
    async fn combined_output_and_exit_code_are_captured() -> TestResult {
        init_tracing();
        let spec = CommandSpec::new("sh")
            .args(["-c", "echo to-stdout; echo to-stderr 1>&2; exit 3"]);

        let out = ProcessRunner::new().run(&spec, &CancellationToken::new()).await?;
        assert!(!out.success);
        assert_eq!(out.code, Some(3));
        assert!(out.output.contains("to-stdout\n"));
        assert!(out.output.contains("to-stderr\n"));

        let err = run_checked(&ProcessRunner::new(), &spec, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("to-stderr"));
        Ok(())
    }

    #[tokio::test]
    async fn output_after_invalid_utf8_is_kept() -> TestResult {
        let spec = CommandSpec::new("sh").args([
            "-c",
            "printf 'bad \\377 byte\\nmain.go:3: syntax error\\n' >&2; exit 2",
        ]);

        let out = ProcessRunner::new().run(&spec, &CancellationToken::new()).await?;
        assert_eq!(out.code, Some(2));
        assert!(out.output.contains("bad \u{FFFD} byte\n"), "got {:?}", out.output);
        assert!(out.output.contains("main.go:3: syntax error\n"), "got {:?}", out.output);
        Ok(())
    }

    #[tokio::test]
    async fn working_directory_and_environment_are_applied() -> TestResult {
        let dir = tempfile::tempdir()?;
        let spec = CommandSpec::new("sh")
            .args(["-c", "pwd; echo \"$FRESHBUILD_PROBE\""])
            .current_dir(dir.path())
            .env("FRESHBUILD_PROBE", "hello");

        let out = ProcessRunner::new().run(&spec, &CancellationToken::new()).await?;
        assert!(out.success);
        let canonical = dir.path().canonicalize()?;
        assert!(out.output.contains(&*canonical.to_string_lossy()));
        assert!(out.output.contains("hello"));
        Ok(())
    }

    #[tokio::test]
    async fn cancellation_kills_the_child() -> TestResult {
        let cancel = CancellationToken::new();
        let spec = CommandSpec::new("sleep").arg("30");

        let started = Instant::now();
        let run = {
            let cancel = cancel.clone();
            tokio::spawn(async move { ProcessRunner::new().run(&spec, &cancel).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();

        let res = with_timeout(run).await?;
        assert!(matches!(res, Err(FreshbuildError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(5));
        Ok(())
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let spec = CommandSpec::new("definitely-not-a-real-program-4821");
        let res = ProcessRunner::new().run(&spec, &CancellationToken::new()).await;
        assert!(matches!(res, Err(FreshbuildError::Other(_))));
    }

    #[test]
    fn lookup_searches_the_path() {
        assert!(ProcessRunner::new().lookup("sh").is_some());
        assert!(ProcessRunner::new().lookup("definitely-not-a-real-program-4821").is_none());
    }
}
