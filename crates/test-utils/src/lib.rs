//! Test doubles and helpers shared by the `freshbuild` integration tests.

pub mod builders;
pub mod fake_packages;
pub mod fake_runner;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING: Once = Once::new();

/// Route `freshbuild` logs into the test harness' captured output.
///
/// `RUST_LOG` overrides the default `freshbuild=info` filter.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("freshbuild=info"));
        fmt().with_env_filter(filter).with_test_writer().init();
    });
}

/// Await `fut`, failing the test if it takes longer than five seconds.
pub async fn with_timeout<F: Future>(fut: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), fut)
        .await
        .expect("timed out after 5s waiting for a cancellable operation")
}
