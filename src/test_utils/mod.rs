//! Test utilities for lazymod.
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration and stress suites.
//!
//! - [`init_test_logging`] routes `tracing` output through the test writer
//! - [`TestManifest`] writes a `lazymod.toml` into a temporary directory
//! - [`recording_factory`] builds factories that count their invocations

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::core::{ContainerError, Dependencies, Factory};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` if given, otherwise `RUST_LOG`; with neither, logging stays off.
///
/// ```rust,no_run
/// use tracing::Level;
///
/// lazymod::test_utils::init_test_logging(Some(Level::DEBUG));
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true) // Show targets like "resolver"
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// A manifest file in its own temporary directory.
///
/// The directory is removed when the value is dropped.
pub struct TestManifest {
    dir: TempDir,
    path: PathBuf,
}

impl TestManifest {
    /// Write `content` to `<tempdir>/lazymod.toml`.
    pub fn new(content: &str) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(crate::constants::MANIFEST_FILE_NAME);
        std::fs::write(&path, content)?;
        Ok(Self {
            dir,
            path,
        })
    }

    /// The diamond `c -> {a, b}`, `b -> a` resolving `c` to `"aabc"`.
    pub fn diamond() -> anyhow::Result<Self> {
        Self::new(
            r#"
[modules.a]
value = "a"

[modules.b]
template = "{a}b"

[modules.c]
template = "{a}{b}c"
"#,
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Invocation counter shared with the factories built by [`recording_factory`].
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// A factory producing `label` prefixed with its string dependencies, counting calls.
///
/// With `deps = ["a", "b"]` and `label = "c"` the value is `a + b + "c"`.
pub fn recording_factory(label: &str, counter: &CallCounter) -> Factory {
    let label = label.to_string();
    let counter = counter.clone();
    Factory::new(move |deps: Dependencies| {
        counter.bump();
        let mut value = String::new();
        for index in 0..deps.len() {
            value.push_str(&deps.get::<String>(index)?);
        }
        value.push_str(&label);
        Ok::<_, ContainerError>(value)
    })
}
