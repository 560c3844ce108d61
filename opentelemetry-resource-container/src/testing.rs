//! In-memory [`Filesystem`] for exercising the detector without `/proc`.
use crate::fs::{Filesystem, Lines};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone)]
enum Entry {
    File(String),
    Unreadable,
    Vanishing,
    Failing { contents: String, fail_after: usize },
}

/// A [`Filesystem`] serving fixed contents and counting every access.
///
/// Paths that were never registered are reported as unreadable.
#[derive(Debug, Default)]
pub struct InMemoryFilesystem {
    entries: HashMap<PathBuf, Entry>,
    probes: AtomicUsize,
    opens: Mutex<HashMap<PathBuf, usize>>,
}

impl InMemoryFilesystem {
    /// Creates a filesystem with no readable paths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `contents` at `path`.
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.with_entry(path, Entry::File(contents.into()))
    }

    /// Reports `path` as unreadable, as for a permission error.
    pub fn with_unreadable(self, path: impl Into<PathBuf>) -> Self {
        self.with_entry(path, Entry::Unreadable)
    }

    /// Reports `path` as readable but fails to open it, as for a file removed
    /// between the check and the read.
    pub fn with_vanishing_file(self, path: impl Into<PathBuf>) -> Self {
        self.with_entry(path, Entry::Vanishing)
    }

    /// Serves the first `fail_after` lines of `contents` at `path`, then fails.
    pub fn with_failing_file(
        self,
        path: impl Into<PathBuf>,
        contents: impl Into<String>,
        fail_after: usize,
    ) -> Self {
        self.with_entry(
            path,
            Entry::Failing {
                contents: contents.into(),
                fail_after,
            },
        )
    }

    /// Number of times `path` was opened for reading.
    pub fn open_count(&self, path: impl AsRef<Path>) -> usize {
        self.opens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path.as_ref())
            .copied()
            .unwrap_or(0)
    }

    /// Number of accesses of any kind, readability checks included.
    pub fn access_count(&self) -> usize {
        let opens: usize = self
            .opens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum();
        self.probes.load(Ordering::SeqCst) + opens
    }

    fn with_entry(mut self, path: impl Into<PathBuf>, entry: Entry) -> Self {
        self.entries.insert(path.into(), entry);
        self
    }
}

impl Filesystem for InMemoryFilesystem {
    fn is_readable(&self, path: &Path) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        matches!(
            self.entries.get(path),
            Some(Entry::File(_) | Entry::Vanishing | Entry::Failing { .. })
        )
    }

    fn lines(&self, path: &Path) -> io::Result<Lines<'_>> {
        *self
            .opens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(path.to_path_buf())
            .or_insert(0) += 1;

        match self.entries.get(path) {
            Some(Entry::File(contents)) => Ok(Box::new(
                contents
                    .lines()
                    .map(|line| Ok::<_, io::Error>(line.to_owned())),
            )),
            Some(Entry::Failing {
                contents,
                fail_after,
            }) => Ok(Box::new(
                contents
                    .lines()
                    .take(*fail_after)
                    .map(|line| Ok(line.to_owned()))
                    .chain(std::iter::once(Err(io::Error::other(
                        "simulated read failure",
                    )))),
            )),
            Some(Entry::Unreadable) => Err(io::Error::from(io::ErrorKind::PermissionDenied)),
            Some(Entry::Vanishing) | None => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }
}
