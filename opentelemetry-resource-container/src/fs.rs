//! Read access to the pseudo-files the extractors inspect.
//!
//! [`Filesystem`] is the only I/O the crate performs. [`HostFilesystem`] reads
//! the real host paths; tests and embedders can substitute their own
//! implementation, see `testing::InMemoryFilesystem` behind the `testing`
//! feature.
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Lines of a file in file order, without their trailing newline.
///
/// The underlying handle is released when the iterator is dropped, whether it
/// was exhausted, abandoned early or stopped on an error.
pub type Lines<'a> = Box<dyn Iterator<Item = io::Result<String>> + 'a>;

/// Minimal read capability over the host filesystem.
pub trait Filesystem: fmt::Debug + Send + Sync {
    /// Returns `true` if `path` is a regular file this process can open.
    ///
    /// Never fails: any access error yields `false`.
    fn is_readable(&self, path: &Path) -> bool;

    /// Opens `path` and returns its lines lazily.
    fn lines(&self, path: &Path) -> io::Result<Lines<'_>>;
}

/// [`Filesystem`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostFilesystem;

impl Filesystem for HostFilesystem {
    fn is_readable(&self, path: &Path) -> bool {
        match std::fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => File::open(path).is_ok(),
            _ => false,
        }
    }

    fn lines(&self, path: &Path) -> io::Result<Lines<'_>> {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file).lines()))
    }
}
