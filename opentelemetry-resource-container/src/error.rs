//! Errors raised while reading container evidence.
use std::io;
use std::path::PathBuf;

/// Failure to read one of the pseudo-files an extractor inspects.
///
/// Only surfaced by [`ContainerIdExtractor::try_extract`]. The detector and
/// [`ContainerIdExtractor::extract`] report it as a warning and carry on as if
/// no id was found.
///
/// [`ContainerIdExtractor::try_extract`]: crate::ContainerIdExtractor::try_extract
/// [`ContainerIdExtractor::extract`]: crate::ContainerIdExtractor::extract
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Opening the file or reading one of its lines failed.
    #[error("failed to read `{}`: {source}", path.display())]
    Read {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Read {
            path: path.into(),
            source,
        }
    }
}
