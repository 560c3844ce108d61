//! Strategies that read one kind of container evidence each.
//!
//! Every extractor checks that its pseudo-file is readable, scans it line by
//! line and stops at the first line that yields a [`ContainerId`]. They hold no
//! state besides the shared [`Filesystem`], so they can be called repeatedly
//! and from several threads at once.
mod cgroup_v1;
mod cgroup_v2;
mod orchestration;

pub use cgroup_v1::CgroupV1Extractor;
pub use cgroup_v2::CgroupV2Extractor;
pub use orchestration::OrchestrationExtractor;

use crate::fs::Filesystem;
use crate::{ContainerId, Error, Source};
use opentelemetry::{otel_debug, otel_warn};
use std::fmt;
use std::path::Path;

/// Produces at most one [`ContainerId`] from one kind of evidence.
pub trait ContainerIdExtractor: fmt::Debug + Send + Sync {
    /// The evidence this extractor inspects.
    fn source(&self) -> Source;

    /// Extracts the container id, reporting read failures to the caller.
    ///
    /// A missing or unreadable file is not a failure and yields `Ok(None)`.
    fn try_extract(&self) -> Result<Option<ContainerId>, Error>;

    /// Extracts the container id, treating read failures as "not found".
    ///
    /// Failures are reported through a `ContainerResource.ReadFailed` warning.
    fn extract(&self) -> Option<ContainerId> {
        match self.try_extract() {
            Ok(Some(container_id)) => {
                otel_debug!(
                    name: "ContainerResource.Extracted",
                    source = self.source().as_str(),
                    container_id = container_id.as_str(),
                );
                Some(container_id)
            }
            Ok(None) => None,
            Err(err) => {
                otel_warn!(
                    name: "ContainerResource.ReadFailed",
                    source = self.source().as_str(),
                    error = format!("{err}"),
                );
                None
            }
        }
    }
}

/// Returns the first id `find` recognizes in the lines of `path`.
///
/// An unreadable `path` yields `Ok(None)` without being opened.
pub(crate) fn scan_lines<F>(
    filesystem: &dyn Filesystem,
    path: &Path,
    mut find: F,
) -> Result<Option<ContainerId>, Error>
where
    F: FnMut(&str) -> Option<ContainerId>,
{
    if !filesystem.is_readable(path) {
        return Ok(None);
    }

    let lines = filesystem
        .lines(path)
        .map_err(|err| Error::read(path, err))?;
    for line in lines {
        let line = line.map_err(|err| Error::read(path, err))?;
        if let Some(container_id) = find(&line) {
            return Ok(Some(container_id));
        }
    }

    Ok(None)
}
