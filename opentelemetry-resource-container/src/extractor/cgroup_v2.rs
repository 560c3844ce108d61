use super::{scan_lines, ContainerIdExtractor};
use crate::fs::{Filesystem, HostFilesystem};
use crate::{ContainerId, Error, Source};
use std::path::Path;
use std::sync::Arc;

/// Reads the container id under the unified (v2) cgroup hierarchy.
///
/// The unified line of the process cgroup descriptor (`0::<path>`) is checked
/// first. With a private cgroup namespace that path is just `/`, so the
/// extractor then looks for the per-container `hostname` file runtimes
/// bind-mount from `.../containers/<id>/`, as listed in the process
/// mountinfo.
#[derive(Debug, Clone)]
pub struct CgroupV2Extractor {
    filesystem: Arc<dyn Filesystem>,
}

impl CgroupV2Extractor {
    /// Cgroup descriptor of the current process.
    pub const CGROUP_PATH: &'static str = "/proc/self/cgroup";
    /// Mount table of the current process.
    pub const MOUNTINFO_PATH: &'static str = "/proc/self/mountinfo";

    /// Creates an extractor reading the host filesystem.
    pub fn new() -> Self {
        Self::with_filesystem(Arc::new(HostFilesystem))
    }

    /// Creates an extractor reading from `filesystem`.
    pub fn with_filesystem(filesystem: Arc<dyn Filesystem>) -> Self {
        CgroupV2Extractor { filesystem }
    }
}

impl Default for CgroupV2Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerIdExtractor for CgroupV2Extractor {
    fn source(&self) -> Source {
        Source::CgroupV2
    }

    fn try_extract(&self) -> Result<Option<ContainerId>, Error> {
        let filesystem = self.filesystem.as_ref();
        let mut has_unified_line = false;
        let container_id = scan_lines(filesystem, Path::new(Self::CGROUP_PATH), |line| {
            let path = line.strip_prefix("0::")?;
            has_unified_line = true;
            path.split('/').find_map(ContainerId::from_cgroup_segment)
        })?;

        // Mounts are consulted only for a unified line without an id.
        if container_id.is_some() || !has_unified_line {
            return Ok(container_id);
        }
        scan_lines(
            filesystem,
            Path::new(Self::MOUNTINFO_PATH),
            find_in_mount_line,
        )
    }
}

fn find_in_mount_line(line: &str) -> Option<ContainerId> {
    if !line.contains("hostname") {
        return None;
    }
    line.split(' ').find_map(ContainerId::from_mount_field)
}
