use super::{scan_lines, ContainerIdExtractor};
use crate::fs::{Filesystem, HostFilesystem};
use crate::{ContainerId, Error, Source};
use std::path::Path;
use std::sync::Arc;

/// Reads the container id from the per-hierarchy lines of the process cgroup
/// descriptor.
///
/// Each line has the form `hierarchy-id:controller-list:cgroup-path`, for
/// example `4:cpu,cpuacct:/docker/<id>` or
/// `1:name=systemd:/system.slice/docker-<id>.scope`. The unified hierarchy
/// line (`0::<path>`) is left to [`CgroupV2Extractor`].
///
/// [`CgroupV2Extractor`]: crate::CgroupV2Extractor
#[derive(Debug, Clone)]
pub struct CgroupV1Extractor {
    filesystem: Arc<dyn Filesystem>,
}

impl CgroupV1Extractor {
    /// Cgroup descriptor of the current process.
    pub const CGROUP_PATH: &'static str = "/proc/self/cgroup";

    /// Creates an extractor reading the host filesystem.
    pub fn new() -> Self {
        Self::with_filesystem(Arc::new(HostFilesystem))
    }

    /// Creates an extractor reading from `filesystem`.
    pub fn with_filesystem(filesystem: Arc<dyn Filesystem>) -> Self {
        CgroupV1Extractor { filesystem }
    }
}

impl Default for CgroupV1Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerIdExtractor for CgroupV1Extractor {
    fn source(&self) -> Source {
        Source::CgroupV1
    }

    fn try_extract(&self) -> Result<Option<ContainerId>, Error> {
        scan_lines(
            self.filesystem.as_ref(),
            Path::new(Self::CGROUP_PATH),
            find_in_line,
        )
    }
}

fn find_in_line(line: &str) -> Option<ContainerId> {
    let mut fields = line.splitn(3, ':');
    let hierarchy_id = fields.next()?;
    let controllers = fields.next()?;
    let cgroup_path = fields.next()?;

    if hierarchy_id == "0" && controllers.is_empty() {
        return None;
    }

    cgroup_path
        .split('/')
        .find_map(ContainerId::from_cgroup_segment)
}
