use super::{scan_lines, ContainerIdExtractor};
use crate::fs::{Filesystem, HostFilesystem};
use crate::{ContainerId, Error, Source};
use std::path::Path;
use std::sync::Arc;

/// Reads the container id the container manager exposes through the cgroup
/// path of process 1.
///
/// Amazon ECS writes this path to `/proc/1/cpuset` in every container, on
/// Fargate (`<32 hex>-<digits>`) as well as on EC2 (`<64 hex>`). A path
/// segment must match one of these shapes as a whole.
#[derive(Debug, Clone)]
pub struct OrchestrationExtractor {
    filesystem: Arc<dyn Filesystem>,
}

impl OrchestrationExtractor {
    /// Cgroup descriptor of process 1.
    pub const CPUSET_PATH: &'static str = "/proc/1/cpuset";

    /// Creates an extractor reading the host filesystem.
    pub fn new() -> Self {
        Self::with_filesystem(Arc::new(HostFilesystem))
    }

    /// Creates an extractor reading from `filesystem`.
    pub fn with_filesystem(filesystem: Arc<dyn Filesystem>) -> Self {
        OrchestrationExtractor { filesystem }
    }
}

impl Default for OrchestrationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerIdExtractor for OrchestrationExtractor {
    fn source(&self) -> Source {
        Source::Orchestration
    }

    fn try_extract(&self) -> Result<Option<ContainerId>, Error> {
        scan_lines(
            self.filesystem.as_ref(),
            Path::new(Self::CPUSET_PATH),
            find_in_line,
        )
    }
}

fn find_in_line(line: &str) -> Option<ContainerId> {
    line.split('/')
        .find_map(ContainerId::from_orchestration_segment)
}
