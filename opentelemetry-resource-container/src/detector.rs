//! Container resource detector
//!
//! Implementation of `ResourceDetector` resolving the `container.id`
//! attribute from the extractors, in order of precedence.
use crate::extractor::{
    CgroupV1Extractor, CgroupV2Extractor, ContainerIdExtractor, OrchestrationExtractor,
};
use crate::fs::{Filesystem, HostFilesystem};
use crate::{ContainerId, Source};
use opentelemetry::{otel_info, KeyValue};
use opentelemetry_sdk::resource::{Resource, ResourceDetector};
use opentelemetry_semantic_conventions::resource::CONTAINER_ID;
use std::sync::{Arc, OnceLock};

/// A container id together with the evidence it was extracted from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedIdentity {
    container_id: ContainerId,
    source: Source,
}

impl ResolvedIdentity {
    /// The resolved container id.
    pub fn container_id(&self) -> &ContainerId {
        &self.container_id
    }

    /// The extractor that produced the id.
    pub fn source(&self) -> Source {
        self.source
    }
}

#[derive(Debug)]
struct Resolution {
    identity: Option<ResolvedIdentity>,
    resource: Resource,
}

/// Detects the `container.id` resource attribute.
///
/// The extractors are consulted in a fixed order and the first id found wins:
///
/// 1. [`OrchestrationExtractor`]
/// 2. [`CgroupV1Extractor`]
/// 3. [`CgroupV2Extractor`]
///
/// Resolution runs once, on first use, even when several threads race for it.
/// Every later call returns the same result without touching the filesystem.
/// When no extractor finds an id the detected resource is empty.
#[derive(Debug)]
pub struct ContainerResourceDetector {
    extractors: [Box<dyn ContainerIdExtractor>; 3],
    resolution: OnceLock<Resolution>,
}

impl ContainerResourceDetector {
    /// Create `ContainerResourceDetector` reading the host filesystem.
    pub fn new() -> Self {
        Self::with_filesystem(Arc::new(HostFilesystem))
    }

    /// Create `ContainerResourceDetector` reading from `filesystem`.
    pub fn with_filesystem(filesystem: Arc<dyn Filesystem>) -> Self {
        ContainerResourceDetector {
            extractors: [
                Box::new(OrchestrationExtractor::with_filesystem(filesystem.clone())),
                Box::new(CgroupV1Extractor::with_filesystem(filesystem.clone())),
                Box::new(CgroupV2Extractor::with_filesystem(filesystem)),
            ],
            resolution: OnceLock::new(),
        }
    }

    /// The resolved container id and its provenance, if any.
    pub fn identity(&self) -> Option<&ResolvedIdentity> {
        self.resolve().identity.as_ref()
    }

    /// The resolved container id, if any.
    pub fn container_id(&self) -> Option<&ContainerId> {
        self.identity().map(ResolvedIdentity::container_id)
    }

    /// The resource holding `container.id`, or an empty resource.
    pub fn resource(&self) -> Resource {
        self.resolve().resource.clone()
    }

    fn resolve(&self) -> &Resolution {
        self.resolution.get_or_init(|| resolve(&self.extractors))
    }
}

impl Default for ContainerResourceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceDetector for ContainerResourceDetector {
    fn detect(&self) -> Resource {
        self.resource()
    }
}

fn resolve(extractors: &[Box<dyn ContainerIdExtractor>]) -> Resolution {
    let identity = extractors.iter().find_map(|extractor| {
        extractor.extract().map(|container_id| ResolvedIdentity {
            container_id,
            source: extractor.source(),
        })
    });

    let resource = match &identity {
        Some(identity) => {
            otel_info!(
                name: "ContainerResource.Resolved",
                source = identity.source.as_str(),
                container_id = identity.container_id.as_str(),
            );
            Resource::builder_empty()
                .with_attribute(KeyValue::new(
                    CONTAINER_ID,
                    identity.container_id.clone(),
                ))
                .build()
        }
        None => {
            otel_info!(name: "ContainerResource.NotFound");
            Resource::builder_empty().build()
        }
    };

    Resolution { identity, resource }
}

/// Returns the container resource of the current process.
///
/// Backed by a process-wide [`ContainerResourceDetector`] reading the host
/// filesystem, so the host is inspected at most once per process.
pub fn get() -> Resource {
    static DETECTOR: OnceLock<ContainerResourceDetector> = OnceLock::new();
    DETECTOR.get_or_init(ContainerResourceDetector::new).resource()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryFilesystem;
    use opentelemetry::{Key, Value};

    const FARGATE_ID: &str = "a1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4-1234567890";
    const V1_ID: &str = "deadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef";
    const V2_ID: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn container_id_attribute(resource: &Resource) -> Option<Value> {
        resource.get(&Key::from_static_str(CONTAINER_ID))
    }

    #[test]
    fn orchestration_id_becomes_the_attribute() {
        let filesystem = InMemoryFilesystem::new().with_file(
            OrchestrationExtractor::CPUSET_PATH,
            "/docker/a1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4-1234567890",
        );
        let detector = ContainerResourceDetector::with_filesystem(Arc::new(filesystem));

        let resource = detector.detect();

        assert_eq!(resource.len(), 1);
        assert_eq!(container_id_attribute(&resource), Some(Value::from(FARGATE_ID)));
        assert_eq!(
            detector.identity().map(ResolvedIdentity::source),
            Some(Source::Orchestration)
        );
    }

    #[test]
    fn nothing_readable_yields_empty_resource() {
        let filesystem = InMemoryFilesystem::new()
            .with_unreadable(OrchestrationExtractor::CPUSET_PATH)
            .with_unreadable(CgroupV1Extractor::CGROUP_PATH)
            .with_unreadable(CgroupV2Extractor::MOUNTINFO_PATH);
        let detector = ContainerResourceDetector::with_filesystem(Arc::new(filesystem));

        assert!(detector.detect().is_empty());
        assert_eq!(detector.identity(), None);
    }

    #[test]
    fn empty_orchestration_file_falls_through_to_cgroup_v1() {
        let filesystem = InMemoryFilesystem::new()
            .with_file(OrchestrationExtractor::CPUSET_PATH, "")
            .with_file(
                CgroupV1Extractor::CGROUP_PATH,
                format!("12:pids:/\n4:cpu,cpuacct:/docker/{V1_ID}"),
            );
        let detector = ContainerResourceDetector::with_filesystem(Arc::new(filesystem));

        assert_eq!(
            container_id_attribute(&detector.detect()),
            Some(Value::from(V1_ID))
        );
        assert_eq!(
            detector.identity().map(ResolvedIdentity::source),
            Some(Source::CgroupV1)
        );
    }

    #[test]
    fn orchestration_takes_precedence_over_cgroups() {
        let filesystem = Arc::new(
            InMemoryFilesystem::new()
                .with_file(
                    OrchestrationExtractor::CPUSET_PATH,
                    format!("/ecs/{FARGATE_ID}"),
                )
                .with_file(
                    CgroupV1Extractor::CGROUP_PATH,
                    format!("4:cpu:/docker/{V1_ID}\n0::/docker/{V2_ID}"),
                ),
        );
        let detector = ContainerResourceDetector::with_filesystem(filesystem.clone());

        assert_eq!(
            detector.container_id().map(ContainerId::as_str),
            Some(FARGATE_ID)
        );
        assert_eq!(filesystem.open_count(CgroupV1Extractor::CGROUP_PATH), 0);
    }

    #[test]
    fn cgroup_v1_takes_precedence_over_cgroup_v2() {
        let filesystem = InMemoryFilesystem::new().with_file(
            CgroupV1Extractor::CGROUP_PATH,
            format!("0::/docker/{V2_ID}\n4:cpu:/docker/{V1_ID}"),
        );
        let detector = ContainerResourceDetector::with_filesystem(Arc::new(filesystem));

        assert_eq!(
            container_id_attribute(&detector.detect()),
            Some(Value::from(V1_ID))
        );
        assert_eq!(
            detector.identity().map(ResolvedIdentity::source),
            Some(Source::CgroupV1)
        );
    }

    #[test]
    fn cgroup_v2_is_used_last() {
        let filesystem = InMemoryFilesystem::new()
            .with_file(OrchestrationExtractor::CPUSET_PATH, "/")
            .with_file(CgroupV1Extractor::CGROUP_PATH, format!("0::/docker/{V2_ID}"));
        let detector = ContainerResourceDetector::with_filesystem(Arc::new(filesystem));

        assert_eq!(
            container_id_attribute(&detector.detect()),
            Some(Value::from(V2_ID))
        );
        assert_eq!(
            detector.identity().map(ResolvedIdentity::source),
            Some(Source::CgroupV2)
        );
    }

    #[test]
    fn read_failure_falls_through_to_next_extractor() {
        let filesystem = InMemoryFilesystem::new()
            .with_failing_file(OrchestrationExtractor::CPUSET_PATH, "/", 1)
            .with_file(CgroupV1Extractor::CGROUP_PATH, format!("4:cpu:/docker/{V1_ID}"));
        let detector = ContainerResourceDetector::with_filesystem(Arc::new(filesystem));

        assert_eq!(
            detector.container_id().map(ContainerId::as_str),
            Some(V1_ID)
        );
    }

    #[test]
    fn resolution_is_memoized() {
        let filesystem = Arc::new(
            InMemoryFilesystem::new()
                .with_file(CgroupV1Extractor::CGROUP_PATH, format!("0::/docker/{V2_ID}")),
        );
        let detector = ContainerResourceDetector::with_filesystem(filesystem.clone());

        let first = detector.detect();
        let accesses = filesystem.access_count();
        let second = detector.detect();

        assert_eq!(first, second);
        assert_eq!(filesystem.access_count(), accesses);
        assert_eq!(filesystem.open_count(CgroupV1Extractor::CGROUP_PATH), 2);
    }

    #[test]
    fn concurrent_first_access_resolves_once() {
        let filesystem = Arc::new(
            InMemoryFilesystem::new()
                .with_file(OrchestrationExtractor::CPUSET_PATH, format!("/ecs/{V1_ID}")),
        );
        let detector = ContainerResourceDetector::with_filesystem(filesystem.clone());

        let resources = std::thread::scope(|scope| {
            let handles = (0..8)
                .map(|_| scope.spawn(|| detector.detect()))
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("detector thread panicked"))
                .collect::<Vec<_>>()
        });

        assert!(resources.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(filesystem.open_count(OrchestrationExtractor::CPUSET_PATH), 1);
    }

    #[test]
    fn plugs_into_resource_builder() {
        let filesystem = InMemoryFilesystem::new()
            .with_file(OrchestrationExtractor::CPUSET_PATH, format!("/ecs/{FARGATE_ID}"));

        let resource = Resource::builder_empty()
            .with_detector(Box::new(ContainerResourceDetector::with_filesystem(
                Arc::new(filesystem),
            )))
            .with_attribute(KeyValue::new("service.name", "checkout"))
            .build();

        assert_eq!(container_id_attribute(&resource), Some(Value::from(FARGATE_ID)));
        assert_eq!(resource.len(), 2);
    }

    #[test]
    fn process_wide_accessor_is_stable() {
        // Reads the real host, so only the memoized result is asserted.
        assert_eq!(get(), get());
    }
}
