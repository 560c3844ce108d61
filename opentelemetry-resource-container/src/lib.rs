//! # OpenTelemetry Container Resource Detector
//!
//! Detects the id of the container hosting the current process and exposes it
//! as the `container.id` resource attribute.
//!
//! The id is taken from the first of the following sources that yields one:
//!
//! 1. [`OrchestrationExtractor`] - the cgroup path the container manager
//!    writes for process 1 (`/proc/1/cpuset`), as found on Amazon ECS on
//!    Fargate and EC2.
//! 2. [`CgroupV1Extractor`] - the per-hierarchy lines of `/proc/self/cgroup`.
//! 3. [`CgroupV2Extractor`] - the unified `0::<path>` line of
//!    `/proc/self/cgroup`, then the hostname bind mount in
//!    `/proc/self/mountinfo`.
//!
//! Resolution happens once per [`ContainerResourceDetector`] and the result is
//! kept for the detector's lifetime. Nothing here ever fails: unreadable or
//! malformed pseudo-files simply produce an empty [`Resource`].
//!
//! # Example
//!
//! ```no_run
//! use opentelemetry_resource_container::ContainerResourceDetector;
//! use opentelemetry_sdk::Resource;
//!
//! let resource = Resource::builder()
//!     .with_detector(Box::new(ContainerResourceDetector::new()))
//!     .build();
//! ```
//!
//! Processes that do not own a resource pipeline can use the process-wide
//! [`get`] accessor instead.
//!
//! [`Resource`]: opentelemetry_sdk::Resource
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![cfg_attr(docsrs, feature(doc_cfg), deny(rustdoc::broken_intra_doc_links))]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/open-telemetry/opentelemetry-rust/main/assets/logo.svg"
)]
#![cfg_attr(test, deny(warnings))]

mod container_id;
mod detector;
mod error;
mod extractor;
pub mod fs;
#[cfg(any(test, feature = "testing"))]
#[cfg_attr(docsrs, doc(cfg(feature = "testing")))]
pub mod testing;

pub use container_id::{ContainerId, Source};
pub use detector::{get, ContainerResourceDetector, ResolvedIdentity};
pub use error::Error;
pub use extractor::{
    CgroupV1Extractor, CgroupV2Extractor, ContainerIdExtractor, OrchestrationExtractor,
};
