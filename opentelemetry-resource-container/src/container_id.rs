use opentelemetry::Value;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Identifier of the container hosting the process.
///
/// Opaque once extracted: a run of lowercase hex digits of a known length,
/// optionally followed by a numeric suffix.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContainerId(String);

impl ContainerId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id and returns the underlying string.
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Matches a whole cgroup path segment against the shapes written by
    /// container managers: `<32 hex>-<digits>` (ECS on Fargate) or
    /// `<64 hex>` (ECS on EC2 and self-managed runtimes).
    pub(crate) fn from_orchestration_segment(segment: &str) -> Option<Self> {
        is_orchestration_id(segment).then(|| ContainerId(segment.to_owned()))
    }

    /// Matches a cgroup path segment after stripping runtime decoration, so
    /// `docker-<id>.scope`, `cri-containerd-<id>.scope`, `crio-<id>.scope`
    /// and a bare `<id>` all yield `<id>`.
    pub(crate) fn from_cgroup_segment(segment: &str) -> Option<Self> {
        let trimmed = match segment.rfind('.') {
            Some(dot) => &segment[..dot],
            None => segment,
        };
        let candidate = match trimmed.rfind(['-', ':']) {
            Some(sep) => &trimmed[sep + 1..],
            None => trimmed,
        };
        is_hex64_id(candidate).then(|| ContainerId(candidate.to_owned()))
    }

    /// Finds `containers/<64 hex>/` anywhere in a mountinfo field.
    pub(crate) fn from_mount_field(field: &str) -> Option<Self> {
        mount_pattern()?
            .captures(field)
            .and_then(|captures| captures.get(1))
            .map(|id| ContainerId(id.as_str().to_owned()))
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContainerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ContainerId> for Value {
    fn from(id: ContainerId) -> Self {
        Value::from(id.0)
    }
}

/// The kind of evidence a [`ContainerId`] was extracted from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Source {
    /// Cgroup path of process 1 written by the container manager.
    Orchestration,
    /// Per-hierarchy lines of the process cgroup descriptor.
    CgroupV1,
    /// Unified hierarchy line of the process cgroup descriptor, or the
    /// container hostname mount.
    CgroupV2,
}

impl Source {
    /// Stable name used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Orchestration => "orchestration",
            Source::CgroupV1 => "cgroup_v1",
            Source::CgroupV2 => "cgroup_v2",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(pattern).ok()
}

fn pattern_matches(pattern: &OnceLock<Option<Regex>>, init: &str, text: &str) -> bool {
    pattern
        .get_or_init(|| compile(init))
        .as_ref()
        .is_some_and(|regex| regex.is_match(text))
}

static ORCHESTRATION_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
static HEX64_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
static MOUNT_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

fn is_orchestration_id(text: &str) -> bool {
    pattern_matches(
        &ORCHESTRATION_PATTERN,
        r"^(?:[0-9a-f]{32}-[0-9]+|[0-9a-f]{64})$",
        text,
    )
}

fn is_hex64_id(text: &str) -> bool {
    pattern_matches(&HEX64_PATTERN, r"^[0-9a-f]{64}$", text)
}

fn mount_pattern() -> Option<&'static Regex> {
    MOUNT_PATTERN
        .get_or_init(|| compile(r"containers/([0-9a-f]{64})/"))
        .as_ref()
}
