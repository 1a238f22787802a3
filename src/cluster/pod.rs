//! Pod resource - the smallest schedulable unit
//!
//! A Pod is created when its Service scales up and destroyed when it scales
//! down. It consumes a fixed CPU/memory request and is hosted by at most one
//! Node at a time.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque pod identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PodId(String);

impl PodId {
    /// Generate a fresh identifier (first 8 hex chars of a v4 UUID)
    pub fn generate() -> Self {
        let uuid = Uuid::new_v4().simple().to_string();
        Self(uuid[..8].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PodId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PodId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// CPU and memory consumed by a single pod
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceRequest {
    /// CPU units
    pub cpu: f64,

    /// Memory units
    pub memory: f64,
}

impl ResourceRequest {
    pub fn new(cpu: f64, memory: f64) -> Self {
        Self { cpu, memory }
    }

    /// Both dimensions finite and non-negative
    pub fn is_valid(&self) -> bool {
        self.cpu.is_finite() && self.memory.is_finite() && self.cpu >= 0.0 && self.memory >= 0.0
    }
}

/// Lifecycle phase of a pod
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PodStatus {
    /// Not placed on any node
    #[default]
    Pending,
    /// Resident on a node
    Running,
}

impl fmt::Display for PodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PodStatus::Pending => f.write_str("Pending"),
            PodStatus::Running => f.write_str("Running"),
        }
    }
}

/// A pod belonging to a service
///
/// `status` and `node` only change through [`Node::try_admit`] and
/// [`Node::evict`], which keep them in agreement: the pod is `Running`
/// exactly when `node` names its host.
///
/// [`Node::try_admit`]: super::node::Node::try_admit
/// [`Node::evict`]: super::node::Node::evict
#[derive(Debug, Clone, PartialEq)]
pub struct Pod {
    id: PodId,
    service: String,
    request: ResourceRequest,
    pub(super) node: Option<String>,
    pub(super) status: PodStatus,
}

impl Pod {
    /// Create an unplaced pod for `service`
    pub fn new(service: impl Into<String>, request: ResourceRequest) -> Self {
        Self {
            id: PodId::generate(),
            service: service.into(),
            request,
            node: None,
            status: PodStatus::Pending,
        }
    }

    pub fn id(&self) -> &PodId {
        &self.id
    }

    /// Name of the owning service
    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn request(&self) -> ResourceRequest {
        self.request
    }

    /// Name of the hosting node, if running
    pub fn node(&self) -> Option<&str> {
        self.node.as_deref()
    }

    pub fn status(&self) -> PodStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == PodStatus::Running
    }
}

impl fmt::Display for Pod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node {
            Some(node) => write!(f, "{} ({}) on {}", self.id, self.service, node),
            None => write!(f, "{} ({}) pending", self.id, self.service),
        }
    }
}
