//! Cluster Controller - owns cluster state and performs every mutation
//!
//! The controller is responsible for:
//! - Registering nodes (in order; order drives first-fit placement)
//! - Deploying and scaling services
//! - Relocating pods between nodes
//! - Handing the current state to the metrics synthesizer
//!
//! `Cluster` is a plain single-threaded value. Callers that share it across
//! tasks wrap the whole instance in one lock (see `api::ControlPlaneState`).

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use super::node::{Node, NodeError};
use super::pod::{Pod, PodId, ResourceRequest};
use super::scheduler::first_fit;
use super::service::Service;
use crate::metrics::{self, JitterSource, MetricsSnapshot};

/// Errors that can occur in the cluster controller
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    #[error("Service '{0}' not found")]
    ServiceNotFound(String),

    #[error("Pod '{0}' not found")]
    PodNotFound(PodId),

    #[error("Node '{0}' not found")]
    NodeNotFound(String),

    #[error("Node '{0}' already registered")]
    NodeExists(String),

    #[error("Service '{0}' already exists")]
    ServiceExists(String),

    #[error("Cannot move pod '{pod}': {source}")]
    CapacityExceeded {
        pod: PodId,
        #[source]
        source: NodeError,
    },

    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Coarse classification of a [`ClusterError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    CapacityExceeded,
    InternalInconsistency,
    InvalidArgument,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::CapacityExceeded => "capacity_exceeded",
            ErrorKind::InternalInconsistency => "internal_inconsistency",
            ErrorKind::InvalidArgument => "invalid_argument",
        };
        f.write_str(s)
    }
}

impl ClusterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClusterError::ServiceNotFound(_)
            | ClusterError::PodNotFound(_)
            | ClusterError::NodeNotFound(_) => ErrorKind::NotFound,
            ClusterError::NodeExists(_) | ClusterError::ServiceExists(_) => {
                ErrorKind::AlreadyExists
            }
            ClusterError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            ClusterError::InternalInconsistency(_) => ErrorKind::InternalInconsistency,
            ClusterError::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }
}

/// The simulated cluster: nodes in registration order plus services by name
#[derive(Debug, Clone, Default)]
pub struct Cluster {
    nodes: Vec<Node>,
    node_index: HashMap<String, usize>,
    services: BTreeMap<String, Service>,
}

impl Cluster {
    /// Create an empty cluster
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Node Management
    // =========================================================================

    /// Register a new, empty node
    pub fn register_node(
        &mut self,
        name: impl Into<String>,
        cpu_capacity: f64,
        memory_capacity: f64,
    ) -> Result<(), ClusterError> {
        let name = name.into();
        if !ResourceRequest::new(cpu_capacity, memory_capacity).is_valid() {
            return Err(ClusterError::InvalidArgument(format!(
                "node '{}' capacity must be finite and non-negative",
                name
            )));
        }
        if self.node_index.contains_key(&name) {
            return Err(ClusterError::NodeExists(name));
        }

        self.node_index.insert(name.clone(), self.nodes.len());
        self.nodes
            .push(Node::new(name.clone(), cpu_capacity, memory_capacity));
        info!(
            "Registered node {} (cpu {}, memory {})",
            name, cpu_capacity, memory_capacity
        );
        Ok(())
    }

    /// Nodes in registration order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Get a node by name
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.node_index.get(name).map(|&i| &self.nodes[i])
    }

    // =========================================================================
    // Service Management
    // =========================================================================

    /// Create a service and scale it to `replicas`
    pub fn deploy_service(
        &mut self,
        name: impl Into<String>,
        replicas: u32,
        cpu_request: f64,
        memory_request: f64,
    ) -> Result<(), ClusterError> {
        let name = name.into();
        let template = ResourceRequest::new(cpu_request, memory_request);
        if !template.is_valid() {
            return Err(ClusterError::InvalidArgument(format!(
                "service '{}' requests must be finite and non-negative",
                name
            )));
        }
        if self.services.contains_key(&name) {
            return Err(ClusterError::ServiceExists(name));
        }

        self.services
            .insert(name.clone(), Service::new(name.clone(), template));
        info!(
            "Deployed service {} (cpu {}, memory {} per pod)",
            name, cpu_request, memory_request
        );
        self.scale_service(&name, replicas)
    }

    /// Bring a service to exactly `replicas` pods
    ///
    /// Scale-up places new pods first-fit; a pod that fits nowhere stays
    /// Pending and the call still succeeds. Scale-down removes the oldest
    /// pods first.
    pub fn scale_service(&mut self, name: &str, replicas: u32) -> Result<(), ClusterError> {
        let service = self
            .services
            .get_mut(name)
            .ok_or_else(|| ClusterError::ServiceNotFound(name.to_string()))?;

        let current = service.pod_count();
        let target = replicas as usize;

        if target > current {
            for _ in current..target {
                let pod = service.spawn_pod();
                if first_fit(&mut self.nodes, pod).is_none() {
                    warn!(
                        "Could not schedule pod {} of {} (insufficient capacity)",
                        pod.id(),
                        name
                    );
                }
            }
        } else if target < current {
            for id in service.oldest(current - target) {
                if let Some(pod) = service.pod_mut(&id) {
                    if let Some(host) = pod.node().map(str::to_owned) {
                        let index = self.node_index.get(&host).copied().ok_or_else(|| {
                            ClusterError::InternalInconsistency(format!(
                                "pod '{}' references unknown node '{}'",
                                id, host
                            ))
                        })?;
                        self.nodes[index]
                            .evict(pod)
                            .map_err(|e| ClusterError::InternalInconsistency(e.to_string()))?;
                    }
                }
                service.remove_pod(&id);
            }
        } else {
            return Ok(());
        }

        info!(
            "Scaled service {} from {} to {} replicas ({} running)",
            name,
            current,
            target,
            service.running_count()
        );
        Ok(())
    }

    /// Services ordered by name
    pub fn services(&self) -> impl Iterator<Item = &Service> {
        self.services.values()
    }

    /// Get a service by name
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    // =========================================================================
    // Pods
    // =========================================================================

    /// All pods, grouped by service, each group in creation order
    pub fn pods(&self) -> impl Iterator<Item = &Pod> {
        self.services.values().flat_map(|s| s.pods())
    }

    /// Get a pod by id
    pub fn pod(&self, id: &PodId) -> Option<&Pod> {
        self.services.values().find_map(|s| s.pod(id))
    }

    /// Relocate a running pod onto `target_node`
    ///
    /// Either the pod ends up on the target or nothing changes. A capacity
    /// shortfall on the target is reported as `CapacityExceeded` before any
    /// mutation.
    pub fn move_pod(&mut self, pod_id: &str, target_node: &str) -> Result<(), ClusterError> {
        let pod_id = PodId::from(pod_id);

        let source = self
            .nodes
            .iter()
            .position(|n| n.hosts(&pod_id))
            .ok_or_else(|| ClusterError::PodNotFound(pod_id.clone()))?;
        let target = self
            .node_index
            .get(target_node)
            .copied()
            .ok_or_else(|| ClusterError::NodeNotFound(target_node.to_string()))?;

        let owner = self.nodes[source]
            .resident(&pod_id)
            .map(|r| r.service.clone())
            .unwrap_or_default();
        let pod = self
            .services
            .get_mut(&owner)
            .and_then(|s| s.pod_mut(&pod_id))
            .ok_or_else(|| {
                ClusterError::InternalInconsistency(format!(
                    "pod '{}' is resident on '{}' but has no owning service",
                    pod_id,
                    self.nodes[source].name()
                ))
            })?;

        if source == target {
            return Ok(());
        }

        if let Err(reason) = self.nodes[target].check_fit(&pod.request()) {
            warn!("Rejected move of pod {}: {}", pod_id, reason);
            return Err(ClusterError::CapacityExceeded {
                pod: pod_id,
                source: reason,
            });
        }

        self.nodes[source]
            .evict(pod)
            .map_err(|e| ClusterError::InternalInconsistency(e.to_string()))?;

        if let Err(reason) = self.nodes[target].try_admit(pod) {
            let restored = self.nodes[source].try_admit(pod);
            error!(
                "Admit of pod {} on {} failed after capacity check passed: {} (rollback {})",
                pod_id,
                target_node,
                reason,
                if restored.is_ok() { "succeeded" } else { "failed" }
            );
            return Err(ClusterError::InternalInconsistency(format!(
                "admit of pod '{}' on '{}' failed after capacity check: {}",
                pod_id, target_node, reason
            )));
        }

        info!(
            "Moved pod {} from {} to {}",
            pod_id,
            self.nodes[source].name(),
            target_node
        );
        Ok(())
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Synthesize a point-in-time metrics snapshot; never mutates
    pub fn metrics(&self, jitter: &mut dyn JitterSource) -> MetricsSnapshot {
        metrics::synthesize(self, jitter)
    }
}
