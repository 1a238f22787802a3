//! Node resource - a capacity-bounded host in the simulated cluster
//!
//! A Node:
//! - Is registered once, by name, with fixed CPU and memory capacity
//! - Keeps a keyed collection of resident pods
//! - Admits a pod only if neither resource would exceed capacity
//!
//! The node never holds the pod record itself; that belongs to the owning
//! service. The resident entry carries what the node needs (owning service,
//! resource request) and the pod carries the node's name as a back-reference.

use std::collections::BTreeMap;

use thiserror::Error;

use super::pod::{Pod, PodId, PodStatus, ResourceRequest};

/// Reasons a node refuses or cannot perform a pod mutation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    #[error("node '{node}' has insufficient CPU: requested {requested}, available {available}")]
    InsufficientCpu {
        node: String,
        requested: f64,
        available: f64,
    },

    #[error("node '{node}' has insufficient memory: requested {requested}, available {available}")]
    InsufficientMemory {
        node: String,
        requested: f64,
        available: f64,
    },

    #[error("pod '{0}' is already placed on node '{1}'")]
    AlreadyPlaced(PodId, String),

    #[error("pod '{0}' is not resident on node '{1}'")]
    NotResident(PodId, String),
}

/// What a node records about each pod it hosts
#[derive(Debug, Clone, PartialEq)]
pub struct Resident {
    /// Owning service, used to find the pod record
    pub service: String,

    /// Resources the pod consumes on this node
    pub request: ResourceRequest,
}

/// A Node in the simulated cluster
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: String,
    cpu_capacity: f64,
    memory_capacity: f64,
    residents: BTreeMap<PodId, Resident>,

    /// Refuse every admission regardless of capacity
    #[cfg(test)]
    pub(super) refuse_admission: bool,
}

impl Node {
    /// Create an empty node
    pub fn new(name: impl Into<String>, cpu_capacity: f64, memory_capacity: f64) -> Self {
        Self {
            name: name.into(),
            cpu_capacity,
            memory_capacity,
            residents: BTreeMap::new(),
            #[cfg(test)]
            refuse_admission: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cpu_capacity(&self) -> f64 {
        self.cpu_capacity
    }

    pub fn memory_capacity(&self) -> f64 {
        self.memory_capacity
    }

    /// Sum of resident CPU requests
    pub fn cpu_usage(&self) -> f64 {
        self.residents.values().map(|r| r.request.cpu).sum()
    }

    /// Sum of resident memory requests
    pub fn memory_usage(&self) -> f64 {
        self.residents.values().map(|r| r.request.memory).sum()
    }

    pub fn pod_count(&self) -> usize {
        self.residents.len()
    }

    /// Check whether `pod_id` is resident here
    pub fn hosts(&self, pod_id: &PodId) -> bool {
        self.residents.contains_key(pod_id)
    }

    pub fn resident(&self, pod_id: &PodId) -> Option<&Resident> {
        self.residents.get(pod_id)
    }

    /// Resident pod ids, ordered by id
    pub fn pod_ids(&self) -> impl Iterator<Item = &PodId> {
        self.residents.keys()
    }

    /// Check that `request` fits into the remaining capacity without mutating
    pub fn check_fit(&self, request: &ResourceRequest) -> Result<(), NodeError> {
        let cpu_usage = self.cpu_usage();
        if cpu_usage + request.cpu > self.cpu_capacity {
            return Err(NodeError::InsufficientCpu {
                node: self.name.clone(),
                requested: request.cpu,
                available: self.cpu_capacity - cpu_usage,
            });
        }

        let memory_usage = self.memory_usage();
        if memory_usage + request.memory > self.memory_capacity {
            return Err(NodeError::InsufficientMemory {
                node: self.name.clone(),
                requested: request.memory,
                available: self.memory_capacity - memory_usage,
            });
        }

        Ok(())
    }

    /// Admit `pod` if it fits, marking it Running on this node
    ///
    /// On failure neither the node nor the pod is changed.
    pub fn try_admit(&mut self, pod: &mut Pod) -> Result<(), NodeError> {
        if let Some(host) = &pod.node {
            return Err(NodeError::AlreadyPlaced(pod.id().clone(), host.clone()));
        }

        self.check_fit(&pod.request())?;
        if self.admission_refused() {
            let cpu_usage = self.cpu_usage();
            return Err(NodeError::InsufficientCpu {
                node: self.name.clone(),
                requested: pod.request().cpu,
                available: self.cpu_capacity - cpu_usage,
            });
        }

        self.residents.insert(
            pod.id().clone(),
            Resident {
                service: pod.service().to_string(),
                request: pod.request(),
            },
        );
        pod.node = Some(self.name.clone());
        pod.status = PodStatus::Running;
        Ok(())
    }

    #[cfg(test)]
    fn admission_refused(&self) -> bool {
        self.refuse_admission
    }

    #[cfg(not(test))]
    fn admission_refused(&self) -> bool {
        false
    }

    /// Detach a resident pod, marking it Pending
    pub fn evict(&mut self, pod: &mut Pod) -> Result<(), NodeError> {
        let hosted_here = pod.node.as_deref() == Some(self.name.as_str());
        if !hosted_here || self.residents.remove(pod.id()).is_none() {
            return Err(NodeError::NotResident(pod.id().clone(), self.name.clone()));
        }

        pod.node = None;
        pod.status = PodStatus::Pending;
        Ok(())
    }
}
