//! Service resource - a named pod template plus its instantiated pods
//!
//! Pods are kept in a keyed collection alongside an explicit creation-order
//! sequence, so "the oldest N pods" is well defined for scale-down.

use std::collections::HashMap;

use super::pod::{Pod, PodId, ResourceRequest};

/// A Service in the simulated cluster
#[derive(Debug, Clone)]
pub struct Service {
    name: String,
    template: ResourceRequest,
    pods: HashMap<PodId, Pod>,
    order: Vec<PodId>,
}

impl Service {
    /// Create a service with no pods
    pub fn new(name: impl Into<String>, template: ResourceRequest) -> Self {
        Self {
            name: name.into(),
            template,
            pods: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Per-pod resource request
    pub fn template(&self) -> ResourceRequest {
        self.template
    }

    /// Number of pods, running or pending
    pub fn pod_count(&self) -> usize {
        self.order.len()
    }

    pub fn running_count(&self) -> usize {
        self.pods.values().filter(|p| p.is_running()).count()
    }

    pub fn pod(&self, id: &PodId) -> Option<&Pod> {
        self.pods.get(id)
    }

    /// Pods in creation order
    pub fn pods(&self) -> impl Iterator<Item = &Pod> {
        self.order.iter().filter_map(|id| self.pods.get(id))
    }

    pub(super) fn pod_mut(&mut self, id: &PodId) -> Option<&mut Pod> {
        self.pods.get_mut(id)
    }

    /// Instantiate a new pending pod from the template
    pub(super) fn spawn_pod(&mut self) -> &mut Pod {
        let pod = Pod::new(self.name.clone(), self.template);
        let id = pod.id().clone();
        self.order.push(id.clone());
        self.pods.entry(id).or_insert(pod)
    }

    /// Ids of the `count` oldest pods
    pub(super) fn oldest(&self, count: usize) -> Vec<PodId> {
        self.order.iter().take(count).cloned().collect()
    }

    /// Drop a pod from the service entirely
    pub(super) fn remove_pod(&mut self, id: &PodId) -> Option<Pod> {
        let pod = self.pods.remove(id)?;
        self.order.retain(|p| p != id);
        Some(pod)
    }
}
