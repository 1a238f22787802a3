//! Shared wire types for the control plane
//!
//! Every control-plane response is wrapped in a [`ToolResponse`] envelope so
//! callers branch on `status` instead of handling raw faults.

use serde::{Deserialize, Serialize};

use super::controller::{ClusterError, ErrorKind};
use super::node::Node;
use super::pod::{Pod, PodId, PodStatus};
use super::service::Service;

/// Outcome marker of an envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Ok,
    Error,
}

/// Success/error envelope returned by every control-plane operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    pub status: ResponseStatus,

    /// Human-readable success message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Payload of a successful read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    /// Human-readable failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Failure classification, when it came from the cluster
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl ToolResponse {
    /// Success with a message
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Ok,
            message: Some(message.into()),
            result: None,
            error: None,
            kind: None,
        }
    }

    /// Success carrying a serialized payload
    pub fn with_result<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(result) => Self {
                status: ResponseStatus::Ok,
                message: None,
                result: Some(result),
                error: None,
                kind: None,
            },
            Err(e) => Self::failure(format!("Failed to serialize result: {}", e)),
        }
    }

    /// Failure with a message and no classification
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: None,
            result: None,
            error: Some(error.into()),
            kind: None,
        }
    }

    /// Failure derived from a cluster error
    pub fn from_error(err: &ClusterError) -> Self {
        Self {
            kind: Some(err.kind()),
            ..Self::failure(err.to_string())
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ResponseStatus::Ok
    }
}

/// Response for listing resources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceList<T> {
    /// API version
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Kind (e.g., "NodeList", "PodList")
    pub kind: String,

    /// List of items
    pub items: Vec<T>,
}

impl<T> ResourceList<T> {
    /// Create a new resource list
    pub fn new(kind: impl Into<String>, items: Vec<T>) -> Self {
        Self {
            api_version: super::API_VERSION.to_string(),
            kind: kind.into(),
            items,
        }
    }
}

/// Listing view of a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSummary {
    pub name: String,

    #[serde(rename = "cpuCapacity")]
    pub cpu_capacity: f64,

    #[serde(rename = "memoryCapacity")]
    pub memory_capacity: f64,

    #[serde(rename = "cpuUsage")]
    pub cpu_usage: f64,

    #[serde(rename = "memoryUsage")]
    pub memory_usage: f64,

    /// Resident pod ids
    pub pods: Vec<PodId>,
}

impl From<&Node> for NodeSummary {
    fn from(node: &Node) -> Self {
        Self {
            name: node.name().to_string(),
            cpu_capacity: node.cpu_capacity(),
            memory_capacity: node.memory_capacity(),
            cpu_usage: node.cpu_usage(),
            memory_usage: node.memory_usage(),
            pods: node.pod_ids().cloned().collect(),
        }
    }
}

/// Listing view of a service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub name: String,

    #[serde(rename = "cpuRequest")]
    pub cpu_request: f64,

    #[serde(rename = "memoryRequest")]
    pub memory_request: f64,

    pub replicas: usize,

    #[serde(rename = "runningPods")]
    pub running_pods: usize,
}

impl From<&Service> for ServiceSummary {
    fn from(service: &Service) -> Self {
        let template = service.template();
        Self {
            name: service.name().to_string(),
            cpu_request: template.cpu,
            memory_request: template.memory,
            replicas: service.pod_count(),
            running_pods: service.running_count(),
        }
    }
}

/// Listing view of a pod
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodSummary {
    pub id: PodId,

    pub service: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,

    pub status: PodStatus,

    #[serde(rename = "cpuRequest")]
    pub cpu_request: f64,

    #[serde(rename = "memoryRequest")]
    pub memory_request: f64,
}

impl From<&Pod> for PodSummary {
    fn from(pod: &Pod) -> Self {
        let request = pod.request();
        Self {
            id: pod.id().clone(),
            service: pod.service().to_string(),
            node: pod.node().map(str::to_string),
            status: pod.status(),
            cpu_request: request.cpu,
            memory_request: request.memory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::Cluster;

    #[test]
    fn test_ok_envelope() {
        let response = ToolResponse::ok("Successfully scaled frontend to 3 replicas.");
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["status"], "ok");
        assert!(value["message"].is_string());
        assert!(value.get("error").is_none());
        assert!(response.is_ok());
    }

    #[test]
    fn test_error_envelope() {
        let err = ClusterError::ServiceNotFound("ghost".to_string());
        let response = ToolResponse::from_error(&err);
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["status"], "error");
        assert_eq!(value["error"], "Service 'ghost' not found");
        assert_eq!(value["kind"], "not_found");
        assert!(!response.is_ok());
    }

    #[test]
    fn test_result_envelope() {
        let list: ResourceList<String> = ResourceList::new("StringList", vec!["a".into()]);
        let response = ToolResponse::with_result(&list);

        assert!(response.is_ok());
        assert_eq!(response.result.unwrap()["kind"], "StringList");
    }

    #[test]
    fn test_summaries() {
        let mut cluster = Cluster::new();
        cluster.register_node("node-1", 4.0, 8.0).unwrap();
        cluster.deploy_service("frontend", 2, 1.0, 0.5).unwrap();

        let node = NodeSummary::from(cluster.node("node-1").unwrap());
        assert_eq!(node.pods.len(), 2);
        assert_eq!(node.memory_usage, 1.0);

        let svc = ServiceSummary::from(cluster.service("frontend").unwrap());
        assert_eq!(svc.replicas, 2);
        assert_eq!(svc.running_pods, 2);

        let pod = PodSummary::from(cluster.pods().next().unwrap());
        assert_eq!(pod.node.as_deref(), Some("node-1"));
        assert_eq!(pod.status, PodStatus::Running);
    }
}
