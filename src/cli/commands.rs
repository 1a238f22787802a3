//! Command implementations for the CLI
//!
//! SBIO pattern: Commands return Results, I/O is handled by caller

use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::cluster::api::{
    CostRequest, DeployServiceRequest, MoveRequest, RegisterNodeRequest, ScaleRequest,
};
use crate::cluster::{
    CostEstimate, ErrorKind, NodeSummary, PodSummary, ResourceList, ServiceSummary, ToolResponse,
};
use crate::config::load_cluster_config;
use crate::metrics::{MetricsSnapshot, SlaReport};

/// Errors that can occur during command execution
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The control plane answered with an error envelope
    #[error("{message}")]
    Server {
        message: String,
        kind: Option<ErrorKind>,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid control plane URL: {0}")]
    InvalidUrl(String),
}

/// Result type for commands
pub type CommandResult<T> = Result<T, CommandError>;

// ============================================================================
// Envelope decoding (pure)
// ============================================================================

/// Turn an error envelope into `CommandError::Server`
pub fn check_envelope(envelope: ToolResponse) -> CommandResult<ToolResponse> {
    if envelope.is_ok() {
        return Ok(envelope);
    }
    Err(CommandError::Server {
        message: envelope
            .error
            .unwrap_or_else(|| "Unknown error".to_string()),
        kind: envelope.kind,
    })
}

/// Extract and decode the `result` payload of a success envelope
pub fn envelope_result<T: DeserializeOwned>(envelope: ToolResponse) -> CommandResult<T> {
    let envelope = check_envelope(envelope)?;
    let result = envelope
        .result
        .ok_or_else(|| CommandError::MalformedResponse("missing result".to_string()))?;
    Ok(serde_json::from_value(result)?)
}

/// Extract the `message` of a success envelope
pub fn envelope_message(envelope: ToolResponse) -> CommandResult<String> {
    let envelope = check_envelope(envelope)?;
    Ok(envelope.message.unwrap_or_default())
}

// ============================================================================
// Validate Commands
// ============================================================================

/// Result of validating a cluster file
#[derive(Debug)]
pub struct ValidationResult {
    pub valid: bool,
    pub nodes: usize,
    pub services: usize,
    pub running_pods: usize,
    pub pending_pods: usize,
    pub error: Option<String>,
}

/// Parse a cluster file and build it locally without serving it
pub fn validate_cluster_file(path: &Path) -> ValidationResult {
    let built = load_cluster_config(path)
        .map_err(|e| e.to_string())
        .and_then(|config| config.build_cluster().map_err(|e| e.to_string()));

    match built {
        Ok(cluster) => {
            let running_pods = cluster.pods().filter(|p| p.is_running()).count();
            ValidationResult {
                valid: true,
                nodes: cluster.nodes().count(),
                services: cluster.services().count(),
                running_pods,
                pending_pods: cluster.pods().count() - running_pods,
                error: None,
            }
        }
        Err(error) => ValidationResult {
            valid: false,
            nodes: 0,
            services: 0,
            running_pods: 0,
            pending_pods: 0,
            error: Some(error),
        },
    }
}

// ============================================================================
// HTTP Client for Control Plane
// ============================================================================

/// Client for communicating with the control plane
pub struct ControlPlaneClient {
    client: reqwest::Client,
    base_url: String,
}

impl ControlPlaneClient {
    /// Create a new client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve path segments against the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> CommandResult<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| CommandError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| CommandError::InvalidUrl(self.base_url.clone()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn build_request(
        &self,
        method: reqwest::Method,
        segments: &[&str],
    ) -> CommandResult<reqwest::RequestBuilder> {
        Ok(self.client.request(method, self.endpoint(segments)?))
    }

    /// Send a request and decode the envelope, whatever the HTTP status
    async fn send(&self, req: reqwest::RequestBuilder) -> CommandResult<ToolResponse> {
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        serde_json::from_slice(&body)
            .map_err(|e| CommandError::MalformedResponse(format!("{} from server: {}", status, e)))
    }

    /// Check the control plane is reachable
    pub async fn health(&self) -> CommandResult<bool> {
        let resp = self
            .build_request(reqwest::Method::GET, &["health"])?
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Fetch a metrics snapshot
    pub async fn metrics(&self) -> CommandResult<MetricsSnapshot> {
        let envelope = self
            .send(self.build_request(reqwest::Method::GET, &["v1", "metrics"])?)
            .await?;
        envelope_result(envelope)
    }

    /// Evaluate the SLA policy over a fresh snapshot
    pub async fn sla(&self) -> CommandResult<SlaReport> {
        let envelope = self
            .send(self.build_request(reqwest::Method::GET, &["v1", "sla"])?)
            .await?;
        envelope_result(envelope)
    }

    /// List nodes
    pub async fn list_nodes(&self) -> CommandResult<Vec<NodeSummary>> {
        let envelope = self
            .send(self.build_request(reqwest::Method::GET, &["v1", "nodes"])?)
            .await?;
        let list: ResourceList<NodeSummary> = envelope_result(envelope)?;
        Ok(list.items)
    }

    /// Register a node
    pub async fn register_node(
        &self,
        name: &str,
        cpu_capacity: f64,
        memory_capacity: f64,
    ) -> CommandResult<String> {
        let body = RegisterNodeRequest {
            name: name.to_string(),
            cpu_capacity,
            memory_capacity,
        };
        let envelope = self
            .send(self.build_request(reqwest::Method::POST, &["v1", "nodes"])?.json(&body))
            .await?;
        envelope_message(envelope)
    }

    /// List services
    pub async fn list_services(&self) -> CommandResult<Vec<ServiceSummary>> {
        let envelope = self
            .send(self.build_request(reqwest::Method::GET, &["v1", "services"])?)
            .await?;
        let list: ResourceList<ServiceSummary> = envelope_result(envelope)?;
        Ok(list.items)
    }

    /// Deploy a service
    pub async fn deploy_service(
        &self,
        name: &str,
        replicas: u32,
        cpu_request: f64,
        memory_request: f64,
    ) -> CommandResult<String> {
        let body = DeployServiceRequest {
            name: name.to_string(),
            replicas,
            cpu_request,
            memory_request,
        };
        let envelope = self
            .send(
                self.build_request(reqwest::Method::POST, &["v1", "services"])?
                    .json(&body),
            )
            .await?;
        envelope_message(envelope)
    }

    /// Scale a service
    pub async fn scale_service(&self, name: &str, replicas: u32) -> CommandResult<String> {
        let envelope = self
            .send(
                self.build_request(reqwest::Method::PATCH, &["v1", "services", name, "scale"])?
                    .json(&ScaleRequest { replicas }),
            )
            .await?;
        envelope_message(envelope)
    }

    /// List pods
    pub async fn list_pods(&self) -> CommandResult<Vec<PodSummary>> {
        let envelope = self
            .send(self.build_request(reqwest::Method::GET, &["v1", "pods"])?)
            .await?;
        let list: ResourceList<PodSummary> = envelope_result(envelope)?;
        Ok(list.items)
    }

    /// Move a running pod to another node
    pub async fn move_pod(&self, pod_id: &str, target_node: &str) -> CommandResult<String> {
        let body = MoveRequest {
            target_node: target_node.to_string(),
        };
        let envelope = self
            .send(
                self.build_request(reqwest::Method::POST, &["v1", "pods", pod_id, "move"])?
                    .json(&body),
            )
            .await?;
        envelope_message(envelope)
    }

    /// Estimate cost of a per-pod request
    pub async fn evaluate_cost(
        &self,
        cpu_request: f64,
        memory_request: f64,
    ) -> CommandResult<CostEstimate> {
        let body = CostRequest {
            cpu_request,
            memory_request,
        };
        let envelope = self
            .send(self.build_request(reqwest::Method::POST, &["v1", "cost"])?.json(&body))
            .await?;
        envelope_result(envelope)
    }
}
