//! Control Plane API Server
//!
//! Exposes the cluster operations over REST:
//! - Nodes: register, list
//! - Services: deploy, list, scale
//! - Pods: list, move
//! - Observation: metrics, SLA report
//! - Cost evaluation
//!
//! Every body is a [`ToolResponse`] envelope, including rejected request
//! bodies and unknown routes. Cluster errors are translated here; the
//! controller itself only returns `ClusterError`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{StatusCode, Uri},
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tower_http::trace::TraceLayer;

use super::{
    controller::{Cluster, ClusterError, ErrorKind},
    cost::evaluate_service_cost,
    resources::{NodeSummary, PodSummary, ResourceList, ServiceSummary, ToolResponse},
};
use crate::metrics::{JitterSource, MetricsSnapshot, RandomJitter, SlaPolicy};

/// Cluster shared across request handlers
///
/// One lock covers the whole cluster: writes take it exclusively, metrics
/// take it shared, so no reader sees a move half done.
pub type SharedCluster = Arc<RwLock<Cluster>>;

/// Jitter source shared across request handlers
pub type SharedJitter = Arc<Mutex<Box<dyn JitterSource + Send>>>;

/// Shared state for the control plane API
#[derive(Clone)]
pub struct ControlPlaneState {
    pub cluster: SharedCluster,
    pub jitter: SharedJitter,
    pub sla: Arc<SlaPolicy>,
}

impl ControlPlaneState {
    /// Wrap `cluster` with entropy-seeded jitter and the default SLA policy
    pub fn new(cluster: Cluster) -> Self {
        let jitter: Box<dyn JitterSource + Send> = Box::new(RandomJitter::from_entropy());
        Self {
            cluster: Arc::new(RwLock::new(cluster)),
            jitter: Arc::new(Mutex::new(jitter)),
            sla: Arc::new(SlaPolicy::default()),
        }
    }

    /// Replace the jitter source
    pub fn with_jitter(mut self, jitter: impl JitterSource + Send + 'static) -> Self {
        let jitter: Box<dyn JitterSource + Send> = Box::new(jitter);
        self.jitter = Arc::new(Mutex::new(jitter));
        self
    }

    /// Replace the SLA policy
    pub fn with_sla(mut self, sla: SlaPolicy) -> Self {
        self.sla = Arc::new(sla);
        self
    }

    /// Take a metrics snapshot under the shared lock
    pub async fn snapshot(&self) -> MetricsSnapshot {
        let cluster = self.cluster.read().await;
        let mut jitter = self.jitter.lock().await;
        cluster.metrics(&mut **jitter)
    }
}

impl Default for ControlPlaneState {
    fn default() -> Self {
        Self::new(Cluster::new())
    }
}

/// Create the control plane router
pub fn create_control_plane_router(state: ControlPlaneState) -> Router {
    Router::new()
        // Observation
        .route("/v1/metrics", get(get_metrics))
        .route("/v1/sla", get(sla_report))
        // Nodes
        .route("/v1/nodes", get(list_nodes).post(register_node))
        // Services
        .route("/v1/services", get(list_services).post(deploy_service))
        .route("/v1/services/{name}/scale", patch(scale_service))
        // Pods
        .route("/v1/pods", get(list_pods))
        .route("/v1/pods/{id}/move", post(move_pod))
        // Cost
        .route("/v1/cost", post(evaluate_cost))
        // Health check
        .route("/health", get(health_check))
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP status for a failed operation
fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::AlreadyExists => StatusCode::CONFLICT,
        ErrorKind::CapacityExceeded => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorKind::InternalInconsistency => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &ClusterError) -> (StatusCode, Json<ToolResponse>) {
    (status_for(err.kind()), Json(ToolResponse::from_error(err)))
}

/// Envelope for a body axum could not decode
fn rejection_response(rejection: JsonRejection) -> (StatusCode, Json<ToolResponse>) {
    let envelope = ToolResponse {
        kind: Some(ErrorKind::InvalidArgument),
        ..ToolResponse::failure(rejection.body_text())
    };
    (StatusCode::BAD_REQUEST, Json(envelope))
}

async fn route_not_found(uri: Uri) -> (StatusCode, Json<ToolResponse>) {
    let envelope = ToolResponse {
        kind: Some(ErrorKind::NotFound),
        ..ToolResponse::failure(format!("No route for {}", uri.path()))
    };
    (StatusCode::NOT_FOUND, Json(envelope))
}

// ============================================================================
// Health & Observation
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(ToolResponse::ok("healthy"))
}

async fn get_metrics(State(state): State<ControlPlaneState>) -> impl IntoResponse {
    let snapshot = state.snapshot().await;
    Json(ToolResponse::with_result(&snapshot))
}

async fn sla_report(State(state): State<ControlPlaneState>) -> impl IntoResponse {
    let snapshot = state.snapshot().await;
    let report = state.sla.evaluate(&snapshot);
    Json(ToolResponse::with_result(&report))
}

// ============================================================================
// Node Endpoints
// ============================================================================

/// Body of `POST /v1/nodes`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterNodeRequest {
    pub name: String,
    #[serde(rename = "cpuCapacity")]
    pub cpu_capacity: f64,
    #[serde(rename = "memoryCapacity")]
    pub memory_capacity: f64,
}

async fn list_nodes(State(state): State<ControlPlaneState>) -> impl IntoResponse {
    let cluster = state.cluster.read().await;
    let nodes: Vec<NodeSummary> = cluster.nodes().map(NodeSummary::from).collect();
    Json(ToolResponse::with_result(&ResourceList::new("NodeList", nodes)))
}

async fn register_node(
    State(state): State<ControlPlaneState>,
    payload: Result<Json<RegisterNodeRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };
    let mut cluster = state.cluster.write().await;
    match cluster.register_node(req.name.clone(), req.cpu_capacity, req.memory_capacity) {
        Ok(()) => (
            StatusCode::CREATED,
            Json(ToolResponse::ok(format!("Registered node '{}'.", req.name))),
        ),
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// Service Endpoints
// ============================================================================

/// Body of `POST /v1/services`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployServiceRequest {
    pub name: String,
    pub replicas: u32,
    #[serde(rename = "cpuRequest")]
    pub cpu_request: f64,
    #[serde(rename = "memoryRequest")]
    pub memory_request: f64,
}

/// Body of `PATCH /v1/services/{name}/scale`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleRequest {
    pub replicas: u32,
}

async fn list_services(State(state): State<ControlPlaneState>) -> impl IntoResponse {
    let cluster = state.cluster.read().await;
    let services: Vec<ServiceSummary> = cluster.services().map(ServiceSummary::from).collect();
    Json(ToolResponse::with_result(&ResourceList::new(
        "ServiceList",
        services,
    )))
}

async fn deploy_service(
    State(state): State<ControlPlaneState>,
    payload: Result<Json<DeployServiceRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };
    let mut cluster = state.cluster.write().await;
    match cluster.deploy_service(
        req.name.clone(),
        req.replicas,
        req.cpu_request,
        req.memory_request,
    ) {
        Ok(()) => (
            StatusCode::CREATED,
            Json(ToolResponse::ok(format!(
                "Successfully deployed service '{}'.",
                req.name
            ))),
        ),
        Err(e) => error_response(&e),
    }
}

async fn scale_service(
    State(state): State<ControlPlaneState>,
    Path(name): Path<String>,
    payload: Result<Json<ScaleRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };
    let mut cluster = state.cluster.write().await;
    match cluster.scale_service(&name, req.replicas) {
        Ok(()) => {
            let running = cluster
                .service(&name)
                .map(|s| s.running_count())
                .unwrap_or_default();
            (
                StatusCode::OK,
                Json(ToolResponse::ok(format!(
                    "Successfully scaled {} to {} replicas ({} running).",
                    name, req.replicas, running
                ))),
            )
        }
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// Pod Endpoints
// ============================================================================

/// Body of `POST /v1/pods/{id}/move`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    #[serde(rename = "targetNode")]
    pub target_node: String,
}

async fn list_pods(State(state): State<ControlPlaneState>) -> impl IntoResponse {
    let cluster = state.cluster.read().await;
    let pods: Vec<PodSummary> = cluster.pods().map(PodSummary::from).collect();
    Json(ToolResponse::with_result(&ResourceList::new("PodList", pods)))
}

async fn move_pod(
    State(state): State<ControlPlaneState>,
    Path(id): Path<String>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };
    let mut cluster = state.cluster.write().await;
    match cluster.move_pod(&id, &req.target_node) {
        Ok(()) => (
            StatusCode::OK,
            Json(ToolResponse::ok(format!(
                "Successfully moved pod {} to {}.",
                id, req.target_node
            ))),
        ),
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// Cost Endpoint
// ============================================================================

/// Body of `POST /v1/cost`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostRequest {
    #[serde(rename = "cpuRequest")]
    pub cpu_request: f64,
    #[serde(rename = "memoryRequest")]
    pub memory_request: f64,
}

async fn evaluate_cost(payload: Result<Json<CostRequest>, JsonRejection>) -> impl IntoResponse {
    let Json(req) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };
    let estimate = evaluate_service_cost(req.cpu_request, req.memory_request);
    (StatusCode::OK, Json(ToolResponse::with_result(&estimate)))
}
