//! # Simulated Cluster
//!
//! A single-process model of a capacity-bounded cluster. Nothing runs:
//! pods are bookkeeping records, and placement is decided by first-fit
//! against each node's declared CPU and memory.
//!
//! ## Core Resources
//!
//! - **Node**: a named host with fixed CPU and memory capacity
//! - **Service**: a named group of identical pods with a per-pod request
//! - **Pod**: one replica, either Running on exactly one node or Pending
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                  kubesim Control Plane                 │
//! │                    (kubesim serve)                     │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  │
//! │  │ API Server   │  │ Cluster      │  │ Metrics      │  │
//! │  │ :8181        │  │ (first-fit)  │  │ Synthesizer  │  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage never exceeds capacity on any node. Operations that would break
//! that either leave pods Pending (scaling) or are refused (moves).

pub mod api;
pub mod controller;
pub mod cost;
pub mod node;
pub mod pod;
pub mod resources;
pub mod scheduler;
pub mod service;

pub use api::{create_control_plane_router, ControlPlaneState};
pub use controller::{Cluster, ClusterError, ErrorKind};
pub use cost::{evaluate_service_cost, CostEstimate, Viability};
pub use node::{Node, NodeError};
pub use pod::{Pod, PodId, PodStatus, ResourceRequest};
pub use resources::*;
pub use service::Service;

/// API version reported in resource lists
pub const API_VERSION: &str = "kubesim/v1";

/// Default control plane API port
pub const CONTROL_PLANE_PORT: u16 = 8181;
