//! kubesim: a simulated, capacity-bounded cluster
//!
//! Nodes with fixed CPU and memory, services made of identical pods placed by
//! first-fit, and synthetic latency telemetry derived from utilization. The
//! cluster is served over a small REST control plane and driven by a
//! kubectl-like CLI.

pub mod cli;
pub mod cluster;
pub mod config;
pub mod metrics;
