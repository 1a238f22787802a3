//! Synthetic telemetry for the simulated cluster
//!
//! This module derives a point-in-time observability snapshot from current
//! placement. Nothing is measured: latency is a function of node CPU
//! utilization plus a jitter term, and completion rate is a function of
//! latency.
//!
//! Figures are computed in dependency order:
//! 1. per-node utilization and latency
//! 2. per-service latency, averaged over the nodes hosting its running pods
//! 3. cluster-wide aggregates

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cluster::Cluster;

mod jitter;
pub mod sla;

pub use jitter::{FixedJitter, JitterSource, RandomJitter};
pub use sla::{SlaPolicy, SlaReport, SlaViolation};

/// Latency of an idle node, in milliseconds
pub const BASE_LATENCY_MS: f64 = 20.0;

/// Extra latency per percentage point of CPU utilization
pub const LATENCY_PER_UTILIZATION_PCT: f64 = 1.0;

/// Jitter is drawn uniformly from `[-JITTER_BOUND_MS, JITTER_BOUND_MS]`
pub const JITTER_BOUND_MS: f64 = 5.0;

/// Each millisecond of latency costs `1 / COMPLETION_LATENCY_DIVISOR` percent
/// of completed requests
pub const COMPLETION_LATENCY_DIVISOR: f64 = 5.0;

/// Point-in-time metrics for the whole cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Per-node figures, keyed by node name
    pub nodes: BTreeMap<String, NodeMetrics>,

    /// Per-service figures, keyed by service name
    pub services: BTreeMap<String, ServiceMetrics>,

    /// Cluster-wide aggregates
    pub cluster: ClusterMetrics,
}

/// Synthetic metrics for one node
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NodeMetrics {
    #[serde(rename = "cpuUsage")]
    pub cpu_usage: f64,

    #[serde(rename = "cpuCapacity")]
    pub cpu_capacity: f64,

    /// CPU utilization percentage (0.0 - 100.0)
    #[serde(rename = "cpuUtilizationPct")]
    pub cpu_utilization_pct: f64,

    #[serde(rename = "memoryUsage")]
    pub memory_usage: f64,

    #[serde(rename = "podCount")]
    pub pod_count: usize,

    #[serde(rename = "latencyMs")]
    pub latency_ms: f64,
}

/// Synthetic metrics for one service
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServiceMetrics {
    /// All pods, running or pending
    #[serde(rename = "podCount")]
    pub pod_count: usize,

    #[serde(rename = "runningPods")]
    pub running_pods: usize,

    /// Mean latency of the nodes hosting this service's running pods
    #[serde(rename = "avgLatencyMs")]
    pub avg_latency_ms: f64,

    /// Percentage of requests completed (0.0 - 100.0)
    #[serde(rename = "requestCompletionRate")]
    pub request_completion_rate: f64,
}

/// Cluster-wide aggregates
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClusterMetrics {
    #[serde(rename = "totalNodes")]
    pub total_nodes: usize,

    /// Pods resident on some node
    #[serde(rename = "totalPods")]
    pub total_pods: usize,

    #[serde(rename = "overallCpuUtilizationPct")]
    pub overall_cpu_utilization_pct: f64,
}

/// `usage / capacity` as a percentage, 0 when capacity is 0
pub fn utilization_pct(usage: f64, capacity: f64) -> f64 {
    if capacity > 0.0 {
        usage / capacity * 100.0
    } else {
        0.0
    }
}

/// Synthetic latency for a node at `utilization_pct`
pub fn node_latency_ms(utilization_pct: f64, jitter: &mut dyn JitterSource) -> f64 {
    BASE_LATENCY_MS
        + utilization_pct * LATENCY_PER_UTILIZATION_PCT
        + jitter.sample(JITTER_BOUND_MS)
}

/// Completion rate for a service with average latency `avg_latency_ms`
pub fn request_completion_rate(avg_latency_ms: f64) -> f64 {
    (100.0 - avg_latency_ms / COMPLETION_LATENCY_DIVISOR).max(0.0)
}

/// Build a snapshot of `cluster`, drawing one jitter sample per node
pub fn synthesize(cluster: &Cluster, jitter: &mut dyn JitterSource) -> MetricsSnapshot {
    let mut nodes = BTreeMap::new();
    let mut total_cpu_usage = 0.0;
    let mut total_cpu_capacity = 0.0;
    let mut total_pods = 0;

    for node in cluster.nodes() {
        let cpu_usage = node.cpu_usage();
        let cpu_utilization_pct = utilization_pct(cpu_usage, node.cpu_capacity());

        nodes.insert(
            node.name().to_string(),
            NodeMetrics {
                cpu_usage,
                cpu_capacity: node.cpu_capacity(),
                cpu_utilization_pct,
                memory_usage: node.memory_usage(),
                pod_count: node.pod_count(),
                latency_ms: node_latency_ms(cpu_utilization_pct, jitter),
            },
        );

        total_cpu_usage += cpu_usage;
        total_cpu_capacity += node.cpu_capacity();
        total_pods += node.pod_count();
    }

    let services = cluster
        .services()
        .map(|service| {
            let latencies: Vec<f64> = service
                .pods()
                .filter_map(|pod| pod.node())
                .filter_map(|host| nodes.get(host))
                .map(|m: &NodeMetrics| m.latency_ms)
                .collect();

            let avg_latency_ms = if latencies.is_empty() {
                0.0
            } else {
                latencies.iter().sum::<f64>() / latencies.len() as f64
            };

            let metrics = ServiceMetrics {
                pod_count: service.pod_count(),
                running_pods: latencies.len(),
                avg_latency_ms,
                request_completion_rate: request_completion_rate(avg_latency_ms),
            };
            (service.name().to_string(), metrics)
        })
        .collect();

    MetricsSnapshot {
        timestamp: Utc::now(),
        nodes,
        services,
        cluster: ClusterMetrics {
            total_nodes: cluster.nodes().count(),
            total_pods,
            overall_cpu_utilization_pct: utilization_pct(total_cpu_usage, total_cpu_capacity),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_cluster() {
        let cluster = Cluster::new();
        let snapshot = synthesize(&cluster, &mut FixedJitter(0.0));

        assert!(snapshot.nodes.is_empty());
        assert!(snapshot.services.is_empty());
        assert_eq!(snapshot.cluster.total_nodes, 0);
        assert_eq!(snapshot.cluster.overall_cpu_utilization_pct, 0.0);
    }

    #[test]
    fn test_node_latency_formula() {
        let mut cluster = Cluster::new();
        cluster.register_node("node-1", 4.0, 8.0).unwrap();
        cluster.deploy_service("frontend", 2, 1.0, 1.0).unwrap();

        let snapshot = synthesize(&cluster, &mut FixedJitter(3.0));
        let node = &snapshot.nodes["node-1"];

        assert!(approx(node.cpu_utilization_pct, 50.0));
        assert!(approx(node.latency_ms, 20.0 + 50.0 + 3.0));
        assert_eq!(node.pod_count, 2);
        assert!(approx(node.memory_usage, 2.0));
    }

    #[test]
    fn test_zero_capacity_node() {
        let mut cluster = Cluster::new();
        cluster.register_node("empty", 0.0, 0.0).unwrap();

        let snapshot = synthesize(&cluster, &mut FixedJitter(0.0));

        assert_eq!(snapshot.nodes["empty"].cpu_utilization_pct, 0.0);
        assert_eq!(snapshot.nodes["empty"].latency_ms, BASE_LATENCY_MS);
        assert_eq!(snapshot.cluster.overall_cpu_utilization_pct, 0.0);
    }

    #[test]
    fn test_service_latency_averages_hosting_nodes() {
        let mut cluster = Cluster::new();
        cluster.register_node("node-1", 2.0, 8.0).unwrap();
        cluster.register_node("node-2", 4.0, 8.0).unwrap();
        // node-1 full (100%), node-2 gets one pod (25%)
        cluster.deploy_service("frontend", 3, 1.0, 1.0).unwrap();

        let snapshot = synthesize(&cluster, &mut FixedJitter(0.0));
        let svc = &snapshot.services["frontend"];

        let expected = (120.0 + 120.0 + 45.0) / 3.0;
        assert!(approx(svc.avg_latency_ms, expected));
        assert!(approx(svc.request_completion_rate, 100.0 - expected / 5.0));
        assert_eq!(svc.running_pods, 3);
    }

    #[test]
    fn test_service_without_running_pods() {
        let mut cluster = Cluster::new();
        cluster.register_node("node-1", 1.0, 1.0).unwrap();
        cluster.deploy_service("huge", 2, 8.0, 8.0).unwrap();

        let snapshot = synthesize(&cluster, &mut FixedJitter(0.0));
        let svc = &snapshot.services["huge"];

        assert_eq!(svc.pod_count, 2);
        assert_eq!(svc.running_pods, 0);
        assert_eq!(svc.avg_latency_ms, 0.0);
        assert_eq!(svc.request_completion_rate, 100.0);
    }

    #[test]
    fn test_completion_rate_floor() {
        assert_eq!(request_completion_rate(1000.0), 0.0);
        assert!(approx(request_completion_rate(50.0), 90.0));
    }

    #[test]
    fn test_cluster_aggregates() {
        let mut cluster = Cluster::new();
        cluster.register_node("node-1", 4.0, 8.0).unwrap();
        cluster.register_node("node-2", 4.0, 8.0).unwrap();
        cluster.deploy_service("frontend", 6, 1.0, 1.0).unwrap();

        let snapshot = synthesize(&cluster, &mut FixedJitter(0.0));

        assert_eq!(snapshot.cluster.total_nodes, 2);
        assert_eq!(snapshot.cluster.total_pods, 6);
        assert!(approx(snapshot.cluster.overall_cpu_utilization_pct, 75.0));
    }

    #[test]
    fn test_seeded_snapshots_match() {
        let mut cluster = Cluster::new();
        cluster.register_node("node-1", 4.0, 8.0).unwrap();
        cluster.register_node("node-2", 4.0, 8.0).unwrap();
        cluster.deploy_service("frontend", 5, 1.0, 1.0).unwrap();

        let a = synthesize(&cluster, &mut RandomJitter::seeded(99));
        let b = synthesize(&cluster, &mut RandomJitter::seeded(99));

        assert_eq!(a.nodes["node-1"].latency_ms, b.nodes["node-1"].latency_ms);
        assert_eq!(a.nodes["node-2"].latency_ms, b.nodes["node-2"].latency_ms);
        assert_eq!(
            a.services["frontend"].avg_latency_ms,
            b.services["frontend"].avg_latency_ms
        );
    }

    #[test]
    fn test_snapshot_wire_names() {
        let mut cluster = Cluster::new();
        cluster.register_node("node-1", 4.0, 8.0).unwrap();
        cluster.deploy_service("frontend", 1, 1.0, 1.0).unwrap();

        let value = serde_json::to_value(synthesize(&cluster, &mut FixedJitter(0.0))).unwrap();

        assert!(value["timestamp"].is_string());
        assert!(value["nodes"]["node-1"]["cpuUtilizationPct"].is_number());
        assert!(value["nodes"]["node-1"]["latencyMs"].is_number());
        assert_eq!(value["services"]["frontend"]["runningPods"], 1);
        assert!(value["services"]["frontend"]["requestCompletionRate"].is_number());
        assert_eq!(value["cluster"]["totalNodes"], 1);
        assert!(value["cluster"]["overallCpuUtilizationPct"].is_number());
    }
}
