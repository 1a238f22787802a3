//! SLA evaluation over a metrics snapshot
//!
//! Reports which thresholds a snapshot breaks. Nothing here acts on the
//! report; deciding what to scale or move is up to the caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::MetricsSnapshot;

/// Latency and utilization thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaPolicy {
    /// Node CPU utilization above this percentage is a violation
    #[serde(rename = "nodeCpuUtilizationPct")]
    #[serde(default = "default_node_cpu_utilization_pct")]
    pub node_cpu_utilization_pct: f64,

    /// Per-service ceiling on average latency, in milliseconds
    #[serde(rename = "serviceLatencyMs")]
    #[serde(default)]
    pub service_latency_ms: BTreeMap<String, f64>,
}

fn default_node_cpu_utilization_pct() -> f64 {
    80.0
}

impl Default for SlaPolicy {
    fn default() -> Self {
        let mut service_latency_ms = BTreeMap::new();
        service_latency_ms.insert("frontend".to_string(), 100.0);
        service_latency_ms.insert("backend".to_string(), 150.0);
        Self {
            node_cpu_utilization_pct: default_node_cpu_utilization_pct(),
            service_latency_ms,
        }
    }
}

/// A single broken threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SlaViolation {
    /// Node CPU utilization above the policy ceiling
    NodeCpu {
        node: String,
        #[serde(rename = "utilizationPct")]
        utilization_pct: f64,
        #[serde(rename = "thresholdPct")]
        threshold_pct: f64,
    },
    /// Service average latency above its ceiling
    ServiceLatency {
        service: String,
        #[serde(rename = "latencyMs")]
        latency_ms: f64,
        #[serde(rename = "thresholdMs")]
        threshold_ms: f64,
    },
    /// Service has pods that no node could host
    PendingPods {
        service: String,
        pending: usize,
    },
}

/// Result of evaluating a snapshot against a policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaReport {
    pub healthy: bool,
    pub violations: Vec<SlaViolation>,
}

impl SlaPolicy {
    /// Collect every violation in `snapshot`
    pub fn evaluate(&self, snapshot: &MetricsSnapshot) -> SlaReport {
        let mut violations = Vec::new();

        for (name, node) in &snapshot.nodes {
            if node.cpu_utilization_pct > self.node_cpu_utilization_pct {
                violations.push(SlaViolation::NodeCpu {
                    node: name.clone(),
                    utilization_pct: node.cpu_utilization_pct,
                    threshold_pct: self.node_cpu_utilization_pct,
                });
            }
        }

        for (name, service) in &snapshot.services {
            if let Some(&threshold) = self.service_latency_ms.get(name) {
                if service.avg_latency_ms > threshold {
                    violations.push(SlaViolation::ServiceLatency {
                        service: name.clone(),
                        latency_ms: service.avg_latency_ms,
                        threshold_ms: threshold,
                    });
                }
            }
            if service.running_pods < service.pod_count {
                violations.push(SlaViolation::PendingPods {
                    service: name.clone(),
                    pending: service.pod_count - service.running_pods,
                });
            }
        }

        SlaReport {
            healthy: violations.is_empty(),
            violations,
        }
    }
}
