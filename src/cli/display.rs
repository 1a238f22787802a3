//! Display formatting for CLI output
//!
//! SBIO pattern: Pure functions that format data for display

use super::commands::ValidationResult;
use crate::cluster::{CostEstimate, NodeSummary, PodSummary, ServiceSummary};
use crate::metrics::{MetricsSnapshot, SlaReport, SlaViolation};

// ============================================================================
// Table formatting helpers
// ============================================================================

/// Format a simple table with headers and rows
pub fn format_table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    if rows.is_empty() {
        return "No resources found.\n".to_string();
    }

    // Calculate column widths
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let mut output = String::new();

    // Header
    for (i, header) in headers.iter().enumerate() {
        if i > 0 {
            output.push_str("   ");
        }
        output.push_str(&format!(
            "{:width$}",
            header.to_uppercase(),
            width = widths[i]
        ));
    }
    output.push('\n');

    // Rows
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                output.push_str("   ");
            }
            if i < widths.len() {
                output.push_str(&format!("{:width$}", cell, width = widths[i]));
            } else {
                output.push_str(cell);
            }
        }
        output.push('\n');
    }

    output
}

// ============================================================================
// Resource lists
// ============================================================================

/// Format node list for display
pub fn format_node_list(nodes: &[NodeSummary]) -> String {
    let headers = &["NAME", "CPU", "MEMORY", "PODS"];
    let rows: Vec<Vec<String>> = nodes
        .iter()
        .map(|n| {
            vec![
                n.name.clone(),
                format!("{}/{}", n.cpu_usage, n.cpu_capacity),
                format!("{}/{}", n.memory_usage, n.memory_capacity),
                n.pods.len().to_string(),
            ]
        })
        .collect();

    format_table(headers, rows)
}

/// Format service list for display
pub fn format_service_list(services: &[ServiceSummary]) -> String {
    let headers = &["NAME", "READY", "CPU/POD", "MEMORY/POD"];
    let rows: Vec<Vec<String>> = services
        .iter()
        .map(|s| {
            vec![
                s.name.clone(),
                format!("{}/{}", s.running_pods, s.replicas),
                s.cpu_request.to_string(),
                s.memory_request.to_string(),
            ]
        })
        .collect();

    format_table(headers, rows)
}

/// Format pod list for display
pub fn format_pod_list(pods: &[PodSummary]) -> String {
    let headers = &["ID", "SERVICE", "STATUS", "NODE"];
    let rows: Vec<Vec<String>> = pods
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.service.clone(),
                p.status.to_string(),
                p.node.clone().unwrap_or_else(|| "<none>".to_string()),
            ]
        })
        .collect();

    format_table(headers, rows)
}

// ============================================================================
// Metrics display
// ============================================================================

/// Format a metrics snapshot for display
///
/// Node rows follow `node_order` (registration order as listed by the
/// control plane); nodes missing from it are appended sorted by name.
pub fn format_metrics(snapshot: &MetricsSnapshot, node_order: &[String]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Cluster: {} nodes, {} running pods, {:.1}% CPU\n\n",
        snapshot.cluster.total_nodes,
        snapshot.cluster.total_pods,
        snapshot.cluster.overall_cpu_utilization_pct
    ));

    let listed = node_order
        .iter()
        .filter_map(|name| snapshot.nodes.get_key_value(name));
    let unlisted = snapshot
        .nodes
        .iter()
        .filter(|(name, _)| !node_order.contains(name));

    let node_rows: Vec<Vec<String>> = listed
        .chain(unlisted)
        .map(|(name, n)| {
            vec![
                name.clone(),
                format!("{:.1}%", n.cpu_utilization_pct),
                n.memory_usage.to_string(),
                n.pod_count.to_string(),
                format!("{:.1}", n.latency_ms),
            ]
        })
        .collect();
    output.push_str(&format_table(
        &["NODE", "CPU%", "MEMORY", "PODS", "LATENCY(MS)"],
        node_rows,
    ));
    output.push('\n');

    let service_rows: Vec<Vec<String>> = snapshot
        .services
        .iter()
        .map(|(name, s)| {
            vec![
                name.clone(),
                format!("{}/{}", s.running_pods, s.pod_count),
                format!("{:.1}", s.avg_latency_ms),
                format!("{:.1}%", s.request_completion_rate),
            ]
        })
        .collect();
    output.push_str(&format_table(
        &["SERVICE", "READY", "AVG LATENCY(MS)", "COMPLETION"],
        service_rows,
    ));

    output
}

// ============================================================================
// SLA display
// ============================================================================

fn describe_violation(violation: &SlaViolation) -> String {
    match violation {
        SlaViolation::NodeCpu {
            node,
            utilization_pct,
            threshold_pct,
        } => format!(
            "node {} CPU at {:.1}% (limit {}%)",
            node, utilization_pct, threshold_pct
        ),
        SlaViolation::ServiceLatency {
            service,
            latency_ms,
            threshold_ms,
        } => format!(
            "service {} latency {:.1}ms (limit {}ms)",
            service, latency_ms, threshold_ms
        ),
        SlaViolation::PendingPods { service, pending } => {
            format!("service {} has {} pending pod(s)", service, pending)
        }
    }
}

/// Format an SLA report for display
pub fn format_sla_report(report: &SlaReport) -> String {
    if report.healthy {
        return "✓ All SLAs met\n".to_string();
    }

    let mut output = format!("✗ {} SLA violation(s)\n\n", report.violations.len());
    for violation in &report.violations {
        output.push_str(&format!("  - {}\n", describe_violation(violation)));
    }
    output
}

/// Format a cost estimate for display
pub fn format_cost_estimate(estimate: &CostEstimate) -> String {
    format!(
        "Cost:      {:.2}/hour\nPower:     {:.0} W\nViability: {:?}\n",
        estimate.estimated_cost_per_hour, estimate.estimated_power_watts, estimate.viability
    )
}

// ============================================================================
// Validation display
// ============================================================================

/// Format validation result for display
pub fn format_validation_result(result: &ValidationResult, path: &str) -> String {
    let mut output = String::new();

    if result.valid {
        output.push_str(&format!("✓ {} is valid\n\n", path));
        output.push_str(&format!("  Nodes:    {}\n", result.nodes));
        output.push_str(&format!("  Services: {}\n", result.services));
        output.push_str(&format!(
            "  Pods:     {} running, {} pending\n",
            result.running_pods, result.pending_pods
        ));
    } else {
        output.push_str(&format!("✗ {} is invalid\n\n", path));
        if let Some(ref error) = result.error {
            output.push_str(&format!("  Error: {}\n", error));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{evaluate_service_cost, Cluster};
    use crate::metrics::FixedJitter;

    #[test]
    fn test_format_table() {
        let headers = &["NAME", "AGE"];
        let rows = vec![
            vec!["Alice".to_string(), "30".to_string()],
            vec!["Bob".to_string(), "25".to_string()],
        ];

        let output = format_table(headers, rows);
        assert!(output.contains("NAME"));
        assert!(output.contains("Alice"));
        assert!(output.contains("Bob"));
    }

    #[test]
    fn test_format_table_empty() {
        let headers = &["NAME"];
        let rows: Vec<Vec<String>> = vec![];

        let output = format_table(headers, rows);
        assert!(output.contains("No resources found"));
    }

    #[test]
    fn test_format_node_list() {
        let mut cluster = Cluster::new();
        cluster.register_node("node-1", 4.0, 8.0).unwrap();
        cluster.deploy_service("frontend", 2, 1.0, 0.5).unwrap();
        let nodes: Vec<NodeSummary> = cluster.nodes().map(NodeSummary::from).collect();

        let output = format_node_list(&nodes);
        assert!(output.contains("node-1"));
        assert!(output.contains("2/4"));
        assert!(output.contains("1/8"));
    }

    #[test]
    fn test_format_pod_list_pending() {
        let mut cluster = Cluster::new();
        cluster.register_node("node-1", 1.0, 8.0).unwrap();
        cluster.deploy_service("frontend", 2, 1.0, 1.0).unwrap();
        let pods: Vec<PodSummary> = cluster.pods().map(PodSummary::from).collect();

        let output = format_pod_list(&pods);
        assert!(output.contains("Running"));
        assert!(output.contains("Pending"));
        assert!(output.contains("<none>"));
    }

    #[test]
    fn test_format_metrics() {
        let mut cluster = Cluster::new();
        cluster.register_node("node-1", 4.0, 8.0).unwrap();
        cluster.deploy_service("frontend", 2, 1.0, 1.0).unwrap();
        let snapshot = cluster.metrics(&mut FixedJitter(0.0));

        let output = format_metrics(&snapshot, &["node-1".to_string()]);
        assert!(output.contains("50.0%"));
        assert!(output.contains("70.0"));
        assert!(output.contains("frontend"));
        assert!(output.contains("2/2"));
    }

    #[test]
    fn test_format_metrics_registration_order() {
        let mut cluster = Cluster::new();
        cluster.register_node("node-2", 4.0, 8.0).unwrap();
        cluster.register_node("node-10", 4.0, 8.0).unwrap();
        cluster.register_node("node-1", 4.0, 8.0).unwrap();
        let snapshot = cluster.metrics(&mut FixedJitter(0.0));
        let order: Vec<String> = cluster.nodes().map(|n| n.name().to_string()).collect();

        let output = format_metrics(&snapshot, &order);

        let row = |name: &str| output.find(&format!("\n{} ", name)).unwrap();
        assert!(row("node-2") < row("node-10"));
        assert!(row("node-10") < row("node-1"));
    }

    #[test]
    fn test_format_metrics_unlisted_nodes_sorted_last() {
        let mut cluster = Cluster::new();
        cluster.register_node("beta", 4.0, 8.0).unwrap();
        cluster.register_node("alpha", 4.0, 8.0).unwrap();
        cluster.register_node("gamma", 4.0, 8.0).unwrap();
        let snapshot = cluster.metrics(&mut FixedJitter(0.0));

        let output = format_metrics(&snapshot, &["gamma".to_string()]);

        let row = |name: &str| output.find(&format!("\n{} ", name)).unwrap();
        assert!(row("gamma") < row("alpha"));
        assert!(row("alpha") < row("beta"));
    }

    #[test]
    fn test_format_sla_report() {
        let healthy = SlaReport {
            healthy: true,
            violations: vec![],
        };
        assert!(format_sla_report(&healthy).contains("All SLAs met"));

        let broken = SlaReport {
            healthy: false,
            violations: vec![SlaViolation::PendingPods {
                service: "database".to_string(),
                pending: 2,
            }],
        };
        let output = format_sla_report(&broken);
        assert!(output.contains("1 SLA violation"));
        assert!(output.contains("database has 2 pending"));
    }

    #[test]
    fn test_format_cost_estimate() {
        let output = format_cost_estimate(&evaluate_service_cost(2.0, 2.0));
        assert!(output.contains("30.00/hour"));
        assert!(output.contains("120 W"));
        assert!(output.contains("High"));
    }

    #[test]
    fn test_format_validation_valid() {
        let result = ValidationResult {
            valid: true,
            nodes: 3,
            services: 2,
            running_pods: 4,
            pending_pods: 1,
            error: None,
        };

        let output = format_validation_result(&result, "cluster.yaml");
        assert!(output.contains("✓"));
        assert!(output.contains("Nodes:    3"));
        assert!(output.contains("4 running, 1 pending"));
    }

    #[test]
    fn test_format_validation_invalid() {
        let result = ValidationResult {
            valid: false,
            nodes: 0,
            services: 0,
            running_pods: 0,
            pending_pods: 0,
            error: Some("Parse error".to_string()),
        };

        let output = format_validation_result(&result, "cluster.yaml");
        assert!(output.contains("✗"));
        assert!(output.contains("invalid"));
        assert!(output.contains("Parse error"));
    }
}
