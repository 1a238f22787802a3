//! Cluster files
//!
//! A YAML document declaring server settings, the initial nodes and
//! services, the jitter seed and the SLA policy.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cluster::{Cluster, ClusterError, CONTROL_PLANE_PORT};
use crate::metrics::SlaPolicy;

/// Errors from loading or applying a cluster file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse cluster file: {0}")]
    ParseError(String),

    #[error("Invalid cluster file: {0}")]
    ClusterError(#[from] ClusterError),
}

/// Control plane listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(rename = "bindAddr")]
    #[serde(default = "default_bind_address")]
    pub bind_addr: String,

    #[serde(default = "default_control_plane_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_address(),
            port: CONTROL_PLANE_PORT,
        }
    }
}

fn default_control_plane_port() -> u16 {
    CONTROL_PLANE_PORT
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

/// A node to register at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub name: String,

    #[serde(rename = "cpuCapacity")]
    pub cpu_capacity: f64,

    #[serde(rename = "memoryCapacity")]
    pub memory_capacity: f64,
}

/// A service to deploy at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,

    pub replicas: u32,

    #[serde(rename = "cpuRequest")]
    pub cpu_request: f64,

    #[serde(rename = "memoryRequest")]
    pub memory_request: f64,
}

/// The complete cluster file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Fixed seed for latency jitter; OS entropy when absent
    #[serde(rename = "jitterSeed")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jitter_seed: Option<u64>,

    #[serde(default)]
    pub nodes: Vec<NodeConfig>,

    #[serde(default)]
    pub services: Vec<ServiceConfig>,

    #[serde(default)]
    pub sla: SlaPolicy,
}

impl Default for ClusterConfig {
    /// Example cluster: three identical nodes running a frontend, backend and
    /// database. Capacities are illustrative.
    fn default() -> Self {
        let node = |name: &str| NodeConfig {
            name: name.to_string(),
            cpu_capacity: 8.0,
            memory_capacity: 16.0,
        };
        let service = |name: &str, replicas, cpu, memory| ServiceConfig {
            name: name.to_string(),
            replicas,
            cpu_request: cpu,
            memory_request: memory,
        };

        Self {
            server: ServerConfig::default(),
            jitter_seed: None,
            nodes: vec![node("node-1"), node("node-2"), node("node-3")],
            services: vec![
                service("frontend", 2, 1.0, 1.0),
                service("backend", 2, 1.0, 2.0),
                service("database", 1, 2.0, 4.0),
            ],
            sla: SlaPolicy::default(),
        }
    }
}

impl ClusterConfig {
    /// Register nodes, then deploy services, both in file order
    pub fn build_cluster(&self) -> Result<Cluster, ClusterError> {
        let mut cluster = Cluster::new();
        for node in &self.nodes {
            cluster.register_node(node.name.clone(), node.cpu_capacity, node.memory_capacity)?;
        }
        for svc in &self.services {
            cluster.deploy_service(
                svc.name.clone(),
                svc.replicas,
                svc.cpu_request,
                svc.memory_request,
            )?;
        }
        Ok(cluster)
    }
}

// ============================================================================
// SBIO: Pure business logic (no I/O)
// ============================================================================

/// Parse a cluster file from YAML
pub fn parse_cluster_config(content: &str) -> Result<ClusterConfig, ConfigError> {
    serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Serialize a cluster file to YAML
pub fn serialize_cluster_config(config: &ClusterConfig) -> Result<String, ConfigError> {
    serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError(e.to_string()))
}

// ============================================================================
// I/O boundary functions
// ============================================================================

/// Load and parse a cluster file from disk
pub fn load_cluster_config(path: &Path) -> Result<ClusterConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_cluster_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_cluster_config() {
        let yaml = r#"
server:
  bindAddr: 127.0.0.1
  port: 9000
jitterSeed: 42
nodes:
  - { name: node-1, cpuCapacity: 4, memoryCapacity: 8 }
  - { name: node-2, cpuCapacity: 2, memoryCapacity: 4 }
services:
  - { name: frontend, replicas: 2, cpuRequest: 1, memoryRequest: 1 }
sla:
  nodeCpuUtilizationPct: 70
  serviceLatencyMs: { frontend: 90 }
"#;
        let config = parse_cluster_config(yaml).unwrap();

        assert_eq!(config.server.bind_addr, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.jitter_seed, Some(42));
        assert_eq!(config.nodes.len(), 2);
        assert_eq!(config.nodes[1].cpu_capacity, 2.0);
        assert_eq!(config.services[0].replicas, 2);
        assert_eq!(config.sla.node_cpu_utilization_pct, 70.0);
        assert_eq!(config.sla.service_latency_ms["frontend"], 90.0);
    }

    #[test]
    fn test_minimal_file_uses_defaults() {
        let config = parse_cluster_config("nodes: []").unwrap();

        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.jitter_seed, None);
        assert!(config.services.is_empty());
        assert_eq!(config.sla, SlaPolicy::default());
    }

    #[test]
    fn test_parse_error() {
        let result = parse_cluster_config("nodes: [ { name: node-1 } ]");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_default_config_builds() {
        let config = ClusterConfig::default();
        let cluster = config.build_cluster().unwrap();

        assert_eq!(cluster.nodes().count(), 3);
        assert_eq!(cluster.services().count(), 3);
        assert_eq!(cluster.pods().filter(|p| p.is_running()).count(), 5);
    }

    #[test]
    fn test_build_cluster_duplicate_node() {
        let yaml = r#"
nodes:
  - { name: node-1, cpuCapacity: 4, memoryCapacity: 8 }
  - { name: node-1, cpuCapacity: 2, memoryCapacity: 4 }
"#;
        let config = parse_cluster_config(yaml).unwrap();
        let result = config.build_cluster();

        assert_eq!(
            result.err(),
            Some(ClusterError::NodeExists("node-1".to_string()))
        );
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = ClusterConfig::default();
        let yaml = serialize_cluster_config(&config).unwrap();

        assert!(yaml.contains("cpuCapacity"));
        assert_eq!(parse_cluster_config(&yaml).unwrap(), config);
    }

    #[test]
    fn test_load_cluster_config() {
        let file = create_temp_file(
            "nodes:\n  - { name: node-1, cpuCapacity: 4, memoryCapacity: 8 }\n",
        );
        let config = load_cluster_config(file.path()).unwrap();
        assert_eq!(config.nodes[0].name, "node-1");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_cluster_config(Path::new("/nonexistent/cluster.yaml"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
