//! CLI module for kubesim
//!
//! Provides kubectl-like subcommands:
//! - `kubesim serve` - Run the control plane over a simulated cluster
//! - `kubesim get` - List resources (nodes, services, pods)
//! - `kubesim metrics` - Show a synthetic metrics snapshot
//! - `kubesim deploy` - Deploy a service
//! - `kubesim scale` - Scale a service
//! - `kubesim move` - Move a running pod to another node
//! - `kubesim cost` - Estimate cost of a resource request
//! - `kubesim sla` - Check the cluster against its SLA policy
//! - `kubesim validate` - Dry-build a cluster file locally

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod display;

pub use commands::*;
pub use display::*;

/// Control plane URL used when neither `--server` nor `KUBESIM_URL` is set
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8181";

#[derive(Parser, Debug)]
#[command(name = "kubesim")]
#[command(about = "Simulated cluster with first-fit scheduling and synthetic telemetry")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Control plane URL for client commands
    #[arg(long, global = true, env = "KUBESIM_URL", default_value = DEFAULT_SERVER_URL)]
    pub server: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the control plane server
    Serve(ServeArgs),

    /// Get/list resources
    Get(GetArgs),

    /// Show cluster metrics
    #[command(visible_alias = "top")]
    Metrics(MetricsArgs),

    /// Deploy a service
    Deploy(DeployArgs),

    /// Scale a service
    Scale(ScaleArgs),

    /// Move a running pod to another node
    #[command(name = "move", visible_alias = "mv")]
    Move(MoveArgs),

    /// Estimate hourly cost and power draw of a per-pod request
    Cost(CostArgs),

    /// Check the cluster against its SLA policy
    Sla,

    /// Validate a cluster file
    Validate(ValidateArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Cluster file to start from (default: built-in three-node cluster)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the bind address
    #[arg(long, value_name = "ADDR")]
    pub bind_addr: Option<String>,

    /// Override the port
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Seed for latency jitter (reproducible metrics)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Path to a .env file
    #[arg(long, value_name = "FILE")]
    pub env_file: Option<PathBuf>,
}

/// Arguments for the get command
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Resource type to list
    #[command(subcommand)]
    pub resource: GetResource,
}

#[derive(Subcommand, Debug)]
pub enum GetResource {
    /// List nodes
    #[command(name = "nodes", visible_alias = "node", visible_alias = "no")]
    Nodes,

    /// List services
    #[command(name = "services", visible_alias = "service", visible_alias = "svc")]
    Services,

    /// List pods
    #[command(name = "pods", visible_alias = "pod", visible_alias = "po")]
    Pods,
}

/// Arguments for the metrics command
#[derive(Parser, Debug)]
pub struct MetricsArgs {
    /// Print the raw snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the deploy command
#[derive(Parser, Debug)]
pub struct DeployArgs {
    /// Service name
    pub name: String,

    /// Number of replicas
    #[arg(long, default_value = "1")]
    pub replicas: u32,

    /// CPU request per pod
    #[arg(long)]
    pub cpu: f64,

    /// Memory request per pod
    #[arg(long)]
    pub memory: f64,
}

/// Arguments for the scale command
#[derive(Parser, Debug)]
pub struct ScaleArgs {
    /// Service name
    pub name: String,

    /// Number of replicas
    #[arg(long)]
    pub replicas: u32,
}

/// Arguments for the move command
#[derive(Parser, Debug)]
pub struct MoveArgs {
    /// Pod id
    pub pod: String,

    /// Target node
    #[arg(long = "to", value_name = "NODE")]
    pub target_node: String,
}

/// Arguments for the cost command
#[derive(Parser, Debug)]
pub struct CostArgs {
    /// CPU request per pod
    #[arg(long)]
    pub cpu: f64,

    /// Memory request per pod
    #[arg(long)]
    pub memory: f64,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the cluster file
    pub file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::parse_from(["kubesim", "serve", "--port", "9000", "--seed", "7"]);
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(9000));
                assert_eq!(args.seed, Some(7));
                assert!(args.config.is_none());
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_parse_get_nodes() {
        let cli = Cli::parse_from(["kubesim", "get", "nodes"]);
        match cli.command {
            Commands::Get(args) => match args.resource {
                GetResource::Nodes => {}
                _ => panic!("Expected Nodes resource"),
            },
            _ => panic!("Expected Get command"),
        }
    }

    #[test]
    fn test_parse_get_alias() {
        let cli = Cli::parse_from(["kubesim", "get", "svc"]);
        match cli.command {
            Commands::Get(args) => assert!(matches!(args.resource, GetResource::Services)),
            _ => panic!("Expected Get command"),
        }
    }

    #[test]
    fn test_parse_deploy() {
        let cli = Cli::parse_from([
            "kubesim",
            "deploy",
            "frontend",
            "--replicas",
            "3",
            "--cpu",
            "1",
            "--memory",
            "0.5",
        ]);
        match cli.command {
            Commands::Deploy(args) => {
                assert_eq!(args.name, "frontend");
                assert_eq!(args.replicas, 3);
                assert_eq!(args.memory, 0.5);
            }
            _ => panic!("Expected Deploy command"),
        }
    }

    #[test]
    fn test_parse_scale() {
        let cli = Cli::parse_from(["kubesim", "scale", "frontend", "--replicas", "5"]);
        match cli.command {
            Commands::Scale(args) => {
                assert_eq!(args.name, "frontend");
                assert_eq!(args.replicas, 5);
            }
            _ => panic!("Expected Scale command"),
        }
    }

    #[test]
    fn test_parse_move() {
        let cli = Cli::parse_from(["kubesim", "move", "3f2a9c1d", "--to", "node-2"]);
        match cli.command {
            Commands::Move(args) => {
                assert_eq!(args.pod, "3f2a9c1d");
                assert_eq!(args.target_node, "node-2");
            }
            _ => panic!("Expected Move command"),
        }
    }

    #[test]
    fn test_server_flag_is_global() {
        let cli = Cli::parse_from(["kubesim", "sla", "--server", "http://10.0.0.1:8181"]);
        assert_eq!(cli.server, "http://10.0.0.1:8181");
        assert!(matches!(cli.command, Commands::Sla));
    }

    #[test]
    fn test_verbose_global() {
        let cli = Cli::parse_from(["kubesim", "-vvv", "sla"]);
        assert_eq!(cli.verbose, 3);
    }
}
