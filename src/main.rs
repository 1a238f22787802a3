use std::process;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use kubesim::cli::{
    format_cost_estimate, format_metrics, format_node_list, format_pod_list, format_service_list,
    format_sla_report, format_validation_result, validate_cluster_file, Cli, Commands,
    ControlPlaneClient, GetResource, ServeArgs,
};
use kubesim::cluster::{create_control_plane_router, ControlPlaneState};
use kubesim::config::{load_cluster_config, ClusterConfig};
use kubesim::metrics::RandomJitter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let client = ControlPlaneClient::new(&cli.server);

    match cli.command {
        Commands::Serve(args) => serve(args).await?,

        Commands::Get(args) => {
            let output = match args.resource {
                GetResource::Nodes => format_node_list(&client.list_nodes().await?),
                GetResource::Services => format_service_list(&client.list_services().await?),
                GetResource::Pods => format_pod_list(&client.list_pods().await?),
            };
            print!("{}", output);
        }

        Commands::Metrics(args) => {
            let snapshot = client.metrics().await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                let order: Vec<String> = client
                    .list_nodes()
                    .await?
                    .into_iter()
                    .map(|node| node.name)
                    .collect();
                print!("{}", format_metrics(&snapshot, &order));
            }
        }

        Commands::Deploy(args) => {
            let message = client
                .deploy_service(&args.name, args.replicas, args.cpu, args.memory)
                .await?;
            println!("{}", message);
        }

        Commands::Scale(args) => {
            let message = client.scale_service(&args.name, args.replicas).await?;
            println!("{}", message);
        }

        Commands::Move(args) => {
            let message = client.move_pod(&args.pod, &args.target_node).await?;
            println!("{}", message);
        }

        Commands::Cost(args) => {
            let estimate = client.evaluate_cost(args.cpu, args.memory).await?;
            print!("{}", format_cost_estimate(&estimate));
        }

        Commands::Sla => {
            let report = client.sla().await?;
            print!("{}", format_sla_report(&report));
        }

        Commands::Validate(args) => {
            let result = validate_cluster_file(&args.file);
            print!(
                "{}",
                format_validation_result(&result, &args.file.display().to_string())
            );
            if !result.valid {
                process::exit(1);
            }
        }
    }

    Ok(())
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    // Load .env file if specified
    if let Some(ref env_file) = args.env_file {
        dotenvy::from_path(env_file)
            .with_context(|| format!("Failed to load env file {}", env_file.display()))?;
    }

    let mut config = match args.config {
        Some(ref path) => load_cluster_config(path)
            .with_context(|| format!("Failed to load cluster file {}", path.display()))?,
        None => {
            info!("No cluster file given, starting the default three-node cluster");
            ClusterConfig::default()
        }
    };

    if let Some(bind_addr) = args.bind_addr {
        config.server.bind_addr = bind_addr;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.seed.is_some() {
        config.jitter_seed = args.seed;
    }

    let cluster = config
        .build_cluster()
        .context("Failed to build cluster from configuration")?;

    let pending = cluster.pods().filter(|p| !p.is_running()).count();
    if pending > 0 {
        warn!("{} pod(s) could not be placed at startup", pending);
    }

    let state = ControlPlaneState::new(cluster)
        .with_jitter(RandomJitter::from_seed(config.jitter_seed))
        .with_sla(config.sla.clone());
    let app = create_control_plane_router(state);

    let addr = format!("{}:{}", config.server.bind_addr, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Control plane listening on {}", addr);
    info!(
        nodes = config.nodes.len(),
        services = config.services.len(),
        seeded = config.jitter_seed.is_some(),
        "Cluster ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to install CTRL+C handler: {}", e);
            }
            info!("Shutdown signal received");
        })
        .await
        .context("Server error")?;

    Ok(())
}
