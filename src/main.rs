use anyhow::Result;
use ceph_pg_exporter::{ceph::CephClient, config::Config, server};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.toml")]
    config: String,

    /// Ceph cluster name passed to `ceph --cluster` (overrides config)
    #[arg(long, env = "CEPH_CLUSTER")]
    cluster: Option<String>,

    /// Path to the ceph binary (overrides config)
    #[arg(long, env = "CEPH_BINARY")]
    ceph_binary: Option<String>,

    /// Seconds between collection cycles (overrides config)
    #[arg(short, long, env = "EXPORTER_INTERVAL")]
    interval: Option<u64>,

    /// Port to listen on for metrics
    #[arg(short, long, env = "EXPORTER_PORT")]
    port: Option<u16>,

    /// Address to bind to
    #[arg(short, long, env = "EXPORTER_ADDR")]
    addr: Option<String>,

    /// Run a single collection cycle, print flat metrics to stdout, and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; logs go to stderr so `--once` output stays clean
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Ceph PG Exporter v{}", env!("CARGO_PKG_VERSION"));

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;

    // Override with CLI arguments if provided
    if let Some(cluster) = args.cluster {
        config.ceph.cluster = cluster;
    }
    if let Some(binary) = args.ceph_binary {
        config.ceph.binary = binary;
    }
    if let Some(interval) = args.interval {
        config.metrics.scrape_interval_seconds = interval;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }

    config.validate()?;

    info!("Configuration loaded successfully");
    info!(
        "Ceph cluster: {} (via {})",
        config.ceph.cluster, config.ceph.binary
    );

    if args.once {
        let client = CephClient::new(config.ceph.clone());
        match server::collect_once(&client, &config).await {
            Ok(set) => {
                print!("{}", set);
                return Ok(());
            }
            Err(e) => {
                error!(
                    "Failed to collect metrics from cluster {}: {}",
                    config.ceph.cluster, e
                );
                std::process::exit(1);
            }
        }
    }

    info!(
        "Metrics endpoint: http://{}:{}/metrics",
        config.server.addr, config.server.port
    );

    // Start the metrics server
    if let Err(e) = server::start(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
