use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use weathervane::{AggregationServer, AggregatorConfig};

/// Weather aggregation server: accepts PUT readings from producers,
/// serves GET snapshots to readers, and expires stale readings.
#[derive(Parser, Debug)]
#[command(name = "aggregator", version)]
struct Args {
    /// Port to listen on.
    #[arg(default_value_t = weathervane::config::DEFAULT_PORT)]
    port: u16,

    /// Seconds a reading stays live without being refreshed.
    #[arg(long, default_value_t = 30)]
    ttl_secs: u64,

    /// Seconds between eviction sweeps.
    #[arg(long, default_value_t = 5)]
    sweep_secs: u64,

    /// Seconds a connection may take to deliver its request.
    #[arg(long, default_value_t = 30)]
    read_timeout_secs: u64,

    /// Maximum concurrently served connections.
    #[arg(long, default_value_t = 1024)]
    max_connections: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = AggregatorConfig::default()
        .with_port(args.port)
        .with_ttl(Duration::from_secs(args.ttl_secs))
        .with_sweep_interval(Duration::from_secs(args.sweep_secs))
        .with_read_timeout(Duration::from_secs(args.read_timeout_secs))
        .with_max_connections(args.max_connections);

    let server = AggregationServer::bind(config).await?;
    server.run().await?;
    Ok(())
}
