use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use weathervane::client::{publish, read_feed, ClientError};
use weathervane::LamportClock;

/// Content server: publish one weather reading from a feed file to
/// the aggregation server, then exit.
#[derive(Parser, Debug)]
#[command(name = "producer", version)]
struct Args {
    /// Aggregation server host.
    host: String,

    /// Aggregation server port.
    port: u16,

    /// Path to the `key: value` feed file.
    feed: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("producer: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), ClientError> {
    let addr = format!("{}:{}", args.host, args.port);
    let payload = read_feed(&args.feed)?;

    let clock = LamportClock::new();
    let reply = publish(&addr, &clock, &payload).await?;
    println!("server answered {} (clock now {})", reply.status, clock.value());
    Ok(())
}
