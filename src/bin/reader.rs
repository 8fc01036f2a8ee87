use clap::Parser;
use tracing_subscriber::EnvFilter;

use weathervane::client::{fetch, ClientError};

/// Query client: fetch the aggregation server's current snapshot,
/// print it, then exit.
#[derive(Parser, Debug)]
#[command(name = "reader", version)]
struct Args {
    /// Aggregation server host.
    host: String,

    /// Aggregation server port.
    port: u16,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("reader: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), ClientError> {
    let addr = format!("{}:{}", args.host, args.port);
    let reply = fetch(&addr).await?;
    println!("{}", reply.body.as_deref().unwrap_or("{}"));
    Ok(())
}
