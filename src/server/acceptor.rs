use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{error, info};

use super::connection::ConnectionHandler;
use super::evictor::Evictor;
use crate::clock::LamportClock;
use crate::config::AggregatorConfig;
use crate::error::AggregatorError;
use crate::store::WeatherStore;

/// The aggregation server: owns the store and clock, sweeps expired
/// records in the background, and hands every accepted connection to
/// its own task so the accept loop never blocks on request
/// processing.
pub struct AggregationServer {
    listener: TcpListener,
    config: AggregatorConfig,
    store: Arc<WeatherStore>,
    clock: Arc<LamportClock>,
}

impl AggregationServer {
    pub async fn bind(config: AggregatorConfig) -> Result<Self, AggregatorError> {
        let addr = config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| AggregatorError::Bind { addr, source })?;
        Ok(AggregationServer {
            listener,
            config,
            store: Arc::new(WeatherStore::new()),
            clock: Arc::new(LamportClock::new()),
        })
    }

    /// The address actually bound; a configured port 0 resolves here.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept forever. Returns only if the listener itself dies;
    /// in-flight connections are abandoned on shutdown.
    pub async fn run(self) -> Result<(), AggregatorError> {
        info!(addr = %self.listener.local_addr()?, "aggregation server listening");

        let evictor = Evictor::new(self.store.clone(), &self.config);
        tokio::spawn(evictor.run());

        let permits = Arc::new(Semaphore::new(self.config.max_connections));
        loop {
            // cap on concurrent handlers; acquire before accept so the
            // backlog queues in the kernel instead of in tasks
            let permit = permits
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| {
                    std::io::Error::new(std::io::ErrorKind::Other, "connection semaphore closed")
                })?;

            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let handler = ConnectionHandler::new(
                        stream,
                        self.store.clone(),
                        self.clock.clone(),
                        addr.to_string(),
                        self.config.read_timeout,
                    );
                    tokio::spawn(async move {
                        handler.run().await;
                        drop(permit);
                    });
                }
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                }
            }
        }
    }
}
