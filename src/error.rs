use thiserror::Error;

pub use crate::protocol::RequestError;

/// Errors fatal to server startup. Per-connection failures never
/// surface here; they are logged and the connection dropped so one
/// bad peer cannot take the aggregator down.
#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
