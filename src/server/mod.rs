mod acceptor;
mod connection;
mod evictor;

pub use acceptor::AggregationServer;
pub use connection::ConnectionHandler;
pub use evictor::Evictor;
