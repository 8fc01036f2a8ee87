pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod store;

pub use clock::LamportClock;
pub use config::AggregatorConfig;
pub use error::AggregatorError;
pub use server::AggregationServer;
pub use store::WeatherStore;
