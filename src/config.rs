use std::time::Duration;

pub const DEFAULT_PORT: u16 = 4567;

/// Tunables for the aggregation server.
///
/// Defaults: port 4567, a 30s record TTL swept every 5s. The read
/// timeout and connection cap are
/// deliberate knobs; a silent peer otherwise parks a handler forever.
/// The sweep interval must stay short relative to the TTL, since a
/// record can outlive its nominal expiry by up to one sweep.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub port: u16,
    pub ttl: Duration,
    pub sweep_interval: Duration,
    pub read_timeout: Duration,
    pub max_connections: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        AggregatorConfig {
            port: DEFAULT_PORT,
            ttl: Duration::from_secs(30),
            sweep_interval: Duration::from_secs(5),
            read_timeout: Duration::from_secs(30),
            max_connections: 1024,
        }
    }
}

impl AggregatorConfig {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
