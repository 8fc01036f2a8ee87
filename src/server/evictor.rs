use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::interval;
use tracing::{debug, info};

use crate::config::AggregatorConfig;
use crate::store::WeatherStore;

/// Background sweeper: the only component that removes records for
/// age. Shares nothing with connection handlers except the store.
pub struct Evictor {
    store: Arc<WeatherStore>,
    ttl: Duration,
    period: Duration,
}

impl Evictor {
    pub fn new(store: Arc<WeatherStore>, config: &AggregatorConfig) -> Self {
        Evictor {
            store,
            ttl: config.ttl,
            period: config.sweep_interval,
        }
    }

    pub async fn run(self) {
        let mut tick = interval(self.period);
        loop {
            tick.tick().await;
            debug!("sweeping for expired records");
            let evicted = self.store.remove_expired(self.ttl, Instant::now());
            for id in &evicted {
                info!(%id, "evicted expired record");
            }
        }
    }
}
