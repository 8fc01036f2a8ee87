use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde_json::{Map, Value};

/// One stored reading: the payload exactly as received plus the time
/// the aggregator accepted it.
#[derive(Debug, Clone)]
pub struct Record {
    pub payload: Value,
    pub arrival: Instant,
}

/// Latest-reading-per-station store, shared between connection
/// handlers and the evictor.
///
/// The whole map sits behind one RwLock: a snapshot always observes
/// records that are fully inserted or fully removed, never in
/// between. The aggregator is the only writer; producers supply
/// payloads but never touch the mapping.
#[derive(Debug, Default)]
pub struct WeatherStore {
    records: RwLock<HashMap<String, Record>>,
}

impl WeatherStore {
    pub fn new() -> Self {
        WeatherStore {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or overwrite the record for `id`, stamped with the
    /// current time. Last writer wins; the previous payload is
    /// replaced whole, never merged.
    pub fn put(&self, id: String, payload: Value) {
        debug_assert!(!id.is_empty(), "caller validates ids before the store");
        let record = Record {
            payload,
            arrival: Instant::now(),
        };
        self.records.write().insert(id, record);
    }

    /// Every live payload keyed by station id, in no particular order.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.records
            .read()
            .iter()
            .map(|(id, record)| (id.clone(), record.payload.clone()))
            .collect()
    }

    /// Remove every record older than `ttl` as of `now` and return the
    /// evicted ids. Called only by the evictor; readers never filter
    /// by age themselves.
    pub fn remove_expired(&self, ttl: Duration, now: Instant) -> Vec<String> {
        let mut records = self.records.write();
        let expired: Vec<String> = records
            .iter()
            .filter(|(_, record)| now.duration_since(record.arrival) > ttl)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            records.remove(id);
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
