//! In-memory TTL cache of resolved estimates.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::types::{ForecastRequest, WeatherEstimate};

#[derive(Debug, Clone)]
struct CachedEstimate {
    estimate: WeatherEstimate,
    stored_at: Instant,
}

impl CachedEstimate {
    fn is_stale(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() >= ttl
    }
}

/// Estimates keyed by rounded point, target date and range end.
///
/// Points within roughly a kilometre share an entry.
#[derive(Debug)]
pub struct EstimateCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedEstimate>>,
}

impl EstimateCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn key_for(request: &ForecastRequest) -> String {
        let (lat, lon) = request.point.rounded();
        let end = request
            .range_end
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!("weather:{lat:.2}:{lon:.2}:{}:{end}", request.target_date)
    }

    /// Fresh entry for the request, if any. Stale entries are evicted.
    pub fn get(&self, request: &ForecastRequest) -> Option<WeatherEstimate> {
        let key = Self::key_for(request);
        let mut entries = self.entries.lock();
        match entries.get(&key) {
            Some(cached) if !cached.is_stale(self.ttl) => Some(cached.estimate.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Store an estimate, dropping every stale entry first.
    pub fn put(&self, request: &ForecastRequest, estimate: WeatherEstimate) {
        let key = Self::key_for(request);
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, cached| !cached.is_stale(self.ttl));
        let swept = before - entries.len();
        if swept > 0 {
            tracing::debug!("Swept {} stale cached estimates", swept);
        }
        entries.insert(
            key,
            CachedEstimate {
                estimate,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
