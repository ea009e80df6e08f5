/*!
Test harness for the collection pipeline

Wires a fresh cache, collector and orchestrator around a `FakeSmartctl`
so every test gets isolated state.
*/

use crate::smartctl_stub::FakeSmartctl;
use chrono::{DateTime, Utc};
use serde_json::Value;
use smartmon_agent::{CacheEntry, Collector, Device, DeviceCache, RefreshOrchestrator};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

pub struct TestHarness {
    pub smartctl: FakeSmartctl,
    pub cache: DeviceCache,
    pub collector: Arc<Collector>,
    pub interval: Duration,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_smartctl(FakeSmartctl::new())
    }

    pub fn with_smartctl(smartctl: FakeSmartctl) -> Self {
        // Several tests may race to install the subscriber
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let cache = DeviceCache::new();
        let collector = Arc::new(Collector::new(
            Arc::new(smartctl.clone()),
            cache.clone(),
            "standby",
        ));
        Self {
            smartctl,
            cache,
            collector,
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn orchestrator(&self) -> RefreshOrchestrator {
        RefreshOrchestrator::new(self.collector.clone(), self.cache.clone(), self.interval)
    }

    /// Put a reading in the cache as if it had been collected at `at`
    pub fn seed(&self, device: &Device, data: Value, at: DateTime<Utc>) {
        self.cache.put(device.clone(), CacheEntry::new(data, at));
    }

    /// Seed an entry old enough to be refreshed
    pub fn seed_stale(&self, device: &Device, data: Value) -> DateTime<Utc> {
        let age = chrono::TimeDelta::seconds(self.interval.as_secs() as i64 * 2 + 1);
        let at = Utc::now() - age;
        self.seed(device, data, at);
        at
    }

    pub fn collected_at(&self, device: &Device) -> Option<DateTime<Utc>> {
        self.cache.get(device).map(|e| e.collected_at)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
