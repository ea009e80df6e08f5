//! Read/refresh surface consumed by the HTTP layer
//!
//! `SmartService` bundles the cache, the orchestrator and the optional
//! fixture source behind two calls:
//! - `read_data(device)`: cached reading (or fixture in fake-data mode)
//! - `refresh_all_devices(devices)`: one refresh cycle

use crate::cache::DeviceCache;
use crate::collector::Collector;
use crate::config::AgentConfig;
use crate::device::Device;
use crate::document::empty_document;
use crate::fixtures::FixtureSource;
use crate::refresh::{RefreshOrchestrator, RefreshSummary};
use crate::runner::SmartctlRunner;
use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

pub struct SmartService {
    cache: DeviceCache,
    orchestrator: RefreshOrchestrator,
    fixtures: Option<FixtureSource>,
}

impl SmartService {
    pub fn new(cache: DeviceCache, orchestrator: RefreshOrchestrator) -> Self {
        Self {
            cache,
            orchestrator,
            fixtures: None,
        }
    }

    /// Serve readings from fixtures instead of the cache
    pub fn with_fixtures(mut self, fixtures: FixtureSource) -> Self {
        info!("Fake data mode, reading fixtures from {}", fixtures.dir().display());
        self.fixtures = Some(fixtures);
        self
    }

    /// Wire a fresh cache, collector and orchestrator from configuration
    pub fn from_config(config: &AgentConfig, runner: Arc<dyn SmartctlRunner>) -> Result<Self> {
        let smartctl = &config.smartctl;
        let cache = DeviceCache::new();
        let collector = Arc::new(Collector::new(runner, cache.clone(), &smartctl.power_mode_check));
        let orchestrator = RefreshOrchestrator::new(collector, cache.clone(), smartctl.interval()?)
            .with_fake_data(smartctl.fake_data)
            .with_max_concurrency(smartctl.max_concurrent_collections);

        let service = Self::new(cache, orchestrator);
        Ok(if smartctl.fake_data {
            service.with_fixtures(FixtureSource::new(smartctl.fixtures_dir.clone()))
        } else {
            service
        })
    }

    pub fn cache(&self) -> &DeviceCache {
        &self.cache
    }

    pub fn orchestrator(&self) -> &RefreshOrchestrator {
        &self.orchestrator
    }

    /// Best available reading; unknown devices give an empty document
    pub async fn read_data(&self, device: &Device) -> Arc<Value> {
        if let Some(fixtures) = &self.fixtures {
            return Arc::new(fixtures.read(device).await);
        }

        match self.cache.get(device) {
            Some(entry) => entry.data,
            None => {
                warn!("Device not found in cache: {}", device);
                Arc::new(empty_document())
            }
        }
    }

    pub async fn refresh_all_devices(&self, devices: &[Device]) -> RefreshSummary {
        self.orchestrator.refresh_all(devices).await
    }
}
