//! Concurrent refresh of stale devices
//!
//! Each call spawns one task per stale device and waits for all of them.
//! Calls are serialised: a second caller waits for the running cycle, then
//! re-checks staleness, so one device never has two collections in flight.
//! A device listed twice in one call is collected once.

use crate::cache::DeviceCache;
use crate::collector::{CollectOutcome, Collector};
use crate::device::Device;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error};

/// Counts for one refresh cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub launched: usize,
    pub admitted: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl RefreshSummary {
    fn record(&mut self, outcome: CollectOutcome) {
        match outcome {
            CollectOutcome::Admitted => self.admitted += 1,
            CollectOutcome::Rejected => self.rejected += 1,
            CollectOutcome::Failed => self.failed += 1,
        }
    }
}

pub struct RefreshOrchestrator {
    collector: Arc<Collector>,
    cache: DeviceCache,
    interval: Duration,
    fake_data: bool,
    limit: Option<Arc<Semaphore>>,
    cycle: Mutex<()>,
}

impl RefreshOrchestrator {
    pub fn new(collector: Arc<Collector>, cache: DeviceCache, interval: Duration) -> Self {
        Self {
            collector,
            cache,
            interval,
            fake_data: false,
            limit: None,
            cycle: Mutex::new(()),
        }
    }

    /// In fake-data mode readings come from fixtures and refreshing is a no-op
    pub fn with_fake_data(mut self, fake_data: bool) -> Self {
        self.fake_data = fake_data;
        self
    }

    /// Cap simultaneous smartctl processes; `None` leaves it unbounded
    pub fn with_max_concurrency(mut self, max: Option<usize>) -> Self {
        self.limit = max.filter(|n| *n > 0).map(|n| Arc::new(Semaphore::new(n)));
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn refresh_all(&self, devices: &[Device]) -> RefreshSummary {
        let mut summary = RefreshSummary::default();
        if self.fake_data {
            return summary;
        }

        let _cycle = self.cycle.lock().await;
        let start_time = Instant::now();
        let now = Utc::now();

        let mut tasks = JoinSet::new();
        let mut scheduled = HashSet::new();
        for device in devices {
            if !self.cache.is_stale(device, self.interval, now) || !scheduled.insert(device) {
                continue;
            }
            let collector = Arc::clone(&self.collector);
            let limit = self.limit.clone();
            let device = device.clone();
            tasks.spawn(async move {
                let _permit = match limit {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                collector.collect(&device).await
            });
            summary.launched += 1;
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => summary.record(outcome),
                Err(e) => {
                    error!("Collection task aborted: {}", e);
                    summary.failed += 1;
                }
            }
        }

        if summary.launched > 0 {
            debug!(
                "Refreshed {} device(s) in {}ms: {} admitted, {} rejected, {} failed",
                summary.launched,
                start_time.elapsed().as_millis(),
                summary.admitted,
                summary.rejected,
                summary.failed
            );
        }
        summary
    }
}
