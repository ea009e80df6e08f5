//! Per-device smartctl collection
//!
//! One collection runs smartctl for a single device, parses the output and
//! writes the cache only when the reading is admissible. A non-zero exit
//! from smartctl is normal: health problems are reported through
//! `smartctl.exit_status`, not the process exit code.

use crate::cache::{CacheEntry, DeviceCache};
use crate::device::Device;
use crate::document::{self, parse_document, strip_artifacts};
use crate::runner::SmartctlRunner;
use crate::status;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// What happened to one collection attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectOutcome {
    /// Reading stored in the cache
    Admitted,
    /// Reading parsed but failed validation; cache untouched
    Rejected,
    /// smartctl could not be run; cache untouched
    Failed,
}

pub struct Collector {
    runner: Arc<dyn SmartctlRunner>,
    cache: DeviceCache,
    power_mode_check: String,
}

impl Collector {
    pub fn new(runner: Arc<dyn SmartctlRunner>, cache: DeviceCache, power_mode_check: &str) -> Self {
        Self {
            runner,
            cache,
            power_mode_check: power_mode_check.to_string(),
        }
    }

    /// Fixed argument set for one device
    pub fn args_for(&self, device: &Device) -> Vec<String> {
        vec![
            "--json".to_string(),
            "--info".to_string(),
            "--health".to_string(),
            "--attributes".to_string(),
            "--tolerance=verypermissive".to_string(),
            format!("--nocheck={}", self.power_mode_check),
            "--format=brief".to_string(),
            "--log=error".to_string(),
            format!("--device={}", device.device_type),
            device.name.clone(),
        ]
    }

    pub async fn collect(&self, device: &Device) -> CollectOutcome {
        let start_time = Instant::now();

        let output = match self.runner.run(&self.args_for(device)).await {
            Ok(output) => output,
            Err(e) => {
                warn!(
                    "S.M.A.R.T. output reading failed for {} after {}ms: {}",
                    device,
                    start_time.elapsed().as_millis(),
                    e
                );
                return CollectOutcome::Failed;
            }
        };

        let json = parse_document(strip_artifacts(&output.stdout));
        let messages = document::messages(&json);
        let admissible = status::decode(device, document::exit_status(&json), messages.as_deref());

        debug!(
            "Collected S.M.A.R.T. json data for {} in {}ms (exit code {:?})",
            device,
            start_time.elapsed().as_millis(),
            output.exit_code
        );

        if admissible {
            self.cache
                .put(device.clone(), CacheEntry::new(json, Utc::now()));
            CollectOutcome::Admitted
        } else {
            CollectOutcome::Rejected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SmartctlError;
    use crate::runner::SmartctlOutput;
    use async_trait::async_trait;

    struct Canned(&'static str);

    #[async_trait]
    impl SmartctlRunner for Canned {
        async fn run(&self, _args: &[String]) -> Result<SmartctlOutput, SmartctlError> {
            Ok(SmartctlOutput {
                stdout: self.0.to_string(),
                exit_code: Some(0),
            })
        }
    }

    #[test]
    fn test_args_for_device() {
        let collector = Collector::new(Arc::new(Canned("")), DeviceCache::new(), "standby");
        let args = collector.args_for(&Device::new("/dev/nvme0", "nvme"));
        assert_eq!(
            args.join(" "),
            "--json --info --health --attributes --tolerance=verypermissive \
             --nocheck=standby --format=brief --log=error --device=nvme /dev/nvme0"
        );
    }

    #[tokio::test]
    async fn test_artifact_is_stripped_before_parsing() {
        let cache = DeviceCache::new();
        let runner = Canned("  Pending defect count:{\"smartctl\":{\"exit_status\":0},\"serial_number\":\"X1\"}");
        let collector = Collector::new(Arc::new(runner), cache.clone(), "standby");
        let device = Device::new("/dev/sda", "sat");

        assert_eq!(collector.collect(&device).await, CollectOutcome::Admitted);
        assert_eq!(cache.get(&device).unwrap().data["serial_number"], "X1");
    }
}
