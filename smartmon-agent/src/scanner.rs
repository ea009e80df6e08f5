//! Device discovery through `smartctl --scan`

use crate::device::Device;
use crate::document::{empty_document, parse_document};
use crate::runner::SmartctlRunner;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// smartctl exits with 2 when some devices are asleep; the output is still usable
const EXIT_DEVICES_SLEEPING: i32 = 2;

pub struct DeviceScanner {
    runner: Arc<dyn SmartctlRunner>,
    device_types: Vec<String>,
}

impl DeviceScanner {
    pub fn new(runner: Arc<dyn SmartctlRunner>, device_types: Vec<String>) -> Self {
        Self {
            runner,
            device_types,
        }
    }

    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["--json".to_string(), "--scan".to_string()];
        args.extend(self.device_types.iter().map(|t| format!("--device={t}")));
        args
    }

    /// Run the scan. Failures are logged and produce an empty document.
    pub async fn scan(&self) -> Value {
        debug!("Scanning for devices");
        let output = match self.runner.run(&self.args()).await {
            Ok(output) => output,
            Err(e) => {
                warn!("S.M.A.R.T. scan failed: {}", e);
                return empty_document();
            }
        };

        match output.exit_code {
            Some(0) => {}
            Some(EXIT_DEVICES_SLEEPING) => {
                debug!("smartctl scan exit status 2, some devices are in a low-power state")
            }
            other => {
                warn!("S.M.A.R.T. scan exited with status {:?}", other);
                return empty_document();
            }
        }
        parse_document(&output.stdout)
    }

    /// Scan and turn the result into a device list
    pub async fn discover(&self) -> Vec<Device> {
        let devices = devices_from_scan(&self.scan().await);
        info!("Discovered {} device(s)", devices.len());
        devices
    }
}

/// `devices[] { name, type }` from a scan document; entries without a name are skipped
pub fn devices_from_scan(doc: &Value) -> Vec<Device> {
    let Some(list) = doc.get("devices").and_then(Value::as_array) else {
        return Vec::new();
    };
    list.iter()
        .filter_map(|entry| {
            let name = entry.get("name")?.as_str()?;
            let device_type = entry.get("type").and_then(Value::as_str).unwrap_or("auto");
            Some(Device::new(name, device_type))
        })
        .collect()
}
