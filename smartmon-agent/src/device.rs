//! Device identity used as the cache key

use serde::{Deserialize, Serialize};
use std::fmt;

/// Addressable storage unit: a device path plus the smartctl `--device` type hint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    #[serde(rename = "type", default = "default_device_type")]
    pub device_type: String,
}

fn default_device_type() -> String {
    "auto".to_string()
}

impl Device {
    pub fn new<N: Into<String>, T: Into<String>>(name: N, device_type: T) -> Self {
        Self {
            name: name.into(),
            device_type: device_type.into(),
        }
    }

    /// Last path segment of the device name (`/dev/sda` -> `sda`)
    pub fn short_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.device_type)
    }
}
