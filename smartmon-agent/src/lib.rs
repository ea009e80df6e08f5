//! Smartmon Agent - S.M.A.R.T. health telemetry for local storage devices
//!
//! The agent keeps the last admissible `smartctl` reading for every device:
//! - Device discovery through `smartctl --scan` (or an explicit config list)
//! - Per-device collection with status-code and message validation
//! - A concurrency-safe cache that always serves the last-known-good reading
//! - Concurrent refresh of stale devices with a join barrier
//! - A small JSON API over the cache

pub mod cache;
pub mod collector;
pub mod config;
pub mod device;
pub mod document;
pub mod error;
pub mod fixtures;
pub mod http;
pub mod refresh;
pub mod runner;
pub mod scanner;
pub mod service;
pub mod status;

pub use cache::{CacheEntry, DeviceCache};
pub use collector::{CollectOutcome, Collector};
pub use config::AgentConfig;
pub use device::Device;
pub use document::{empty_document, parse_document, SmartctlMessage};
pub use error::SmartctlError;
pub use refresh::{RefreshOrchestrator, RefreshSummary};
pub use runner::{SmartctlCommand, SmartctlOutput, SmartctlRunner};
pub use scanner::DeviceScanner;
pub use service::SmartService;
