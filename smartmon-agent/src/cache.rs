//! Last-known-good smartctl readings, keyed by device
//!
//! Entries are only ever replaced whole. Staleness never removes an entry,
//! it only makes the device eligible for another collection attempt.

use crate::device::Device;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// One admitted reading and the moment it was collected
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: Arc<Value>,
    pub collected_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(data: Value, collected_at: DateTime<Utc>) -> Self {
        Self {
            data: Arc::new(data),
            collected_at,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        now - self.collected_at
    }
}

/// Shared device cache. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct DeviceCache {
    entries: Arc<RwLock<HashMap<Device, CacheEntry>>>,
}

impl DeviceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, device: &Device) -> Option<CacheEntry> {
        self.entries.read().get(device).cloned()
    }

    /// Last write wins
    pub fn put(&self, device: Device, entry: CacheEntry) {
        self.entries.write().insert(device, entry);
    }

    /// True when the device has no entry or its entry is older than `interval`
    pub fn is_stale(&self, device: &Device, interval: Duration, now: DateTime<Utc>) -> bool {
        match self.entries.read().get(device) {
            Some(entry) => {
                let limit = TimeDelta::from_std(interval).unwrap_or(TimeDelta::MAX);
                entry.age(now) > limit
            }
            None => true,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
