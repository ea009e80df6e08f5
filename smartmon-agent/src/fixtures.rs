//! Fake-data mode: readings come from `<dir>/<short name>.json` instead of smartctl

use crate::device::Device;
use crate::document::{empty_document, parse_document};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

#[derive(Debug, Clone)]
pub struct FixtureSource {
    dir: PathBuf,
}

impl FixtureSource {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, device: &Device) -> PathBuf {
        self.dir.join(format!("{}.json", device.short_name()))
    }

    /// Read and parse the fixture; unreadable files give an empty document
    pub async fn read(&self, device: &Device) -> Value {
        let path = self.path_for(device);
        debug!("Read fake S.M.A.R.T. data from {}", path.display());
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => parse_document(&content),
            Err(e) => {
                error!("Fake S.M.A.R.T. data reading error ({}): {}", path.display(), e);
                empty_document()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_uses_last_segment() {
        let fixtures = FixtureSource::new("debug");
        let path = fixtures.path_for(&Device::new("/dev/sda", "sat"));
        assert_eq!(path, PathBuf::from("debug/sda.json"));
        assert_eq!(fixtures.dir(), Path::new("debug"));
    }

    #[tokio::test]
    async fn test_read_fixture() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sdb.json"), r#"{"model_name": "WDC"}"#).unwrap();
        std::fs::write(dir.path().join("sdc.json"), "garbage").unwrap();
        let fixtures = FixtureSource::new(dir.path());

        let doc = fixtures.read(&Device::new("/dev/sdb", "sat")).await;
        assert_eq!(doc["model_name"], "WDC");

        let doc = fixtures.read(&Device::new("/dev/sdc", "sat")).await;
        assert_eq!(doc, empty_document());

        let doc = fixtures.read(&Device::new("/dev/sdz", "sat")).await;
        assert_eq!(doc, empty_document());
    }
}
