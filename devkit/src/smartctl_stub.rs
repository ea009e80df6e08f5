/*!
Scripted smartctl runner for tests without real hardware

Records every invocation and answers from per-device scripts.
Unscripted devices answer with an empty stdout and exit code 0.
*/

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use smartmon_agent::{SmartctlError, SmartctlOutput, SmartctlRunner};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Canned answer for one device (or for `--scan`)
#[derive(Debug, Clone)]
pub enum Reply {
    Output { stdout: String, exit_code: Option<i32> },
    LaunchFailure,
}

impl Reply {
    pub fn json(doc: &Value, exit_code: i32) -> Self {
        Reply::Output {
            stdout: doc.to_string(),
            exit_code: Some(exit_code),
        }
    }

    pub fn raw<S: Into<String>>(stdout: S, exit_code: i32) -> Self {
        Reply::Output {
            stdout: stdout.into(),
            exit_code: Some(exit_code),
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeSmartctl {
    replies: Arc<Mutex<HashMap<String, Reply>>>,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    delay: Option<Duration>,
}

const SCAN_KEY: &str = "--scan";

impl FakeSmartctl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every invocation sleeps this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Script the answer for the device whose name is the last argument
    pub fn reply_for<S: Into<String>>(&self, device_name: S, reply: Reply) -> &Self {
        self.replies.lock().insert(device_name.into(), reply);
        self
    }

    pub fn reply_for_scan(&self, reply: Reply) -> &Self {
        self.replies.lock().insert(SCAN_KEY.to_string(), reply);
        self
    }

    /// All recorded argument lists, in call order
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().clone()
    }

    /// Number of collection runs for one device
    pub fn calls_for(&self, device_name: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|args| args.last().map(String::as_str) == Some(device_name))
            .count()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn key_for(args: &[String]) -> String {
        if args.iter().any(|a| a == SCAN_KEY) {
            SCAN_KEY.to_string()
        } else {
            args.last().cloned().unwrap_or_default()
        }
    }
}

#[async_trait]
impl SmartctlRunner for FakeSmartctl {
    async fn run(&self, args: &[String]) -> Result<SmartctlOutput, SmartctlError> {
        self.calls.lock().push(args.to_vec());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self.replies.lock().get(&Self::key_for(args)).cloned();
        match reply {
            Some(Reply::Output { stdout, exit_code }) => Ok(SmartctlOutput { stdout, exit_code }),
            Some(Reply::LaunchFailure) => Err(SmartctlError::Launch {
                program: "smartctl".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not installed"),
            }),
            None => Ok(SmartctlOutput {
                stdout: String::new(),
                exit_code: Some(0),
            }),
        }
    }
}

/// Builds smartctl JSON documents shaped like real `--json` output
pub struct SmartctlJsonBuilder {
    exit_status: i64,
    messages: Vec<Value>,
    extra: serde_json::Map<String, Value>,
}

impl SmartctlJsonBuilder {
    pub fn new() -> Self {
        Self {
            exit_status: 0,
            messages: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn exit_status(mut self, code: i64) -> Self {
        self.exit_status = code;
        self
    }

    pub fn message(mut self, severity: &str, text: &str) -> Self {
        self.messages
            .push(serde_json::json!({ "severity": severity, "string": text }));
        self
    }

    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    pub fn build(self) -> Value {
        let mut smartctl = serde_json::json!({
            "version": [7, 4],
            "exit_status": self.exit_status,
        });
        if !self.messages.is_empty() {
            smartctl["messages"] = Value::Array(self.messages);
        }
        let mut doc = self.extra;
        doc.insert("smartctl".to_string(), smartctl);
        Value::Object(doc)
    }

    /// `--scan` output listing `(name, type)` pairs
    pub fn scan(devices: &[(&str, &str)]) -> Value {
        let list: Vec<Value> = devices
            .iter()
            .map(|(name, kind)| {
                serde_json::json!({
                    "name": name,
                    "info_name": format!("{name} [{kind}]"),
                    "type": kind,
                })
            })
            .collect();
        serde_json::json!({ "devices": list })
    }
}

impl Default for SmartctlJsonBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_scripted_replies_and_recording() {
        let fake = FakeSmartctl::new();
        fake.reply_for("/dev/sda", Reply::raw("{}", 4))
            .reply_for("/dev/sdb", Reply::LaunchFailure);

        let out = fake.run(&args(&["--json", "/dev/sda"])).await.unwrap();
        assert_eq!(out.stdout, "{}");
        assert_eq!(out.exit_code, Some(4));

        assert!(fake.run(&args(&["--json", "/dev/sdb"])).await.is_err());

        let out = fake.run(&args(&["--json", "/dev/sdc"])).await.unwrap();
        assert!(out.stdout.is_empty());

        assert_eq!(fake.calls().len(), 3);
        assert_eq!(fake.calls_for("/dev/sda"), 1);
    }

    #[tokio::test]
    async fn test_scan_key() {
        let fake = FakeSmartctl::new();
        fake.reply_for_scan(Reply::json(&SmartctlJsonBuilder::scan(&[("/dev/sda", "sat")]), 0));

        let out = fake.run(&args(&["--json", "--scan", "--device=sat"])).await.unwrap();
        assert!(out.stdout.contains("/dev/sda"));
    }

    #[test]
    fn test_json_builder() {
        let doc = SmartctlJsonBuilder::new()
            .exit_status(4)
            .message("error", "boom")
            .field("serial_number", Value::from("S1"))
            .build();
        assert_eq!(doc["smartctl"]["exit_status"], 4);
        assert_eq!(doc["smartctl"]["messages"][0]["string"], "boom");
        assert_eq!(doc["serial_number"], "S1");

        let plain = SmartctlJsonBuilder::new().build();
        assert!(plain["smartctl"].get("messages").is_none());
    }
}
