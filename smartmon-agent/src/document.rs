//! smartctl JSON output handling
//!
//! Readings are kept as generic `serde_json::Value` trees because consumers
//! read arbitrary nested fields. Only two paths are typed here:
//! - `smartctl.exit_status`
//! - `smartctl.messages[] { severity, string }`

use serde_json::{Map, Value};

/// Line that smartmontools before 7.3 prints ahead of the JSON document
const PENDING_DEFECT_ARTIFACT: &str = "  Pending defect count:";

/// One entry of `smartctl.messages`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SmartctlMessage {
    pub severity: String,
    pub text: String,
}

impl SmartctlMessage {
    /// Fields are read independently so a malformed `string` never hides the severity
    pub fn from_value(entry: &Value) -> Self {
        let field = |key: &str| {
            entry
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            severity: field("severity"),
            text: field("string"),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == "error"
    }
}

/// The value substituted for missing, empty or malformed output
pub fn empty_document() -> Value {
    Value::Object(Map::new())
}

/// Remove the known pre-7.3 artifact from raw tool output
pub fn strip_artifacts(raw: &str) -> &str {
    raw.strip_prefix(PENDING_DEFECT_ARTIFACT).unwrap_or(raw)
}

/// Parse tool output, never failing: anything that is not valid JSON becomes `{}`
pub fn parse_document(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| empty_document())
}

/// `smartctl.exit_status` coerced to an integer; floats truncate, numeric
/// strings are parsed, anything else is 0
pub fn exit_status(doc: &Value) -> i64 {
    match doc.pointer("/smartctl/exit_status") {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
                .unwrap_or(0)
        }
        Some(Value::Bool(true)) => 1,
        _ => 0,
    }
}

/// `smartctl.messages`, `None` when the list is absent
pub fn messages(doc: &Value) -> Option<Vec<SmartctlMessage>> {
    let list = doc.pointer("/smartctl/messages")?.as_array()?;
    Some(
        list.iter()
            .map(SmartctlMessage::from_value)
            .collect(),
    )
}
