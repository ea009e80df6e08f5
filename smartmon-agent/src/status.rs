//! smartctl exit status decoding
//!
//! `smartctl.exit_status` is an 8-bit flag field. Each bit is an independent
//! condition. Bits 0 and 1 mean the reading itself is unusable; bits 2-7
//! report disk health problems and are logged without blocking admission.

use crate::device::Device;
use crate::document::SmartctlMessage;
use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Meaning of one exit status bit
#[derive(Debug)]
pub struct StatusFlag {
    pub bit: u8,
    pub severity: Severity,
    pub description: &'static str,
}

impl StatusFlag {
    /// Error-severity flags make a reading inadmissible
    pub fn blocks_admission(&self) -> bool {
        self.severity == Severity::Error
    }

    fn is_set(&self, code: i64) -> bool {
        code > 0 && (code >> self.bit) & 1 == 1
    }
}

pub static STATUS_FLAGS: [StatusFlag; 8] = [
    StatusFlag {
        bit: 0,
        severity: Severity::Error,
        description: "Command line did not parse",
    },
    StatusFlag {
        bit: 1,
        severity: Severity::Error,
        description: "Device open failed, device did not return an IDENTIFY DEVICE structure, or device is in a low-power mode",
    },
    StatusFlag {
        bit: 2,
        severity: Severity::Warning,
        description: "Some SMART or other ATA command to the disk failed, or there was a checksum error in a SMART data structure",
    },
    StatusFlag {
        bit: 3,
        severity: Severity::Warning,
        description: "SMART status check returned 'DISK FAILING'",
    },
    StatusFlag {
        bit: 4,
        severity: Severity::Warning,
        description: "Prefail attributes <= threshold",
    },
    StatusFlag {
        bit: 5,
        severity: Severity::Warning,
        description: "SMART status check returned 'DISK OK' but some usage or prefail attributes have been <= threshold at some time in the past",
    },
    StatusFlag {
        bit: 6,
        severity: Severity::Warning,
        description: "The device error log contains records of errors",
    },
    StatusFlag {
        bit: 7,
        severity: Severity::Warning,
        description: "The device self-test log contains records of errors",
    },
];

/// Flags set in `code`, lowest bit first. Bits above 7 are ignored.
pub fn flagged(code: i64) -> impl Iterator<Item = &'static StatusFlag> {
    STATUS_FLAGS.iter().filter(move |flag| flag.is_set(code))
}

/// Log every flagged condition and report whether the code allows admission
pub fn status_code_is_ok(device: &Device, code: i64) -> bool {
    let mut ok = true;
    for flag in flagged(code) {
        match flag.severity {
            Severity::Error => {
                error!("{} (device: {})", flag.description, device);
                ok = false;
            }
            Severity::Warning => warn!("{} (device: {})", flag.description, device),
        }
    }
    ok
}

/// A reading carrying an error-severity message is rejected; a missing list is fine
pub fn messages_are_ok(device: &Device, messages: Option<&[SmartctlMessage]>) -> bool {
    let Some(messages) = messages else {
        return true;
    };
    match messages.iter().find(|m| m.is_error()) {
        Some(message) => {
            error!("{} (device: {})", message.text, device);
            false
        }
        None => true,
    }
}

/// Admission check for one reading. Both inputs are always inspected so
/// every condition gets logged.
pub fn decode(device: &Device, code: i64, messages: Option<&[SmartctlMessage]>) -> bool {
    let code_ok = status_code_is_ok(device, code);
    let messages_ok = messages_are_ok(device, messages);
    code_ok && messages_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sda() -> Device {
        Device::new("/dev/sda", "sat")
    }

    fn message(severity: &str, text: &str) -> SmartctlMessage {
        SmartctlMessage {
            severity: severity.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_zero_is_admissible() {
        assert!(decode(&sda(), 0, None));
        assert_eq!(flagged(0).count(), 0);
    }

    #[test]
    fn test_bits_0_and_1_reject() {
        for code in 0..=255i64 {
            let expected = code & 0b11 == 0;
            assert_eq!(decode(&sda(), code, None), expected, "code {code:#010b}");
        }
    }

    #[test]
    fn test_warning_bits_only_are_admissible() {
        let no_messages: Vec<SmartctlMessage> = Vec::new();
        for code in (0..=255i64).filter(|c| c & 0b11 == 0) {
            assert!(decode(&sda(), code, Some(no_messages.as_slice())));
        }
        assert!(decode(&sda(), 0b0000_0100, None));
    }

    #[test]
    fn test_flagged_order_and_range() {
        let bits: Vec<u8> = flagged(0b1000_0101).map(|f| f.bit).collect();
        assert_eq!(bits, vec![0, 2, 7]);

        // Only the low byte carries meaning
        assert_eq!(flagged(0x100).count(), 0);
        assert_eq!(flagged(-1).count(), 0);
    }

    #[test]
    fn test_error_message_rejects_regardless_of_code() {
        let msgs = vec![
            message("information", "ok"),
            message("error", "Smartctl open device: /dev/sda failed"),
        ];
        assert!(!decode(&sda(), 0, Some(msgs.as_slice())));
        assert!(!decode(&sda(), 0b0100_0000, Some(msgs.as_slice())));
    }

    #[test]
    fn test_non_error_messages_are_admissible() {
        let msgs = vec![message("warning", "odd"), message("Error", "case matters")];
        assert!(messages_are_ok(&sda(), Some(msgs.as_slice())));
    }

    #[test]
    fn test_error_message_with_malformed_text_rejects() {
        let doc = serde_json::json!({
            "smartctl": {
                "exit_status": 0,
                "messages": [
                    {"severity": "information", "string": "ok"},
                    {"severity": "error", "string": null}
                ]
            }
        });
        let msgs = crate::document::messages(&doc).unwrap();
        assert!(!decode(&sda(), 0, Some(msgs.as_slice())));

        let doc = serde_json::json!({
            "smartctl": {"messages": [{"severity": "error", "string": 12}]}
        });
        let msgs = crate::document::messages(&doc).unwrap();
        assert!(!decode(&sda(), 0, Some(msgs.as_slice())));
    }

    #[test]
    fn test_non_integer_code_still_rejects() {
        let doc = serde_json::json!({"smartctl": {"exit_status": 2.0}});
        assert!(!decode(&sda(), crate::document::exit_status(&doc), None));

        let doc = serde_json::json!({"smartctl": {"exit_status": "1"}});
        assert!(!decode(&sda(), crate::document::exit_status(&doc), None));
    }

    #[test]
    fn test_table_severity() {
        let blocking: Vec<u8> = STATUS_FLAGS
            .iter()
            .filter(|f| f.blocks_admission())
            .map(|f| f.bit)
            .collect();
        assert_eq!(blocking, vec![0, 1]);
    }
}
