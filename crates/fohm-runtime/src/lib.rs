#![forbid(unsafe_code)]

//! FrankenOhm runtime: operating modes and the configuration audit trail
//! shared by the decomposition and switch crates.
//!
//! ## Module layout
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | `mode`      | [`RuntimeMode`] enum (Strict / Hardened)                   |
//! | `evidence`  | [`ConfigurationLedger`], [`ConfigurationRecord`]           |

pub mod evidence;
pub mod mode;

pub use evidence::{ConfigurationLedger, ConfigurationRecord};
pub use mode::RuntimeMode;

use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock milliseconds for ledger timestamps.
#[must_use]
pub fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(channel: u8, ohms: f64) -> ConfigurationRecord {
        ConfigurationRecord {
            channel,
            requested_ohms: ohms,
            quantized_ohms: ohms,
            active_indices: vec![],
            closure_count: 19,
            mode: RuntimeMode::Strict,
            timestamp_ms: now_unix_ms(),
        }
    }

    #[test]
    fn default_mode_is_strict() {
        assert_eq!(RuntimeMode::default(), RuntimeMode::Strict);
        assert!(!RuntimeMode::Strict.is_hardened());
        assert!(RuntimeMode::Hardened.is_hardened());
    }

    #[test]
    fn mode_serializes_as_variant_name() {
        let json = serde_json::to_string(&RuntimeMode::Hardened).expect("serialize");
        assert_eq!(json, "\"Hardened\"");
        let back: RuntimeMode = serde_json::from_str("\"Strict\"").expect("deserialize");
        assert_eq!(back, RuntimeMode::Strict);
    }

    #[test]
    fn ledger_is_bounded() {
        let mut ledger = ConfigurationLedger::new(2);
        for i in 0..4 {
            ledger.record(record(0, f64::from(i)));
        }
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.latest().map(|r| r.requested_ohms), Some(3.0));
        assert_eq!(ledger.iter().next().map(|r| r.requested_ohms), Some(2.0));
    }

    #[test]
    fn ledger_capacity_has_floor_of_one() {
        let mut ledger = ConfigurationLedger::new(0);
        assert_eq!(ledger.capacity(), 1);
        assert!(ledger.is_empty());
        ledger.record(record(1, 5.0));
        ledger.record(record(1, 6.0));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn latest_for_filters_by_channel() {
        let mut ledger = ConfigurationLedger::new(8);
        ledger.record(record(0, 1.0));
        ledger.record(record(3, 2.0));
        ledger.record(record(0, 4.0));
        assert_eq!(ledger.latest_for(3).map(|r| r.requested_ohms), Some(2.0));
        assert_eq!(ledger.latest_for(0).map(|r| r.requested_ohms), Some(4.0));
        assert!(ledger.latest_for(7).is_none());
    }

    #[test]
    fn jsonl_has_one_line_per_record() {
        let mut ledger = ConfigurationLedger::new(8);
        ledger.record(record(0, 67.0));
        ledger.record(record(1, 10.0));
        let jsonl = ledger.serialize_jsonl();
        let lines: Vec<_> = jsonl.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: serde_json::Value = serde_json::from_str(lines[0]).expect("valid JSON");
        assert_eq!(parsed["channel"], 0);
        assert_eq!(parsed["requested_ohms"], 67.0);
        assert_eq!(parsed["mode"], "Strict");
    }

    #[test]
    fn record_json_line_roundtrips() {
        let entry = record(2, 0.25);
        let back: ConfigurationRecord =
            serde_json::from_str(&entry.to_json_line()).expect("valid JSON");
        assert_eq!(back, entry);
    }
}
