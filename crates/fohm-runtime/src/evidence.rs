#![forbid(unsafe_code)]

//! Bounded FIFO ledger of applied channel configurations.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::mode::RuntimeMode;

/// Record of one successful clear-then-apply sequence on a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationRecord {
    pub channel: u8,
    pub requested_ohms: f64,
    pub quantized_ohms: f64,
    /// Catalog indices left in circuit, ascending.
    pub active_indices: Vec<u8>,
    pub closure_count: usize,
    pub mode: RuntimeMode,
    pub timestamp_ms: u64,
}

impl ConfigurationRecord {
    /// Serialize to a single JSON line.
    #[must_use]
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

/// Bounded FIFO buffer of configuration records.
///
/// Capacity is enforced via `capacity.max(1)`. When full, the oldest entry
/// is evicted before a new one is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationLedger {
    capacity: usize,
    entries: VecDeque<ConfigurationRecord>,
}

impl ConfigurationLedger {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    /// Append a record, evicting the oldest if at capacity.
    pub fn record(&mut self, entry: ConfigurationRecord) {
        if self.entries.len() == self.capacity {
            let _ = self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&ConfigurationRecord> {
        self.entries.back()
    }

    /// Most recent record for one channel.
    #[must_use]
    pub fn latest_for(&self, channel: u8) -> Option<&ConfigurationRecord> {
        self.entries.iter().rev().find(|e| e.channel == channel)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigurationRecord> {
        self.entries.iter()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// JSONL rendering, oldest first.
    #[must_use]
    pub fn serialize_jsonl(&self) -> String {
        self.entries
            .iter()
            .filter_map(|e| serde_json::to_string(e).ok())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
