#![forbid(unsafe_code)]

//! Active set to relay closures for the two-bank series network.
//!
//! Both banks are always engaged and bridged in series; resistance is set
//! entirely by which bypass relays are closed. A closed bypass shorts its
//! element, so only inactive values get a closure.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{Bank, CATALOG_LEN};
use crate::decompose::ActiveSet;
use crate::layout::{BankLayout, ChannelLayout};

/// Two channel names to connect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClosurePair {
    pub a: String,
    pub b: String,
}

impl ClosurePair {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }

    /// Same relay regardless of argument order.
    #[must_use]
    pub fn joins(&self, a: &str, b: &str) -> bool {
        (self.a == a && self.b == b) || (self.a == b && self.b == a)
    }
}

impl fmt::Display for ClosurePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.a, self.b)
    }
}

/// Ordered closures realizing one decomposition: engage A, engage B, bridge,
/// then bypasses in ascending catalog order.
///
/// Only [`encode`] builds plans; serialization is one-way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClosurePlan {
    pairs: Vec<ClosurePair>,
    bypassed: ActiveSet,
}

/// Closures issued for every target.
pub const UNCONDITIONAL_CLOSURES: usize = 3;

impl ClosurePlan {
    #[must_use]
    pub fn pairs(&self) -> &[ClosurePair] {
        &self.pairs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ClosurePair> {
        self.pairs.iter()
    }

    /// Catalog indices that receive a bypass closure.
    #[must_use]
    pub const fn bypassed(&self) -> ActiveSet {
        self.bypassed
    }

    #[must_use]
    pub fn contains(&self, a: &str, b: &str) -> bool {
        self.pairs.iter().any(|pair| pair.joins(a, b))
    }

    /// Only the bypass closures, skipping engage and bridge.
    #[must_use]
    pub fn bypass_pairs(&self) -> &[ClosurePair] {
        self.pairs.get(UNCONDITIONAL_CLOSURES..).unwrap_or(&[])
    }
}

impl<'a> IntoIterator for &'a ClosurePlan {
    type Item = &'a ClosurePair;
    type IntoIter = std::slice::Iter<'a, ClosurePair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

/// Build the closure plan leaving `active` in circuit.
///
/// Layouts must be in trunk, engage, ascending-bypass order; nothing here can
/// detect a misordered layout.
#[must_use]
pub fn encode(active: ActiveSet, layout_a: &BankLayout, layout_b: &BankLayout) -> ClosurePlan {
    let bypassed = active.complement();
    let mut pairs = Vec::with_capacity(UNCONDITIONAL_CLOSURES + bypassed.len());
    pairs.push(ClosurePair::new(layout_a.trunk(), layout_a.engage()));
    pairs.push(ClosurePair::new(layout_b.trunk(), layout_b.engage()));
    pairs.push(ClosurePair::new(layout_a.trunk(), layout_b.trunk()));

    for index in (0..CATALOG_LEN).filter(|&i| bypassed.contains(i)) {
        let layout = match Bank::of(index) {
            Bank::A => layout_a,
            Bank::B => layout_b,
        };
        pairs.push(ClosurePair::new(
            layout.trunk(),
            layout.bypass(Bank::slot(index)),
        ));
    }

    ClosurePlan { pairs, bypassed }
}

/// [`encode`] against a channel's layouts.
#[must_use]
pub fn encode_channel(active: ActiveSet, layout: &ChannelLayout) -> ClosurePlan {
    encode(active, &layout.bank_a, &layout.bank_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompose::decompose;
    use crate::layout::{BankLayoutProvider, ChannelIndex, StandardLayout};

    fn channel_zero() -> ChannelLayout {
        StandardLayout
            .layout(ChannelIndex::new(0).expect("valid channel"))
            .expect("standard layout")
    }

    #[test]
    fn sixty_seven_ohm_plan() {
        let layout = channel_zero();
        let d = decompose(67.0).expect("in range");
        let plan = encode_channel(d.active, &layout);

        assert_eq!(plan.len(), UNCONDITIONAL_CLOSURES + 13);
        assert_eq!(plan.pairs()[0], ClosurePair::new("b0", "b0engage"));
        assert_eq!(plan.pairs()[1], ClosurePair::new("b1", "b1engage"));
        assert_eq!(plan.pairs()[2], ClosurePair::new("b0", "b1"));
        // 1, 2 ohm are bank A slots 2, 3; 64 ohm is bank B slot 0.
        assert!(!plan.contains("b0", "b0r2"));
        assert!(!plan.contains("b0", "b0r3"));
        assert!(!plan.contains("b1", "b1r0"));
        assert!(plan.contains("b0", "b0r0"));
        assert!(plan.contains("b1", "b1r7"));
    }

    #[test]
    fn zero_ohm_plan_shorts_everything() {
        let layout = channel_zero();
        let plan = encode_channel(ActiveSet::EMPTY, &layout);
        assert_eq!(plan.len(), UNCONDITIONAL_CLOSURES + CATALOG_LEN);
        assert_eq!(plan.bypassed(), ActiveSet::FULL);
        for slot in 0..8 {
            assert!(plan.contains("b0", &format!("b0r{slot}")));
            assert!(plan.contains("b1", &format!("b1r{slot}")));
        }
    }

    #[test]
    fn full_active_set_keeps_only_unconditional_closures() {
        let plan = encode_channel(ActiveSet::FULL, &channel_zero());
        assert_eq!(plan.len(), UNCONDITIONAL_CLOSURES);
        assert!(plan.bypass_pairs().is_empty());
    }

    #[test]
    fn bypasses_are_bank_a_then_bank_b_ascending() {
        let plan = encode_channel(ActiveSet::EMPTY, &channel_zero());
        let names: Vec<&str> = plan.bypass_pairs().iter().map(|p| p.b.as_str()).collect();
        let expected: Vec<String> = (0..8)
            .map(|s| format!("b0r{s}"))
            .chain((0..8).map(|s| format!("b1r{s}")))
            .collect();
        assert_eq!(names, expected);
        assert!(plan.bypass_pairs()[..8].iter().all(|p| p.a == "b0"));
        assert!(plan.bypass_pairs()[8..].iter().all(|p| p.a == "b1"));
    }

    #[test]
    fn encoding_is_idempotent() {
        let layout = channel_zero();
        let d = decompose(4321.75).expect("in range");
        let first = encode_channel(d.active, &layout);
        let second = encode_channel(d.active, &layout);
        assert_eq!(first, second);
    }

    #[test]
    fn plan_pairs_are_a_subset_of_clear_pairs() {
        let layout = channel_zero();
        let clear = layout.clear_pairs();
        let plan = encode_channel(ActiveSet::EMPTY, &layout);
        for pair in &plan {
            assert!(clear.iter().any(|c| c.joins(&pair.a, &pair.b)), "{pair}");
        }
    }

    #[test]
    fn bypass_pairs_of_short_plan_is_empty() {
        let plan = ClosurePlan {
            pairs: vec![ClosurePair::new("b0", "b0engage")],
            bypassed: ActiveSet::FULL,
        };
        assert!(plan.bypass_pairs().is_empty());
    }

    #[test]
    fn plan_serializes_in_closure_order() {
        let plan = encode_channel(ActiveSet::FULL, &channel_zero());
        let json = serde_json::to_value(&plan).expect("serialize");
        assert_eq!(json["pairs"][2]["a"], "b0");
        assert_eq!(json["pairs"][2]["b"], "b1");
        assert_eq!(json["bypassed"], 0);
    }

    #[test]
    fn joins_is_symmetric() {
        let pair = ClosurePair::new("b0", "b1");
        assert!(pair.joins("b1", "b0"));
        assert!(!pair.joins("b0", "b0engage"));
        assert_eq!(pair.to_string(), "b0 <-> b1");
    }
}
