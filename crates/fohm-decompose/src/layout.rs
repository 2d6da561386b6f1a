#![forbid(unsafe_code)]

//! Physical channel names for the two relay banks behind a resistance channel.
//!
//! A bank layout is ten names in a fixed order: trunk, engage, then the
//! eight bypass relays in ascending catalog order. The encoder trusts this
//! order blindly, so every constructor here enforces it.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{BANK_SIZE, Bank};
use crate::encode::ClosurePair;
use crate::validation::{LayoutError, LayoutResult};

/// Trunk + engage + one bypass per bank element.
pub const BANK_LAYOUT_LEN: usize = 2 + BANK_SIZE;
/// Resistance channels on one card.
pub const CHANNEL_COUNT: u8 = 16;

/// Validated resistance channel number, `0..16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ChannelIndex(u8);

impl ChannelIndex {
    pub fn new(channel: u8) -> LayoutResult<Self> {
        if channel >= CHANNEL_COUNT {
            return Err(LayoutError::ChannelOutOfRange { channel });
        }
        Ok(Self(channel))
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Bank number on the card for one of this channel's banks. Channel `c`
    /// drives banks `2c` (A) and `2c + 1` (B).
    #[must_use]
    pub const fn bank_number(self, bank: Bank) -> u8 {
        match bank {
            Bank::A => self.0 * 2,
            Bank::B => self.0 * 2 + 1,
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..CHANNEL_COUNT).map(Self)
    }
}

impl TryFrom<u8> for ChannelIndex {
    type Error = LayoutError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChannelIndex> for u8 {
    fn from(value: ChannelIndex) -> Self {
        value.0
    }
}

impl fmt::Display for ChannelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BankLayout {
    channels: Vec<String>,
}

impl BankLayout {
    pub fn new(channels: Vec<String>) -> LayoutResult<Self> {
        if channels.len() != BANK_LAYOUT_LEN {
            return Err(LayoutError::WrongLength {
                expected: BANK_LAYOUT_LEN,
                actual: channels.len(),
            });
        }
        let mut seen = HashSet::new();
        for name in &channels {
            if !seen.insert(name.as_str()) {
                return Err(LayoutError::DuplicateChannel { name: name.clone() });
            }
        }
        Ok(Self { channels })
    }

    #[must_use]
    pub fn trunk(&self) -> &str {
        &self.channels[0]
    }

    #[must_use]
    pub fn engage(&self) -> &str {
        &self.channels[1]
    }

    /// Bypass relay for bank slot `slot` (`0..8`).
    #[must_use]
    pub fn bypass(&self, slot: usize) -> &str {
        &self.channels[2 + slot]
    }

    #[must_use]
    pub fn bypasses(&self) -> &[String] {
        &self.channels[2..]
    }

    #[must_use]
    pub fn channels(&self) -> &[String] {
        &self.channels
    }
}

/// Both bank layouts for one resistance channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelLayout {
    pub channel: ChannelIndex,
    pub bank_a: BankLayout,
    pub bank_b: BankLayout,
}

impl ChannelLayout {
    #[must_use]
    pub fn bank(&self, bank: Bank) -> &BankLayout {
        match bank {
            Bank::A => &self.bank_a,
            Bank::B => &self.bank_b,
        }
    }

    /// Every pair that can carry a path for this channel: each trunk to its
    /// engage and bypass channels, then the A-B bridge.
    #[must_use]
    pub fn clear_pairs(&self) -> Vec<ClosurePair> {
        let mut pairs = Vec::with_capacity(2 * (BANK_LAYOUT_LEN - 1) + 1);
        for layout in [&self.bank_a, &self.bank_b] {
            for name in &layout.channels()[1..] {
                pairs.push(ClosurePair::new(layout.trunk(), name));
            }
        }
        pairs.push(ClosurePair::new(self.bank_a.trunk(), self.bank_b.trunk()));
        pairs
    }
}

/// Source of bank layouts for a channel.
pub trait BankLayoutProvider {
    fn layout(&self, channel: ChannelIndex) -> LayoutResult<ChannelLayout>;
}

/// Synthesized names in the card's convention: `b{n}`, `b{n}engage`,
/// `b{n}r0`..`b{n}r7`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandardLayout;

impl StandardLayout {
    #[must_use]
    pub fn bank_names(bank_number: u8) -> Vec<String> {
        let trunk = format!("b{bank_number}");
        let mut names = Vec::with_capacity(BANK_LAYOUT_LEN);
        names.push(trunk.clone());
        names.push(format!("{trunk}engage"));
        names.extend((0..BANK_SIZE).map(|slot| format!("{trunk}r{slot}")));
        names
    }
}

impl BankLayoutProvider for StandardLayout {
    fn layout(&self, channel: ChannelIndex) -> LayoutResult<ChannelLayout> {
        Ok(ChannelLayout {
            channel,
            bank_a: BankLayout::new(Self::bank_names(channel.bank_number(Bank::A)))?,
            bank_b: BankLayout::new(Self::bank_names(channel.bank_number(Bank::B)))?,
        })
    }
}

/// Layouts carved out of a channel-name enumeration reported by the
/// instrument, keeping enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelNameLayout {
    names: Vec<String>,
}

impl ChannelNameLayout {
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    fn bank(&self, bank_number: u8) -> LayoutResult<BankLayout> {
        let trunk = format!("b{bank_number}");
        let channels: Vec<String> = self
            .names
            .iter()
            .filter(|name| belongs_to_bank(name, &trunk))
            .cloned()
            .collect();
        let layout = BankLayout::new(channels)?;
        if layout.trunk() != trunk {
            return Err(LayoutError::TrunkMismatch {
                expected: trunk,
                actual: layout.trunk().to_string(),
            });
        }
        Ok(layout)
    }
}

impl BankLayoutProvider for ChannelNameLayout {
    fn layout(&self, channel: ChannelIndex) -> LayoutResult<ChannelLayout> {
        Ok(ChannelLayout {
            channel,
            bank_a: self.bank(channel.bank_number(Bank::A))?,
            bank_b: self.bank(channel.bank_number(Bank::B))?,
        })
    }
}

// `b1` owns `b1engage` and `b1r3` but not `b10` or `b12r0`.
fn belongs_to_bank(name: &str, trunk: &str) -> bool {
    name.strip_prefix(trunk)
        .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_digit()))
}
