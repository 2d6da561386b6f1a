#![forbid(unsafe_code)]

//! The fixed 16-value binary-weighted resistor catalog and its fixed-point
//! quarter-ohm representation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of resistor elements on one channel (both banks).
pub const CATALOG_LEN: usize = 16;
/// Resistor elements per bank.
pub const BANK_SIZE: usize = 8;
/// Quarter-ohm units per ohm.
pub const QUARTERS_PER_OHM: u32 = 4;
/// Inclusive upper bound for requested resistances, in ohms.
pub const MAX_REQUESTED_OHMS: f64 = 16_000.0;
/// Inclusive lower bound for requested resistances, in ohms.
pub const MIN_REQUESTED_OHMS: f64 = 0.0;

/// Catalog magnitudes in quarter-ohms: element `i` is `2^i`, i.e. `0.25 * 2^i` ohm.
pub const CATALOG: [QuarterOhms; CATALOG_LEN] = {
    let mut values = [QuarterOhms(0); CATALOG_LEN];
    let mut i = 0;
    while i < CATALOG_LEN {
        values[i] = QuarterOhms(1 << i);
        i += 1;
    }
    values
};

/// A resistance held as an exact count of 0.25 ohm steps.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct QuarterOhms(pub u32);

impl QuarterOhms {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn to_ohms(self) -> f64 {
        f64::from(self.0) / f64::from(QUARTERS_PER_OHM)
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for QuarterOhms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ohm", self.to_ohms())
    }
}

/// Round a non-negative resistance to the nearest quarter-ohm, ties up.
///
/// Callers validate the range first; values past `u32::MAX` quarters
/// saturate via the float-to-int cast.
#[must_use]
pub fn quantize(ohms: f64) -> QuarterOhms {
    let scaled = (ohms * f64::from(QUARTERS_PER_OHM) + 0.5).floor();
    QuarterOhms(scaled as u32)
}

/// One of the two physical relay banks serving a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Bank {
    /// Low range, 0.25 to 32 ohm.
    A,
    /// High range, 64 to 8192 ohm.
    B,
}

impl Bank {
    pub const ALL: [Self; 2] = [Self::A, Self::B];

    /// Bank membership of a catalog index.
    #[must_use]
    pub const fn of(index: usize) -> Self {
        if index < BANK_SIZE { Self::A } else { Self::B }
    }

    /// Position of a catalog index within its bank's bypass relays.
    #[must_use]
    pub const fn slot(index: usize) -> usize {
        index % BANK_SIZE
    }

    /// Catalog indices belonging to this bank, ascending.
    #[must_use]
    pub fn indices(self) -> std::ops::Range<usize> {
        match self {
            Self::A => 0..BANK_SIZE,
            Self::B => BANK_SIZE..CATALOG_LEN,
        }
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
        }
    }
}

/// Catalog magnitudes as ohms, for the public boundary.
#[must_use]
pub fn catalog_ohms() -> [f64; CATALOG_LEN] {
    CATALOG.map(QuarterOhms::to_ohms)
}

/// Largest sum the catalog can realize.
#[must_use]
pub const fn catalog_capacity() -> QuarterOhms {
    QuarterOhms((1 << CATALOG_LEN) - 1)
}
