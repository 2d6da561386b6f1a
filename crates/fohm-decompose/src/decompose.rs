#![forbid(unsafe_code)]

//! Requested resistance to active catalog values.

use std::fmt;

use fohm_runtime::RuntimeMode;
use serde::{Deserialize, Serialize};

use crate::catalog::{CATALOG, CATALOG_LEN, QuarterOhms, quantize};
use crate::subset_sum::SubsetSumEngine;
use crate::validation::{DecomposeError, DecomposeResult, validate_requested_ohms};

/// Set of catalog indices, one bit per element.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ActiveSet(u16);

impl ActiveSet {
    pub const EMPTY: Self = Self(0);
    pub const FULL: Self = Self(u16::MAX);

    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Build from catalog indices; indices past the catalog are ignored.
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        indices
            .into_iter()
            .filter(|&i| i < CATALOG_LEN)
            .fold(Self::EMPTY, |set, i| Self(set.0 | (1 << i)))
    }

    #[must_use]
    pub const fn contains(self, index: usize) -> bool {
        index < CATALOG_LEN && self.0 & (1 << index) != 0
    }

    #[must_use]
    pub const fn complement(self) -> Self {
        Self(!self.0)
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Member catalog indices, ascending.
    pub fn indices(self) -> impl Iterator<Item = usize> {
        (0..CATALOG_LEN).filter(move |&i| self.contains(i))
    }

    /// Member magnitudes in ohms, ascending.
    #[must_use]
    pub fn values_ohms(self) -> Vec<f64> {
        self.indices().map(|i| CATALOG[i].to_ohms()).collect()
    }

    /// Sum of member magnitudes.
    #[must_use]
    pub fn total(self) -> QuarterOhms {
        QuarterOhms(self.indices().map(|i| CATALOG[i].get()).sum())
    }
}

impl fmt::Debug for ActiveSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values_ohms()).finish()
    }
}

/// Result of decomposing one request. Built only by [`decompose_with_mode`],
/// so `active` always sums to `quantized`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Decomposition {
    pub requested_ohms: f64,
    pub quantized: QuarterOhms,
    /// Values left in circuit.
    pub active: ActiveSet,
}

impl Decomposition {
    /// Values to short out: the catalog minus the active set.
    #[must_use]
    pub const fn bypassed(&self) -> ActiveSet {
        self.active.complement()
    }

    #[must_use]
    pub fn resistance_ohms(&self) -> f64 {
        self.quantized.to_ohms()
    }
}

/// Decompose a request in Strict mode.
pub fn decompose(requested_ohms: f64) -> DecomposeResult<Decomposition> {
    decompose_with_mode(requested_ohms, RuntimeMode::Strict)
}

/// Decompose a request. Hardened mode also checks the search against
/// [`binary_reference`].
pub fn decompose_with_mode(
    requested_ohms: f64,
    mode: RuntimeMode,
) -> DecomposeResult<Decomposition> {
    let requested_ohms = validate_requested_ohms(requested_ohms)?;
    let quantized = quantize(requested_ohms);
    let active = search_active_set(quantized)?;

    if mode.is_hardened() {
        let reference = binary_reference(quantized);
        if reference != active {
            return Err(DecomposeError::ReconstructionMismatch {
                quantized,
                search: active,
                reference,
            });
        }
    }

    Ok(Decomposition {
        requested_ohms,
        quantized,
        active,
    })
}

/// Direct bit decomposition of a quarter-ohm target. Bits above the
/// catalog are dropped.
#[must_use]
pub fn binary_reference(quantized: QuarterOhms) -> ActiveSet {
    ActiveSet::from_indices((0..CATALOG_LEN).filter(|&i| quantized.get() & (1 << i) != 0))
}

fn search_active_set(quantized: QuarterOhms) -> DecomposeResult<ActiveSet> {
    let values = CATALOG.map(QuarterOhms::get);
    let solution = SubsetSumEngine::new(&values)?.solve(i64::from(quantized.get()));
    if solution.achieved_sum == 0 && !quantized.is_zero() {
        return Err(DecomposeError::Unrepresentable { quantized });
    }
    Ok(ActiveSet::from_indices(solution.indices))
}
