#![forbid(unsafe_code)]

//! Resistance decomposition for the binary-weighted two-bank relay network.
//!
//! A request in ohms is validated, quantized to quarter-ohms, decomposed into
//! the unique subset of the 16-element catalog that sums to it, and encoded
//! into relay closures. Everything here is pure: no I/O, no shared state.

pub mod catalog;
pub mod decompose;
pub mod encode;
pub mod layout;
pub mod subset_sum;
pub mod validation;

pub use catalog::{
    BANK_SIZE, Bank, CATALOG, CATALOG_LEN, MAX_REQUESTED_OHMS, MIN_REQUESTED_OHMS,
    QUARTERS_PER_OHM, QuarterOhms, catalog_capacity, catalog_ohms, quantize,
};
pub use decompose::{ActiveSet, Decomposition, binary_reference, decompose, decompose_with_mode};
pub use encode::{ClosurePair, ClosurePlan, UNCONDITIONAL_CLOSURES, encode, encode_channel};
pub use layout::{
    BANK_LAYOUT_LEN, BankLayout, BankLayoutProvider, CHANNEL_COUNT, ChannelIndex, ChannelLayout,
    ChannelNameLayout, StandardLayout,
};
pub use subset_sum::{SubsetSolution, SubsetSumEngine, count_solutions, solve};
pub use validation::{
    DecomposeError, DecomposeResult, LayoutError, LayoutResult, validate_requested_ohms,
};
