#![forbid(unsafe_code)]

use thiserror::Error;

use crate::catalog::{MAX_REQUESTED_OHMS, MIN_REQUESTED_OHMS, QuarterOhms};
use crate::decompose::ActiveSet;

pub type DecomposeResult<T> = Result<T, DecomposeError>;
pub type LayoutResult<T> = Result<T, LayoutError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecomposeError {
    #[error("requested resistance {requested} ohm is outside [0, 16000] ohm")]
    OutOfRange { requested: f64 },
    #[error("quantized target {quantized} has no subset in the catalog")]
    Unrepresentable { quantized: QuarterOhms },
    #[error("subset-sum values must not be empty")]
    EmptyCatalog,
    #[error("subset-sum value at index {index} must be positive")]
    NonPositiveValue { index: usize },
    #[error(
        "search chose {search:?} but binary reference gives {reference:?} for {quantized}"
    )]
    ReconstructionMismatch {
        quantized: QuarterOhms,
        search: ActiveSet,
        reference: ActiveSet,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("bank layout needs {expected} channels, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    #[error("bank layout must start with trunk `{expected}`, found `{actual}`")]
    TrunkMismatch { expected: String, actual: String },
    #[error("channel index {channel} is outside 0..16")]
    ChannelOutOfRange { channel: u8 },
    #[error("channel `{name}` appears more than once in a layout")]
    DuplicateChannel { name: String },
}

/// Reject anything outside the closed request range, NaN included.
pub fn validate_requested_ohms(requested: f64) -> DecomposeResult<f64> {
    if !(MIN_REQUESTED_OHMS..=MAX_REQUESTED_OHMS).contains(&requested) {
        return Err(DecomposeError::OutOfRange { requested });
    }
    Ok(requested)
}
