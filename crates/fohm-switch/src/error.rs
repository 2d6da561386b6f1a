#![forbid(unsafe_code)]

use fohm_decompose::{ChannelIndex, DecomposeError, LayoutError};
use thiserror::Error;

use crate::topology::{PathState, TopologyError};

pub type SwitchResult<T> = Result<T, SwitchError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SwitchError {
    #[error(transparent)]
    Decompose(#[from] DecomposeError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error("{channel} is not managed by this card")]
    UnmanagedChannel { channel: ChannelIndex },
    #[error("{a} <-> {b} reports {state:?} after apply")]
    VerificationFailed {
        a: String,
        b: String,
        state: PathState,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SwitchError {
    /// Whether relay state may now differ from what was last applied.
    #[must_use]
    pub fn leaves_relays_unknown(&self) -> bool {
        matches!(self, Self::Topology(_) | Self::VerificationFailed { .. })
    }
}
