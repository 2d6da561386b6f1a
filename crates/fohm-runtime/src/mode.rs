#![forbid(unsafe_code)]

//! Runtime mode definitions for Strict and Hardened operation.

use serde::{Deserialize, Serialize};

/// Operational mode governing how much cross-checking a request receives.
///
/// - **Strict**: Run the decomposition search and apply the closure plan,
///   nothing more. Matches the behavior of the bench instrument software.
/// - **Hardened**: Cross-check every decomposition against the direct binary
///   reference and re-query every closed pair after apply, failing closed on
///   any disagreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RuntimeMode {
    #[default]
    Strict,
    Hardened,
}

impl RuntimeMode {
    #[must_use]
    pub const fn is_hardened(self) -> bool {
        matches!(self, Self::Hardened)
    }
}
