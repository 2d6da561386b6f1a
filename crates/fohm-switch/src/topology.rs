#![forbid(unsafe_code)]

//! Boundary to the relay hardware: path queries and make/break of single
//! channel pairs.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Path capability between two channels, as reported by the switch driver.
///
/// Codes follow the driver's numbering; anything unrecognized is carried
/// through as [`PathState::Backend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathState {
    /// No path exists, one could be made.
    PathAvailable,
    PathExists,
    PathUnsupported,
    ResourceInUse,
    SourceConflict,
    ChannelNotAvailable,
    Backend(i32),
}

impl PathState {
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            1 => Self::PathAvailable,
            2 => Self::PathExists,
            3 => Self::PathUnsupported,
            4 => Self::ResourceInUse,
            5 => Self::SourceConflict,
            6 => Self::ChannelNotAvailable,
            other => Self::Backend(other),
        }
    }

    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::PathAvailable => 1,
            Self::PathExists => 2,
            Self::PathUnsupported => 3,
            Self::ResourceInUse => 4,
            Self::SourceConflict => 5,
            Self::ChannelNotAvailable => 6,
            Self::Backend(code) => code,
        }
    }

    #[must_use]
    pub const fn exists(self) -> bool {
        matches!(self, Self::PathExists)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TopologyOp {
    CanConnect,
    Connect,
    Disconnect,
}

impl fmt::Display for TopologyOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CanConnect => f.write_str("can_connect"),
            Self::Connect => f.write_str("connect"),
            Self::Disconnect => f.write_str("disconnect"),
        }
    }
}

/// A driver call that failed. Relay state afterwards is unknown.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{operation} {a} <-> {b} failed: {message}")]
pub struct TopologyError {
    pub operation: TopologyOp,
    pub a: String,
    pub b: String,
    pub message: String,
}

impl TopologyError {
    pub fn new(operation: TopologyOp, a: &str, b: &str, message: impl Into<String>) -> Self {
        Self {
            operation,
            a: a.to_string(),
            b: b.to_string(),
            message: message.into(),
        }
    }
}

/// Relay path control for one switch module.
///
/// `connect` on a connected pair and `disconnect` on a disconnected pair
/// are no-ops. Implementations synchronize internally; callers serialize
/// per physical channel.
pub trait TopologyService: Send + Sync {
    fn can_connect(&self, a: &str, b: &str) -> Result<PathState, TopologyError>;

    fn connect(&self, a: &str, b: &str) -> Result<(), TopologyError>;

    fn disconnect(&self, a: &str, b: &str) -> Result<(), TopologyError>;
}
