#![forbid(unsafe_code)]

//! Relay orchestration for programmable resistance channels.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`topology`] | `TopologyService` trait, path states, driver errors |
//! | [`channel`] | per-channel clear-then-apply orchestration |
//! | [`card`] | multi-channel card sharing one service and ledger |
//! | [`config`] | JSON card configuration |
//! | [`sim`] | in-memory relay backend |

pub mod card;
pub mod channel;
pub mod config;
pub mod error;
pub mod sim;
pub mod topology;

pub use card::ResistanceCard;
pub use channel::{
    Applied, ChannelState, ResistanceChannel, SharedLedger, clear_pairs, configuration_record,
};
pub use config::{CardConfig, ConfigError};
pub use error::{SwitchError, SwitchResult};
pub use sim::{JournalEntry, SimulatedSwitch};
pub use topology::{PathState, TopologyError, TopologyOp, TopologyService};

/// Install a `tracing` subscriber filtered by `RUST_LOG`, defaulting to
/// `default_directive` when the variable is unset or invalid. Safe to call
/// more than once; later calls are ignored.
pub fn init_tracing(default_directive: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
