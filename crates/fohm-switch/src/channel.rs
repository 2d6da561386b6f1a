#![forbid(unsafe_code)]

//! One resistance channel: clear every relay it owns, then close the plan
//! for the new value.
//!
//! The channel moves between two meta-states, cleared and configured, and
//! every transition to "configured" starts from a full clear. The state
//! lock is held for the whole clear-then-apply sequence, so concurrent
//! callers on one channel are serialized while different channels proceed
//! independently.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use fohm_decompose::{
    ChannelIndex, ChannelLayout, ClosurePair, ClosurePlan, Decomposition, QuarterOhms,
    decompose_with_mode, encode_channel,
};
use fohm_runtime::{ConfigurationLedger, ConfigurationRecord, RuntimeMode, now_unix_ms};
use tracing::{debug, info, warn};

use crate::error::{SwitchError, SwitchResult};
use crate::topology::TopologyService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Cleared,
    Configured { quantized: QuarterOhms },
    /// A driver call failed mid-sequence; the next operation must clear.
    Unknown,
}

/// What a successful [`ResistanceChannel::set_resistance`] applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub decomposition: Decomposition,
    pub plan: ClosurePlan,
    pub disconnects: usize,
}

pub type SharedLedger = Arc<Mutex<ConfigurationLedger>>;

#[derive(Debug)]
pub struct ResistanceChannel<S: TopologyService> {
    service: Arc<S>,
    layout: ChannelLayout,
    clear_pairs: Vec<ClosurePair>,
    mode: RuntimeMode,
    state: Mutex<ChannelState>,
    ledger: Option<SharedLedger>,
    clear_on_drop: bool,
}

impl<S: TopologyService> ResistanceChannel<S> {
    /// A channel starts `Unknown`: whatever the relays hold is cleared by the
    /// first operation.
    pub fn new(service: Arc<S>, layout: ChannelLayout, mode: RuntimeMode) -> Self {
        let clear_pairs = layout.clear_pairs();
        Self {
            service,
            layout,
            clear_pairs,
            mode,
            state: Mutex::new(ChannelState::Unknown),
            ledger: None,
            clear_on_drop: false,
        }
    }

    #[must_use]
    pub fn with_ledger(mut self, ledger: SharedLedger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Clear the channel's relays when dropped, logging any failure.
    #[must_use]
    pub fn clear_on_drop(mut self, enabled: bool) -> Self {
        self.clear_on_drop = enabled;
        self
    }

    #[must_use]
    pub fn index(&self) -> ChannelIndex {
        self.layout.channel
    }

    #[must_use]
    pub fn layout(&self) -> &ChannelLayout {
        &self.layout
    }

    #[must_use]
    pub const fn mode(&self) -> RuntimeMode {
        self.mode
    }

    #[must_use]
    pub fn state(&self) -> ChannelState {
        *self.lock_state()
    }

    /// Decompose and encode `requested_ohms` without touching relays.
    pub fn plan(&self, requested_ohms: f64) -> SwitchResult<(Decomposition, ClosurePlan)> {
        let decomposition = decompose_with_mode(requested_ohms, self.mode)?;
        let plan = encode_channel(decomposition.active, &self.layout);
        Ok((decomposition, plan))
    }

    /// Clear the channel, then close every pair of the plan for
    /// `requested_ohms`. A rejected request leaves the relays untouched.
    pub fn set_resistance(&self, requested_ohms: f64) -> SwitchResult<Applied> {
        let (decomposition, plan) = self.plan(requested_ohms)?;
        let mut state = self.lock_state();

        let disconnects = self.clear_locked(&mut state)?;
        if let Err(error) = self.apply_locked(&plan) {
            *state = ChannelState::Unknown;
            warn!(channel = %self.index(), %error, "apply failed, relay state unknown");
            return Err(error);
        }
        *state = ChannelState::Configured {
            quantized: decomposition.quantized,
        };
        info!(
            channel = %self.index(),
            requested = requested_ohms,
            quantized = decomposition.resistance_ohms(),
            closures = plan.len(),
            "channel configured"
        );
        self.record(&decomposition, &plan);

        Ok(Applied {
            decomposition,
            plan,
            disconnects,
        })
    }

    /// Open every relay the channel owns. Returns the number of disconnects
    /// issued.
    pub fn clear(&self) -> SwitchResult<usize> {
        let mut state = self.lock_state();
        let disconnects = self.clear_locked(&mut state)?;
        info!(channel = %self.index(), disconnects, "channel cleared");
        Ok(disconnects)
    }

    /// A panic while the lock was held left the relays mid-sequence, so a
    /// poisoned lock is recovered as `Unknown` and the caller's full clear
    /// runs as usual.
    fn lock_state(&self) -> MutexGuard<'_, ChannelState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!(channel = %self.index(), "state lock poisoned, relay state unknown");
            let mut state = poisoned.into_inner();
            *state = ChannelState::Unknown;
            self.state.clear_poison();
            state
        })
    }

    fn clear_locked(&self, state: &mut ChannelState) -> SwitchResult<usize> {
        match clear_pairs(self.service.as_ref(), &self.clear_pairs) {
            Ok(disconnects) => {
                *state = ChannelState::Cleared;
                debug!(channel = %self.index(), disconnects, "relays opened");
                Ok(disconnects)
            }
            Err(error) => {
                *state = ChannelState::Unknown;
                warn!(channel = %self.index(), %error, "clear failed, relay state unknown");
                Err(error)
            }
        }
    }

    fn apply_locked(&self, plan: &ClosurePlan) -> SwitchResult<()> {
        for pair in plan {
            debug!(channel = %self.index(), "closing {} {}", pair.a, pair.b);
            self.service.connect(&pair.a, &pair.b)?;
        }
        if self.mode.is_hardened() {
            for pair in plan {
                let state = self.service.can_connect(&pair.a, &pair.b)?;
                if !state.exists() {
                    return Err(SwitchError::VerificationFailed {
                        a: pair.a.clone(),
                        b: pair.b.clone(),
                        state,
                    });
                }
            }
        }
        Ok(())
    }

    fn record(&self, decomposition: &Decomposition, plan: &ClosurePlan) {
        let Some(ledger) = &self.ledger else {
            return;
        };
        let entry = configuration_record(self.index(), decomposition, plan, self.mode);
        ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(entry);
    }
}

impl<S: TopologyService> Drop for ResistanceChannel<S> {
    fn drop(&mut self) {
        if !self.clear_on_drop {
            return;
        }
        let state = *self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if state == ChannelState::Cleared {
            return;
        }
        if let Err(error) = clear_pairs(self.service.as_ref(), &self.clear_pairs) {
            warn!(channel = %self.index(), %error, "clear on drop failed");
        }
    }
}

/// Audit record for one applied (or planned) configuration.
#[must_use]
pub fn configuration_record(
    channel: ChannelIndex,
    decomposition: &Decomposition,
    plan: &ClosurePlan,
    mode: RuntimeMode,
) -> ConfigurationRecord {
    ConfigurationRecord {
        channel: channel.get(),
        requested_ohms: decomposition.requested_ohms,
        quantized_ohms: decomposition.resistance_ohms(),
        active_indices: decomposition.active.indices().map(|i| i as u8).collect(),
        closure_count: plan.len(),
        mode,
        timestamp_ms: now_unix_ms(),
    }
}

/// Disconnect every pair that currently carries a path. Pairs reporting any
/// other state are left alone.
pub fn clear_pairs<S: TopologyService + ?Sized>(
    service: &S,
    pairs: &[ClosurePair],
) -> SwitchResult<usize> {
    let mut disconnects = 0;
    for pair in pairs {
        if service.can_connect(&pair.a, &pair.b)?.exists() {
            debug!("disconnecting {} {}", pair.a, pair.b);
            service.disconnect(&pair.a, &pair.b)?;
            disconnects += 1;
        }
    }
    Ok(disconnects)
}
