#![forbid(unsafe_code)]

//! In-memory relay backend.
//!
//! Tracks closed pairs without regard to argument order, journals every
//! call, and can be told to fail specific operations. `measure_resistance`
//! reads the series resistance a meter would see across a channel.

use std::collections::{BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use fohm_decompose::{Bank, CATALOG, ChannelLayout, QuarterOhms};
use serde::{Deserialize, Serialize};

use crate::topology::{PathState, TopologyError, TopologyOp, TopologyService};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub operation: TopologyOp,
    pub a: String,
    pub b: String,
}

#[derive(Debug, Default)]
struct SimState {
    closed: BTreeSet<(String, String)>,
    journal: Vec<JournalEntry>,
    faults: Vec<(TopologyOp, (String, String))>,
    /// Channels the simulated module exposes; empty means "any name".
    known: HashSet<String>,
    reject_redundant_disconnect: bool,
}

#[derive(Debug, Default)]
pub struct SimulatedSwitch {
    state: Mutex<SimState>,
}

fn key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

impl SimulatedSwitch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the module to `names`; pairs touching any other name report
    /// [`PathState::ChannelNotAvailable`] and refuse to connect.
    #[must_use]
    pub fn with_channels(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let sim = Self::new();
        sim.lock().known = names.into_iter().map(Into::into).collect();
        sim
    }

    /// Make `disconnect` on an open pair an error, as some drivers do.
    #[must_use]
    pub fn rejecting_redundant_disconnect(self) -> Self {
        self.lock().reject_redundant_disconnect = true;
        self
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Close a pair without journaling, to stage prior relay state.
    pub fn force_close(&self, a: &str, b: &str) {
        self.lock().closed.insert(key(a, b));
    }

    /// Fail every future `operation` on this pair.
    pub fn fail_on(&self, operation: TopologyOp, a: &str, b: &str) {
        self.lock().faults.push((operation, key(a, b)));
    }

    pub fn clear_faults(&self) {
        self.lock().faults.clear();
    }

    #[must_use]
    pub fn is_closed(&self, a: &str, b: &str) -> bool {
        self.lock().closed.contains(&key(a, b))
    }

    #[must_use]
    pub fn closed_pairs(&self) -> Vec<(String, String)> {
        self.lock().closed.iter().cloned().collect()
    }

    #[must_use]
    pub fn journal(&self) -> Vec<JournalEntry> {
        self.lock().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.lock().journal.clear();
    }

    /// Journaled calls of one kind.
    #[must_use]
    pub fn count(&self, operation: TopologyOp) -> usize {
        self.lock()
            .journal
            .iter()
            .filter(|e| e.operation == operation)
            .count()
    }

    /// Series resistance across a channel, or `None` when the path is open
    /// (a bank not engaged or the banks not bridged).
    #[must_use]
    pub fn measure_resistance(&self, layout: &ChannelLayout) -> Option<QuarterOhms> {
        let state = self.lock();
        let closed = |a: &str, b: &str| state.closed.contains(&key(a, b));
        if !closed(layout.bank_a.trunk(), layout.bank_b.trunk()) {
            return None;
        }
        let mut total = 0u32;
        for bank in Bank::ALL {
            let bank_layout = layout.bank(bank);
            if !closed(bank_layout.trunk(), bank_layout.engage()) {
                return None;
            }
            total += bank
                .indices()
                .filter(|&i| !closed(bank_layout.trunk(), bank_layout.bypass(Bank::slot(i))))
                .map(|i| CATALOG[i].get())
                .sum::<u32>();
        }
        Some(QuarterOhms(total))
    }

    fn check(
        state: &mut SimState,
        operation: TopologyOp,
        a: &str,
        b: &str,
    ) -> Result<(), TopologyError> {
        state.journal.push(JournalEntry {
            operation,
            a: a.to_string(),
            b: b.to_string(),
        });
        let pair = key(a, b);
        if state
            .faults
            .iter()
            .any(|(op, faulted)| *op == operation && *faulted == pair)
        {
            return Err(TopologyError::new(operation, a, b, "injected fault"));
        }
        Ok(())
    }

    fn available(state: &SimState, a: &str, b: &str) -> bool {
        state.known.is_empty() || (state.known.contains(a) && state.known.contains(b))
    }
}

impl TopologyService for SimulatedSwitch {
    fn can_connect(&self, a: &str, b: &str) -> Result<PathState, TopologyError> {
        let mut state = self.lock();
        Self::check(&mut state, TopologyOp::CanConnect, a, b)?;
        if !Self::available(&state, a, b) {
            return Ok(PathState::ChannelNotAvailable);
        }
        if state.closed.contains(&key(a, b)) {
            Ok(PathState::PathExists)
        } else {
            Ok(PathState::PathAvailable)
        }
    }

    fn connect(&self, a: &str, b: &str) -> Result<(), TopologyError> {
        let mut state = self.lock();
        Self::check(&mut state, TopologyOp::Connect, a, b)?;
        if !Self::available(&state, a, b) {
            return Err(TopologyError::new(
                TopologyOp::Connect,
                a,
                b,
                "channel not available",
            ));
        }
        state.closed.insert(key(a, b));
        Ok(())
    }

    fn disconnect(&self, a: &str, b: &str) -> Result<(), TopologyError> {
        let mut state = self.lock();
        Self::check(&mut state, TopologyOp::Disconnect, a, b)?;
        let removed = state.closed.remove(&key(a, b));
        if !removed && state.reject_redundant_disconnect {
            return Err(TopologyError::new(
                TopologyOp::Disconnect,
                a,
                b,
                "no path to disconnect",
            ));
        }
        Ok(())
    }
}
