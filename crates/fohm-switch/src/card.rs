#![forbid(unsafe_code)]

//! A switch card carrying several resistance channels on one topology
//! service, sharing one configuration ledger.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use fohm_decompose::{BankLayoutProvider, ChannelIndex};
use fohm_runtime::{ConfigurationLedger, RuntimeMode};
use tracing::{info, warn};

use crate::channel::{Applied, ResistanceChannel, SharedLedger};
use crate::config::CardConfig;
use crate::error::{SwitchError, SwitchResult};
use crate::topology::TopologyService;

#[derive(Debug)]
pub struct ResistanceCard<S: TopologyService> {
    device: String,
    mode: RuntimeMode,
    channels: BTreeMap<ChannelIndex, ResistanceChannel<S>>,
    ledger: SharedLedger,
}

impl<S: TopologyService> ResistanceCard<S> {
    /// Build one channel per configured index, with layouts from `provider`.
    pub fn new(
        service: Arc<S>,
        config: &CardConfig,
        provider: &impl BankLayoutProvider,
    ) -> SwitchResult<Self> {
        let indices = config
            .channel_indices()
            .map_err(|err| SwitchError::Config(err.to_string()))?;
        let ledger: SharedLedger =
            Arc::new(Mutex::new(ConfigurationLedger::new(config.ledger_capacity)));

        let mut channels = BTreeMap::new();
        for index in indices {
            let layout = provider.layout(index)?;
            let channel = ResistanceChannel::new(Arc::clone(&service), layout, config.mode)
                .with_ledger(Arc::clone(&ledger))
                .clear_on_drop(config.clear_on_drop);
            channels.insert(index, channel);
        }
        info!(
            device = %config.device,
            topology = %config.topology,
            channels = channels.len(),
            mode = ?config.mode,
            "card opened"
        );

        Ok(Self {
            device: config.device.clone(),
            mode: config.mode,
            channels,
            ledger,
        })
    }

    #[must_use]
    pub fn device(&self) -> &str {
        &self.device
    }

    #[must_use]
    pub const fn mode(&self) -> RuntimeMode {
        self.mode
    }

    pub fn channel(&self, index: ChannelIndex) -> SwitchResult<&ResistanceChannel<S>> {
        self.channels
            .get(&index)
            .ok_or(SwitchError::UnmanagedChannel { channel: index })
    }

    pub fn channels(&self) -> impl Iterator<Item = &ResistanceChannel<S>> {
        self.channels.values()
    }

    #[must_use]
    pub fn channel_indices(&self) -> Vec<ChannelIndex> {
        self.channels.keys().copied().collect()
    }

    pub fn set_resistance(
        &self,
        index: ChannelIndex,
        requested_ohms: f64,
    ) -> SwitchResult<Applied> {
        self.channel(index)?.set_resistance(requested_ohms)
    }

    /// Clear every channel, continuing past failures. Returns the total
    /// disconnect count, or the first error once every channel was tried.
    pub fn clear_all(&self) -> SwitchResult<usize> {
        let mut total = 0;
        let mut first_error = None;
        for channel in self.channels.values() {
            match channel.clear() {
                Ok(disconnects) => total += disconnects,
                Err(error) => {
                    warn!(channel = %channel.index(), %error, "clear_all: channel failed");
                    first_error.get_or_insert(error);
                }
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => {
                info!(device = %self.device, disconnects = total, "card cleared");
                Ok(total)
            }
        }
    }

    #[must_use]
    pub fn ledger(&self) -> SharedLedger {
        Arc::clone(&self.ledger)
    }

    /// Configuration history as JSON lines, oldest first.
    #[must_use]
    pub fn ledger_jsonl(&self) -> String {
        self.ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .serialize_jsonl()
    }
}
