#![no_main]

use std::sync::Arc;

use arbitrary::Arbitrary;
use fohm_decompose::{BankLayoutProvider, ChannelIndex, StandardLayout, quantize};
use fohm_runtime::RuntimeMode;
use fohm_switch::{ChannelState, ResistanceChannel, SimulatedSwitch, TopologyOp};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Step {
    Set(f64),
    Clear,
    /// Fail the next operations on one relay of the channel.
    Fault { op: u8, slot: u8 },
    Heal,
}

#[derive(Debug, Arbitrary)]
struct OrchestrateInput {
    hardened: bool,
    steps: Vec<Step>,
}

fuzz_target!(|input: OrchestrateInput| {
    let mode = if input.hardened {
        RuntimeMode::Hardened
    } else {
        RuntimeMode::Strict
    };
    let sim = Arc::new(SimulatedSwitch::new().rejecting_redundant_disconnect());
    let layout = StandardLayout
        .layout(ChannelIndex::new(0).expect("valid channel"))
        .expect("standard layout");
    let pairs = layout.clear_pairs();
    let channel = ResistanceChannel::new(Arc::clone(&sim), layout, mode);

    for step in input.steps.into_iter().take(32) {
        match step {
            Step::Set(ohms) => match channel.set_resistance(ohms) {
                Ok(applied) => {
                    assert_eq!(
                        sim.measure_resistance(channel.layout()),
                        Some(quantize(ohms))
                    );
                    assert_eq!(sim.closed_pairs().len(), applied.plan.len());
                }
                Err(error) if !error.leaves_relays_unknown() => {}
                Err(_) => assert_eq!(channel.state(), ChannelState::Unknown),
            },
            Step::Clear => {
                if channel.clear().is_ok() {
                    assert!(sim.closed_pairs().is_empty());
                }
            }
            Step::Fault { op, slot } => {
                let op = match op % 3 {
                    0 => TopologyOp::CanConnect,
                    1 => TopologyOp::Connect,
                    _ => TopologyOp::Disconnect,
                };
                let pair = &pairs[usize::from(slot) % pairs.len()];
                sim.fail_on(op, &pair.a, &pair.b);
            }
            Step::Heal => sim.clear_faults(),
        }
    }
});
