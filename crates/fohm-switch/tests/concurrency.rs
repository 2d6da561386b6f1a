#![forbid(unsafe_code)]

use std::sync::Arc;
use std::thread;

use fohm_decompose::{ChannelIndex, QuarterOhms, StandardLayout, decompose, quantize};
use fohm_switch::{CardConfig, ChannelState, ResistanceCard, SimulatedSwitch};

fn idx(channel: u8) -> ChannelIndex {
    ChannelIndex::new(channel).expect("valid channel")
}

#[test]
fn distinct_channels_configure_concurrently() {
    let sim = Arc::new(SimulatedSwitch::new());
    let config = CardConfig {
        channels: (0..16).collect(),
        ledger_capacity: 1024,
        ..CardConfig::default()
    };
    let card = ResistanceCard::new(Arc::clone(&sim), &config, &StandardLayout).expect("card");

    thread::scope(|scope| {
        for channel in 0..16u8 {
            let card = &card;
            scope.spawn(move || {
                for step in 0..20u32 {
                    let ohms = f64::from(channel) * 1000.0 + f64::from(step) * 0.25;
                    card.set_resistance(idx(channel), ohms)
                        .unwrap_or_else(|error| panic!("{channel}/{step}: {error}"));
                }
            });
        }
    });

    for channel in 0..16u8 {
        let expected = quantize(f64::from(channel) * 1000.0 + 19.0 * 0.25);
        let ch = card.channel(idx(channel)).expect("managed");
        assert_eq!(sim.measure_resistance(ch.layout()), Some(expected));
        assert_eq!(ch.state(), ChannelState::Configured { quantized: expected });
    }
    let ledger = card.ledger();
    assert_eq!(ledger.lock().expect("ledger lock").len(), 16 * 20);
}

#[test]
fn one_channel_serializes_concurrent_callers() {
    let sim = Arc::new(SimulatedSwitch::new().rejecting_redundant_disconnect());
    let card = ResistanceCard::new(Arc::clone(&sim), &CardConfig::default(), &StandardLayout)
        .expect("card");
    let targets = [67.0, 0.0, 16_000.0, 1234.5];

    thread::scope(|scope| {
        for &ohms in &targets {
            let card = &card;
            scope.spawn(move || {
                for _ in 0..10 {
                    card.set_resistance(idx(0), ohms)
                        .unwrap_or_else(|error| panic!("{ohms}: {error}"));
                }
            });
        }
    });

    // Whichever caller ran last, the relays hold exactly one of the targets.
    let ch = card.channel(idx(0)).expect("managed");
    let measured = sim.measure_resistance(ch.layout()).expect("closed network");
    assert!(
        targets.iter().any(|&ohms| quantize(ohms) == measured),
        "measured {measured}"
    );
    let ChannelState::Configured { quantized } = ch.state() else {
        panic!("channel not configured");
    };
    assert_eq!(quantized, measured);
}

#[test]
fn decompositions_run_in_parallel_without_shared_state() {
    let results: Vec<Vec<QuarterOhms>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8u32)
            .map(|worker| {
                scope.spawn(move || {
                    (0..2000u32)
                        .map(|i| {
                            let ohms = f64::from(worker * 2000 + i) * 0.25;
                            decompose(ohms).expect("in range").active.total()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("worker panicked"))
            .collect()
    });
    for (worker, totals) in results.iter().enumerate() {
        for (i, total) in totals.iter().enumerate() {
            assert_eq!(total.get() as usize, worker * 2000 + i);
        }
    }
}
