#![no_main]

use arbitrary::Arbitrary;
use fohm_decompose::{
    ActiveSet, BankLayoutProvider, ChannelIndex, ChannelNameLayout, StandardLayout,
    encode_channel,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct LayoutInput {
    channel: u8,
    /// Extra enumerated names mixed into a valid bank listing.
    noise: Vec<String>,
    include_standard: bool,
    active: u16,
}

fuzz_target!(|input: LayoutInput| {
    let Ok(channel) = ChannelIndex::new(input.channel % 16) else {
        return;
    };
    let mut names = input.noise;
    if input.include_standard {
        let standard = StandardLayout.layout(channel).expect("standard layout");
        names.extend(standard.bank_a.channels().iter().cloned());
        names.extend(standard.bank_b.channels().iter().cloned());
    }
    let Ok(layout) = ChannelNameLayout::new(names).layout(channel) else {
        return;
    };
    assert_eq!(layout.channel, channel);
    let clear = layout.clear_pairs();
    let plan = encode_channel(ActiveSet::from_bits(input.active), &layout);
    for pair in &plan {
        assert!(clear.iter().any(|c| c.joins(&pair.a, &pair.b)));
    }
});
