#![no_main]

use arbitrary::Arbitrary;
use fohm_decompose::{binary_reference, decompose_with_mode, quantize};
use fohm_runtime::RuntimeMode;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct DecomposeInput {
    ohms: f64,
    hardened: bool,
}

fuzz_target!(|input: DecomposeInput| {
    let mode = if input.hardened {
        RuntimeMode::Hardened
    } else {
        RuntimeMode::Strict
    };
    let in_range = (0.0..=16_000.0).contains(&input.ohms);
    match decompose_with_mode(input.ohms, mode) {
        Ok(d) => {
            assert!(in_range, "{} accepted", input.ohms);
            assert_eq!(d.quantized, quantize(input.ohms));
            assert_eq!(d.active.total(), d.quantized);
            assert_eq!(d.active, binary_reference(d.quantized));
        }
        Err(_) => assert!(!in_range, "{} rejected", input.ohms),
    }
});
