#![no_main]

use arbitrary::Arbitrary;
use fohm_decompose::{count_solutions, solve};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct SubsetInput {
    values: Vec<u16>,
    target: i32,
}

fuzz_target!(|input: SubsetInput| {
    let values: Vec<u32> = input
        .values
        .iter()
        .take(20)
        .map(|&v| u32::from(v))
        .collect();
    let target = i64::from(input.target);
    let (Ok(solution), Ok(count)) = (solve(&values, target), count_solutions(&values, target))
    else {
        assert!(values.is_empty() || values.contains(&0));
        return;
    };
    if count == 0 || target == 0 {
        assert!(solution.indices.is_empty());
        assert_eq!(solution.achieved_sum, 0);
        return;
    }
    let sum: i64 = solution.indices.iter().map(|&i| i64::from(values[i])).sum();
    assert_eq!(sum, target);
    assert_eq!(solution.achieved_sum, target);
    assert!(solution.indices.windows(2).all(|w| w[0] < w[1]));
});
