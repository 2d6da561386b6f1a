#![forbid(unsafe_code)]

//! Exact subset-sum search with memoized counting and greedy reconstruction.
//!
//! The engine's `count` answers "how many subsets of `values[i..]` sum
//! to `r`", memoized on `(i, r)`. Reconstruction walks the values left to
//! right and keeps `values[i]` only when the remaining tail can still reach
//! the remaining target, so the result is exact whenever any subset exists.
//!
//! The memo lives inside the engine, and [`SubsetSumEngine::solve`] consumes
//! the engine: no table outlives a single solve, and nothing is shared
//! between threads.

use std::collections::HashMap;

use crate::validation::{DecomposeError, DecomposeResult};

/// Outcome of a subset-sum solve.
///
/// `achieved_sum == 0` with empty `indices` means no subset reached the
/// target (or the target was zero).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsetSolution {
    pub achieved_sum: i64,
    /// Positions into the input values, ascending.
    pub indices: Vec<usize>,
}

impl SubsetSolution {
    #[must_use]
    pub fn infeasible() -> Self {
        Self {
            achieved_sum: 0,
            indices: Vec::new(),
        }
    }

    /// The chosen values, in input order. Indices past the end of `values`
    /// are skipped.
    #[must_use]
    pub fn values(&self, values: &[u32]) -> Vec<u32> {
        self.indices
            .iter()
            .filter_map(|&i| values.get(i).copied())
            .collect()
    }
}

#[derive(Debug)]
pub struct SubsetSumEngine<'a> {
    values: &'a [u32],
    /// `suffix[i]` is the sum of `values[i..]`.
    suffix: Vec<i64>,
    /// `suffix_gcd[i]` is the gcd of `values[i..]`.
    suffix_gcd: Vec<i64>,
    memo: HashMap<(usize, i64), u64>,
}

impl<'a> SubsetSumEngine<'a> {
    pub fn new(values: &'a [u32]) -> DecomposeResult<Self> {
        if values.is_empty() {
            return Err(DecomposeError::EmptyCatalog);
        }
        if let Some(index) = values.iter().position(|&v| v == 0) {
            return Err(DecomposeError::NonPositiveValue { index });
        }
        let mut suffix = vec![0i64; values.len() + 1];
        let mut suffix_gcd = vec![0i64; values.len() + 1];
        for i in (0..values.len()).rev() {
            suffix[i] = suffix[i + 1] + i64::from(values[i]);
            suffix_gcd[i] = gcd(suffix_gcd[i + 1], i64::from(values[i]));
        }
        Ok(Self {
            values,
            suffix,
            suffix_gcd,
            memo: HashMap::new(),
        })
    }

    /// Number of subsets of `values[i..]` summing exactly to `remaining`.
    /// Saturates at `u64::MAX`.
    pub(crate) fn count(&mut self, i: usize, remaining: i64) -> u64 {
        if i >= self.values.len() {
            return u64::from(remaining == 0);
        }
        // All values are positive: a negative remainder, one beyond the
        // tail's total, or one off the tail's gcd lattice can never be met.
        if remaining < 0
            || remaining > self.suffix[i]
            || remaining % self.suffix_gcd[i] != 0
        {
            return 0;
        }
        if let Some(&cached) = self.memo.get(&(i, remaining)) {
            return cached;
        }
        let without = self.count(i + 1, remaining);
        let with = self.count(i + 1, remaining - i64::from(self.values[i]));
        let total = without.saturating_add(with);
        self.memo.insert((i, remaining), total);
        total
    }

    /// Reconstruct one subset reaching `target`, preferring earlier values.
    #[must_use]
    pub fn solve(mut self, target: i64) -> SubsetSolution {
        if self.count(0, target) == 0 {
            return SubsetSolution::infeasible();
        }
        let mut remaining = target;
        let mut indices = Vec::new();
        for i in 0..self.values.len() {
            let value = i64::from(self.values[i]);
            if self.count(i + 1, remaining - value) > 0 {
                indices.push(i);
                remaining -= value;
            }
        }
        debug_assert_eq!(remaining, 0, "greedy reconstruction must land on target");
        SubsetSolution {
            achieved_sum: target - remaining,
            indices,
        }
    }

    #[must_use]
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Find one subset of `values` summing to `target`.
pub fn solve(values: &[u32], target: i64) -> DecomposeResult<SubsetSolution> {
    Ok(SubsetSumEngine::new(values)?.solve(target))
}

/// Count every subset of `values` summing to `target`.
pub fn count_solutions(values: &[u32], target: i64) -> DecomposeResult<u64> {
    Ok(SubsetSumEngine::new(values)?.count(0, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_subset_in_general_catalog() {
        let values = [3, 34, 4, 12, 5, 2];
        let solution = solve(&values, 9).expect("valid values");
        assert_eq!(solution.achieved_sum, 9);
        let sum: u32 = solution.values(&values).iter().sum();
        assert_eq!(sum, 9);
    }

    #[test]
    fn prefers_earlier_values_when_several_subsets_exist() {
        // {3, 4, 2} and {4, 5} both reach 9; index order keeps the 3.
        let values = [3, 34, 4, 12, 5, 2];
        assert_eq!(count_solutions(&values, 9), Ok(2));
        let solution = solve(&values, 9).expect("valid values");
        assert_eq!(solution.indices, vec![0, 2, 5]);
    }

    #[test]
    fn infeasible_target_returns_zero_and_empty() {
        let values = [3, 34, 4, 12, 5, 2];
        assert_eq!(
            solve(&values, 30).expect("valid values"),
            SubsetSolution::infeasible()
        );
    }

    #[test]
    fn negative_and_oversized_targets_are_infeasible() {
        let values = [1, 2, 4];
        assert_eq!(solve(&values, -1), Ok(SubsetSolution::infeasible()));
        assert_eq!(solve(&values, 8), Ok(SubsetSolution::infeasible()));
        assert_eq!(count_solutions(&values, 7), Ok(1));
    }

    #[test]
    fn zero_target_is_the_empty_subset() {
        let values = [1, 2, 4];
        assert_eq!(count_solutions(&values, 0), Ok(1));
        assert_eq!(solve(&values, 0), Ok(SubsetSolution::infeasible()));
    }

    #[test]
    fn duplicate_values_are_counted_separately() {
        let values = [5, 5, 5];
        assert_eq!(count_solutions(&values, 10), Ok(3));
        let solution = solve(&values, 10).expect("valid values");
        assert_eq!(solution.indices, vec![0, 1]);
    }

    #[test]
    fn rejects_empty_values() {
        assert_eq!(solve(&[], 1), Err(DecomposeError::EmptyCatalog));
    }

    #[test]
    fn rejects_zero_value() {
        assert_eq!(
            solve(&[1, 0, 2], 1),
            Err(DecomposeError::NonPositiveValue { index: 1 })
        );
    }

    #[test]
    fn values_skips_indices_outside_the_slice() {
        let solution = solve(&[1, 2, 4, 8], 9).expect("valid values");
        assert_eq!(solution.values(&[1, 2, 4, 8]), vec![1, 8]);
        assert_eq!(solution.values(&[1, 2]), vec![1]);
        assert!(solution.values(&[]).is_empty());
    }

    #[test]
    fn memo_is_owned_per_engine() {
        let values = [1, 2, 4, 8];
        let mut first = SubsetSumEngine::new(&values).expect("valid values");
        assert_eq!(first.count(0, 11), 1);
        assert!(first.memo_len() > 0);
        let second = SubsetSumEngine::new(&values).expect("valid values");
        assert_eq!(second.memo_len(), 0);
    }

    #[test]
    fn binary_catalog_keeps_the_memo_small() {
        let values: Vec<u32> = (0..16).map(|i| 1 << i).collect();
        let mut engine = SubsetSumEngine::new(&values).expect("valid values");
        assert_eq!(engine.count(0, 64_000), 1);
        assert!(engine.memo_len() <= values.len());
    }

    #[test]
    fn gcd_lattice_prune_is_exact() {
        let values = [6, 10, 15];
        assert_eq!(count_solutions(&values, 25), Ok(1));
        assert_eq!(count_solutions(&values, 21), Ok(1));
        assert_eq!(count_solutions(&values, 5), Ok(0));
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(0, 7), 7);
    }

    #[test]
    fn counts_saturate_instead_of_overflowing() {
        // 70 ones: C(70, 35) exceeds u64::MAX.
        let values = vec![1u32; 70];
        assert_eq!(count_solutions(&values, 35), Ok(u64::MAX));
        let solution = solve(&values, 35).expect("valid values");
        assert_eq!(solution.indices, (0..35).collect::<Vec<_>>());
    }
}
