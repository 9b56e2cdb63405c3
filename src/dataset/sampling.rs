//! Reproducible document sampling.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};

/// Draw `count` distinct indices out of `0..population`, seeded.
///
/// Uses Floyd's selection followed by a Fisher-Yates shuffle from the same
/// generator, so the same `(population, count, seed)` always yields the same
/// indices in the same order.
pub fn sample_indices(population: usize, count: usize, seed: u64) -> Result<Vec<usize>> {
    if count > population {
        return Err(Error::InvalidSample { count, population });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut chosen: HashSet<usize> = HashSet::with_capacity(count);
    let mut order: Vec<usize> = Vec::with_capacity(count);

    for top in (population - count)..population {
        let candidate = rng.random_range(0..=top);
        let pick = if chosen.contains(&candidate) {
            top
        } else {
            candidate
        };
        chosen.insert(pick);
        order.push(pick);
    }

    order.shuffle(&mut rng);
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_order() {
        let a = sample_indices(100, 10, 42).unwrap();
        let b = sample_indices(100, 10, 42).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 10);
    }

    #[test]
    fn test_distinct_and_in_range() {
        let picks = sample_indices(50, 50, 7).unwrap();
        let unique: HashSet<usize> = picks.iter().copied().collect();
        assert_eq!(unique.len(), 50);
        assert!(picks.iter().all(|&i| i < 50));
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = sample_indices(1000, 20, 1).unwrap();
        let b = sample_indices(1000, 20, 2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_count_above_population() {
        assert!(matches!(
            sample_indices(3, 4, 42),
            Err(Error::InvalidSample {
                count: 4,
                population: 3
            })
        ));
        assert!(sample_indices(0, 0, 42).unwrap().is_empty());
    }
}
