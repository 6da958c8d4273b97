//! Re-ranking of fetched places before display.
//!
//! The default strategy is a uniform random permutation; the trait exists
//! so a real scoring strategy (category-emotion affinity, distance, ratings)
//! can be dropped in without touching the session.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thymos_core::{Emotion, PlaceRecord};

/// Reorders candidate places using emotion context.
///
/// Implementations must return a permutation of the input: same elements,
/// same count, any order.
pub trait RecommendationRanker: Send + Sync {
    fn rank(&mut self, places: Vec<PlaceRecord>, emotion: Emotion) -> Vec<PlaceRecord>;
}

/// Default strategy: uniform random permutation, no scoring.
#[derive(Debug)]
pub struct ShuffleRanker {
    rng: StdRng,
}

impl ShuffleRanker {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic ranker for reproducible tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for ShuffleRanker {
    fn default() -> Self {
        Self::new()
    }
}

impl RecommendationRanker for ShuffleRanker {
    fn rank(&mut self, mut places: Vec<PlaceRecord>, _emotion: Emotion) -> Vec<PlaceRecord> {
        places.shuffle(&mut self.rng);
        places
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn place(name: &str) -> PlaceRecord {
        PlaceRecord {
            name: name.to_string(),
            address: format!("{} street", name),
            lat: Some(40.0),
            lng: Some(-73.0),
        }
    }

    #[test]
    fn test_rank_empty() {
        let mut ranker = ShuffleRanker::with_seed(1);
        assert!(ranker.rank(Vec::new(), Emotion::Happy).is_empty());
    }

    #[test]
    fn test_seeded_rank_replays() {
        let input: Vec<PlaceRecord> = (0..6).map(|i| place(&format!("p{}", i))).collect();
        let mut a = ShuffleRanker::with_seed(99);
        let mut b = ShuffleRanker::with_seed(99);
        assert_eq!(
            a.rank(input.clone(), Emotion::Tired),
            b.rank(input, Emotion::Tired)
        );
    }

    proptest! {
        #[test]
        fn rank_is_a_permutation(names in prop::collection::vec("[a-z]{1,8}", 0..12), seed in any::<u64>()) {
            let input: Vec<PlaceRecord> = names.iter().map(|n| place(n)).collect();
            let mut ranker = ShuffleRanker::with_seed(seed);
            let ranked = ranker.rank(input.clone(), Emotion::Neutral);

            prop_assert_eq!(ranked.len(), input.len());
            let mut got: Vec<String> = ranked.into_iter().map(|p| p.name).collect();
            let mut want: Vec<String> = input.into_iter().map(|p| p.name).collect();
            got.sort();
            want.sort();
            prop_assert_eq!(got, want);
        }
    }
}
