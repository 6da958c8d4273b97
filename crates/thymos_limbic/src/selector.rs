//! Emotion → activity-category selection.
//!
//! Each emotion maps to a fixed candidate list; one entry is picked uniformly
//! at random per message. The randomness is intentional: it provides
//! exploration diversity independent of the feedback model's own estimates.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thymos_core::Emotion;

const HAPPY: &[&str] = &["amusement park", "movie theater", "anime expo", "karaoke"];
const TIRED: &[&str] = &["yoga", "spa", "cafe", "nature walk"];
const BORED: &[&str] = &["bar", "theme park", "anime", "manga", "cosplay"];
const NEUTRAL: &[&str] = &["park", "museum", "cafe", "library"];

/// Picks a place-search keyword for an emotion.
///
/// Owns its random source so a seeded instance replays the same choices.
#[derive(Debug)]
pub struct ActivitySelector {
    rng: StdRng,
}

impl ActivitySelector {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic selector for reproducible tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The fixed, non-empty candidate list for an emotion.
    pub fn candidates(emotion: Emotion) -> &'static [&'static str] {
        match emotion {
            Emotion::Happy => HAPPY,
            Emotion::Tired => TIRED,
            Emotion::Bored => BORED,
            Emotion::Neutral => NEUTRAL,
        }
    }

    /// Uniform random pick from the emotion's candidate list.
    pub fn select(&mut self, emotion: Emotion) -> String {
        let options = Self::candidates(emotion);
        let picked = options[self.rng.gen_range(0..options.len())];
        tracing::debug!(emotion = %emotion, category = picked, "selected activity category");
        picked.to_string()
    }
}

impl Default for ActivitySelector {
    fn default() -> Self {
        Self::new()
    }
}
