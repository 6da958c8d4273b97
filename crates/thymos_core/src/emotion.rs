//! Keyword-based emotion classification.
//!
//! Deliberately a placeholder: ordered substring rules, first match wins.
//! In production this should be replaced with an ML model, which is why
//! callers go through the `EmotionClassifier` trait rather than a function.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse emotional state inferred from one user message.
///
/// Produced per turn and not persisted beyond it; the feedback model only
/// sees it as part of an opaque state key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Tired,
    Bored,
    Neutral,
}

impl Emotion {
    /// Stable lowercase label, used in state keys and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Tired => "tired",
            Emotion::Bored => "bored",
            Emotion::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seam for swapping the placeholder below for a real classifier.
pub trait EmotionClassifier: Send + Sync {
    /// Total function: always yields an emotion, `Neutral` when unsure.
    fn classify(&self, text: &str) -> Emotion;
}

/// Trigger words checked in order; the first hit wins.
const RULES: &[(&str, Emotion)] = &[
    ("happy", Emotion::Happy),
    ("tired", Emotion::Tired),
    ("bored", Emotion::Bored),
];

/// Case-insensitive substring matcher over the fixed rule list.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl EmotionClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Emotion {
        let lowered = text.to_lowercase();
        for (trigger, emotion) in RULES {
            if lowered.contains(trigger) {
                return *emotion;
            }
        }
        Emotion::Neutral
    }
}
