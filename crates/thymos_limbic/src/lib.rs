pub mod ranker;
pub mod selector;

pub use ranker::{RecommendationRanker, ShuffleRanker};
pub use selector::ActivitySelector;
