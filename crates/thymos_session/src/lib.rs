pub mod session;
pub mod state;

pub use session::{ConversationSession, SessionOptions, TurnOutcome};
pub use state::{FeedbackSignal, RecommendationState, SessionState};
