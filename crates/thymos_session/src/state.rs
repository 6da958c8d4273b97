//! Explicit session state.
//!
//! Everything a session mutates lives in this one value with defined
//! creation, mutation, and reset points. There is no ambient global; the
//! orchestrator owns one `SessionState` and every transition is a
//! run-to-completion `&mut` call.

use thymos_core::{dialogue, DialogueTurn, PlaceRecord};
use thymos_memory::StateKey;
use uuid::Uuid;

/// Recommendation sub-machine. `Recommended` is only left through a location
/// change or an explicit clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationState {
    NoRecommendations,
    Recommended,
}

/// A thumbs-up/thumbs-down on a displayed assistant turn.
///
/// `turn_index` points into the dialogue history. Only the most recent
/// (state, action) pair is retained by the session, so feedback always
/// attributes to that pair regardless of which turn was rated; the index is
/// carried for logging and a future per-turn ledger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackSignal {
    pub turn_index: usize,
    pub value: f64,
}

impl FeedbackSignal {
    pub fn positive(turn_index: usize) -> Self {
        Self {
            turn_index,
            value: 1.0,
        }
    }

    pub fn negative(turn_index: usize) -> Self {
        Self {
            turn_index,
            value: -1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    /// Correlation id for logs; survives clears.
    pub session_id: Uuid,
    /// The literal prompt context. First two turns are fixed.
    pub history: Vec<DialogueTurn>,
    pub user_message_count: u32,
    pub recommended_places: Vec<PlaceRecord>,
    pub recommendation_state: RecommendationState,
    /// Free-form location name as the user gave it.
    pub location: String,
    /// Geocoded coordinates; absent until a location resolves.
    pub location_coords: Option<(f64, f64)>,
    /// Pending feedback target, overwritten by every user message.
    pub last_state: Option<StateKey>,
    pub last_action: Option<String>,
}

impl SessionState {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            history: dialogue::initial_history(),
            user_message_count: 0,
            recommended_places: Vec::new(),
            recommendation_state: RecommendationState::NoRecommendations,
            location: location.into(),
            location_coords: None,
            last_state: None,
            last_action: None,
        }
    }

    /// Back to the fixed initial turns and zero counters. Location and
    /// coordinates are kept; learned state lives outside this struct and is
    /// untouched by design.
    pub fn reset(&mut self) {
        self.history = dialogue::initial_history();
        self.user_message_count = 0;
        self.recommended_places.clear();
        self.recommendation_state = RecommendationState::NoRecommendations;
        self.last_state = None;
        self.last_action = None;
    }

    /// `"lat,lng"` search parameter, falling back when nothing is geocoded.
    pub fn coords_param(&self, fallback: (f64, f64)) -> String {
        let (lat, lng) = self.location_coords.unwrap_or(fallback);
        format!("{},{}", lat, lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thymos_core::Role;

    #[test]
    fn test_new_session_shape() {
        let state = SessionState::new("New York");
        assert_eq!(state.history.len(), 2);
        assert_eq!(state.history[0].role, Role::System);
        assert_eq!(state.user_message_count, 0);
        assert_eq!(
            state.recommendation_state,
            RecommendationState::NoRecommendations
        );
        assert!(state.last_state.is_none());
    }

    #[test]
    fn test_reset_restores_initial_turns() {
        let mut state = SessionState::new("New York");
        let id = state.session_id;
        state.history.push(DialogueTurn::user("hi"));
        state.user_message_count = 4;
        state.recommendation_state = RecommendationState::Recommended;
        state.last_action = Some("yoga".into());

        state.reset();

        assert_eq!(state.history, dialogue::initial_history());
        assert_eq!(state.user_message_count, 0);
        assert_eq!(
            state.recommendation_state,
            RecommendationState::NoRecommendations
        );
        assert!(state.last_action.is_none());
        assert_eq!(state.session_id, id);
        assert_eq!(state.location, "New York");
    }

    #[test]
    fn test_coords_param_fallback() {
        let mut state = SessionState::new("Atlantis");
        assert_eq!(state.coords_param((40.7128, -74.006)), "40.7128,-74.006");
        state.location_coords = Some((35.0, 139.0));
        assert_eq!(state.coords_param((40.7128, -74.006)), "35,139");
    }
}
