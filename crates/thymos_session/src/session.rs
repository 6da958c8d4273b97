//! Conversation orchestration.
//!
//! One `ConversationSession` owns the classifier, selector, ranker, the two
//! external providers, and the feedback model, and drives the transitions of
//! the session state machine. Provider failures are degraded here (empty
//! results for places, a visible in-band error string for dialogue) so that
//! no provider error ever ends a session.

use crate::state::{FeedbackSignal, RecommendationState, SessionState};
use std::sync::Arc;
use thymos_core::{DialogueTurn, Emotion, EmotionClassifier, ThymosConfig, ThymosError};
use thymos_core::dialogue::RECOMMEND_PROMPT;
use thymos_limbic::{ActivitySelector, RecommendationRanker};
use thymos_memory::{FeedbackModel, StateKey};
use thymos_places::PlaceSearch;
use thymos_reasoning::{CompletionParams, DialogueClient};

/// Knobs the orchestrator needs from the application config.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// User messages required before the first place search fires.
    pub recommend_threshold: u32,
    pub radius_m: u32,
    /// Used whenever nothing has been geocoded yet.
    pub fallback_coords: (f64, f64),
    pub completion: CompletionParams,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            recommend_threshold: 3,
            radius_m: 1500,
            fallback_coords: (40.7128, -74.0060),
            completion: CompletionParams::default(),
        }
    }
}

impl From<&ThymosConfig> for SessionOptions {
    fn from(cfg: &ThymosConfig) -> Self {
        Self {
            recommend_threshold: cfg.session.recommend_threshold,
            radius_m: cfg.places.radius_m,
            fallback_coords: (cfg.places.fallback_lat, cfg.places.fallback_lng),
            completion: CompletionParams {
                max_tokens: cfg.llm.max_tokens,
                temperature: cfg.llm.temperature,
            },
        }
    }
}

/// What one user message produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: String,
    /// True when this turn freshly populated `recommended_places`.
    pub new_recommendations: bool,
}

pub struct ConversationSession {
    state: SessionState,
    classifier: Box<dyn EmotionClassifier>,
    selector: ActivitySelector,
    ranker: Box<dyn RecommendationRanker>,
    places: Arc<dyn PlaceSearch>,
    dialogue: Arc<dyn DialogueClient>,
    model: FeedbackModel,
    options: SessionOptions,
}

impl ConversationSession {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        location: impl Into<String>,
        classifier: Box<dyn EmotionClassifier>,
        selector: ActivitySelector,
        ranker: Box<dyn RecommendationRanker>,
        places: Arc<dyn PlaceSearch>,
        dialogue: Arc<dyn DialogueClient>,
        model: FeedbackModel,
        options: SessionOptions,
    ) -> Self {
        let state = SessionState::new(location);
        tracing::debug!(session = %state.session_id, location = %state.location, "session created");
        Self {
            state,
            classifier,
            selector,
            ranker,
            places,
            dialogue,
            model,
            options,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn model(&self) -> &FeedbackModel {
        &self.model
    }

    /// One user message, run to completion: classify, pick a category,
    /// maybe fetch recommendations, then ask the dialogue service.
    #[tracing::instrument(skip(self, text), fields(session = %self.state.session_id))]
    pub async fn handle_message(&mut self, text: &str) -> TurnOutcome {
        let text = text.trim();
        self.state.history.push(DialogueTurn::user(text));
        self.state.user_message_count += 1;

        let emotion = self.classifier.classify(text);
        let action = self.selector.select(emotion);
        // This pair is the feedback target for the assistant turn about to
        // be produced; every new message overwrites it.
        self.state.last_state = Some(StateKey::new(self.state.location.clone(), emotion));
        self.state.last_action = Some(action.clone());

        let mut new_recommendations = false;
        if self.state.recommendation_state == RecommendationState::NoRecommendations
            && self.state.user_message_count >= self.options.recommend_threshold
        {
            new_recommendations = self.fetch_recommendations(&action, emotion).await;
        }

        let reply = match self
            .dialogue
            .complete(&self.state.history, &self.options.completion)
            .await
        {
            Ok(text) => {
                self.state.history.push(DialogueTurn::assistant(&text));
                text
            }
            Err(e) => {
                // Shown to the user but kept out of the history, so provider
                // noise never becomes prompt context.
                tracing::warn!(error = %e, "dialogue provider unavailable");
                format!("[dialogue error] {}", e)
            }
        };

        TurnOutcome {
            reply,
            new_recommendations,
        }
    }

    /// Search and rank. Empty or failed searches leave the sub-state at
    /// `NoRecommendations` so the next qualifying message retries.
    async fn fetch_recommendations(&mut self, keyword: &str, emotion: Emotion) -> bool {
        let location = self.state.coords_param(self.options.fallback_coords);
        match self
            .places
            .search(keyword, &location, self.options.radius_m)
            .await
        {
            Ok(places) if !places.is_empty() => {
                self.state.recommended_places = self.ranker.rank(places, emotion);
                self.state.recommendation_state = RecommendationState::Recommended;
                tracing::info!(
                    keyword,
                    count = self.state.recommended_places.len(),
                    "recommendations fetched"
                );
                true
            }
            Ok(_) => {
                tracing::debug!(keyword, "place search returned nothing, will retry");
                false
            }
            Err(e) => {
                tracing::warn!(keyword, error = %e, "place search unavailable, will retry");
                false
            }
        }
    }

    /// Apply one feedback event to the pending (state, action) pair.
    ///
    /// Feedback before any chat activity has no target and is a no-op.
    /// Repeated feedback on the same turn is applied each time; returns
    /// whether an update happened.
    pub fn apply_feedback(&mut self, signal: FeedbackSignal) -> bool {
        match (&self.state.last_state, &self.state.last_action) {
            (Some(state), Some(action)) => {
                tracing::info!(
                    session = %self.state.session_id,
                    turn = signal.turn_index,
                    state = %state,
                    action = %action,
                    value = signal.value,
                    "feedback received"
                );
                self.model.update(state, action, signal.value);
                true
            }
            _ => {
                tracing::debug!(
                    session = %self.state.session_id,
                    turn = signal.turn_index,
                    "feedback with no pending pair, ignored"
                );
                false
            }
        }
    }

    /// Change the session location, invalidating stale recommendations.
    ///
    /// A geocoding miss or provider failure is non-fatal: the fallback
    /// coordinate is used until a location resolves.
    pub async fn set_location(&mut self, name: &str) {
        match self.places.geocode(name).await {
            Ok(Some(coords)) => {
                self.state.location_coords = Some(coords);
                tracing::info!(location = name, ?coords, "location resolved");
            }
            Ok(None) => {
                self.state.location_coords = None;
                let err = ThymosError::InvalidLocation(name.to_string());
                tracing::warn!(
                    error = %err,
                    fallback = ?self.options.fallback_coords,
                    "using fallback coordinates"
                );
            }
            Err(e) => {
                self.state.location_coords = None;
                tracing::warn!(location = name, error = %e, "geocoding unavailable, using fallback coordinates");
            }
        }
        self.state.location = name.to_string();
        // Stale results no longer match the new coordinates.
        self.state.recommended_places.clear();
        self.state.recommendation_state = RecommendationState::NoRecommendations;
    }

    /// Reset the dialogue; the learned model is cross-session state and
    /// survives.
    pub fn clear(&mut self) {
        tracing::info!(session = %self.state.session_id, "session cleared");
        self.state.reset();
    }

    /// Best-known category for the state of the most recent turn, according
    /// to the feedback model. Advisory only; selection stays random.
    pub fn best_known_category(&self) -> Option<String> {
        self.state
            .last_state
            .as_ref()
            .and_then(|s| self.model.best_action(s))
            .map(str::to_string)
    }

    /// Ask the dialogue service for an activity recommendation grounded in
    /// the conversation so far. The prompt turn is throwaway: neither it nor
    /// the reply is stored in the history.
    pub async fn recommend_via_dialogue(&self) -> String {
        let mut prompt = self.state.history.clone();
        prompt.push(DialogueTurn::user(RECOMMEND_PROMPT));
        match self
            .dialogue
            .complete(&prompt, &self.options.completion)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "dialogue provider unavailable");
                format!("[dialogue error] {}", e)
            }
        }
    }
}
