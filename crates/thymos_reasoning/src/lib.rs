//! Dialogue generation, treated as an opaque text-completion capability.

pub mod openai;

pub use openai::OpenAiClient;

use anyhow::Result;
use async_trait::async_trait;
use thymos_core::DialogueTurn;

/// Generation parameters passed alongside the history.
#[derive(Debug, Clone)]
pub struct CompletionParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

/// Text-completion capability over an ordered dialogue history.
///
/// The history is sent verbatim; the provider returns a single assistant
/// text. Failures are surfaced as `Err` and converted by the session into a
/// visible in-band error string so the session stays usable.
#[async_trait]
pub trait DialogueClient: Send + Sync {
    async fn complete(&self, history: &[DialogueTurn], params: &CompletionParams)
        -> Result<String>;
}
