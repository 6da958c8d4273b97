use crate::error::ThymosError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ThymosConfig {
    pub llm: LlmConfig,
    pub places: PlacesConfig,
    pub session: SessionConfig,
}

impl ThymosConfig {
    /// Load config from a TOML file, falling back to defaults for missing
    /// fields. After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: ThymosConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if file doesn't exist, return defaults with
    /// env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("LLM_BASE_URL") {
            self.llm.base_url = Some(v);
        }
        if let Ok(v) = std::env::var("LLM_MAX_TOKENS") {
            if let Ok(n) = v.parse() {
                self.llm.max_tokens = n;
            }
        }
        if let Ok(v) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(n) = v.parse() {
                self.llm.temperature = n;
            }
        }
        if let Ok(v) = std::env::var("PLACES_RADIUS_M") {
            if let Ok(n) = v.parse() {
                self.places.radius_m = n;
            }
        }
        if let Ok(v) = std::env::var("RECOMMEND_THRESHOLD") {
            if let Ok(n) = v.parse() {
                self.session.recommend_threshold = n;
            }
        }
    }

    /// Verify required credentials are present in the environment.
    ///
    /// Only ever called at startup, before the first session; missing keys
    /// are fatal there and nowhere else. `offline` skips the check entirely
    /// (mock providers need no credentials).
    pub fn ensure_credentials(offline: bool) -> std::result::Result<(), ThymosError> {
        if offline {
            return Ok(());
        }
        for key in ["OPENAI_API_KEY", "GOOGLE_MAPS_API_KEY"] {
            match std::env::var(key) {
                Ok(v) if !v.trim().is_empty() => {}
                _ => {
                    return Err(ThymosError::Configuration(format!(
                        "{} is not set (use --offline to run with mock providers)",
                        key
                    )))
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            base_url: None,
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlacesConfig {
    /// Search radius around the session coordinates, in meters.
    pub radius_m: u32,
    /// Cap on places kept from one search response.
    pub max_results: usize,
    /// Coordinate used when geocoding fails or no location is set.
    pub fallback_lat: f64,
    pub fallback_lng: f64,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            radius_m: 1500,
            max_results: 5,
            // New York City
            fallback_lat: 40.7128,
            fallback_lng: -74.0060,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// User messages required before the first place search fires.
    pub recommend_threshold: u32,
    /// Where the learned model snapshot lives.
    pub model_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            recommend_threshold: 3,
            model_path: "thymos_model.json".to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
