use serde::{Deserialize, Serialize};

use crate::services::matcher::MatcherConfig;

/// AI adapter settings, assembled from the environment.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AiConfig {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            base_url: None,
            model: "gpt-3.5-turbo-1106".into(),
        }
    }
}

/// Runtime settings for a mapping run.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Settings {
    pub source_market: String,
    pub target_market: String,
    pub matcher: MatcherConfig,
    pub ai: AiConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_market: "Portuguese market".into(),
            target_market: "German market".into(),
            matcher: MatcherConfig::default(),
            ai: AiConfig::default(),
        }
    }
}

impl Settings {
    /// Assemble settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Assemble settings from an arbitrary key lookup.
    ///
    /// The AI stage turns on only when an API key is present and
    /// `AI_MAPPING_ENABLED` is not set to an off value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Settings::default();

        if let Some(market) = lookup("SOURCE_MARKET") {
            settings.source_market = market;
        }
        if let Some(market) = lookup("TARGET_MARKET") {
            settings.target_market = market;
        }

        if let Some(raw) = lookup("SIMILARITY_THRESHOLD") {
            match raw.parse::<f32>() {
                Ok(value) if (0.0..=1.0).contains(&value) => {
                    settings.matcher.similarity_threshold = value;
                }
                _ => log::warn!(
                    "Ignoring invalid SIMILARITY_THRESHOLD {raw:?}, keeping {}",
                    settings.matcher.similarity_threshold
                ),
            }
        }

        settings.ai.api_key = lookup("OPENAI_API_KEY").filter(|key| !key.trim().is_empty());
        settings.ai.base_url = lookup("OPENAI_BASE_URL");
        if let Some(model) = lookup("OPENAI_MODEL") {
            settings.ai.model = model;
        }
        let flag_enabled = lookup("AI_MAPPING_ENABLED")
            .map_or(true, |raw| !matches!(raw.to_lowercase().as_str(), "false" | "0" | "no"));
        settings.ai.enabled = settings.ai.api_key.is_some() && flag_enabled;

        settings
    }
}

#[cfg(test)]
#[path = "tests/models_tests.rs"]
mod tests;
