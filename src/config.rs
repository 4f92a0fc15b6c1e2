//! # Config
//! Which completion provider answers requests, and how it is set up.
//!
//! The choice is explicit: build a [PlannerConfig] with [PlannerConfig::fallback] or [PlannerConfig::openai], or let
//! [PlannerConfig::from_env] decide once from `OPENAI_API_KEY`. The live provider is only chosen when the key is set
//! and non-empty and the crate was built with the `openai` feature; everything else gets the fallback.

use std::env;

use anyhow::Result;
use log::info;
use url::Url;

use crate::chain::DEFAULT_MAX_CONCURRENCY;
use crate::utils::llm::fallback::FallbackPlanner;
use crate::utils::llm::CompletionProvider;

/// The only environment variable that affects provider selection.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Cheap and fast.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Clone, PartialEq, Eq)]
pub enum ProviderChoice {
    /// Deterministic local planner, no network.
    Fallback,
    /// OpenAI chat completion.
    OpenAI { api_key: String },
}

impl std::fmt::Debug for ProviderChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print the key
        match self {
            ProviderChoice::Fallback => write!(f, "Fallback"),
            ProviderChoice::OpenAI { .. } => write!(f, "OpenAI {{ api_key: \"***\" }}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub provider: ProviderChoice,
    /// Model name for the live provider.
    pub model: String,
    pub temperature: f32,
    /// OpenAI-compatible endpoint, `None` for the official API.
    pub api_base: Option<Url>,
    pub max_concurrency: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::fallback()
    }
}

impl PlannerConfig {
    fn with_provider(provider: ProviderChoice) -> Self {
        Self {
            provider,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            api_base: None,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    pub fn fallback() -> Self {
        Self::with_provider(ProviderChoice::Fallback)
    }

    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::with_provider(ProviderChoice::OpenAI { api_key: api_key.into() })
    }

    /// Decide from `OPENAI_API_KEY`, see [PlannerConfig::from_api_key].
    pub fn from_env() -> Self {
        Self::from_api_key(env::var(API_KEY_ENV).ok())
    }

    /// OpenAI when `api_key` is non-empty and the `openai` feature is enabled, otherwise the fallback.
    pub fn from_api_key(api_key: Option<String>) -> Self {
        match api_key {
            Some(key) if !key.trim().is_empty() && cfg!(feature = "openai") => Self::openai(key),
            _ => Self::fallback(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_api_base(mut self, api_base: Url) -> Self {
        self.api_base = Some(api_base);
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Construct the chosen provider.
    ///
    /// Choosing OpenAI in a build without the `openai` feature is a
    /// [ProviderUnavailable](crate::utils::llm::errors::ProviderUnavailable) error.
    pub fn build_provider(&self) -> Result<Box<dyn CompletionProvider>> {
        match &self.provider {
            ProviderChoice::Fallback => {
                info!("using the deterministic fallback planner");
                Ok(Box::new(FallbackPlanner::default()))
            }
            ProviderChoice::OpenAI { api_key } => self.build_openai(api_key),
        }
    }

    #[cfg(feature = "openai")]
    fn build_openai(&self, api_key: &str) -> Result<Box<dyn CompletionProvider>> {
        use crate::utils::llm::openai::OpenAIChat;

        let chat = match &self.api_base {
            Some(api_base) => OpenAIChat::with_api_base(api_key, api_base),
            None => OpenAIChat::new(api_key),
        };
        info!("using OpenAI model {} (temperature {})", self.model, self.temperature);
        Ok(Box::new(chat.with_model(self.model.as_str()).with_temperature(self.temperature)))
    }

    #[cfg(not(feature = "openai"))]
    fn build_openai(&self, _api_key: &str) -> Result<Box<dyn CompletionProvider>> {
        use crate::utils::llm::errors::ProviderUnavailable;

        Err(ProviderUnavailable {
            provider: "openai".to_string(),
            feature: "openai".to_string(),
        }.into())
    }
}
