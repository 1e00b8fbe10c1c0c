/*!
 * Translation capability.
 *
 * The pipeline only knows the `TextTranslator` trait: text in, text out.
 * `TranslationService` implements it on top of a configured LLM provider and
 * `FnTranslator` adapts any plain function or closure.
 */

use anyhow::Result;
use async_trait::async_trait;
use log::debug;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::Provider;
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::ollama::{GenerationRequest, Ollama};

/// Upper bound on generated tokens for one caption
const MAX_TOKENS_PER_CUE: u32 = 1024;

/// Something that can translate one piece of caption text.
///
/// Implementations may hold state (a loaded model, an HTTP client); the
/// pipeline borrows them for the duration of a run and never clones them.
#[async_trait]
pub trait TextTranslator: Send + Sync {
    async fn translate_text(&self, text: &str) -> Result<String, ProviderError>;
}

/// Adapts a synchronous function to `TextTranslator`
pub struct FnTranslator<F> {
    f: F,
}

impl<F> FnTranslator<F>
where
    F: Fn(&str) -> Result<String, ProviderError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> TextTranslator for FnTranslator<F>
where
    F: Fn(&str) -> Result<String, ProviderError> + Send + Sync,
{
    async fn translate_text(&self, text: &str) -> Result<String, ProviderError> {
        (self.f)(text)
    }
}

/// Tidy translated text: lines trimmed, blank lines dropped.
///
/// Every translated piece goes through here once before it is stored. Text
/// that is empty after tidying is a `ParseError`.
pub fn normalize_translation(text: &str) -> Result<String, ProviderError> {
    let normalized = text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if normalized.is_empty() {
        return Err(ProviderError::ParseError("empty translation".to_string()));
    }
    Ok(normalized)
}

#[derive(Debug)]
enum Backend {
    Ollama(Ollama),
    Anthropic(Anthropic),
}

/// Provider-backed translation capability
#[derive(Debug)]
pub struct TranslationService {
    backend: Backend,
    model: String,
    system_prompt: String,
    temperature: f32,
}

impl TranslationService {
    /// Build the service for a language pair from the translation config
    pub fn new(config: &TranslationConfig, source_language: &str, target_language: &str) -> Result<Self> {
        let source_name = language_utils::get_language_name(source_language)?;
        let target_name = language_utils::get_language_name(target_language)?;
        let system_prompt = Self::build_system_prompt(&config.common.system_prompt, &source_name, &target_name);

        let timeout_secs = config.get_timeout_secs();
        let backend = match config.provider {
            TranslationProvider::Ollama => Backend::Ollama(
                Ollama::from_url(config.get_endpoint(), timeout_secs)
                    .with_retries(config.common.retry_count, config.common.retry_backoff_ms),
            ),
            TranslationProvider::Anthropic => Backend::Anthropic(
                Anthropic::new(config.get_api_key(), config.get_endpoint(), config.get_model(), timeout_secs),
            ),
        };

        Ok(Self {
            backend,
            model: config.get_model(),
            system_prompt,
            temperature: config.common.temperature,
        })
    }

    /// Fill the `{source_language}` and `{target_language}` placeholders
    pub fn build_system_prompt(template: &str, source_language: &str, target_language: &str) -> String {
        template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &'static str {
        match self.backend {
            Backend::Ollama(_) => "Ollama",
            Backend::Anthropic(_) => "Anthropic",
        }
    }

    /// Check that the provider is reachable before starting a run
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        match &self.backend {
            Backend::Ollama(client) => client.test_connection().await,
            Backend::Anthropic(client) => client.test_connection().await,
        }
    }
}

#[async_trait]
impl TextTranslator for TranslationService {
    async fn translate_text(&self, text: &str) -> Result<String, ProviderError> {
        let reply = match &self.backend {
            Backend::Ollama(client) => {
                let request = GenerationRequest::new(self.model.as_str(), text)
                    .system(self.system_prompt.as_str())
                    .temperature(self.temperature)
                    .num_predict(MAX_TOKENS_PER_CUE);
                let response = client.complete(request).await?;
                Ollama::extract_text(&response)
            },
            Backend::Anthropic(client) => {
                let request = AnthropicRequest::new(self.model.as_str(), MAX_TOKENS_PER_CUE)
                    .system(self.system_prompt.as_str())
                    .temperature(self.temperature)
                    .add_message("user", text);
                let response = client.complete(request).await?;
                Anthropic::extract_text(&response)
            },
        };

        debug!("{} translated {} chars into {} chars", self.provider_name(), text.len(), reply.len());
        Ok(reply)
    }
}
