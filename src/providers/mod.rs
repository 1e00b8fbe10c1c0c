/*!
 * Provider implementations for the translation capability.
 *
 * This module contains client implementations for the LLM providers a
 * `TranslationService` can be backed by:
 * - Ollama: Local LLM server
 * - Anthropic: Anthropic API integration
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably in the translation service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

/// Read an error body, falling back to a placeholder when the body is unreadable
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    response.text().await
        .unwrap_or_else(|_| "Failed to get error response text".to_string())
}

pub mod ollama;
pub mod anthropic;
