//! Ollama backend implementation
//!
//! HTTP client for the Ollama API. The prompt instructs the model to answer
//! with exactly one token from the closed category set; parsing tolerates
//! chatty responses (see `parsing`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Category;

use super::parsing::parse_category_response;
use super::ClassifierBackend;

/// Timeout for classification calls. The first request after a cold start can
/// take over a minute while Ollama loads the model, so this is deliberately
/// far above a warm-call latency.
const COLD_START_TIMEOUT: Duration = Duration::from_secs(120);

/// Descriptions are truncated before leaving the process
const MAX_DESCRIPTION_CHARS: usize = 500;

/// Ollama classification backend
#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    /// Create a new Ollama backend with the default cold-start timeout
    pub fn new(base_url: &str, model: &str) -> Self {
        Self::with_timeout(base_url, model, COLD_START_TIMEOUT)
    }

    /// Create with an explicit request timeout
    pub fn with_timeout(base_url: &str, model: &str, timeout: Duration) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OLLAMA_HOST").ok()?;
        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "mistral".to_string());
        Some(Self::new(&host, &model))
    }

    fn build_prompt(description: &str, amount: f64) -> String {
        let tokens = Category::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let description: String = description.chars().take(MAX_DESCRIPTION_CHARS).collect();
        format!(
            "Return only one word from this exact list: {tokens}.\n\
             Transaction description: {description}\n\
             Amount: {amount}\n\
             Reply with only the single category word, nothing else."
        )
    }
}

/// Request to Ollama API
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
}

/// Response from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[async_trait]
impl ClassifierBackend for OllamaBackend {
    async fn categorize(&self, description: &str, amount: f64) -> Result<Category> {
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: Self::build_prompt(description, amount),
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Http(response.error_for_status().unwrap_err()));
        }

        let ollama_response: OllamaResponse = response.json().await?;
        debug!("Ollama classification response: {}", ollama_response.response);

        Ok(parse_category_response(&ollama_response.response))
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_model_and_host() {
        let client = OllamaBackend::new("http://localhost:11434/", "mistral");
        assert_eq!(client.model(), "mistral");
        assert_eq!(client.host(), "http://localhost:11434");
    }

    #[test]
    fn test_prompt_truncates_description() {
        let long = "x".repeat(2000);
        let prompt = OllamaBackend::build_prompt(&long, -10.0);
        assert!(prompt.len() < 1600 + "x".repeat(500).len());
        assert!(prompt.contains(&"x".repeat(500)));
        assert!(!prompt.contains(&"x".repeat(501)));
    }

    #[test]
    fn test_prompt_lists_all_tokens() {
        let prompt = OllamaBackend::build_prompt("Kaufland", -50.0);
        assert!(prompt.contains("GROCERIES"));
        assert!(prompt.contains("FOREIGN_EXCHANGE_FEE"));
        assert!(prompt.contains("Amount: -50"));
    }
}
