//! Test utilities for vistier-core
//!
//! Provides a mock classifier server speaking the Ollama API, used by
//! integration tests and local development without a real model server.
//!
//! The requested model name selects the behavior:
//! - any normal name: keyword-driven category answers
//! - "broken": every generate call returns HTTP 500
//! - "rambling": answers prose that names no category token

use axum::{
    extract::Json,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::sync::oneshot;

/// Mock classifier server for testing and development
pub struct MockClassifierServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockClassifierServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockClassifierServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ollama tags endpoint response (health check)
async fn handle_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        models: vec![ModelInfo {
            name: "mistral:latest".to_string(),
            modified_at: "2024-01-01T00:00:00Z".to_string(),
            size: 4_000_000_000,
        }],
    })
}

/// Ollama generate endpoint
async fn handle_generate(
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, StatusCode> {
    if request.model == "broken" {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let response = if request.model == "rambling" {
        "Well, it could be several things, hard to say really.".to_string()
    } else {
        classify_mock(&extract_description(&request.prompt))
    };

    Ok(Json(GenerateResponse {
        model: request.model,
        response,
        done: true,
    }))
}

/// Extract the transaction description from the classification prompt
fn extract_description(prompt: &str) -> String {
    if let Some(start) = prompt.find("Transaction description: ") {
        let after = &prompt[start + 25..];
        let end = after.find('\n').unwrap_or(after.len());
        return after[..end].trim().to_string();
    }
    String::new()
}

/// Keyword-driven category answers, wrapped the way small models answer
fn classify_mock(description: &str) -> String {
    let d = description.to_uppercase();

    let token = if d.contains("NETFLIX") || d.contains("SPOTIFY") {
        "SUBSCRIPTION"
    } else if d.contains("KAUFLAND") || d.contains("LIDL") || d.contains("MEGA IMAGE") {
        "GROCERIES"
    } else if d.contains("UBER") || d.contains("BOLT") {
        "TAXI_AND_RIDESHARE"
    } else if d.contains("OMV") || d.contains("PETROM") || d.contains("ROMPETROL") {
        "FUEL_TRANSPORT"
    } else if d.contains("FARMACI") || d.contains("CATENA") {
        "PHARMACY_HEALTH"
    } else if d.contains("COMISION") {
        "OTHER_FEE"
    } else if d.contains("ENEL") || d.contains("E-ON") {
        "UTILITIES"
    } else {
        "OTHER"
    };

    // Some models answer with exactly the token, some add chatter; alternate
    // so both parse paths stay covered
    if description.len() % 2 == 0 {
        token.to_string()
    } else {
        format!("The category is {}.", token)
    }
}

// Request/Response types for the mock server

#[derive(Debug, Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    name: String,
    modified_at: String,
    size: u64,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    #[allow(dead_code)]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{ClassifierBackend, OllamaBackend};
    use crate::models::Category;

    #[tokio::test]
    async fn test_mock_server_health_check() {
        let server = MockClassifierServer::start().await;
        let client = OllamaBackend::new(&server.url(), "mistral");

        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn test_mock_server_classify_groceries() {
        let server = MockClassifierServer::start().await;
        let client = OllamaBackend::new(&server.url(), "mistral");

        let category = client
            .categorize("Cumparare POS KAUFLAND BUCURESTI", -230.0)
            .await
            .unwrap();
        assert_eq!(category, Category::Groceries);
    }

    #[tokio::test]
    async fn test_mock_server_classify_unknown_is_other() {
        let server = MockClassifierServer::start().await;
        let client = OllamaBackend::new(&server.url(), "mistral");

        let category = client.categorize("RANDOM MERCHANT 42", -10.0).await.unwrap();
        assert_eq!(category, Category::Other);
    }

    #[tokio::test]
    async fn test_mock_server_broken_model_errors() {
        let server = MockClassifierServer::start().await;
        let client = OllamaBackend::new(&server.url(), "broken");

        assert!(client.categorize("KAUFLAND", -10.0).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_server_rambling_model_parses_as_other() {
        let server = MockClassifierServer::start().await;
        let client = OllamaBackend::new(&server.url(), "rambling");

        let category = client.categorize("KAUFLAND", -10.0).await.unwrap();
        assert_eq!(category, Category::Other);
    }
}
