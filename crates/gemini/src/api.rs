//! REST API client for the Gemini `generateContent` endpoint.
//!
//! Wraps the HTTP call using [`reqwest`]; response interpretation is
//! left to [`crate::gateway`].

use std::time::Duration;

use crate::config::GeminiConfig;
use crate::messages::{GenerateContentRequest, GenerateContentResponse};

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP client for the Gemini API.
pub struct GeminiApi {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

/// Errors from the Gemini REST layer.
#[derive(Debug, thiserror::Error)]
pub enum GeminiApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Gemini returned a non-2xx status code.
    #[error("Gemini API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl GeminiApi {
    /// Create an API client reusing an existing [`reqwest::Client`].
    ///
    /// * `api_url` - Base URL, e.g. `https://generativelanguage.googleapis.com`.
    pub fn with_client(client: reqwest::Client, api_url: String, api_key: String) -> Self {
        Self {
            client,
            api_url,
            api_key,
        }
    }

    /// Build a client from configuration, applying the request timeout.
    pub fn from_config(config: &GeminiConfig) -> Result<Self, GeminiApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(
            client,
            config.api_url.trim_end_matches('/').to_string(),
            config.api_key.clone(),
        ))
    }

    /// Run one `generateContent` call against `model`.
    ///
    /// Sends `POST /v1beta/models/{model}:generateContent`.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiApiError> {
        tracing::debug!(model, "Sending generateContent request");

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.api_url, model
            ))
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`GeminiApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GeminiApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GeminiApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GeminiApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
