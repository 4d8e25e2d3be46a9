use async_trait::async_trait;
use serde_json::json;

use crate::error::{DocsaiError, Result};

/// Model used when the caller does not pick one.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// A generative model that can rewrite source code with documentation.
///
/// One synchronous round trip per call: no retry, no timeout, no
/// streaming. Failures surface as `DocsaiError::Model` with the service's
/// own description attached.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send `source_code` as the user content together with a fixed
    /// `system_instruction`, returning the model's raw text response.
    async fn generate(&self, source_code: &str, system_instruction: &str) -> Result<String>;
}

/// Gemini-backed `ModelClient`.
///
/// The credential is held by the client instance rather than configured
/// process-wide, so tests can construct clients freely.
pub struct GeminiClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, source_code: &str, system_instruction: &str) -> Result<String> {
        let payload = json!({
            "system_instruction": {
                "parts": [{ "text": system_instruction }]
            },
            "contents": [{
                "parts": [{ "text": source_code }]
            }]
        });

        let url = format!("{}/{}:generateContent", API_BASE_URL, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| DocsaiError::Model(format!("Gemini API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DocsaiError::Model(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let response_data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| DocsaiError::Model(format!("Failed to parse Gemini response: {}", e)))?;

        let text = response_data["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                DocsaiError::Model("Gemini response contained no text candidate".to_string())
            })?;

        Ok(text.to_string())
    }
}
