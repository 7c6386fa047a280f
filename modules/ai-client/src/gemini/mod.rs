mod client;
pub(crate) mod types;

use anyhow::Result;

use crate::error::AiError;
use client::GeminiClient;
use types::*;

// =============================================================================
// Gemini
// =============================================================================

#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    pub(crate) model: String,
    base_url: Option<String>,
}

impl Gemini {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn client(&self) -> GeminiClient {
        let client = GeminiClient::new(&self.api_key);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    /// Single-turn prompt with no system instruction.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest::user(prompt)
            .temperature(0.0)
            .max_output_tokens(8192);
        let response = self.client().generate(&self.model, &request).await?;

        Ok(response
            .text()
            .ok_or(AiError::EmptyResponse("Gemini"))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_new() {
        let ai = Gemini::new("AIza-test", "gemini-2.5-flash");
        assert_eq!(ai.model(), "gemini-2.5-flash");
        assert_eq!(ai.api_key, "AIza-test");
    }

    #[test]
    fn test_gemini_with_base_url() {
        let ai = Gemini::new("AIza-test", "gemini-2.5-flash").with_base_url("http://localhost:8089");
        assert_eq!(ai.base_url.as_deref(), Some("http://localhost:8089"));
    }
}
