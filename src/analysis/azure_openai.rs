//! Azure OpenAI chat transport (deployment-scoped chat completions).

use super::{ChatTransport, LlmError};
use crate::config::AzureOpenAiSettings;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

const MAX_TOKENS: u32 = 1500;
const TEMPERATURE: f32 = 0.7;

pub struct AzureOpenAi {
    http: reqwest::Client,
    settings: AzureOpenAiSettings,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

impl AzureOpenAi {
    pub fn new(settings: AzureOpenAiSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.settings.endpoint.as_str().trim_end_matches('/'),
            self.settings.deployment,
            self.settings.api_version,
        )
    }
}

#[async_trait]
impl ChatTransport for AzureOpenAi {
    #[instrument(skip_all)]
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let body = json!({
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
        });

        let response = self
            .http
            .post(self.completions_url())
            .header("api-key", &self.settings.key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.and_then(|e| e.message))
                .unwrap_or_else(|| format!("Error de Azure OpenAI: {status}"));
            return Err(LlmError::Provider { message });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(LlmError::Provider {
                message: "No se recibió respuesta de Azure OpenAI".to_string(),
            });
        }

        Ok(content)
    }

    fn provider_name(&self) -> &'static str {
        "azure-openai"
    }
}
