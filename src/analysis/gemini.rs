//! Google Gemini chat transport.
//!
//! Gemini has no separate system role in the `generateContent` shape used
//! here, so the system and user prompts are concatenated into a single part,
//! with a trailing reminder to emit bare JSON.

use super::{ChatTransport, LlmError};
use crate::config::GeminiSettings;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const JSON_ONLY_REMINDER: &str =
    "IMPORTANTE: Responde SOLO con el JSON, sin texto adicional, sin markdown, sin explicaciones fuera del JSON.";

pub struct Gemini {
    http: reqwest::Client,
    settings: GeminiSettings,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl Gemini {
    pub fn new(settings: GeminiSettings) -> Self {
        Self::with_base_url(settings, DEFAULT_BASE_URL.parse().expect("static url"))
    }

    pub fn with_base_url(settings: GeminiSettings, base_url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
            base_url,
        }
    }
}

#[async_trait]
impl ChatTransport for Gemini {
    #[instrument(skip_all, fields(model = %self.settings.model))]
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url.as_str().trim_end_matches('/'),
            self.settings.model,
            self.settings.api_key,
        );
        let prompt = format!("{system}\n\n{user}\n\n{JSON_ONLY_REMINDER}");
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });

        let response = self.http.post(url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(LlmError::Provider {
                message: format!("Error de Gemini: {}", response.status()),
            });
        }

        let generated: GenerateResponse = response.json().await?;
        let content = generated
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(LlmError::Provider {
                message: "No se recibió respuesta de Gemini".to_string(),
            });
        }

        Ok(content)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}
