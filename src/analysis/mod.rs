//! LLM document analysis.
//!
//! The analysis stage takes the OCR extraction plus the user's description and
//! asks a chat model for a structured Spanish-language analysis. Two provider
//! transports are supported (Azure OpenAI and Gemini) behind [`ChatTransport`];
//! the surrounding prompt construction and response shaping in [`Analyzer`] is
//! shared between them.

pub mod azure_openai;
pub mod gemini;
pub mod parse;
pub mod prompt;

use crate::config::LlmSettings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("no hay un proveedor de análisis configurado")]
    Unavailable,

    #[error("{message}")]
    Provider { message: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Confidence levels the model may attach to a detected entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Alta,
    Media,
    Baja,
}

/// One piece of structured information the model found in the document, such
/// as a date, an amount, a name, or an equation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DetectedEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectedInfo {
    pub entities: Vec<DetectedEntity>,
    pub key_points: Vec<String>,
    pub document_type: String,
    pub understanding: String,
}

/// Shaped analysis output. Always structurally complete: missing or
/// unparseable model output is backfilled with defaults in [`parse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    pub label: String,
    pub detected_info: DetectedInfo,
    pub tags: Vec<String>,
}

/// Raw chat access to one LLM provider. Implementations only move text; all
/// prompt and response handling lives in [`Analyzer`].
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError>;

    fn provider_name(&self) -> &'static str;
}

/// The analysis capability the API handlers depend on.
#[async_trait]
pub trait DocumentAnalysis: Send + Sync {
    async fn analyze(&self, extracted_text: &str, description: &str) -> Result<AnalysisResult, LlmError>;
}

/// Prompt construction and response shaping around a [`ChatTransport`].
pub struct Analyzer {
    transport: Arc<dyn ChatTransport>,
}

impl Analyzer {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl DocumentAnalysis for Analyzer {
    #[instrument(skip_all, fields(provider = self.transport.provider_name()))]
    async fn analyze(&self, extracted_text: &str, description: &str) -> Result<AnalysisResult, LlmError> {
        let user = prompt::user_prompt(description, extracted_text);
        let completion = self.transport.complete(prompt::SYSTEM_PROMPT, &user).await?;
        Ok(parse::shape_completion(&completion))
    }
}

/// Placeholder when no provider is configured. Startup still succeeds; analyze
/// requests fail with [`LlmError::Unavailable`].
pub struct Unconfigured;

#[async_trait]
impl DocumentAnalysis for Unconfigured {
    async fn analyze(&self, _extracted_text: &str, _description: &str) -> Result<AnalysisResult, LlmError> {
        Err(LlmError::Unavailable)
    }
}

/// Pick the analysis provider from configuration, Azure OpenAI first.
pub fn select_analyzer(settings: &LlmSettings) -> Arc<dyn DocumentAnalysis> {
    if let Some(azure) = &settings.azure {
        let transport = Arc::new(azure_openai::AzureOpenAi::new(azure.clone()));
        return Arc::new(Analyzer::new(transport));
    }

    if let Some(gemini) = &settings.gemini {
        let transport = Arc::new(gemini::Gemini::new(gemini.clone()));
        return Arc::new(Analyzer::new(transport));
    }

    Arc::new(Unconfigured)
}
