//! Shared test helpers: stub providers and a preconfigured test server.

use crate::analysis::{AnalysisResult, DetectedInfo, DocumentAnalysis, LlmError};
use crate::image::DecodedImage;
use crate::ocr::{Extraction, OcrError, TextExtraction};
use crate::{build_router, AppState, Config};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// OCR stub returning a fixed extraction and counting calls.
pub struct StubOcr {
    text: Option<String>,
    calls: AtomicUsize,
}

impl StubOcr {
    pub fn with_text(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    /// A stub that finds no legible text.
    pub fn blank() -> Arc<Self> {
        Arc::new(Self {
            text: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextExtraction for StubOcr {
    async fn extract(&self, _image: &DecodedImage) -> Result<Extraction, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(match &self.text {
            Some(text) => Extraction::Text(text.clone()),
            None => Extraction::NoText,
        })
    }

    fn backend_name(&self) -> &'static str {
        "stub"
    }
}

/// Analyzer stub returning a fixed label and counting calls.
pub struct StubAnalyzer {
    label: String,
    calls: AtomicUsize,
}

impl StubAnalyzer {
    pub fn with_label(label: &str) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentAnalysis for StubAnalyzer {
    async fn analyze(&self, extracted_text: &str, description: &str) -> Result<AnalysisResult, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AnalysisResult {
            summary: format!("Resumen de: {description}"),
            label: self.label.clone(),
            detected_info: DetectedInfo {
                entities: Vec::new(),
                key_points: vec![extracted_text.to_string()],
                document_type: self.label.clone(),
                understanding: "Comprensión de prueba".to_string(),
            },
            tags: vec![self.label.clone()],
        })
    }
}

pub fn test_state(db: Option<PgPool>, ocr: Arc<dyn TextExtraction>, analyzer: Arc<dyn DocumentAnalysis>) -> AppState {
    AppState::builder()
        .maybe_db(db)
        .config(Config::default())
        .ocr(ocr)
        .analyzer(analyzer)
        .build()
}

pub fn test_server(state: AppState) -> axum_test::TestServer {
    axum_test::TestServer::new(build_router(state).expect("router")).expect("test server")
}

/// A valid 1x1 PNG as a data URI.
pub fn png_data_uri() -> String {
    "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg=="
        .to_string()
}
