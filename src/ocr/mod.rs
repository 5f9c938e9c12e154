//! OCR extraction with configuration-selected backends.
//!
//! Three interchangeable backends sit behind the [`TextExtraction`] trait:
//!
//! 1. Azure Document Intelligence (async submit-then-poll job model)
//! 2. Google Vision document text detection (synchronous)
//! 3. A local Tesseract engine (feature `local-ocr`, no network)
//!
//! Selection happens once at startup from configuration, in that precedence
//! order. Exactly one backend produces the extraction for a request; results
//! are never merged across backends.

pub mod azure;
#[cfg(feature = "local-ocr")]
pub mod local;
pub mod vision;

use crate::config::OcrSettings;
use crate::image::DecodedImage;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Language hints passed to cloud backends and the local engine.
pub const LANGUAGE_HINTS: [&str; 2] = ["es", "en"];

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("no hay un backend de OCR configurado")]
    Unavailable,

    #[error("{message}")]
    Provider { message: String },

    #[error("el sondeo de OCR superó {attempts} intentos")]
    Timeout { attempts: u32 },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Outcome of one extraction: recognized text, or the no-text sentinel.
///
/// The sentinel is distinct from an error: the backend worked but found no
/// legible text. Callers treat it as a request-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Text(String),
    NoText,
}

impl Extraction {
    /// Normalize raw recognizer output: trim surrounding whitespace and map an
    /// empty result to the sentinel.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Extraction::NoText
        } else {
            Extraction::Text(trimmed.to_string())
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Extraction::Text(text) => Some(text),
            Extraction::NoText => None,
        }
    }
}

/// Capability interface implemented by every OCR backend.
#[async_trait]
pub trait TextExtraction: Send + Sync {
    async fn extract(&self, image: &DecodedImage) -> Result<Extraction, OcrError>;

    /// Stable identifier used for logging and selection tests.
    fn backend_name(&self) -> &'static str;
}

/// Placeholder backend used when nothing is configured. Every call fails with
/// [`OcrError::Unavailable`]; startup still succeeds so the rest of the API
/// (history, health) keeps working.
pub struct Disabled;

#[async_trait]
impl TextExtraction for Disabled {
    async fn extract(&self, _image: &DecodedImage) -> Result<Extraction, OcrError> {
        Err(OcrError::Unavailable)
    }

    fn backend_name(&self) -> &'static str {
        "disabled"
    }
}

/// Pick the OCR backend from configuration.
///
/// Precedence: Document Intelligence endpoint/key pair, then the Vision API
/// when explicitly enabled with a key, then the local engine when compiled in.
pub fn select_backend(settings: &OcrSettings) -> Arc<dyn TextExtraction> {
    if let Some(azure) = &settings.azure {
        return Arc::new(azure::DocumentIntelligence::new(
            azure.clone(),
            settings.poll_interval,
            settings.max_poll_attempts,
        ));
    }

    if settings.use_vision {
        if let Some(key) = &settings.vision_api_key {
            return Arc::new(vision::VisionOcr::new(key.clone()));
        }
    }

    #[cfg(feature = "local-ocr")]
    {
        return Arc::new(local::LocalOcr::default());
    }

    #[cfg(not(feature = "local-ocr"))]
    {
        Arc::new(Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AzureDocumentSettings, OcrSettings};

    fn azure_settings() -> AzureDocumentSettings {
        AzureDocumentSettings {
            endpoint: "https://example.cognitiveservices.azure.com".parse().unwrap(),
            key: "secret".to_string(),
        }
    }

    #[test]
    fn extraction_trims_and_maps_empty_to_sentinel() {
        assert_eq!(Extraction::from_raw("  Hola mundo \n"), Extraction::Text("Hola mundo".into()));
        assert_eq!(Extraction::from_raw("   \n\t "), Extraction::NoText);
        assert_eq!(Extraction::NoText.text(), None);
    }

    #[test]
    fn document_intelligence_wins_over_vision() {
        let settings = OcrSettings {
            azure: Some(azure_settings()),
            use_vision: true,
            vision_api_key: Some("vision-key".to_string()),
            ..OcrSettings::default()
        };
        assert_eq!(select_backend(&settings).backend_name(), "azure-document-intelligence");
    }

    #[test]
    fn vision_requires_both_flag_and_key() {
        let settings = OcrSettings {
            use_vision: true,
            vision_api_key: Some("vision-key".to_string()),
            ..OcrSettings::default()
        };
        assert_eq!(select_backend(&settings).backend_name(), "google-vision");

        // Flag without key falls through to the local/disabled backend.
        let settings = OcrSettings {
            use_vision: true,
            ..OcrSettings::default()
        };
        assert_ne!(select_backend(&settings).backend_name(), "google-vision");
    }

    #[cfg(not(feature = "local-ocr"))]
    #[test]
    fn unconfigured_selection_is_disabled() {
        let settings = OcrSettings::default();
        assert_eq!(select_backend(&settings).backend_name(), "disabled");
    }

    #[cfg(feature = "local-ocr")]
    #[test]
    fn unconfigured_selection_falls_back_to_local() {
        let settings = OcrSettings::default();
        assert_eq!(select_backend(&settings).backend_name(), "tesseract-local");
    }

    #[tokio::test]
    async fn disabled_backend_reports_unavailable() {
        let image = crate::image::DecodedImage {
            kind: crate::image::ImageKind::Png,
            bytes: bytes::Bytes::from_static(b"png"),
        };
        let err = Disabled.extract(&image).await.unwrap_err();
        assert!(matches!(err, OcrError::Unavailable));
    }
}
