//! Google Vision document text detection backend.
//!
//! Unlike Document Intelligence this is a single synchronous call: one
//! `images:annotate` request with the base64 payload, one response with the
//! full-document annotation at `textAnnotations[0]`.

use super::{Extraction, OcrError, TextExtraction, LANGUAGE_HINTS};
use crate::image::DecodedImage;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://vision.googleapis.com";

pub struct VisionOcr {
    http: reqwest::Client,
    api_key: String,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct AnnotateBody {
    #[serde(default)]
    responses: Vec<AnnotateResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateResponse {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    error: Option<AnnotateError>,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    description: String,
}

#[derive(Debug, Deserialize)]
struct AnnotateError {
    message: Option<String>,
}

impl VisionOcr {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.parse().expect("static url"))
    }

    pub fn with_base_url(api_key: String, base_url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl TextExtraction for VisionOcr {
    #[instrument(skip_all, fields(bytes = image.len()))]
    async fn extract(&self, image: &DecodedImage) -> Result<Extraction, OcrError> {
        let url = format!(
            "{}/v1/images:annotate?key={}",
            self.base_url.as_str().trim_end_matches('/'),
            self.api_key
        );
        let body = json!({
            "requests": [{
                "image": { "content": STANDARD.encode(&image.bytes) },
                "features": [{ "type": "DOCUMENT_TEXT_DETECTION" }],
                "imageContext": { "languageHints": LANGUAGE_HINTS },
            }]
        });

        let response = self.http.post(url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(OcrError::Provider {
                message: format!("error de Google Vision: {}", response.status()),
            });
        }

        let body: AnnotateBody = response.json().await?;
        let annotate = body.responses.into_iter().next().ok_or_else(|| OcrError::Provider {
            message: "respuesta vacía de Google Vision".to_string(),
        })?;

        if let Some(error) = annotate.error {
            return Err(OcrError::Provider {
                message: error.message.unwrap_or_else(|| "error de Google Vision".to_string()),
            });
        }

        // The first annotation is the whole-document text; the rest are
        // per-word boxes we don't need.
        match annotate.text_annotations.first() {
            Some(annotation) => Ok(Extraction::from_raw(&annotation.description)),
            None => Ok(Extraction::NoText),
        }
    }

    fn backend_name(&self) -> &'static str {
        "google-vision"
    }
}
