//! Local Tesseract engine, compiled in behind the `local-ocr` feature.
//!
//! Recognition runs on the blocking thread pool. The Tesseract session is
//! created inside the closure and dropped before it returns, so no session
//! outlives a request on either the success or the error path.

use super::{Extraction, OcrError, TextExtraction, LANGUAGE_HINTS};
use crate::image::DecodedImage;
use async_trait::async_trait;
use leptess::LepTess;
use tracing::instrument;

pub struct LocalOcr {
    languages: String,
}

impl Default for LocalOcr {
    fn default() -> Self {
        Self {
            languages: LANGUAGE_HINTS
                .iter()
                .map(|hint| match *hint {
                    "es" => "spa",
                    "en" => "eng",
                    other => other,
                })
                .collect::<Vec<_>>()
                .join("+"),
        }
    }
}

#[async_trait]
impl TextExtraction for LocalOcr {
    #[instrument(skip_all, fields(bytes = image.len()))]
    async fn extract(&self, image: &DecodedImage) -> Result<Extraction, OcrError> {
        let languages = self.languages.clone();
        let bytes = image.bytes.clone();

        let text = tokio::task::spawn_blocking(move || {
            let mut session = LepTess::new(None, &languages).map_err(|e| OcrError::Provider {
                message: format!("no se pudo iniciar Tesseract ({languages}): {e}"),
            })?;
            session.set_image_from_mem(&bytes).map_err(|e| OcrError::Provider {
                message: format!("Tesseract no pudo leer la imagen: {e}"),
            })?;
            session.get_utf8_text().map_err(|e| OcrError::Provider {
                message: format!("Tesseract no pudo extraer texto: {e}"),
            })
        })
        .await
        .map_err(|_| OcrError::Provider {
            message: "la tarea de OCR local terminó inesperadamente".to_string(),
        })??;

        Ok(Extraction::from_raw(&text))
    }

    fn backend_name(&self) -> &'static str {
        "tesseract-local"
    }
}
