//! Azure Document Intelligence backend (prebuilt-read model).
//!
//! This backend uses the provider's asynchronous job pattern: the image bytes
//! are submitted as the request body, the job handle comes back in the
//! `operation-location` response header, and the job status is polled at a
//! fixed interval until it reaches a terminal state. The poll loop is capped
//! and reports [`OcrError::Timeout`] past the cap.

use super::{Extraction, OcrError, TextExtraction};
use crate::config::AzureDocumentSettings;
use crate::image::DecodedImage;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const API_VERSION: &str = "2023-07-31";
const KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OPERATION_LOCATION: &str = "operation-location";

pub struct DocumentIntelligence {
    http: reqwest::Client,
    settings: AzureDocumentSettings,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

/// Poll states of an analyze job. Terminal states are `succeeded` and `failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
enum OperationStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResult {
    #[serde(default)]
    pages: Vec<AnalyzePage>,
}

#[derive(Debug, Deserialize)]
struct AnalyzePage {
    #[serde(default)]
    lines: Vec<AnalyzeLine>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeLine {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: Option<ProviderErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    message: Option<String>,
}

impl DocumentIntelligence {
    pub fn new(settings: AzureDocumentSettings, poll_interval: Duration, max_poll_attempts: u32) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
            poll_interval,
            max_poll_attempts,
        }
    }

    fn analyze_url(&self) -> String {
        format!(
            "{}/formrecognizer/documentModels/prebuilt-read:analyze?api-version={API_VERSION}",
            self.settings.endpoint.as_str().trim_end_matches('/'),
        )
    }

    /// Submit the image and return the operation URL to poll.
    async fn submit(&self, image: &DecodedImage) -> Result<String, OcrError> {
        let response = self
            .http
            .post(self.analyze_url())
            .header(KEY_HEADER, &self.settings.key)
            .header("Content-Type", image.kind.content_type())
            .body(image.bytes.clone())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ProviderErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.and_then(|e| e.message))
                .unwrap_or_else(|| format!("Error de Azure Document Intelligence: {status}"));
            return Err(OcrError::Provider { message });
        }

        let operation_location = response
            .headers()
            .get(OPERATION_LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| OcrError::Provider {
                message: "no se recibió el header operation-location en la respuesta de OCR".to_string(),
            })?;

        Ok(operation_location)
    }

    /// Poll the operation until it succeeds, fails, or the attempt bound is hit.
    async fn poll(&self, operation_location: &str) -> Result<Extraction, OcrError> {
        for attempt in 1..=self.max_poll_attempts {
            let response = self
                .http
                .get(operation_location)
                .header(KEY_HEADER, &self.settings.key)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(OcrError::Provider {
                    message: format!("error al consultar el estado del OCR: {}", response.status()),
                });
            }

            let payload: serde_json::Value = response.json().await?;
            let status: OperationStatus = payload
                .get("status")
                .cloned()
                .and_then(|v| serde_json::from_value(v).ok())
                .ok_or_else(|| OcrError::Provider {
                    message: format!("respuesta de estado de OCR inesperada: {payload}"),
                })?;

            match status {
                OperationStatus::Succeeded => {
                    let result: AnalyzeResult = payload
                        .get("analyzeResult")
                        .cloned()
                        .map(serde_json::from_value)
                        .transpose()
                        .map_err(|e| OcrError::Provider {
                            message: format!("no se pudo interpretar el resultado del OCR: {e}"),
                        })?
                        .unwrap_or(AnalyzeResult { pages: Vec::new() });
                    return Ok(join_lines(&result));
                }
                // The raw payload is kept in the error for diagnostics.
                OperationStatus::Failed => {
                    return Err(OcrError::Provider {
                        message: format!("OCR falló: {payload}"),
                    });
                }
                OperationStatus::NotStarted | OperationStatus::Running => {
                    debug!(attempt, "OCR job still running");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }

        Err(OcrError::Timeout {
            attempts: self.max_poll_attempts,
        })
    }
}

/// Concatenate recognized line contents across pages, in page order then line
/// order, joined by newline.
fn join_lines(result: &AnalyzeResult) -> Extraction {
    let text = result
        .pages
        .iter()
        .flat_map(|page| page.lines.iter().map(|line| line.content.as_str()))
        .collect::<Vec<_>>()
        .join("\n");
    Extraction::from_raw(&text)
}

#[async_trait]
impl TextExtraction for DocumentIntelligence {
    #[instrument(skip_all, fields(bytes = image.len()))]
    async fn extract(&self, image: &DecodedImage) -> Result<Extraction, OcrError> {
        let operation_location = self.submit(image).await?;
        self.poll(&operation_location).await
    }

    fn backend_name(&self) -> &'static str {
        "azure-document-intelligence"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageKind;
    use bytes::Bytes;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_image() -> DecodedImage {
        DecodedImage {
            kind: ImageKind::Jpeg,
            bytes: Bytes::from_static(&[0xff, 0xd8, 0xff]),
        }
    }

    fn backend(server: &MockServer, max_attempts: u32) -> DocumentIntelligence {
        DocumentIntelligence::new(
            AzureDocumentSettings {
                endpoint: server.uri().parse().unwrap(),
                key: "test-key".to_string(),
            },
            Duration::from_millis(10),
            max_attempts,
        )
    }

    async fn mount_submit(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/formrecognizer/documentModels/prebuilt-read:analyze"))
            .and(header(KEY_HEADER, "test-key"))
            .and(header("content-type", "image/jpeg"))
            .respond_with(
                ResponseTemplate::new(202).insert_header(OPERATION_LOCATION, format!("{}/operations/1", server.uri()).as_str()),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn polls_until_succeeded_and_joins_lines_across_pages() {
        let server = MockServer::start().await;
        mount_submit(&server).await;

        // First poll: still running. Second poll: done.
        Mock::given(method("GET"))
            .and(path("/operations/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "running" })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/operations/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "succeeded",
                "analyzeResult": {
                    "pages": [
                        { "lines": [ { "content": "Hola" }, { "content": "mundo" } ] },
                        { "lines": [ { "content": "segunda página" } ] }
                    ]
                }
            })))
            .mount(&server)
            .await;

        let extraction = backend(&server, 5).extract(&test_image()).await.unwrap();
        assert_eq!(extraction, Extraction::Text("Hola\nmundo\nsegunda página".to_string()));
    }

    #[tokio::test]
    async fn failed_job_carries_the_raw_payload() {
        let server = MockServer::start().await;
        mount_submit(&server).await;
        Mock::given(method("GET"))
            .and(path("/operations/1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "status": "failed", "error": { "code": "InvalidImage" } })),
            )
            .mount(&server)
            .await;

        let err = backend(&server, 5).extract(&test_image()).await.unwrap_err();
        match err {
            OcrError::Provider { message } => assert!(message.contains("InvalidImage"), "message was {message}"),
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn bounded_polling_times_out() {
        let server = MockServer::start().await;
        mount_submit(&server).await;
        Mock::given(method("GET"))
            .and(path("/operations/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "running" })))
            .mount(&server)
            .await;

        let err = backend(&server, 3).extract(&test_image()).await.unwrap_err();
        assert!(matches!(err, OcrError::Timeout { attempts: 3 }));
    }

    #[tokio::test]
    async fn missing_operation_location_is_a_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/formrecognizer/documentModels/prebuilt-read:analyze"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let err = backend(&server, 5).extract(&test_image()).await.unwrap_err();
        assert!(matches!(err, OcrError::Provider { ref message } if message.contains("operation-location")));
    }

    #[tokio::test]
    async fn submit_rejection_surfaces_the_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/formrecognizer/documentModels/prebuilt-read:analyze"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "error": { "message": "Access denied" } })))
            .mount(&server)
            .await;

        let err = backend(&server, 5).extract(&test_image()).await.unwrap_err();
        assert!(matches!(err, OcrError::Provider { ref message } if message == "Access denied"));
    }

    #[tokio::test]
    async fn succeeded_job_with_no_pages_is_the_sentinel() {
        let server = MockServer::start().await;
        mount_submit(&server).await;
        Mock::given(method("GET"))
            .and(path("/operations/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "succeeded", "analyzeResult": { "pages": [] } })))
            .mount(&server)
            .await;

        let extraction = backend(&server, 5).extract(&test_image()).await.unwrap();
        assert_eq!(extraction, Extraction::NoText);
    }
}
