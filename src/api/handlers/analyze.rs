//! Handler for the analyze pipeline: validate, OCR, LLM, best-effort save.

use super::user_id_from_headers;
use crate::api::models::analyze::{AnalyzeRequest, AnalyzeResponse};
use crate::db::handlers::History;
use crate::db::models::history::HistoryCreateDBRequest;
use crate::errors::{Error, Result};
use crate::image::decode_data_uri;
use crate::ocr::Extraction;
use crate::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use tracing::{debug, info, instrument, warn};

/// Analyze a document image.
///
/// The pipeline is OCR then LLM then a best-effort history insert: a database
/// failure is logged and the analysis is still returned.
#[utoipa::path(
    post,
    path = "/api/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Document analyzed", body = AnalyzeResponse),
        (status = 400, description = "Invalid image, missing fields, or no readable text"),
        (status = 500, description = "Provider failure or misconfiguration"),
    ),
    tag = "analyze"
)]
#[instrument(skip_all)]
pub async fn analyze_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>> {
    let image = request.image.as_deref().filter(|s| !s.is_empty()).ok_or(Error::BadRequest {
        message: "El campo \"image\" es obligatorio".to_string(),
    })?;
    let description = request
        .description
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(Error::BadRequest {
            message: "El campo \"description\" es obligatorio".to_string(),
        })?;

    let decoded = decode_data_uri(image)?;
    debug!(kind = decoded.kind.content_type(), bytes = decoded.len(), "image decoded");

    let extracted_text = match state.ocr.extract(&decoded).await? {
        Extraction::Text(text) => text,
        Extraction::NoText => {
            return Err(Error::BadRequest {
                message: "El documento no contiene texto legible o la imagen no es válida".to_string(),
            });
        }
    };

    let analysis = state.analyzer.analyze(&extracted_text, description).await?;
    info!(label = %analysis.label, "analysis completed");

    // Persistence is best-effort: the analysis result is already in hand.
    match &state.db {
        Some(pool) => {
            let save_request = HistoryCreateDBRequest {
                user_id: user_id_from_headers(&headers),
                description: description.to_string(),
                extracted_text: extracted_text.clone(),
                summary: analysis.summary.clone(),
                label: analysis.label.clone(),
                detected_info: serde_json::to_value(&analysis.detected_info).ok(),
                tags: analysis.tags.clone(),
            };
            let saved = async {
                let mut conn = pool.acquire().await?;
                History::new(&mut conn).save(&save_request).await.map_err(anyhow::Error::from)
            }
            .await;
            if let Err(error) = saved {
                warn!("failed to save analysis to history: {error:#}");
            }
        }
        None => debug!("no database configured, skipping history save"),
    }

    Ok(Json(AnalyzeResponse::new(extracted_text, analysis)))
}

#[cfg(test)]
mod tests {
    use crate::analysis::Unconfigured;
    use crate::db::handlers::History;
    use crate::ocr::Disabled;
    use crate::test_utils::{png_data_uri, test_server, test_state, StubAnalyzer, StubOcr};
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;
    use std::sync::Arc;

    #[test_log::test(tokio::test)]
    async fn analyzes_a_document_without_a_database() {
        let ocr = StubOcr::with_text("Hola mundo");
        let analyzer = StubAnalyzer::with_label("Nota");
        let server = test_server(test_state(None, ocr.clone(), analyzer.clone()));

        let response = server
            .post("/api/analyze")
            .json(&json!({ "image": png_data_uri(), "description": "una nota breve" }))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["extractedText"], "Hola mundo");
        assert_eq!(body["label"], "Nota");
        assert_eq!(body["summary"], "Resumen de: una nota breve");
        assert_eq!(body["detectedInfo"]["documentType"], "Nota");
        assert_eq!(body["tags"][0], "Nota");
        assert_eq!(ocr.calls(), 1);
        assert_eq!(analyzer.calls(), 1);
    }

    #[tokio::test]
    async fn missing_image_is_a_400_before_any_provider_call() {
        let ocr = StubOcr::with_text("Hola");
        let server = test_server(test_state(None, ocr.clone(), StubAnalyzer::with_label("Nota")));

        let response = server.post("/api/analyze").json(&json!({ "description": "nota" })).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "El campo \"image\" es obligatorio");
        assert_eq!(ocr.calls(), 0);
    }

    #[tokio::test]
    async fn blank_description_is_a_400() {
        let ocr = StubOcr::with_text("Hola");
        let server = test_server(test_state(None, ocr.clone(), StubAnalyzer::with_label("Nota")));

        let response = server
            .post("/api/analyze")
            .json(&json!({ "image": png_data_uri(), "description": "   " }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "El campo \"description\" es obligatorio");
        assert_eq!(ocr.calls(), 0);
    }

    #[tokio::test]
    async fn invalid_data_uri_is_a_400() {
        let server = test_server(test_state(None, StubOcr::with_text("x"), StubAnalyzer::with_label("Nota")));

        let response = server
            .post("/api/analyze")
            .json(&json!({ "image": "http://example.com/image.png", "description": "nota" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "La imagen debe ser un data URI válido (data:image/...;base64,...)");
    }

    #[tokio::test]
    async fn unreadable_document_is_a_400_and_skips_the_analyzer() {
        let analyzer = StubAnalyzer::with_label("Nota");
        let server = test_server(test_state(None, StubOcr::blank(), analyzer.clone()));

        let response = server
            .post("/api/analyze")
            .json(&json!({ "image": png_data_uri(), "description": "nota" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "El documento no contiene texto legible o la imagen no es válida");
        assert_eq!(analyzer.calls(), 0);
    }

    #[tokio::test]
    async fn unconfigured_ocr_backend_is_a_500() {
        let server = test_server(test_state(None, Arc::new(Disabled), StubAnalyzer::with_label("Nota")));

        let response = server
            .post("/api/analyze")
            .json(&json!({ "image": png_data_uri(), "description": "nota" }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Error interno del servidor");
    }

    #[tokio::test]
    async fn unconfigured_analyzer_is_a_500() {
        let server = test_server(test_state(None, StubOcr::with_text("Hola"), Arc::new(Unconfigured)));

        let response = server
            .post("/api/analyze")
            .json(&json!({ "image": png_data_uri(), "description": "nota" }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn successful_analysis_is_persisted_with_the_user_id(pool: PgPool) {
        let server = test_server(test_state(
            Some(pool.clone()),
            StubOcr::with_text("Hola mundo"),
            StubAnalyzer::with_label("Nota"),
        ));

        let response = server
            .post("/api/analyze")
            .add_header("x-user-id", "user-1")
            .json(&json!({ "image": png_data_uri(), "description": "una nota" }))
            .await;
        response.assert_status_ok();

        let mut conn = pool.acquire().await.unwrap();
        let rows = History::new(&mut conn).list(Some("user-1"), 50, 0).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].extracted_text, "Hola mundo");
        assert_eq!(rows[0].label, "Nota");
        assert_eq!(rows[0].description, "una nota");
        assert!(rows[0].detected_info.is_some());
    }

    #[sqlx::test]
    async fn anonymous_requests_persist_without_a_user_id(pool: PgPool) {
        let server = test_server(test_state(
            Some(pool.clone()),
            StubOcr::with_text("Hola"),
            StubAnalyzer::with_label("Nota"),
        ));

        server
            .post("/api/analyze")
            .json(&json!({ "image": png_data_uri(), "description": "una nota" }))
            .await
            .assert_status_ok();

        let mut conn = pool.acquire().await.unwrap();
        let rows = History::new(&mut conn).list(None, 50, 0).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].user_id.is_none());
    }
}
