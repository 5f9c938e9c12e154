//! HTTP API surface.
//!
//! - [`handlers`]: axum request handlers
//! - [`models`]: request/response wire types (camelCase JSON)

pub mod handlers;
pub mod models;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Apunto Backend API",
        description = "Document image analysis: OCR extraction, LLM analysis, and history."
    ),
    paths(
        handlers::analyze::analyze_document,
        handlers::history::list_history,
        handlers::history::get_history_item,
        handlers::history::delete_history_item,
    ),
    components(schemas(
        models::analyze::AnalyzeRequest,
        models::analyze::AnalyzeResponse,
        models::history::HistoryItemResponse,
        models::history::HistoryListResponse,
        models::history::DeleteResponse,
        models::pagination::PageInfo,
        crate::analysis::AnalysisResult,
        crate::analysis::DetectedInfo,
        crate::analysis::DetectedEntity,
        crate::analysis::Confidence,
    ))
)]
pub struct ApiDoc;
