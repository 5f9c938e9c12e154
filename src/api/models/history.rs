//! Wire types for the history endpoints.

use super::pagination::PageInfo;
use crate::analysis::DetectedInfo;
use crate::db::models::history::{HistoryId, HistoryRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItemResponse {
    pub id: HistoryId,
    pub user_id: Option<String>,
    pub description: String,
    pub extracted_text: String,
    pub summary: String,
    pub label: String,
    pub detected_info: Option<DetectedInfo>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<HistoryRecord> for HistoryItemResponse {
    fn from(record: HistoryRecord) -> Self {
        // Stored JSONB that no longer matches the current analysis shape is
        // surfaced as null rather than failing the whole listing.
        let detected_info = record.detected_info.and_then(|value| serde_json::from_value(value).ok());
        Self {
            id: record.id,
            user_id: record.user_id,
            description: record.description,
            extracted_text: record.extracted_text,
            summary: record.summary,
            label: record.label,
            detected_info,
            tags: record.tags,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryListResponse {
    pub history: Vec<HistoryItemResponse>,
    pub pagination: PageInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
    pub id: HistoryId,
}
