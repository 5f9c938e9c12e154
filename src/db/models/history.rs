//! Records for the `analysis_history` table.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub type HistoryId = i64;

/// One persisted analysis, exactly as stored.
#[derive(Debug, Clone, FromRow)]
pub struct HistoryRecord {
    pub id: HistoryId,
    pub user_id: Option<String>,
    pub description: String,
    pub extracted_text: String,
    pub summary: String,
    pub label: String,
    /// Structured analysis payload, stored as JSONB. `None` for rows written
    /// before structured analysis existed.
    pub detected_info: Option<serde_json::Value>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new history row.
#[derive(Debug, Clone)]
pub struct HistoryCreateDBRequest {
    pub user_id: Option<String>,
    pub description: String,
    pub extracted_text: String,
    pub summary: String,
    pub label: String,
    pub detected_info: Option<serde_json::Value>,
    pub tags: Vec<String>,
}
