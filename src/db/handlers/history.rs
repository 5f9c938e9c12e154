//! Database repository for analysis history.
//!
//! All queries take an optional `user_id` scope. When present, rows belonging
//! to other users (or to no user) are invisible to the caller, including for
//! deletion.

use sqlx::PgConnection;
use tracing::instrument;

use crate::db::{
    errors::Result,
    models::history::{HistoryCreateDBRequest, HistoryId, HistoryRecord},
};

pub struct History<'c> {
    db: &'c mut PgConnection,
}

impl<'c> History<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(user_id = request.user_id.as_deref()), err)]
    pub async fn save(&mut self, request: &HistoryCreateDBRequest) -> Result<HistoryRecord> {
        let record = sqlx::query_as::<_, HistoryRecord>(
            r#"
            INSERT INTO analysis_history (user_id, description, extracted_text, summary, label, detected_info, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, description, extracted_text, summary, label, detected_info, tags, created_at
            "#,
        )
        .bind(&request.user_id)
        .bind(&request.description)
        .bind(&request.extracted_text)
        .bind(&request.summary)
        .bind(&request.label)
        .bind(&request.detected_info)
        .bind(&request.tags)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(record)
    }

    /// Newest-first page of history rows, optionally scoped to a user.
    #[instrument(skip(self), err)]
    pub async fn list(&mut self, user_id: Option<&str>, limit: i64, offset: i64) -> Result<Vec<HistoryRecord>> {
        let records = match user_id {
            Some(user_id) => {
                sqlx::query_as::<_, HistoryRecord>(
                    r#"
                    SELECT id, user_id, description, extracted_text, summary, label, detected_info, tags, created_at
                    FROM analysis_history
                    WHERE user_id = $1
                    ORDER BY created_at DESC, id DESC
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(user_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(&mut *self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, HistoryRecord>(
                    r#"
                    SELECT id, user_id, description, extracted_text, summary, label, detected_info, tags, created_at
                    FROM analysis_history
                    ORDER BY created_at DESC, id DESC
                    LIMIT $1 OFFSET $2
                    "#,
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&mut *self.db)
                .await?
            }
        };

        Ok(records)
    }

    /// Total row count under the same scope as [`Self::list`].
    #[instrument(skip(self), err)]
    pub async fn count(&mut self, user_id: Option<&str>) -> Result<i64> {
        let total = match user_id {
            Some(user_id) => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM analysis_history WHERE user_id = $1")
                    .bind(user_id)
                    .fetch_one(&mut *self.db)
                    .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM analysis_history")
                    .fetch_one(&mut *self.db)
                    .await?
            }
        };

        Ok(total)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: HistoryId, user_id: Option<&str>) -> Result<Option<HistoryRecord>> {
        let record = match user_id {
            Some(user_id) => {
                sqlx::query_as::<_, HistoryRecord>(
                    r#"
                    SELECT id, user_id, description, extracted_text, summary, label, detected_info, tags, created_at
                    FROM analysis_history
                    WHERE id = $1 AND user_id = $2
                    "#,
                )
                .bind(id)
                .bind(user_id)
                .fetch_optional(&mut *self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, HistoryRecord>(
                    r#"
                    SELECT id, user_id, description, extracted_text, summary, label, detected_info, tags, created_at
                    FROM analysis_history
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .fetch_optional(&mut *self.db)
                .await?
            }
        };

        Ok(record)
    }

    /// Delete a row under the user scope. Returns false when the row does not
    /// exist or belongs to a different user.
    #[instrument(skip(self), err)]
    pub async fn delete(&mut self, id: HistoryId, user_id: Option<&str>) -> Result<bool> {
        let deleted = match user_id {
            Some(user_id) => {
                sqlx::query_scalar::<_, i64>("DELETE FROM analysis_history WHERE id = $1 AND user_id = $2 RETURNING id")
                    .bind(id)
                    .bind(user_id)
                    .fetch_optional(&mut *self.db)
                    .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>("DELETE FROM analysis_history WHERE id = $1 RETURNING id")
                    .bind(id)
                    .fetch_optional(&mut *self.db)
                    .await?
            }
        };

        Ok(deleted.is_some())
    }
}
