//! Handlers for the analysis history endpoints.

use super::user_id_from_headers;
use crate::api::models::history::{DeleteResponse, HistoryItemResponse, HistoryListResponse};
use crate::api::models::pagination::{HistoryQuery, PageInfo};
use crate::db::handlers::History;
use crate::db::models::history::HistoryId;
use crate::errors::{Error, Result};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use sqlx::PgPool;
use tracing::instrument;

/// History endpoints need a database; analyze works without one.
fn history_pool(state: &AppState) -> Result<&PgPool> {
    state.db.as_ref().ok_or(Error::ProviderUnavailable {
        provider: "El historial".to_string(),
    })
}

/// Path IDs arrive as strings so a non-numeric ID can produce a 400 with a
/// Spanish message rather than axum's default rejection.
fn parse_id(raw: &str) -> Result<HistoryId> {
    raw.parse().map_err(|_| Error::BadRequest {
        message: "El ID debe ser un número".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/api/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Page of analysis history", body = HistoryListResponse),
        (status = 500, description = "History is unavailable"),
    ),
    tag = "history"
)]
#[instrument(skip_all)]
pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
    headers: HeaderMap,
) -> Result<Json<HistoryListResponse>> {
    let pool = history_pool(&state)?;
    let user_id = user_id_from_headers(&headers);
    let (limit, offset) = (query.limit(), query.offset());

    let mut conn = pool.acquire().await.map_err(anyhow::Error::from)?;
    let mut repo = History::new(&mut conn);
    let records = repo.list(user_id.as_deref(), limit, offset).await?;
    let total = repo.count(user_id.as_deref()).await?;

    Ok(Json(HistoryListResponse {
        history: records.into_iter().map(HistoryItemResponse::from).collect(),
        pagination: PageInfo::new(total, limit, offset),
    }))
}

#[utoipa::path(
    get,
    path = "/api/history/{id}",
    params(("id" = String, Path, description = "History row ID")),
    responses(
        (status = 200, description = "One analysis", body = HistoryItemResponse),
        (status = 400, description = "Non-numeric ID"),
        (status = 404, description = "Not found or belongs to another user"),
    ),
    tag = "history"
)]
#[instrument(skip_all, fields(id = %id))]
pub async fn get_history_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<HistoryItemResponse>> {
    let pool = history_pool(&state)?;
    let id = parse_id(&id)?;
    let user_id = user_id_from_headers(&headers);

    let mut conn = pool.acquire().await.map_err(anyhow::Error::from)?;
    let record = History::new(&mut conn)
        .get_by_id(id, user_id.as_deref())
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "analysis".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(HistoryItemResponse::from(record)))
}

#[utoipa::path(
    delete,
    path = "/api/history/{id}",
    params(("id" = String, Path, description = "History row ID")),
    responses(
        (status = 200, description = "Deleted", body = DeleteResponse),
        (status = 400, description = "Non-numeric ID"),
        (status = 404, description = "Not found or belongs to another user"),
    ),
    tag = "history"
)]
#[instrument(skip_all, fields(id = %id))]
pub async fn delete_history_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DeleteResponse>> {
    let pool = history_pool(&state)?;
    let id = parse_id(&id)?;
    let user_id = user_id_from_headers(&headers);

    let mut conn = pool.acquire().await.map_err(anyhow::Error::from)?;
    let deleted = History::new(&mut conn).delete(id, user_id.as_deref()).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "analysis".to_string(),
            id: id.to_string(),
        });
    }

    Ok(Json(DeleteResponse {
        message: "Análisis eliminado correctamente".to_string(),
        id,
    }))
}
