//! # GET /medias, GET /medias/{id}
//!
//! メタデータテーブルの一覧取得と単体取得。

use std::sync::Arc;

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use reel_types::{ListMediasQuery, MediaListResponse, MediaRecord};

use crate::config::GatewayState;
use crate::error::{GatewayError, INVALID_REQUEST, MEDIA_NOT_FOUND};
use crate::store::ListFilter;

use super::require_media_id;

/// GET /medias: メタデータ一覧。
///
/// `?limit=N` で返却件数を制限できる。
pub async fn handle_list_medias(
    State(state): State<Arc<GatewayState>>,
    query: Result<Query<ListMediasQuery>, QueryRejection>,
) -> Result<Json<MediaListResponse>, GatewayError> {
    let Query(query) = query.map_err(|rejection| {
        tracing::warn!(rejection = %rejection, "クエリパラメータが不正です");
        GatewayError::BadRequest(INVALID_REQUEST.to_string())
    })?;

    tracing::info!(limit = ?query.limit, "メタデータ一覧を取得中...");
    let records = state
        .metadata_store
        .list_records(&ListFilter { limit: query.limit })
        .await?;
    tracing::info!(count = records.len(), "メタデータ一覧を取得しました");

    Ok(Json(MediaListResponse::from(records)))
}

/// GET /medias/{id}: メタデータ単体取得。
pub async fn handle_get_media(
    State(state): State<Arc<GatewayState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<MediaRecord>, GatewayError> {
    let media_id = require_media_id(&path)?;

    tracing::info!(media_id, "メタデータを取得中...");
    match state.metadata_store.get_record(media_id).await? {
        Some(record) => {
            tracing::info!(media_id, "メタデータが見つかりました");
            Ok(Json(record))
        }
        None => {
            tracing::info!(media_id, "メタデータが見つかりません");
            Err(GatewayError::NotFound(MEDIA_NOT_FOUND.to_string()))
        }
    }
}
