//! # Gatewayエンドポイント
//!
//! - `GET /medias`: メタデータ一覧
//! - `GET /medias/{id}`: メタデータ単体取得
//! - `POST /media/{id}/presigned-url`: CloudFront署名付きURL発行

pub mod medias;
pub mod presigned_url;

use std::sync::Arc;

use axum::extract::rejection::PathRejection;
use axum::extract::Path;

pub use medias::{handle_get_media, handle_list_medias};
pub use presigned_url::handle_presigned_url;

use crate::config::GatewayState;
use crate::error::{GatewayError, INVALID_REQUEST};

/// 全エンドポイントを登録したルーターを構築する。
pub fn router(state: Arc<GatewayState>) -> axum::Router {
    axum::Router::new()
        .route("/medias", axum::routing::get(handle_list_medias))
        .route("/medias/{id}", axum::routing::get(handle_get_media))
        .route(
            "/media/{id}/presigned-url",
            axum::routing::post(handle_presigned_url),
        )
        .with_state(state)
}

/// パスパラメータからメディアIDを取り出す。欠落・空白のみは `BadRequest`。
pub(crate) fn require_media_id(
    path: &Result<Path<String>, PathRejection>,
) -> Result<&str, GatewayError> {
    match path {
        Ok(Path(id)) if !id.trim().is_empty() => Ok(id.as_str()),
        Ok(_) => Err(GatewayError::BadRequest(INVALID_REQUEST.to_string())),
        Err(rejection) => {
            tracing::warn!(rejection = %rejection, "パスパラメータを取得できません");
            Err(GatewayError::BadRequest(INVALID_REQUEST.to_string()))
        }
    }
}
