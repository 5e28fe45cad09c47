//! # POST /media/{id}/presigned-url
//!
//! CloudFront署名付きURL発行。
//!
//! 処理順序:
//! 1. パスパラメータ・ボディの検証
//! 2. メタデータストアから `s3_key` を取得し、リソースURLを組み立てる
//! 3. シークレットストアから秘密鍵を取得する（リクエストごと、キャッシュしない）
//! 4. カスタムポリシー `[now, now + expiration)` で署名する

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use reel_crypto::{CloudFrontSigner, CryptoError, ExpirationSeconds, SignedUrl};
use reel_types::{PresignedUrlRequest, PresignedUrlResponse};

use crate::config::GatewayState;
use crate::error::{GatewayError, INVALID_REQUEST, MEDIA_NOT_FOUND};

use super::require_media_id;

/// POST /media/{id}/presigned-url: 署名付きURL発行。
///
/// ボディは省略可。`{"expiration_seconds": 600}` で設定値以下の有効期限を指定できる。
pub async fn handle_presigned_url(
    State(state): State<Arc<GatewayState>>,
    path: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Result<Json<PresignedUrlResponse>, GatewayError> {
    let media_id = require_media_id(&path)?;
    let request = parse_request_body(&body)?;

    let signed = issue_presigned_url(&state, media_id, request.expiration_seconds.as_ref()).await?;

    Ok(Json(PresignedUrlResponse { url: signed.url }))
}

/// メディアIDに対する署名付きURLを発行する。
pub(crate) async fn issue_presigned_url(
    state: &GatewayState,
    media_id: &str,
    requested_expiration: Option<&serde_json::Value>,
) -> Result<SignedUrl, GatewayError> {
    let expiration = resolve_expiration(requested_expiration, state.config.default_expiry)?;

    let resource_url = resolve_resource_url(state, media_id).await?;
    tracing::debug!(media_id, resource_url = %resource_url, "リソースURLを組み立てました");

    tracing::info!("秘密鍵を取得中...");
    let pem = state
        .secret_store
        .get_secret(&state.config.private_key_secret)
        .await?;

    let signer = CloudFrontSigner::from_pem(&state.config.key_pair_id, &pem)?;
    let signed = signer.generate_presigned_url_now(&resource_url, expiration)?;

    tracing::info!(
        media_id,
        expires_at = signed.expires_at,
        expiration_secs = expiration.get(),
        "署名付きURLを発行しました"
    );
    Ok(signed)
}

/// メタデータストアからリソースURLを解決する。
///
/// レコードが無い、`s3_key` を持たない、ストアに到達できない場合はいずれも `NotFound`。
async fn resolve_resource_url(state: &GatewayState, media_id: &str) -> Result<String, GatewayError> {
    tracing::info!(media_id, "s3_keyを取得中...");
    let record = match state.metadata_store.get_record(media_id).await {
        Ok(record) => record,
        Err(e) => {
            tracing::error!(media_id, error = %e, "メタデータの取得に失敗しました");
            return Err(GatewayError::NotFound(MEDIA_NOT_FOUND.to_string()));
        }
    };

    match record.and_then(|r| r.s3_key).filter(|key| !key.trim().is_empty()) {
        Some(s3_key) => Ok(state.config.resource_url(&s3_key)),
        None => {
            tracing::info!(media_id, "s3_keyが見つかりません");
            Err(GatewayError::NotFound(MEDIA_NOT_FOUND.to_string()))
        }
    }
}

/// リクエストボディを読み取る。空ボディは既定値として扱う。
fn parse_request_body(body: &[u8]) -> Result<PresignedUrlRequest, GatewayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(PresignedUrlRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "リクエストボディのパースに失敗しました");
        GatewayError::BadRequest(INVALID_REQUEST.to_string())
    })
}

/// 要求された有効期限を検証する。
///
/// 整数または数字のみの文字列を受け付け、設定値を上限とする。
/// 省略時・`null` の場合は設定値を使う。
fn resolve_expiration(
    requested: Option<&serde_json::Value>,
    window: ExpirationSeconds,
) -> Result<ExpirationSeconds, CryptoError> {
    let expiration = match requested {
        None | Some(serde_json::Value::Null) => return Ok(window),
        Some(serde_json::Value::Number(n)) => match n.as_i64() {
            Some(secs) => ExpirationSeconds::new(secs)?,
            None => {
                return Err(CryptoError::InvalidExpiration(format!(
                    "整数ではありません: {n}"
                )))
            }
        },
        Some(serde_json::Value::String(s)) => s.parse::<ExpirationSeconds>()?,
        Some(other) => {
            return Err(CryptoError::InvalidExpiration(format!(
                "数値または文字列である必要があります: {other}"
            )))
        }
    };

    if expiration > window {
        return Err(CryptoError::InvalidExpiration(format!(
            "{expiration}秒は上限 {window}秒を超えています"
        )));
    }
    Ok(expiration)
}
