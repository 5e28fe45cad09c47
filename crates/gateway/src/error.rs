//! # Gateway エラー型
//!
//! 全エンドポイントで共通のエラー型。
//! どの失敗経路もここで `{"error": ...}` のJSONレスポンスに変換される。
//! バックエンドの詳細はログにのみ出力し、呼び出し元には返さない。

use axum::http::StatusCode;
use axum::Json;
use reel_crypto::CryptoError;
use reel_types::ErrorResponse;

use crate::secrets::SecretError;
use crate::store::StoreError;

/// メディアが存在しない、または署名対象のパスを持たない場合のメッセージ
pub const MEDIA_NOT_FOUND: &str = "Media not found.";
/// パスパラメータやボディが不正な場合のメッセージ
pub const INVALID_REQUEST: &str = "Invalid request. Please provide a valid request.";

const INVALID_EXPIRATION: &str =
    "Invalid expiration_seconds. Please provide a positive integer within the allowed window.";
const METADATA_UNAVAILABLE: &str = "Unable to retrieve media metadata.";
const PRESIGN_FAILED: &str = "Unable to generate a presigned url.";

/// Gatewayエラー型。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// レコードが存在しない
    #[error("{0}")]
    NotFound(String),
    /// 不正なリクエスト（パスパラメータ欠落、ボディのパース失敗）
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),
    /// メタデータストアの障害
    #[error("メタデータストア操作に失敗: {0}")]
    StoreUnavailable(#[from] StoreError),
    /// シークレットストアの障害
    #[error("シークレット取得に失敗: {0}")]
    SecretUnavailable(#[from] SecretError),
    /// 鍵素材・有効期限の不正、または署名処理の失敗
    #[error("署名付きURLの生成に失敗: {0}")]
    SigningFailure(#[from] CryptoError),
}

impl GatewayError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            GatewayError::NotFound(message) => (StatusCode::NOT_FOUND, message.clone()),
            GatewayError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            GatewayError::StoreUnavailable(_) => {
                (StatusCode::BAD_REQUEST, METADATA_UNAVAILABLE.to_string())
            }
            GatewayError::SecretUnavailable(_) => {
                (StatusCode::BAD_REQUEST, PRESIGN_FAILED.to_string())
            }
            GatewayError::SigningFailure(CryptoError::InvalidExpiration(_)) => {
                (StatusCode::BAD_REQUEST, INVALID_EXPIRATION.to_string())
            }
            GatewayError::SigningFailure(_) => (StatusCode::BAD_REQUEST, PRESIGN_FAILED.to_string()),
        }
    }
}

impl axum::response::IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = self.status_and_message();
        match &self {
            GatewayError::NotFound(_) | GatewayError::BadRequest(_) => {
                tracing::warn!(status = status.as_u16(), error = %self, "リクエストを拒否しました");
            }
            _ => {
                tracing::error!(status = status.as_u16(), error = %self, "リクエスト処理に失敗しました");
            }
        }
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
