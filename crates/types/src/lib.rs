//! # Reel 共有型定義
//!
//! メタデータテーブルのレコードと、Gatewayの各エンドポイントで
//! やり取りするリクエスト/レスポンスをRust構造体として提供する。
//!
//! ## エンコーディング規則
//! - JSON: すべてのHTTPボディ（`Content-Type: application/json`）
//! - UNIXタイムスタンプ（秒）: 署名付きURLの有効期限

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// メタデータレコード
// ---------------------------------------------------------------------------

/// メタデータテーブル上のメディアレコード。
///
/// レコードはこのシステムの外で作成され、Gatewayからは読み取り専用。
/// `id` と `s3_key` 以外の属性は `attributes` にそのまま保持し、
/// シリアライズ時はトップレベルへ展開する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    /// メディア識別子（パーティションキー）
    pub id: String,
    /// オリジン上のオブジェクトパス（例: `/dev/test.mp4`）。
    /// 欠落しているレコードは署名付きURLを発行できない。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_key: Option<String>,
    /// その他の属性
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl MediaRecord {
    /// `id` と `s3_key` のみを持つレコードを構築する。
    pub fn new(id: impl Into<String>, s3_key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            s3_key: Some(s3_key.into()),
            attributes: serde_json::Map::new(),
        }
    }

    /// 属性を追加する。
    pub fn with_attribute(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }
}

// ---------------------------------------------------------------------------
// GET /medias
// ---------------------------------------------------------------------------

/// GET /medias のクエリパラメータ。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListMediasQuery {
    /// 返却するレコード数の上限
    #[serde(default)]
    pub limit: Option<u32>,
}

/// GET /medias レスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaListResponse {
    /// 取得したレコード
    pub items: Vec<MediaRecord>,
    /// `items` の件数
    pub count: usize,
}

impl From<Vec<MediaRecord>> for MediaListResponse {
    fn from(items: Vec<MediaRecord>) -> Self {
        let count = items.len();
        Self { items, count }
    }
}

// ---------------------------------------------------------------------------
// POST /media/{id}/presigned-url
// ---------------------------------------------------------------------------

/// POST /media/{id}/presigned-url リクエストボディ（省略可）。
///
/// `expiration_seconds` は整数または数字のみの文字列を受け付ける。
/// 型の検証はGateway側で行うため、ここでは生のJSON値のまま保持する。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresignedUrlRequest {
    /// 有効期限（秒）。省略時は設定値を使用する。
    #[serde(default)]
    pub expiration_seconds: Option<serde_json::Value>,
}

/// POST /media/{id}/presigned-url レスポンス。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresignedUrlResponse {
    /// CloudFront署名付きURL
    pub url: String,
}

// ---------------------------------------------------------------------------
// エラーレスポンス
// ---------------------------------------------------------------------------

/// 全エンドポイント共通のエラーボディ。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 呼び出し元に返すメッセージ（バックエンドの詳細は含めない）
    pub error: String,
}
