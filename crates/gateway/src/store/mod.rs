//! # メタデータストア
//!
//! メディアレコードを保持するキーバリューストアの抽象インターフェース。
//! DynamoDB実装は `dynamodb` サブモジュールを参照。

#[cfg(feature = "vendor-aws")]
pub mod dynamodb;

#[cfg(feature = "vendor-aws")]
pub use dynamodb::DynamoDbMetadataStore;

use reel_types::MediaRecord;

/// メタデータストアのエラー型。
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// キーが空
    #[error("キーが不正です: {0}")]
    InvalidKey(String),
    /// バックエンドに到達できない、または応答が不正
    #[error("メタデータストアを利用できません: {0}")]
    Unavailable(String),
}

/// 一覧取得の条件。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// 返却するレコード数の上限。Noneの場合は全件。
    pub limit: Option<u32>,
}

/// メタデータストアの抽象インターフェース。
///
/// 実装は起動時に一度だけ構築され、以降は複数リクエストから並行に参照される。
#[async_trait::async_trait]
pub trait MetadataStore: Send + Sync {
    /// 主キーでレコードを取得する。
    ///
    /// 存在しない場合はエラーではなく `Ok(None)` を返す。
    async fn get_record(&self, id: &str) -> Result<Option<MediaRecord>, StoreError>;

    /// レコードを一覧取得する。
    async fn list_records(&self, filter: &ListFilter) -> Result<Vec<MediaRecord>, StoreError>;
}

/// 主キーが空でないことを確認する。
pub(crate) fn validate_key(id: &str) -> Result<(), StoreError> {
    if id.trim().is_empty() {
        return Err(StoreError::InvalidKey("主キーが空です".to_string()));
    }
    Ok(())
}
