//! # シークレットストア
//!
//! CloudFront署名用の秘密鍵を取得するための抽象インターフェース。
//! Secrets Manager実装は `secrets_manager` サブモジュールを参照。

#[cfg(feature = "vendor-aws")]
pub mod secrets_manager;

#[cfg(feature = "vendor-aws")]
pub use secrets_manager::SecretsManagerStore;

/// シークレットストアのエラー型。
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    /// 参照が不正（IDが空）
    #[error("シークレット参照が不正です: {0}")]
    InvalidReference(String),
    /// バックエンドに到達できない、または値が存在しない
    #[error("シークレットを取得できません: {0}")]
    Unavailable(String),
}

/// シークレットの参照。
///
/// バージョンを固定しない場合は `AWSCURRENT` ステージの値が返る。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRef {
    /// シークレット名またはARN
    pub id: String,
    /// 固定するバージョンID
    pub version_id: Option<String>,
    /// 固定するステージラベル
    pub version_stage: Option<String>,
}

impl SecretRef {
    /// 現在のバージョンを指す参照を構築する。
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version_id: None,
            version_stage: None,
        }
    }

    /// IDが空でないことを確認する。
    pub fn validate(&self) -> Result<(), SecretError> {
        if self.id.trim().is_empty() {
            return Err(SecretError::InvalidReference("シークレットIDが空です".to_string()));
        }
        Ok(())
    }
}

/// シークレットストアの抽象インターフェース。
#[async_trait::async_trait]
pub trait SecretStore: Send + Sync {
    /// シークレットの値をバイト列で取得する。
    ///
    /// 値はリクエストごとに取得し、呼び出し側でキャッシュしない。
    async fn get_secret(&self, secret: &SecretRef) -> Result<Vec<u8>, SecretError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_ref_validate() {
        assert!(SecretRef::new("cf-private-key").validate().is_ok());
        assert!(matches!(
            SecretRef::new(" ").validate(),
            Err(SecretError::InvalidReference(_))
        ));
    }
}
