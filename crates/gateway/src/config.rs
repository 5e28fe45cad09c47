//! # Gateway設定・共有状態
//!
//! 環境変数からの設定読み込みとGatewayの共有状態の定義。
//! 共有状態は起動時に一度だけ構築し、以降は読み取り専用で全リクエストから参照する。

use reel_crypto::ExpirationSeconds;

use crate::secrets::{SecretRef, SecretStore};
use crate::store::MetadataStore;

/// 署名付きURLの有効期限の既定値（秒）
pub const DEFAULT_EXPIRY_SECS: i64 = 3600;
/// ローカル起動時の待ち受けアドレスの既定値
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// 設定読み込みのエラー型。起動時に致命的エラーとして扱う。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 必須の環境変数が未設定
    #[error("必須の環境変数が未設定です: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    /// 値が不正
    #[error("環境変数 {name} の値が不正です: {reason}")]
    Invalid {
        /// 環境変数名
        name: &'static str,
        /// 不正な理由
        reason: String,
    },
}

/// Gatewayの設定。
///
/// | 環境変数 | 必須 | 用途 |
/// |---|---|---|
/// | `CLOUDFRONT_DOMAIN` | ○ | リソースURLの接頭辞 |
/// | `CF_DEFAULT_URL_EXP` | | 有効期限の既定値かつ上限（秒、既定3600） |
/// | `CF_PUBLIC_KEY_ID` | ○ | `Key-Pair-Id` |
/// | `CF_PRIVATE_KEY_SECRET_ID` | ○ | 秘密鍵PEMを保持するシークレット |
/// | `CF_PRIVATE_KEY_SECRET_VERSION` | | シークレットのバージョン固定 |
/// | `CF_PRIVATE_KEY_SECRET_STAGE` | | シークレットのステージ固定 |
/// | `METADATA_DDB_TABLE_NAME` | ○ | メタデータテーブル名 |
/// | `DEFAULT_AWS_REGION` | | SDKのリージョン解決を上書き |
/// | `BIND_ADDR` | | ローカル起動時の待ち受けアドレス |
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// CloudFrontのドメイン（例: `https://cdn.example.com`）
    pub cdn_domain: String,
    /// 署名付きURLの有効期限の既定値。リクエストで指定できる上限も兼ねる。
    pub default_expiry: ExpirationSeconds,
    /// CloudFrontに登録された公開鍵のID
    pub key_pair_id: String,
    /// 秘密鍵PEMを保持するシークレット
    pub private_key_secret: SecretRef,
    /// メタデータテーブル名
    pub metadata_table: String,
    /// AWSリージョン。Noneの場合はSDKの既定の解決順に従う。
    pub region: Option<String>,
    /// ローカル起動時の待ち受けアドレス
    pub bind_addr: String,
}

impl GatewayConfig {
    /// 環境変数から構築する。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の参照関数から構築する。空文字列は未設定として扱う。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut missing = Vec::new();
        let mut require = |name: &'static str| {
            let value = get(name);
            if value.is_none() {
                missing.push(name);
            }
            value.unwrap_or_default()
        };

        let cdn_domain = require("CLOUDFRONT_DOMAIN");
        let key_pair_id = require("CF_PUBLIC_KEY_ID");
        let secret_id = require("CF_PRIVATE_KEY_SECRET_ID");
        let metadata_table = require("METADATA_DDB_TABLE_NAME");

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let default_expiry = match get("CF_DEFAULT_URL_EXP") {
            Some(raw) => raw.trim().parse::<ExpirationSeconds>().map_err(|e| ConfigError::Invalid {
                name: "CF_DEFAULT_URL_EXP",
                reason: e.to_string(),
            })?,
            None => ExpirationSeconds::new(DEFAULT_EXPIRY_SECS).map_err(|e| ConfigError::Invalid {
                name: "CF_DEFAULT_URL_EXP",
                reason: e.to_string(),
            })?,
        };

        let mut private_key_secret = SecretRef::new(secret_id);
        private_key_secret.version_id = get("CF_PRIVATE_KEY_SECRET_VERSION");
        private_key_secret.version_stage = get("CF_PRIVATE_KEY_SECRET_STAGE");

        Ok(Self {
            cdn_domain: normalize_domain(&cdn_domain),
            default_expiry,
            key_pair_id,
            private_key_secret,
            metadata_table,
            region: get("DEFAULT_AWS_REGION"),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }

    /// オブジェクトパスからCloudFront上のリソースURLを組み立てる。
    pub fn resource_url(&self, s3_key: &str) -> String {
        let key = s3_key.trim_start_matches('/');
        format!("{}/{}", self.cdn_domain, key)
    }
}

/// スキームを補い、末尾のスラッシュを取り除く。
fn normalize_domain(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    if domain.starts_with("https://") || domain.starts_with("http://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    }
}

/// Gatewayの共有状態。
///
/// ストアはトレイトオブジェクトとして注入し、テストではモックに差し替える。
pub struct GatewayState {
    /// 設定
    pub config: GatewayConfig,
    /// メタデータストア（DynamoDB等、トレイトで抽象化）
    pub metadata_store: Box<dyn MetadataStore>,
    /// シークレットストア（Secrets Manager等、トレイトで抽象化）
    pub secret_store: Box<dyn SecretStore>,
}
