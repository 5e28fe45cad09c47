//! # テスト用共通ヘルパー
//!
//! モックのメタデータストア・シークレットストアと、テスト用GatewayStateの構築。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use reel_types::MediaRecord;

use crate::config::{GatewayConfig, GatewayState};
use crate::secrets::{SecretError, SecretRef, SecretStore};
use crate::store::{validate_key, ListFilter, MetadataStore, StoreError};

/// `crates/crypto` のテスト用RSA秘密鍵（PKCS#8）
pub const TEST_KEY_PEM: &str = include_str!("../../crypto/tests/fixtures/test_key_pkcs8.pem");

/// テスト用のモックMetadataStore。
pub struct MockMetadataStore {
    records: Vec<MediaRecord>,
    fail: bool,
}

impl MockMetadataStore {
    /// `abc123`（s3_keyあり）と `no-key`（s3_keyなし）を持つストア
    pub fn with_sample_records() -> Self {
        let mut no_key = MediaRecord::new("no-key", "");
        no_key.s3_key = None;
        Self {
            records: vec![
                MediaRecord::new("abc123", "/dev/test.mp4")
                    .with_attribute("title", serde_json::json!("Test")),
                no_key,
            ],
            fail: false,
        }
    }

    /// 常にバックエンド障害を返すストア
    pub fn failing() -> Self {
        Self {
            records: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait::async_trait]
impl MetadataStore for MockMetadataStore {
    async fn get_record(&self, id: &str) -> Result<Option<MediaRecord>, StoreError> {
        validate_key(id)?;
        if self.fail {
            return Err(StoreError::Unavailable("mock store unavailable".to_string()));
        }
        Ok(self.records.iter().find(|r| r.id == id).cloned())
    }

    async fn list_records(&self, filter: &ListFilter) -> Result<Vec<MediaRecord>, StoreError> {
        if self.fail {
            return Err(StoreError::Unavailable("mock store unavailable".to_string()));
        }
        let limit = filter.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(self.records.iter().take(limit).cloned().collect())
    }
}

/// テスト用のモックSecretStore。呼び出し回数と最後に要求された参照を記録する。
pub struct MockSecretStore {
    value: Option<Vec<u8>>,
    pub calls: Arc<AtomicUsize>,
    pub requested: Arc<Mutex<Option<SecretRef>>>,
}

impl MockSecretStore {
    /// 指定した値を返すストア
    pub fn with_value(value: Vec<u8>) -> Self {
        Self {
            value: Some(value),
            calls: Arc::new(AtomicUsize::new(0)),
            requested: Arc::new(Mutex::new(None)),
        }
    }

    /// テスト用RSA秘密鍵を返すストア
    pub fn with_test_key() -> Self {
        Self::with_value(TEST_KEY_PEM.as_bytes().to_vec())
    }

    /// 常にバックエンド障害を返すストア
    pub fn failing() -> Self {
        Self {
            value: None,
            calls: Arc::new(AtomicUsize::new(0)),
            requested: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait::async_trait]
impl SecretStore for MockSecretStore {
    async fn get_secret(&self, secret: &SecretRef) -> Result<Vec<u8>, SecretError> {
        secret.validate()?;
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.requested.lock().unwrap() = Some(secret.clone());
        self.value
            .clone()
            .ok_or_else(|| SecretError::Unavailable("mock secret unavailable".to_string()))
    }
}

/// テスト用の設定（`https://cdn.example.com`、有効期限3600秒）
pub fn test_config() -> GatewayConfig {
    GatewayConfig::from_lookup(|name| {
        let value = match name {
            "CLOUDFRONT_DOMAIN" => "https://cdn.example.com",
            "CF_PUBLIC_KEY_ID" => "K2JCJMDEHXQW5F",
            "CF_PRIVATE_KEY_SECRET_ID" => "cf-private-key",
            "METADATA_DDB_TABLE_NAME" => "media-metadata",
            "CF_DEFAULT_URL_EXP" => "3600",
            _ => return None,
        };
        Some(value.to_string())
    })
    .unwrap()
}

/// テスト用GatewayStateを構築する（シークレットはテスト用RSA秘密鍵）
pub fn test_state(metadata_store: MockMetadataStore) -> Arc<GatewayState> {
    test_state_with(metadata_store, MockSecretStore::with_test_key())
}

/// ストアを指定してテスト用GatewayStateを構築する
pub fn test_state_with(
    metadata_store: MockMetadataStore,
    secret_store: MockSecretStore,
) -> Arc<GatewayState> {
    Arc::new(GatewayState {
        config: test_config(),
        metadata_store: Box::new(metadata_store),
        secret_store: Box::new(secret_store),
    })
}

/// URLのクエリパラメータを取り出す。
pub fn query_param<'a>(url: &'a str, name: &str) -> Option<&'a str> {
    let (_, query) = url.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}

/// Gatewayのルーターを127.0.0.1の空きポートで起動し、ポート番号を返す。
pub async fn start_gateway(state: Arc<GatewayState>) -> u16 {
    let app = crate::endpoints::router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    port
}
