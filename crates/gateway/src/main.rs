//! # Reel Gateway
//!
//! メディアのメタデータ参照と、CloudFront署名付きURLの発行を行う。
//!
//! ## 役割
//! - メタデータテーブル（DynamoDB）の参照
//! - Secrets Managerからの署名用秘密鍵の取得（リクエストごと）
//! - CloudFront署名付きURLの発行（RSA-SHA1、カスタムポリシー）
//!
//! ## API エンドポイント
//! - `GET /medias`: メタデータ一覧
//! - `GET /medias/{id}`: メタデータ単体取得
//! - `POST /media/{id}/presigned-url`: 署名付きURL発行
//!
//! ## 起動モード
//! `AWS_LAMBDA_RUNTIME_API` が設定されていればLambdaランタイム（API Gatewayプロキシ統合）、
//! それ以外は `BIND_ADDR` でHTTPサーバーとして待ち受ける。

mod config;
mod endpoints;
mod error;
mod secrets;
mod store;

#[cfg(test)]
mod test_helpers;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::{GatewayConfig, GatewayState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let on_lambda = std::env::var("AWS_LAMBDA_RUNTIME_API").is_ok();
    init_tracing(on_lambda);

    let config = GatewayConfig::from_env()?;
    tracing::info!(
        cdn_domain = %config.cdn_domain,
        metadata_table = %config.metadata_table,
        default_expiry_secs = config.default_expiry.get(),
        "設定を読み込みました"
    );

    let state = Arc::new(build_state(config).await?);
    let bind_addr = state.config.bind_addr.clone();
    let app = endpoints::router(state);

    if on_lambda {
        tracing::info!("Lambdaランタイムで起動します");
        lambda_http::run(app)
            .await
            .map_err(|e| anyhow::anyhow!("Lambdaランタイムが異常終了しました: {e}"))?;
    } else {
        tracing::info!("Gatewayを {} で起動します", bind_addr);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
        axum::serve(listener, app).await?;
    }

    Ok(())
}

/// ログ出力を初期化する。
///
/// フィルタは `RUST_LOG`、次に `LOG_LEVEL`、どちらも無ければ `info`。
/// Lambda上ではCloudWatch Logsで検索しやすいようJSONで出力する。
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
            EnvFilter::try_new(level.to_lowercase())
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// AWSクライアントを構築し、共有状態を組み立てる。
#[cfg(feature = "vendor-aws")]
async fn build_state(config: GatewayConfig) -> anyhow::Result<GatewayState> {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = &config.region {
        loader = loader.region(aws_config::Region::new(region.clone()));
    }
    let sdk_config = loader.load().await;

    let metadata_store = store::DynamoDbMetadataStore::new(
        aws_sdk_dynamodb::Client::new(&sdk_config),
        config.metadata_table.clone(),
    );
    let secret_store =
        secrets::SecretsManagerStore::new(aws_sdk_secretsmanager::Client::new(&sdk_config));

    Ok(GatewayState {
        config,
        metadata_store: Box::new(metadata_store),
        secret_store: Box::new(secret_store),
    })
}

#[cfg(not(feature = "vendor-aws"))]
async fn build_state(_config: GatewayConfig) -> anyhow::Result<GatewayState> {
    anyhow::bail!("ストア実装が有効になっていません（vendor-aws featureを有効にしてください）")
}

// ---------------------------------------------------------------------------
// テスト
// ---------------------------------------------------------------------------
