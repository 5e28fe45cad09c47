//! # Secrets Manager シークレットストア実装

use aws_sdk_secretsmanager::error::DisplayErrorContext;

use super::{SecretError, SecretRef, SecretStore};

/// AWS Secrets Managerによるシークレットストア実装。
pub struct SecretsManagerStore {
    /// Secrets Managerクライアント
    client: aws_sdk_secretsmanager::Client,
}

impl SecretsManagerStore {
    /// クライアントから構築する。
    pub fn new(client: aws_sdk_secretsmanager::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl SecretStore for SecretsManagerStore {
    async fn get_secret(&self, secret: &SecretRef) -> Result<Vec<u8>, SecretError> {
        secret.validate()?;

        let output = self
            .client
            .get_secret_value()
            .secret_id(&secret.id)
            .set_version_id(secret.version_id.clone())
            .set_version_stage(secret.version_stage.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    secret_id = %secret.id,
                    error = %DisplayErrorContext(&e),
                    "GetSecretValueに失敗"
                );
                SecretError::Unavailable(format!("GetSecretValue失敗: {e}"))
            })?;

        if let Some(value) = output.secret_string() {
            tracing::info!(secret_id = %secret.id, "シークレット文字列を取得しました");
            return Ok(value.as_bytes().to_vec());
        }
        if let Some(blob) = output.secret_binary() {
            tracing::info!(secret_id = %secret.id, "シークレットバイナリを取得しました");
            return Ok(blob.as_ref().to_vec());
        }

        Err(SecretError::Unavailable(format!(
            "シークレット {} に値がありません",
            secret.id
        )))
    }
}
