//! # CloudFront署名付きURLの生成
//!
//! ポリシーをRSA-SHA1（PKCS#1 v1.5）で署名し、
//! `Policy`/`Expires`、`Signature`、`Key-Pair-Id` をクエリに付与する。

use std::fmt;

use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use sha1::Sha1;

use crate::{cloudfront_b64_encode, parse_rsa_private_key, unix_now};
use crate::{CryptoError, ExpirationSeconds, Policy};

/// 署名付きURLの発行結果。永続化しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    /// 署名パラメータ付きURL
    pub url: String,
    /// 失効時刻（UNIX秒）
    pub expires_at: u64,
    /// 署名したポリシーJSON
    pub policy: String,
}

/// CloudFront用のURL署名器。
///
/// 秘密鍵はリクエストごとにSecrets Managerから取得して構築し、
/// リクエストをまたいで保持しない。
pub struct CloudFrontSigner {
    /// CloudFrontに登録された公開鍵のID
    key_pair_id: String,
    /// 署名鍵
    signing_key: SigningKey<Sha1>,
}

impl fmt::Debug for CloudFrontSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudFrontSigner")
            .field("key_pair_id", &self.key_pair_id)
            .finish_non_exhaustive()
    }
}

impl CloudFrontSigner {
    /// キーペアIDとPEM形式の秘密鍵から署名器を構築する。
    pub fn from_pem(key_pair_id: &str, pem: &[u8]) -> Result<Self, CryptoError> {
        if key_pair_id.trim().is_empty() {
            return Err(CryptoError::InvalidKeyMaterial("キーペアIDが空です".to_string()));
        }
        let private_key = parse_rsa_private_key(pem)?;
        Ok(Self {
            key_pair_id: key_pair_id.to_string(),
            signing_key: SigningKey::<Sha1>::new(private_key),
        })
    }

    /// キーペアIDを返す。
    pub fn key_pair_id(&self) -> &str {
        &self.key_pair_id
    }

    /// メッセージをRSA-SHA1（PKCS#1 v1.5）で署名する。
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.signing_key
            .try_sign(message)
            .map(|signature| signature.to_vec())
            .map_err(|e| CryptoError::SigningBackendUnavailable(format!("RSA署名に失敗: {e}")))
    }

    /// 任意のポリシーでURLに署名する。
    ///
    /// canned policyは `Expires`、それ以外は `Policy` パラメータで送る。
    pub fn sign_with_policy(&self, resource_url: &str, policy: &Policy) -> Result<SignedUrl, CryptoError> {
        if resource_url.is_empty() {
            return Err(CryptoError::InvalidResource("リソースURLが空です".to_string()));
        }
        policy.validate()?;

        let policy_json = policy.to_json()?;
        let signature = cloudfront_b64_encode(&self.sign(policy_json.as_bytes())?);

        let separator = if resource_url.contains('?') { '&' } else { '?' };
        let policy_param = if policy.is_canned() {
            format!("Expires={}", policy.date_less_than)
        } else {
            format!("Policy={}", cloudfront_b64_encode(policy_json.as_bytes()))
        };

        Ok(SignedUrl {
            url: format!(
                "{resource_url}{separator}{policy_param}&Signature={signature}&Key-Pair-Id={}",
                self.key_pair_id
            ),
            expires_at: policy.date_less_than,
            policy: policy_json,
        })
    }

    /// 有効期間 `[now, now + expiration)` のカスタムポリシーで署名付きURLを生成する。
    ///
    /// 同じ入力（`now` を含む）に対して常に同じURLを返す。
    pub fn generate_presigned_url(
        &self,
        resource_url: &str,
        expiration: ExpirationSeconds,
        now: u64,
    ) -> Result<SignedUrl, CryptoError> {
        let expires_at = expiration.expires_at(now)?;
        tracing::debug!(
            key_pair_id = %self.key_pair_id,
            expires_at,
            expiration_secs = expiration.get(),
            "署名付きURLを生成"
        );
        self.sign_with_policy(resource_url, &Policy::custom(resource_url, now, expires_at))
    }

    /// 現在時刻を起点に署名付きURLを生成する。
    pub fn generate_presigned_url_now(
        &self,
        resource_url: &str,
        expiration: ExpirationSeconds,
    ) -> Result<SignedUrl, CryptoError> {
        self.generate_presigned_url(resource_url, expiration, unix_now()?)
    }
}
