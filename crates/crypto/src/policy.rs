//! # CloudFrontアクセスポリシー
//!
//! 署名対象となるポリシー文書の構築と正規化シリアライズ。
//! キーの順序と区切り文字（空白なし）は署名のバイト列に直結するため固定。

use serde::Serialize;

use crate::CryptoError;

/// リソースURLと有効期間を結びつけるアクセスポリシー。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    /// 対象リソースURL（ワイルドカード可）
    pub resource: String,
    /// 失効時刻（UNIX秒）。この時刻以降はアクセス不可。
    pub date_less_than: u64,
    /// アクセス元IPの制限（CIDR表記）
    pub ip_address: Option<String>,
    /// 開始時刻（UNIX秒）。この時刻より前はアクセス不可。
    pub date_greater_than: Option<u64>,
}

#[derive(Serialize)]
struct PolicyDocument<'a> {
    #[serde(rename = "Statement")]
    statement: [Statement<'a>; 1],
}

#[derive(Serialize)]
struct Statement<'a> {
    #[serde(rename = "Resource")]
    resource: &'a str,
    #[serde(rename = "Condition")]
    condition: Condition<'a>,
}

#[derive(Serialize)]
struct Condition<'a> {
    #[serde(rename = "DateLessThan")]
    date_less_than: EpochTime,
    #[serde(rename = "IpAddress", skip_serializing_if = "Option::is_none")]
    ip_address: Option<SourceIp<'a>>,
    #[serde(rename = "DateGreaterThan", skip_serializing_if = "Option::is_none")]
    date_greater_than: Option<EpochTime>,
}

#[derive(Serialize)]
struct EpochTime {
    #[serde(rename = "AWS:EpochTime")]
    epoch_time: u64,
}

#[derive(Serialize)]
struct SourceIp<'a> {
    #[serde(rename = "AWS:SourceIp")]
    source_ip: &'a str,
}

impl Policy {
    /// 失効時刻のみの既定ポリシー（canned policy）。
    pub fn canned(resource: impl Into<String>, expires_at: u64) -> Self {
        Self {
            resource: resource.into(),
            date_less_than: expires_at,
            ip_address: None,
            date_greater_than: None,
        }
    }

    /// 有効期間 `[not_before, expires_at)` を持つカスタムポリシー。
    pub fn custom(resource: impl Into<String>, not_before: u64, expires_at: u64) -> Self {
        Self {
            resource: resource.into(),
            date_less_than: expires_at,
            ip_address: None,
            date_greater_than: Some(not_before),
        }
    }

    /// アクセス元IPの条件を追加する。
    pub fn with_source_ip(mut self, cidr: impl Into<String>) -> Self {
        self.ip_address = Some(cidr.into());
        self
    }

    /// canned policyとして `Expires` パラメータで表現できるか。
    pub fn is_canned(&self) -> bool {
        self.ip_address.is_none() && self.date_greater_than.is_none()
    }

    /// 期間の整合性を検証する。
    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.resource.is_empty() {
            return Err(CryptoError::InvalidResource("リソースURLが空です".to_string()));
        }
        if let Some(start) = self.date_greater_than {
            if start >= self.date_less_than {
                return Err(CryptoError::InvalidExpiration(format!(
                    "開始時刻 {start} が失効時刻 {} 以降です",
                    self.date_less_than
                )));
            }
        }
        Ok(())
    }

    /// 署名対象の正規化JSONを返す。
    pub fn to_json(&self) -> Result<String, CryptoError> {
        let document = PolicyDocument {
            statement: [Statement {
                resource: &self.resource,
                condition: Condition {
                    date_less_than: EpochTime {
                        epoch_time: self.date_less_than,
                    },
                    ip_address: self
                        .ip_address
                        .as_deref()
                        .map(|source_ip| SourceIp { source_ip }),
                    date_greater_than: self
                        .date_greater_than
                        .map(|epoch_time| EpochTime { epoch_time }),
                },
            }],
        };
        serde_json::to_string(&document).map_err(|e| {
            CryptoError::SigningBackendUnavailable(format!("ポリシーのシリアライズに失敗: {e}"))
        })
    }
}
