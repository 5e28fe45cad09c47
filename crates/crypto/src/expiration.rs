//! # 有効期限（秒）
//!
//! 署名付きURLの有効期間。正の整数のみを受け付ける。

use std::fmt;
use std::str::FromStr;

use crate::CryptoError;

/// 署名付きURLの有効期間（秒）。常に1以上。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpirationSeconds(u64);

impl ExpirationSeconds {
    /// 整数から構築する。0以下は `InvalidExpiration`。
    pub fn new(secs: i64) -> Result<Self, CryptoError> {
        if secs <= 0 {
            return Err(CryptoError::InvalidExpiration(format!(
                "正の整数である必要があります: {secs}"
            )));
        }
        Ok(Self(secs as u64))
    }

    /// 秒数を返す。
    pub fn get(self) -> u64 {
        self.0
    }

    /// `now` から数えた失効時刻を返す。
    pub fn expires_at(self, now: u64) -> Result<u64, CryptoError> {
        now.checked_add(self.0).ok_or_else(|| {
            CryptoError::InvalidExpiration(format!("失効時刻がオーバーフローします: {}", self.0))
        })
    }
}

impl FromStr for ExpirationSeconds {
    type Err = CryptoError;

    /// ASCII数字のみで構成された文字列を受け付ける（符号・空白・小数は不可）。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CryptoError::InvalidExpiration(format!(
                "整数として解釈できません: {s:?}"
            )));
        }
        let secs: i64 = s
            .parse()
            .map_err(|_| CryptoError::InvalidExpiration(format!("範囲外の値です: {s}")))?;
        Self::new(secs)
    }
}

impl fmt::Display for ExpirationSeconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
