//! # DynamoDB メタデータストア実装
//!
//! パーティションキー `id`（文字列）を持つテーブルからメディアレコードを読み取る。

use std::collections::HashMap;

use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use base64::Engine;
use reel_types::MediaRecord;

use super::{validate_key, ListFilter, MetadataStore, StoreError};

/// DynamoDBによるメタデータストア実装。
pub struct DynamoDbMetadataStore {
    /// DynamoDBクライアント
    client: aws_sdk_dynamodb::Client,
    /// テーブル名
    table_name: String,
}

impl DynamoDbMetadataStore {
    /// クライアントとテーブル名から構築する。
    pub fn new(client: aws_sdk_dynamodb::Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[async_trait::async_trait]
impl MetadataStore for DynamoDbMetadataStore {
    async fn get_record(&self, id: &str) -> Result<Option<MediaRecord>, StoreError> {
        validate_key(id)?;

        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    table = %self.table_name,
                    media_id = %id,
                    error = %DisplayErrorContext(&e),
                    "GetItemに失敗"
                );
                StoreError::Unavailable(format!("GetItem失敗: {e}"))
            })?;

        Ok(output.item().and_then(item_to_record))
    }

    async fn list_records(&self, filter: &ListFilter) -> Result<Vec<MediaRecord>, StoreError> {
        let limit = filter.limit.map(|l| l as usize);
        if limit == Some(0) {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;
        let mut pages = 0usize;

        loop {
            let mut request = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(start_key.take());
            if let Some(limit) = limit {
                let remaining = limit.saturating_sub(records.len());
                request = request.limit(i32::try_from(remaining).unwrap_or(i32::MAX));
            }

            let output = request.send().await.map_err(|e| {
                tracing::error!(
                    table = %self.table_name,
                    error = %DisplayErrorContext(&e),
                    "Scanに失敗"
                );
                StoreError::Unavailable(format!("Scan失敗: {e}"))
            })?;
            pages += 1;

            records.extend(output.items().iter().filter_map(item_to_record));

            if let Some(limit) = limit {
                if records.len() >= limit {
                    records.truncate(limit);
                    break;
                }
            }

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        tracing::debug!(table = %self.table_name, pages, count = records.len(), "Scan完了");
        Ok(records)
    }
}

/// DynamoDBのアイテムをメディアレコードに変換する。
///
/// 文字列の `id` を持たないアイテムは読み飛ばす。
fn item_to_record(item: &HashMap<String, AttributeValue>) -> Option<MediaRecord> {
    let id = match item.get("id") {
        Some(AttributeValue::S(id)) => id.clone(),
        _ => {
            tracing::warn!("文字列のidを持たないアイテムを読み飛ばします");
            return None;
        }
    };

    let s3_key = match item.get("s3_key") {
        Some(AttributeValue::S(key)) => Some(key.clone()),
        _ => None,
    };

    let attributes = item
        .iter()
        .filter(|(name, _)| name.as_str() != "id" && name.as_str() != "s3_key")
        .map(|(name, value)| (name.clone(), attribute_to_json(value)))
        .collect();

    Some(MediaRecord {
        id,
        s3_key,
        attributes,
    })
}

/// DynamoDBの属性値をJSON値に変換する。
fn attribute_to_json(value: &AttributeValue) -> serde_json::Value {
    use serde_json::Value;

    match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => number_to_json(n),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(list) => Value::Array(list.iter().map(attribute_to_json).collect()),
        AttributeValue::M(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), attribute_to_json(v)))
                .collect(),
        ),
        AttributeValue::Ss(set) => Value::Array(set.iter().cloned().map(Value::String).collect()),
        AttributeValue::Ns(set) => Value::Array(set.iter().map(|n| number_to_json(n)).collect()),
        AttributeValue::B(blob) => Value::String(b64().encode(blob.as_ref())),
        AttributeValue::Bs(set) => Value::Array(
            set.iter()
                .map(|blob| Value::String(b64().encode(blob.as_ref())))
                .collect(),
        ),
        _ => Value::Null,
    }
}

/// DynamoDBの数値（文字列表現）をJSONの数値に変換する。表現できなければ文字列のまま返す。
fn number_to_json(n: &str) -> serde_json::Value {
    if let Ok(i) = n.parse::<i64>() {
        return serde_json::Value::from(i);
    }
    n.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(serde_json::Value::Number)
        .unwrap_or_else(|| serde_json::Value::String(n.to_string()))
}

/// Base64エンジン（Standard）
fn b64() -> base64::engine::general_purpose::GeneralPurpose {
    base64::engine::general_purpose::STANDARD
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::primitives::Blob;

    use super::*;

    fn s(v: &str) -> AttributeValue {
        AttributeValue::S(v.to_string())
    }

    #[test]
    fn test_item_to_record() {
        let item = HashMap::from([
            ("id".to_string(), s("abc123")),
            ("s3_key".to_string(), s("/dev/test.mp4")),
            ("title".to_string(), s("Test")),
            ("duration".to_string(), AttributeValue::N("12".to_string())),
        ]);

        let record = item_to_record(&item).unwrap();
        assert_eq!(record.id, "abc123");
        assert_eq!(record.s3_key.as_deref(), Some("/dev/test.mp4"));
        assert_eq!(record.attributes.len(), 2);
        assert_eq!(record.attributes["title"], serde_json::json!("Test"));
        assert_eq!(record.attributes["duration"], serde_json::json!(12));
    }

    #[test]
    fn test_item_without_string_id_is_skipped() {
        let item = HashMap::from([("id".to_string(), AttributeValue::N("1".to_string()))]);
        assert!(item_to_record(&item).is_none());
        assert!(item_to_record(&HashMap::new()).is_none());
    }

    #[test]
    fn test_item_with_non_string_s3_key() {
        let item = HashMap::from([
            ("id".to_string(), s("abc123")),
            ("s3_key".to_string(), AttributeValue::Bool(true)),
        ]);
        let record = item_to_record(&item).unwrap();
        assert_eq!(record.s3_key, None);
        assert!(record.attributes.is_empty());
    }

    #[test]
    fn test_attribute_to_json_nested() {
        let value = AttributeValue::M(HashMap::from([
            (
                "tags".to_string(),
                AttributeValue::Ss(vec!["a".to_string(), "b".to_string()]),
            ),
            (
                "sizes".to_string(),
                AttributeValue::L(vec![
                    AttributeValue::N("1.5".to_string()),
                    AttributeValue::Null(true),
                ]),
            ),
            ("raw".to_string(), AttributeValue::B(Blob::new(vec![0xfb, 0xff]))),
        ]));

        assert_eq!(
            attribute_to_json(&value),
            serde_json::json!({"tags": ["a", "b"], "sizes": [1.5, null], "raw": "+/8="})
        );
    }

    #[test]
    fn test_number_to_json_fallback() {
        assert_eq!(number_to_json("-7"), serde_json::json!(-7));
        assert_eq!(number_to_json("1e400"), serde_json::json!("1e400"));
    }
}
