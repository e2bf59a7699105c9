//! Provider cost sheet kept in a bucket.

use serde_json::Value;

use super::BucketConnector;
use crate::config::StorageConfig;
use crate::error::{Error, Result};

/// Read the provider cost sheet and return its `cost_data` section.
pub async fn load_provider_costs(
    connector: &dyn BucketConnector,
    config: &StorageConfig,
) -> Result<Value> {
    if config.cost_bucket.trim().is_empty() {
        return Err(Error::Configuration("No bucket configured for provider costs".to_string()));
    }

    let store = connector.connect(&config.cost_bucket)?;
    let bytes = store.get(&config.cost_object).await?;
    tracing::debug!(
        bucket = %config.cost_bucket,
        object = %config.cost_object,
        size = bytes.len(),
        "Provider costs fetched"
    );

    let mut sheet: Value = serde_json::from_slice(&bytes)?;
    sheet
        .get_mut("cost_data")
        .map(Value::take)
        .ok_or_else(|| {
            Error::Unexpected(format!(
                "{}/{} has no cost_data section",
                config.cost_bucket, config.cost_object
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SignedStore;
    use bytes::Bytes;
    use std::sync::Arc;
    use std::time::Duration;
    use url::Url;

    #[derive(Debug)]
    struct SheetBucket {
        body: &'static str,
    }

    #[async_trait::async_trait]
    impl SignedStore for SheetBucket {
        async fn put(&self, _key: &str, _payload: Bytes) -> Result<()> {
            Ok(())
        }

        async fn get(&self, key: &str) -> Result<Bytes> {
            if key == "providers_cost_master.json" {
                Ok(Bytes::from_static(self.body.as_bytes()))
            } else {
                Err(Error::Unexpected(format!("no such object: {key}")))
            }
        }

        async fn signed_url(&self, _key: &str, _expires_in: Duration) -> Result<Url> {
            Url::parse("https://storage.test/x").map_err(|e| Error::Unexpected(e.to_string()))
        }
    }

    #[derive(Debug)]
    struct SheetConnector {
        body: &'static str,
    }

    impl BucketConnector for SheetConnector {
        fn connect(&self, bucket: &str) -> Result<Arc<dyn SignedStore>> {
            assert_eq!(bucket, "providers-cost");
            Ok(Arc::new(SheetBucket { body: self.body }))
        }
    }

    #[tokio::test]
    async fn test_returns_cost_data_section() {
        let connector = SheetConnector {
            body: r#"{"version": 3, "cost_data": {"klippa": {"ocr": {"price": "0.1"}}}}"#,
        };
        let costs = load_provider_costs(&connector, &StorageConfig::default())
            .await
            .unwrap();
        assert_eq!(costs["klippa"]["ocr"]["price"], "0.1");
        assert!(costs.get("version").is_none());
    }

    #[tokio::test]
    async fn test_sheet_without_cost_data_is_unexpected() {
        let connector = SheetConnector { body: r#"{"version": 3}"# };
        let err = load_provider_costs(&connector, &StorageConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unexpected(msg) if msg.contains("cost_data")));
    }

    #[tokio::test]
    async fn test_invalid_json_is_json_error() {
        let connector = SheetConnector { body: "not json" };
        let err = load_provider_costs(&connector, &StorageConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[tokio::test]
    async fn test_missing_bucket_is_configuration_error() {
        let config = StorageConfig {
            cost_bucket: " ".to_string(),
            ..Default::default()
        };
        let connector = SheetConnector { body: "{}" };
        let err = load_provider_costs(&connector, &config).await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
