//! Google Cloud Storage backend.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use object_store::gcp::{GoogleCloudStorage, GoogleCloudStorageBuilder};
use object_store::path::Path as StorePath;
use object_store::signer::Signer;
use object_store::{ObjectStore, PutPayload};
use url::Url;

use super::{BucketConnector, SignedStore};
use crate::error::{Error, Result};

/// Opens GCS buckets with credentials from the environment
/// (`GOOGLE_SERVICE_ACCOUNT`, `GOOGLE_APPLICATION_CREDENTIALS`, ...).
#[derive(Debug, Default)]
pub struct GcsConnector;

impl GcsConnector {
    pub fn new() -> Self {
        Self
    }
}

impl BucketConnector for GcsConnector {
    fn connect(&self, bucket: &str) -> Result<Arc<dyn SignedStore>> {
        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| Error::Configuration(format!("cannot open bucket {bucket}: {e}")))?;
        Ok(Arc::new(GcsBucket { inner: store }))
    }
}

/// One GCS bucket. Signed URLs use V4 signatures.
#[derive(Debug)]
pub struct GcsBucket {
    inner: GoogleCloudStorage,
}

#[async_trait::async_trait]
impl SignedStore for GcsBucket {
    async fn put(&self, key: &str, payload: Bytes) -> Result<()> {
        self.inner
            .put(&StorePath::from(key), PutPayload::from(payload))
            .await
            .map_err(|e| Error::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let result = self
            .inner
            .get(&StorePath::from(key))
            .await
            .map_err(|e| Error::Unexpected(e.to_string()))?;
        result.bytes().await.map_err(|e| Error::Unexpected(e.to_string()))
    }

    async fn signed_url(&self, key: &str, expires_in: Duration) -> Result<Url> {
        self.inner
            .signed_url(reqwest::Method::GET, &StorePath::from(key), expires_in)
            .await
            .map_err(|e| Error::Unexpected(e.to_string()))
    }
}
