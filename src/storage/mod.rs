//! File uploads that hand back a time-limited signed URL.
//!
//! Two process classes exist. Provider-origin uploads (files we stage so a
//! vendor can fetch them) get a short-lived URL; user-origin uploads (files
//! we return to users) get a long-lived one. Each class has its own bucket.

mod costs;
mod gcs;

pub use costs::load_provider_costs;
pub use gcs::{GcsBucket, GcsConnector};

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use url::Url;
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::{Error, Result};

/// Who the uploaded file is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessClass {
    /// Staged for a vendor: short-lived URL.
    Provider,
    /// Returned to a user: long-lived URL.
    User,
}

impl fmt::Display for ProcessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Provider => "provider_process",
            Self::User => "users_process",
        })
    }
}

impl FromStr for ProcessClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "provider" | "provider_process" => Ok(Self::Provider),
            "user" | "users" | "users_process" => Ok(Self::User),
            other => Err(Error::Configuration(format!("Unknown process class: {other}"))),
        }
    }
}

/// A bucket that can store objects and sign URLs for them.
#[async_trait::async_trait]
pub trait SignedStore: Send + Sync + fmt::Debug {
    async fn put(&self, key: &str, payload: Bytes) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Bytes>;

    /// A `GET` URL for `key`, valid for `expires_in`.
    async fn signed_url(&self, key: &str, expires_in: Duration) -> Result<Url>;
}

/// Opens buckets by name.
pub trait BucketConnector: Send + Sync + fmt::Debug {
    fn connect(&self, bucket: &str) -> Result<Arc<dyn SignedStore>>;
}

/// Uploads files and mints signed URLs according to their process class.
#[derive(Debug, Clone)]
pub struct SignedUrlUploader {
    connector: Arc<dyn BucketConnector>,
    config: StorageConfig,
}

impl SignedUrlUploader {
    pub fn new(config: StorageConfig, connector: Arc<dyn BucketConnector>) -> Self {
        Self { connector, config }
    }

    /// Uploader backed by Google Cloud Storage.
    pub fn gcs(config: StorageConfig) -> Self {
        Self::new(config, Arc::new(GcsConnector::new()))
    }

    /// Bucket and URL lifetime for a process class.
    pub fn target(&self, class: ProcessClass) -> Result<(&str, Duration)> {
        let (bucket, secs) = match class {
            ProcessClass::Provider => (&self.config.provider_bucket, self.config.short_lived_secs),
            ProcessClass::User => (&self.config.user_bucket, self.config.long_lived_secs),
        };
        if bucket.trim().is_empty() {
            return Err(Error::Configuration(format!(
                "No bucket configured for {class}"
            )));
        }
        Ok((bucket.as_str(), Duration::from_secs(secs)))
    }

    /// Upload a file from disk.
    pub async fn upload_path(&self, path: &Path, name: &str, class: ProcessClass) -> Result<Url> {
        self.target(class)?;
        let bytes = tokio::fs::read(path).await?;
        self.upload_bytes(bytes, name, class).await
    }

    /// Upload in-memory bytes.
    ///
    /// The object key is `{uuid}_{name}` so repeated uploads never collide.
    pub async fn upload_bytes(
        &self,
        bytes: impl Into<Bytes>,
        name: &str,
        class: ProcessClass,
    ) -> Result<Url> {
        let (bucket, expires_in) = self.target(class)?;
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(Error::Configuration(format!("Empty file payload for {name}")));
        }

        let key = object_key(name);
        tracing::info!(
            bucket = bucket,
            key = %key,
            size = bytes.len(),
            class = %class,
            "Uploading file"
        );

        let result: Result<Url> = async {
            let store = self.connector.connect(bucket)?;
            store.put(&key, bytes).await?;
            store.signed_url(&key, expires_in).await
        }
        .await;

        result.map_err(|e| {
            tracing::error!(bucket = bucket, key = %key, error = %e, "Upload failed");
            match e {
                e @ (Error::Configuration(_) | Error::Unexpected(_)) => e,
                other => Error::Unexpected(other.to_string()),
            }
        })
    }
}

fn object_key(name: &str) -> String {
    format!("{}_{name}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_class_from_str() {
        assert_eq!("provider".parse::<ProcessClass>().unwrap(), ProcessClass::Provider);
        assert_eq!("users_process".parse::<ProcessClass>().unwrap(), ProcessClass::User);
        assert!("admin".parse::<ProcessClass>().is_err());
    }

    #[test]
    fn test_object_keys_are_unique() {
        let a = object_key("scan.pdf");
        let b = object_key("scan.pdf");
        assert_ne!(a, b);
        assert!(a.ends_with("_scan.pdf"));
        assert_eq!(a.len(), 36 + 1 + "scan.pdf".len());
    }

    #[test]
    fn test_target_lifetimes() {
        let config = StorageConfig {
            provider_bucket: "staging".to_string(),
            user_bucket: "resources".to_string(),
            ..Default::default()
        };
        let uploader = SignedUrlUploader::gcs(config);
        assert_eq!(
            uploader.target(ProcessClass::Provider).unwrap(),
            ("staging", Duration::from_secs(3600))
        );
        assert_eq!(
            uploader.target(ProcessClass::User).unwrap(),
            ("resources", Duration::from_secs(604_800))
        );
    }
}
