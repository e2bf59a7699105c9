use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use provider_bridge::config::StorageConfig;
use provider_bridge::storage::{BucketConnector, ProcessClass, SignedStore, SignedUrlUploader};
use provider_bridge::{Error, Result};
use url::Url;

#[derive(Debug)]
struct MemoryBucket {
    name: String,
    fail_puts: bool,
    objects: Mutex<Vec<(String, Bytes)>>,
}

#[async_trait]
impl SignedStore for MemoryBucket {
    async fn put(&self, key: &str, payload: Bytes) -> Result<()> {
        if self.fail_puts {
            return Err(Error::Io(std::io::Error::other("disk full")));
        }
        self.objects.lock().unwrap().push((key.to_string(), payload));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, payload)| payload.clone())
            .ok_or_else(|| Error::Unexpected(format!("no such object: {key}")))
    }

    async fn signed_url(&self, key: &str, expires_in: Duration) -> Result<Url> {
        Url::parse(&format!(
            "https://storage.test/{}/{key}?expires={}",
            self.name,
            expires_in.as_secs()
        ))
        .map_err(|e| Error::Unexpected(e.to_string()))
    }
}

#[derive(Debug, Default)]
struct CountingConnector {
    connects: AtomicUsize,
    fail_puts: bool,
    buckets: Mutex<Vec<Arc<MemoryBucket>>>,
}

impl BucketConnector for CountingConnector {
    fn connect(&self, bucket: &str) -> Result<Arc<dyn SignedStore>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let store = Arc::new(MemoryBucket {
            name: bucket.to_string(),
            fail_puts: self.fail_puts,
            objects: Mutex::default(),
        });
        self.buckets.lock().unwrap().push(Arc::clone(&store));
        Ok(store as Arc<dyn SignedStore>)
    }
}

fn storage() -> StorageConfig {
    StorageConfig {
        provider_bucket: "staging".to_string(),
        user_bucket: "resources".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_provider_upload_is_short_lived() {
    let connector = Arc::new(CountingConnector::default());
    let uploader = SignedUrlUploader::new(
        storage(),
        Arc::clone(&connector) as Arc<dyn BucketConnector>,
    );

    let url = uploader
        .upload_bytes(b"hello".to_vec(), "scan.pdf", ProcessClass::Provider)
        .await
        .unwrap();

    assert!(url.path().starts_with("/staging/"));
    assert!(url.path().ends_with("_scan.pdf"));
    assert_eq!(url.query(), Some("expires=3600"));

    let buckets = connector.buckets.lock().unwrap();
    let objects = buckets[0].objects.lock().unwrap();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].1, Bytes::from_static(b"hello"));
}

#[tokio::test]
async fn test_user_upload_is_long_lived() {
    let connector = Arc::new(CountingConnector::default());
    let uploader = SignedUrlUploader::new(storage(), connector);

    let url = uploader
        .upload_bytes(b"report".to_vec(), "report.csv", ProcessClass::User)
        .await
        .unwrap();

    assert!(url.path().starts_with("/resources/"));
    assert_eq!(url.query(), Some("expires=604800"));
}

#[tokio::test]
async fn test_same_name_gets_distinct_keys() {
    let uploader = SignedUrlUploader::new(storage(), Arc::new(CountingConnector::default()));
    let a = uploader
        .upload_bytes(b"1".to_vec(), "a.txt", ProcessClass::Provider)
        .await
        .unwrap();
    let b = uploader
        .upload_bytes(b"1".to_vec(), "a.txt", ProcessClass::Provider)
        .await
        .unwrap();
    assert_ne!(a, b);
}

#[tokio::test]
async fn test_empty_bucket_is_rejected_without_connecting() {
    let connector = Arc::new(CountingConnector::default());
    let uploader = SignedUrlUploader::new(
        StorageConfig::default(),
        Arc::clone(&connector) as Arc<dyn BucketConnector>,
    );

    let err = uploader
        .upload_bytes(b"data".to_vec(), "a.txt", ProcessClass::User)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Configuration(_)));
    assert_eq!(connector.connects.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_payload_is_rejected_without_connecting() {
    let connector = Arc::new(CountingConnector::default());
    let uploader = SignedUrlUploader::new(
        storage(),
        Arc::clone(&connector) as Arc<dyn BucketConnector>,
    );

    let err = uploader
        .upload_bytes(Vec::new(), "empty.txt", ProcessClass::Provider)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Configuration(_)));
    assert_eq!(connector.connects.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_store_failure_is_unexpected() {
    let connector = Arc::new(CountingConnector {
        fail_puts: true,
        ..Default::default()
    });
    let uploader = SignedUrlUploader::new(storage(), connector);

    let err = uploader
        .upload_bytes(b"data".to_vec(), "a.txt", ProcessClass::Provider)
        .await
        .unwrap_err();

    match err {
        Error::Unexpected(msg) => assert!(msg.contains("disk full")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_upload_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"on disk").unwrap();

    let connector = Arc::new(CountingConnector::default());
    let uploader = SignedUrlUploader::new(
        storage(),
        Arc::clone(&connector) as Arc<dyn BucketConnector>,
    );
    let url = uploader
        .upload_path(file.path(), "disk.bin", ProcessClass::Provider)
        .await
        .unwrap();

    assert!(url.path().ends_with("_disk.bin"));
    let buckets = connector.buckets.lock().unwrap();
    assert_eq!(
        buckets[0].objects.lock().unwrap()[0].1,
        Bytes::from_static(b"on disk")
    );
}

#[tokio::test]
async fn test_uploaded_object_reads_back() {
    let connector = Arc::new(CountingConnector::default());
    let uploader = SignedUrlUploader::new(
        storage(),
        Arc::clone(&connector) as Arc<dyn BucketConnector>,
    );
    let url = uploader
        .upload_bytes(b"payload".to_vec(), "x.bin", ProcessClass::Provider)
        .await
        .unwrap();

    let key = url.path().trim_start_matches("/staging/").to_string();
    let bucket = Arc::clone(&connector.buckets.lock().unwrap()[0]);
    assert_eq!(bucket.get(&key).await.unwrap(), Bytes::from_static(b"payload"));
    assert!(bucket.get("other").await.is_err());
}

#[tokio::test]
async fn test_missing_bucket_checked_before_reading_file() {
    let connector = Arc::new(CountingConnector::default());
    let uploader = SignedUrlUploader::new(StorageConfig::default(), connector);

    let err = uploader
        .upload_path(
            std::path::Path::new("/no/such/file"),
            "x",
            ProcessClass::Provider,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}
