//! In-process object store backed by `dashmap`. Used by tests and by
//! `EvaluateJob` integration tests that want to avoid touching disk.

use crate::error::ObjectStoreError;
use crate::port::{ObjectStore, PrefixEntry};
use dashmap::DashMap;

struct Object {
    bytes: Vec<u8>,
    #[allow(dead_code)]
    content_type: String,
}

/// `bucket -> key -> object`. Both levels are concurrent maps so the store
/// can be shared behind an `Arc` across worker tasks without a mutex.
#[derive(Default)]
pub struct InMemoryObjectStore {
    buckets: DashMap<String, DashMap<String, Object>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn bucket_exists(&self, bucket: &str) -> Result<bool, ObjectStoreError> {
        Ok(self.buckets.contains_key(bucket))
    }

    fn create_bucket(&self, bucket: &str) -> Result<(), ObjectStoreError> {
        self.buckets.entry(bucket.to_string()).or_default();
        Ok(())
    }

    fn remove_bucket_if_exists(&self, bucket: &str) -> Result<bool, ObjectStoreError> {
        Ok(self.buckets.remove(bucket).is_some())
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        let objects = self.buckets.entry(bucket.to_string()).or_default();
        objects.insert(
            key.to_string(),
            Object {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        let objects = self.buckets.get(bucket).ok_or_else(|| ObjectStoreError::ObjectNotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })?;
        objects
            .get(key)
            .map(|o| o.bytes.clone())
            .ok_or_else(|| ObjectStoreError::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<bool, ObjectStoreError> {
        match self.buckets.get(bucket) {
            Some(objects) => Ok(objects.remove(key).is_some()),
            None => Ok(false),
        }
    }

    fn iter_by_prefix<'a>(
        &'a self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Box<dyn Iterator<Item = Result<PrefixEntry, ObjectStoreError>> + 'a>, ObjectStoreError> {
        let prefix = prefix.to_string();
        let keys: Vec<String> = match self.buckets.get(bucket) {
            Some(objects) => objects
                .iter()
                .filter(|entry| entry.key().starts_with(&prefix))
                .map(|entry| entry.key().clone())
                .collect(),
            None => Vec::new(),
        };
        let bucket = bucket.to_string();
        Ok(Box::new(keys.into_iter().map(move |key| {
            let bytes = self
                .buckets
                .get(&bucket)
                .and_then(|objects| objects.get(&key).map(|o| o.bytes.clone()))
                .ok_or_else(|| ObjectStoreError::ObjectNotFound {
                    bucket: bucket.clone(),
                    key: key.clone(),
                })?;
            let filename = key.rsplit('/').next().unwrap_or(&key).to_string();
            Ok((filename, bytes))
        })))
    }
}
