//! Filesystem-backed object store. Buckets are directories under a root;
//! objects are files keyed by their path relative to the bucket directory.
//! Content type is accepted but not persisted — the local filesystem has no
//! metadata slot for it, unlike a real object store.

use crate::error::ObjectStoreError;
use crate::port::{ObjectStore, PrefixEntry};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub struct FilesystemObjectStore {
    root: PathBuf,
}

impl FilesystemObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn bucket_path(&self, bucket: &str) -> PathBuf {
        self.root.join(bucket)
    }

    fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.bucket_path(bucket).join(key)
    }

    fn connection_error(err: std::io::Error) -> ObjectStoreError {
        ObjectStoreError::BucketConnection(err.to_string())
    }
}

impl ObjectStore for FilesystemObjectStore {
    fn bucket_exists(&self, bucket: &str) -> Result<bool, ObjectStoreError> {
        Ok(self.bucket_path(bucket).is_dir())
    }

    fn create_bucket(&self, bucket: &str) -> Result<(), ObjectStoreError> {
        fs::create_dir_all(self.bucket_path(bucket)).map_err(Self::connection_error)
    }

    fn remove_bucket_if_exists(&self, bucket: &str) -> Result<bool, ObjectStoreError> {
        let path = self.bucket_path(bucket);
        if !path.is_dir() {
            return Ok(false);
        }
        fs::remove_dir_all(&path).map_err(Self::connection_error)?;
        Ok(true)
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        let path = self.object_path(bucket, key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ObjectStoreError::BucketOperation(e.to_string()))?;
        }
        fs::write(&path, bytes).map_err(|e| ObjectStoreError::BucketOperation(e.to_string()))
    }

    fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        let path = self.object_path(bucket, key);
        fs::read(&path).map_err(|_| ObjectStoreError::ObjectNotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<bool, ObjectStoreError> {
        let path = self.object_path(bucket, key);
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|e| ObjectStoreError::BucketOperation(e.to_string()))?;
        Ok(true)
    }

    fn iter_by_prefix<'a>(
        &'a self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Box<dyn Iterator<Item = Result<PrefixEntry, ObjectStoreError>> + 'a>, ObjectStoreError> {
        let walk_root = self.bucket_path(bucket).join(prefix);
        if !walk_root.exists() {
            return Ok(Box::new(std::iter::empty()));
        }

        let iter = WalkDir::new(walk_root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(move |entry| read_entry(entry.path()));

        Ok(Box::new(iter))
    }
}

fn read_entry(path: &Path) -> Result<PrefixEntry, ObjectStoreError> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let bytes = fs::read(path).map_err(|e| ObjectStoreError::BucketOperation(e.to_string()))?;
    Ok((filename, bytes))
}
