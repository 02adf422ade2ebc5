use crate::error::ObjectStoreError;

/// An item yielded while iterating a bucket by key prefix: the object's
/// filename (the last path segment, not the full key) and its bytes.
pub type PrefixEntry = (String, Vec<u8>);

/// Port onto an object store (§4.6): bucket lifecycle plus prefix iteration
/// over staged blobs. Two backends exist: an in-process `InMemoryObjectStore`
/// for tests and a `FilesystemObjectStore` for local/dev deployments; a
/// MinIO/S3-backed implementation would satisfy the same trait.
pub trait ObjectStore: Send + Sync {
    fn bucket_exists(&self, bucket: &str) -> Result<bool, ObjectStoreError>;

    /// Create `bucket` if it does not already exist. Idempotent.
    fn create_bucket(&self, bucket: &str) -> Result<(), ObjectStoreError>;

    /// Remove `bucket` and everything in it. Returns whether it existed.
    fn remove_bucket_if_exists(&self, bucket: &str) -> Result<bool, ObjectStoreError>;

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), ObjectStoreError>;

    fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError>;

    /// Delete one object. Returns whether it existed.
    fn delete_object(&self, bucket: &str, key: &str) -> Result<bool, ObjectStoreError>;

    /// Lazily iterate every object under `bucket` whose key starts with
    /// `prefix`, yielding `(filename, bytes)` pairs. Each element is read
    /// from the backing store only as the iterator advances.
    fn iter_by_prefix<'a>(
        &'a self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Box<dyn Iterator<Item = Result<crate::port::PrefixEntry, ObjectStoreError>> + 'a>, ObjectStoreError>;
}
