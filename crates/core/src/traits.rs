//! The storage backend seam
//!
//! The scanner only talks to this trait, so it can run against S3, an
//! S3-compatible service, or an in-memory store in tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ListOptions, ObjectPage, VersionListOptions, VersionPage};

/// Read-only listing operations against object storage
///
/// Implementations own transport concerns such as retries and credentials.
/// Page-level methods return exactly one page; following the continuation
/// is left to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Names of all accessible buckets, in backend order
    async fn list_buckets(&self) -> Result<Vec<String>>;

    /// Fetch one page of objects
    async fn list_objects(&self, bucket: &str, options: &ListOptions) -> Result<ObjectPage>;

    /// Fetch one page of object versions and delete markers
    ///
    /// A missing bucket must be reported as [`crate::Error::BucketNotFound`].
    async fn list_object_versions(
        &self,
        bucket: &str,
        options: &VersionListOptions,
    ) -> Result<VersionPage>;
}
