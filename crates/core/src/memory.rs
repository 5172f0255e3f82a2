//! In-memory object store for tests
//!
//! Listings are paginated with a configurable page size so callers can be
//! exercised across page boundaries without a network.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::traits::ObjectStore;
use crate::types::{
    ListOptions, ObjectEntry, ObjectPage, VersionEntry, VersionListOptions, VersionPage,
};

#[derive(Debug, Default)]
struct MemoryBucket {
    name: String,
    objects: Vec<ObjectEntry>,
    versions: Vec<VersionEntry>,
    fail_with: Option<String>,
}

/// Object store backed by vectors
#[derive(Debug)]
pub struct MemoryStore {
    buckets: Vec<MemoryBucket>,
    page_size: usize,
    page_requests: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            buckets: Vec::new(),
            page_size: 1000,
            page_requests: AtomicUsize::new(0),
        }
    }

    /// Entries returned per page; zero is raised to one
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Add a bucket holding `objects` in listing order
    pub fn bucket(mut self, name: impl Into<String>, objects: Vec<ObjectEntry>) -> Self {
        self.buckets.push(MemoryBucket {
            name: name.into(),
            objects,
            ..Default::default()
        });
        self
    }

    /// Attach version history to an already added bucket
    pub fn versions(mut self, name: &str, versions: Vec<VersionEntry>) -> Self {
        if let Some(bucket) = self.buckets.iter_mut().find(|b| b.name == name) {
            bucket.versions = versions;
        }
        self
    }

    /// Make every listing of `name` fail with a network error
    pub fn failing(mut self, name: &str, message: impl Into<String>) -> Self {
        if let Some(bucket) = self.buckets.iter_mut().find(|b| b.name == name) {
            bucket.fail_with = Some(message.into());
        }
        self
    }

    /// Number of page requests served so far
    pub fn page_requests(&self) -> usize {
        self.page_requests.load(Ordering::SeqCst)
    }

    fn find(&self, name: &str) -> Result<&MemoryBucket> {
        let bucket = self
            .buckets
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| Error::BucketNotFound(name.to_string()))?;
        if let Some(message) = &bucket.fail_with {
            return Err(Error::Network(message.clone()));
        }
        Ok(bucket)
    }

    /// Slice `items` into a page starting at the numeric `cursor`
    fn page<T: Clone>(&self, items: &[T], cursor: Option<&str>) -> Result<(Vec<T>, Option<String>)> {
        let start = match cursor {
            Some(c) => c
                .parse::<usize>()
                .map_err(|_| Error::General(format!("Invalid continuation token: {c}")))?,
            None => 0,
        };
        let end = (start + self.page_size).min(items.len());
        let next = (end < items.len()).then(|| end.to_string());
        Ok((items.get(start..end).unwrap_or_default().to_vec(), next))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_buckets(&self) -> Result<Vec<String>> {
        Ok(self.buckets.iter().map(|b| b.name.clone()).collect())
    }

    async fn list_objects(&self, bucket: &str, options: &ListOptions) -> Result<ObjectPage> {
        self.page_requests.fetch_add(1, Ordering::SeqCst);
        let bucket = self.find(bucket)?;
        let matching: Vec<ObjectEntry> = bucket
            .objects
            .iter()
            .filter(|o| options.prefix.as_deref().is_none_or(|p| o.key.starts_with(p)))
            .cloned()
            .collect();
        let (objects, next_token) = self.page(&matching, options.continuation_token.as_deref())?;
        Ok(ObjectPage {
            objects,
            next_token,
        })
    }

    async fn list_object_versions(
        &self,
        bucket: &str,
        options: &VersionListOptions,
    ) -> Result<VersionPage> {
        self.page_requests.fetch_add(1, Ordering::SeqCst);
        let bucket = self.find(bucket)?;
        let matching: Vec<VersionEntry> = bucket
            .versions
            .iter()
            .filter(|v| options.prefix.as_deref().is_none_or(|p| v.key.starts_with(p)))
            .cloned()
            .collect();
        let (page, next_key_marker) = self.page(&matching, options.key_marker.as_deref())?;
        let (mut versions, markers): (Vec<_>, Vec<_>) =
            page.into_iter().partition(|v| !v.is_delete_marker);
        versions.extend(markers);
        Ok(VersionPage {
            versions,
            next_key_marker,
            next_version_id_marker: None,
        })
    }
}
