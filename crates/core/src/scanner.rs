//! Object scanner
//!
//! Turns paginated backend listings into flat, lazy streams of records.
//! Pages are fetched one at a time, only when the consumer has drained the
//! previous one, so memory stays bounded by a single page.

use futures::future;
use futures::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};

use crate::error::{Error, Result};
use crate::traits::ObjectStore;
use crate::types::{
    ListOptions, ObjectEntry, ObjectRecord, SearchMode, VersionEntry, VersionListOptions,
    VersionRecord,
};

/// Stream of matched objects from one bucket
pub type RecordStream<'a> = BoxStream<'a, Result<ObjectRecord>>;

/// Stream of versions and delete markers from one bucket
pub type VersionStream<'a> = BoxStream<'a, Result<VersionRecord>>;

enum PageCursor {
    First,
    Next(String),
    Done,
}

enum VersionCursor {
    First,
    Next {
        key_marker: String,
        version_id_marker: Option<String>,
    },
    Done,
}

fn object_pages<'a, S>(
    store: &'a S,
    bucket: &'a str,
    prefix: Option<&'a str>,
) -> impl Stream<Item = Result<Vec<ObjectEntry>>> + Send + 'a
where
    S: ObjectStore + ?Sized,
{
    stream::try_unfold(PageCursor::First, move |cursor| async move {
        let continuation_token = match cursor {
            PageCursor::First => None,
            PageCursor::Next(token) => Some(token),
            PageCursor::Done => return Ok(None),
        };

        let options = ListOptions {
            prefix: prefix.map(str::to_string),
            continuation_token,
            ..Default::default()
        };
        let page = store.list_objects(bucket, &options).await?;
        tracing::trace!(
            bucket,
            objects = page.objects.len(),
            truncated = page.next_token.is_some(),
            "Fetched object page"
        );

        let next = page.next_token.map_or(PageCursor::Done, PageCursor::Next);
        Ok::<_, Error>(Some((page.objects, next)))
    })
}

fn flatten_pages<'a, T, P>(pages: P) -> impl Stream<Item = Result<T>> + Send + 'a
where
    T: Send + 'a,
    P: Stream<Item = Result<Vec<T>>> + Send + 'a,
{
    pages
        .map_ok(|items| stream::iter(items.into_iter().map(Ok::<_, Error>)))
        .try_flatten()
}

/// Every object in `bucket` whose key contains `term`, in listing order
pub fn scan_contains<'a, S>(store: &'a S, bucket: &'a str, term: &'a str) -> RecordStream<'a>
where
    S: ObjectStore + ?Sized,
{
    flatten_pages(object_pages(store, bucket, None))
        .try_filter(move |entry: &ObjectEntry| future::ready(entry.key.contains(term)))
        .map_ok(move |entry| ObjectRecord::from_entry(bucket, entry))
        .boxed()
}

/// Every object in `bucket` under `prefix`, without further filtering
pub fn scan_prefix<'a, S>(store: &'a S, bucket: &'a str, prefix: &'a str) -> RecordStream<'a>
where
    S: ObjectStore + ?Sized,
{
    let prefix = (!prefix.is_empty()).then_some(prefix);
    flatten_pages(object_pages(store, bucket, prefix))
        .map_ok(move |entry| ObjectRecord::from_entry(bucket, entry))
        .boxed()
}

/// Object stream for `mode`
///
/// Version sweeps produce a different record type; use [`scan_versions`].
pub fn scan_objects<'a, S>(
    store: &'a S,
    bucket: &'a str,
    term: &'a str,
    mode: SearchMode,
) -> RecordStream<'a>
where
    S: ObjectStore + ?Sized,
{
    match mode {
        SearchMode::Prefix => scan_prefix(store, bucket, term),
        SearchMode::Contains | SearchMode::Versions => scan_contains(store, bucket, term),
    }
}

/// All versions and delete markers under `prefix`
///
/// A bucket that no longer exists produces an empty stream so that a
/// multi-bucket sweep carries on. Any other failure is passed through.
pub fn scan_versions<'a, S>(store: &'a S, bucket: &'a str, prefix: &'a str) -> VersionStream<'a>
where
    S: ObjectStore + ?Sized,
{
    let prefix = (!prefix.is_empty()).then(|| prefix.to_string());

    let pages = stream::try_unfold(VersionCursor::First, move |cursor| {
        let prefix = prefix.clone();
        async move {
            let (key_marker, version_id_marker) = match cursor {
                VersionCursor::First => (None, None),
                VersionCursor::Next {
                    key_marker,
                    version_id_marker,
                } => (Some(key_marker), version_id_marker),
                VersionCursor::Done => return Ok(None),
            };

            let options = VersionListOptions {
                prefix,
                key_marker,
                version_id_marker,
                ..Default::default()
            };
            let page = match store.list_object_versions(bucket, &options).await {
                Ok(page) => page,
                Err(Error::BucketNotFound(_)) => {
                    tracing::debug!(bucket, "Bucket no longer exists, skipping versions");
                    return Ok(None);
                }
                Err(e) => return Err(e),
            };
            tracing::trace!(
                bucket,
                versions = page.versions.len(),
                truncated = page.next_key_marker.is_some(),
                "Fetched version page"
            );

            let next = match page.next_key_marker {
                Some(key_marker) => VersionCursor::Next {
                    key_marker,
                    version_id_marker: page.next_version_id_marker,
                },
                None => VersionCursor::Done,
            };
            Ok::<_, Error>(Some((page.versions, next)))
        }
    });

    flatten_pages(pages)
        .map_ok(move |entry: VersionEntry| VersionRecord::from_entry(bucket, entry))
        .boxed()
}
