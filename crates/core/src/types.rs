//! Data model shared by the scanner, renderers and storage backends

use std::path::{Path, PathBuf};

use jiff::Timestamp;
use jiff::tz::TimeZone;

use crate::error::{Error, Result};

/// Storage class reported when a listing omits it
pub const DEFAULT_STORAGE_CLASS: &str = "STANDARD";

/// One object as returned by a backend listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<Timestamp>,
    pub storage_class: Option<String>,
}

impl ObjectEntry {
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified: None,
            storage_class: None,
        }
    }

    pub fn modified(mut self, ts: Timestamp) -> Self {
        self.last_modified = Some(ts);
        self
    }

    pub fn storage_class(mut self, class: impl Into<String>) -> Self {
        self.storage_class = Some(class.into());
        self
    }
}

/// Options for a single list-objects request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Server-side key prefix
    pub prefix: Option<String>,
    pub continuation_token: Option<String>,
    pub max_keys: Option<i32>,
}

/// One page of a paginated object listing
#[derive(Debug, Clone, Default)]
pub struct ObjectPage {
    pub objects: Vec<ObjectEntry>,
    /// Present only when more pages follow
    pub next_token: Option<String>,
}

/// One historical version or delete marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    pub key: String,
    pub version_id: String,
    pub is_latest: bool,
    pub is_delete_marker: bool,
    /// Absent for delete markers
    pub size: Option<u64>,
    pub last_modified: Option<Timestamp>,
}

impl VersionEntry {
    pub fn version(key: impl Into<String>, version_id: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            version_id: version_id.into(),
            is_latest: false,
            is_delete_marker: false,
            size: Some(size),
            last_modified: None,
        }
    }

    pub fn delete_marker(key: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version_id: version_id.into(),
            is_latest: false,
            is_delete_marker: true,
            size: None,
            last_modified: None,
        }
    }

    pub fn latest(mut self) -> Self {
        self.is_latest = true;
        self
    }

    pub fn modified(mut self, ts: Timestamp) -> Self {
        self.last_modified = Some(ts);
        self
    }
}

/// Options for a single list-object-versions request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionListOptions {
    pub prefix: Option<String>,
    pub key_marker: Option<String>,
    pub version_id_marker: Option<String>,
    pub max_keys: Option<i32>,
}

/// One page of a paginated version listing
///
/// Versions come before delete markers within a page.
#[derive(Debug, Clone, Default)]
pub struct VersionPage {
    pub versions: Vec<VersionEntry>,
    /// Present only when more pages follow
    pub next_key_marker: Option<String>,
    pub next_version_id_marker: Option<String>,
}

/// Render a timestamp the way every record stores it: RFC 3339 in UTC with
/// a numeric offset, fractional seconds only when non-zero.
pub fn format_timestamp(ts: Timestamp) -> String {
    ts.to_zoned(TimeZone::UTC)
        .strftime("%Y-%m-%dT%H:%M:%S%.f%:z")
        .to_string()
}

/// A matched object, ready for rendering
///
/// Fields are fixed at construction; renderers only read them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    bucket: String,
    key: String,
    size: u64,
    last_modified: String,
    storage_class: String,
}

impl ObjectRecord {
    pub fn from_entry(bucket: &str, entry: ObjectEntry) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: entry.key,
            size: entry.size,
            last_modified: entry.last_modified.map(format_timestamp).unwrap_or_default(),
            storage_class: entry
                .storage_class
                .unwrap_or_else(|| DEFAULT_STORAGE_CLASS.to_string()),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn last_modified(&self) -> &str {
        &self.last_modified
    }

    pub fn storage_class(&self) -> &str {
        &self.storage_class
    }
}

/// A version or delete marker found during a version sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    bucket: String,
    key: String,
    version_id: String,
    is_latest: bool,
    is_delete_marker: bool,
    size: Option<u64>,
    last_modified: String,
}

impl VersionRecord {
    pub fn from_entry(bucket: &str, entry: VersionEntry) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: entry.key,
            version_id: entry.version_id,
            is_latest: entry.is_latest,
            is_delete_marker: entry.is_delete_marker,
            size: entry.size,
            last_modified: entry.last_modified.map(format_timestamp).unwrap_or_default(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn version_id(&self) -> &str {
        &self.version_id
    }

    pub fn is_latest(&self) -> bool {
        self.is_latest
    }

    pub fn is_delete_marker(&self) -> bool {
        self.is_delete_marker
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn last_modified(&self) -> &str {
        &self.last_modified
    }
}

/// How results are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Column-aligned table, needs the full result set first
    #[default]
    Table,
    /// Tab-separated, streamed
    Raw,
    /// One labelled block per object, streamed
    Stacked,
    /// Comma-separated, streamed
    Csv,
}

impl OutputFormat {
    /// Pick a format from the command line switches; the first set flag wins
    pub fn from_flags(raw: bool, stacked: bool, csv: bool) -> Self {
        if raw {
            OutputFormat::Raw
        } else if stacked {
            OutputFormat::Stacked
        } else if csv {
            OutputFormat::Csv
        } else {
            OutputFormat::Table
        }
    }

    /// Whether records can be written as soon as they are found
    pub fn is_streaming(&self) -> bool {
        !matches!(self, OutputFormat::Table)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Raw => write!(f, "raw"),
            OutputFormat::Stacked => write!(f, "stacked"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// How the search term is applied to keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Key contains the term anywhere
    #[default]
    Contains,
    /// Key starts with the term, resolved server-side
    Prefix,
    /// All versions and delete markers under the term as a prefix
    Versions,
}

/// Parameters for one run, validated on construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    term: String,
    bucket_filter: Option<String>,
    format: OutputFormat,
    csv_destination: Option<PathBuf>,
    mode: SearchMode,
}

impl SearchRequest {
    /// Create a request for `term`; an empty term is rejected
    pub fn new(term: impl Into<String>) -> Result<Self> {
        let term = term.into();
        if term.is_empty() {
            return Err(Error::InvalidArgument(
                "Search term cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            term,
            bucket_filter: None,
            format: OutputFormat::default(),
            csv_destination: None,
            mode: SearchMode::default(),
        })
    }

    /// Restrict the sweep to buckets whose name contains `filter`
    ///
    /// An empty filter is the same as no filter.
    pub fn with_bucket_filter(mut self, filter: Option<String>) -> Self {
        self.bucket_filter = filter.filter(|f| !f.is_empty());
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_csv_destination(mut self, path: Option<PathBuf>) -> Self {
        self.csv_destination = path;
        self
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn bucket_filter(&self) -> Option<&str> {
        self.bucket_filter.as_deref()
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn csv_destination(&self) -> Option<&Path> {
        self.csv_destination.as_deref()
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }
}
