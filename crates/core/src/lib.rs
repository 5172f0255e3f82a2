//! ss-core: Core library for the s3search CLI
//!
//! This crate provides everything that does not depend on a particular
//! storage SDK:
//! - Configuration and retry settings
//! - The `ObjectStore` trait the scanner runs against
//! - Bucket selection and the paginated object scanner
//! - The record types handed to renderers

pub mod config;
pub mod error;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod retry;
pub mod scanner;
pub mod selector;
pub mod size;
pub mod traits;
pub mod types;

pub use config::{Config, ConfigManager, OutputSettings, S3Settings};
pub use error::{Error, Result};
#[cfg(any(test, feature = "testing"))]
pub use memory::MemoryStore;
pub use retry::{RetryBuilder, RetryConfig, RetryMode};
pub use scanner::{
    RecordStream, VersionStream, scan_contains, scan_objects, scan_prefix, scan_versions,
};
pub use selector::select_buckets;
pub use size::format_size;
pub use traits::ObjectStore;
pub use types::{
    DEFAULT_STORAGE_CLASS, ListOptions, ObjectEntry, ObjectPage, ObjectRecord, OutputFormat,
    SearchMode, SearchRequest, VersionEntry, VersionListOptions, VersionPage, VersionRecord,
    format_timestamp,
};
