//! ss-s3: S3 SDK adapter for s3search
//!
//! This crate implements the `ObjectStore` trait from ss-core on top of
//! aws-sdk-s3. It is the only crate that knows about the AWS SDK.

mod client;

pub use client::S3Client;
