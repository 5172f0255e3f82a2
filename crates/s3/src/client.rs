//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from ss-core.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use jiff::Timestamp;
use ss_core::{
    Error, ListOptions, ObjectEntry, ObjectPage, ObjectStore, Result, RetryConfig, RetryMode,
    S3Settings, VersionEntry, VersionListOptions, VersionPage,
};

/// Error codes that mean the caller's credentials were rejected
const AUTH_ERROR_CODES: &[&str] = &[
    "AccessDenied",
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "ExpiredToken",
    "InvalidToken",
    "AllAccessDisabled",
];

/// S3 client wrapper
pub struct S3Client {
    inner: aws_sdk_s3::Client,
}

impl S3Client {
    /// Create a new S3 client
    ///
    /// Unset settings fall through to the SDK's default provider chains, so
    /// environment variables, shared profiles and instance roles all work.
    pub async fn new(settings: &S3Settings, retry: &RetryConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .retry_config(sdk_retry_config(retry));

        if let Some(profile) = &settings.profile {
            loader = loader.profile_name(profile);
        }

        if let Some(region) = &settings.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }

        if let Some(endpoint) = &settings.endpoint {
            validate_endpoint(endpoint)?;
            loader = loader.endpoint_url(endpoint);
        }

        if let Some((access_key, secret_key)) = settings.static_credentials() {
            let credentials = aws_credential_types::Credentials::new(
                access_key,
                secret_key,
                None, // session token
                None, // expiry
                "s3search-static-credentials",
            );
            loader = loader.credentials_provider(credentials);
        }

        let config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(settings.force_path_style)
            .build();

        tracing::debug!(
            profile = settings.profile.as_deref().unwrap_or("default"),
            endpoint = settings.endpoint.as_deref().unwrap_or("aws"),
            max_attempts = retry.max_attempts,
            retry_mode = %retry.mode,
            "Created S3 client"
        );

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
        })
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }

    /// Format AWS SDK error into a detailed error message
    fn format_sdk_error<E>(error: &SdkError<E, HttpResponse>) -> String
    where
        E: ProvideErrorMetadata + std::fmt::Display,
    {
        match error {
            SdkError::ServiceError(service_err) => {
                let err = service_err.err();
                let mut msg = format!("Service error: {err}");
                if let Some(code) = err.code() {
                    msg.push_str(&format!(" (code: {code})"));
                }
                if let Some(message) = err.message() {
                    msg.push_str(&format!(": {message}"));
                }
                msg
            }
            SdkError::ConstructionFailure(err) => {
                format!("Request construction failed: {err:?}")
            }
            SdkError::TimeoutError(_) => "Request timeout".to_string(),
            SdkError::DispatchFailure(err) => {
                format!("Network dispatch error: {err:?}")
            }
            SdkError::ResponseError(err) => {
                format!("Response error: {err:?}")
            }
            _ => error.to_string(),
        }
    }

    /// Map an SDK failure onto the core error taxonomy
    fn map_sdk_error<E>(bucket: Option<&str>, error: SdkError<E, HttpResponse>) -> Error
    where
        E: ProvideErrorMetadata + std::fmt::Display,
    {
        let code = error.as_service_error().and_then(|e| e.code());
        match code {
            Some("NoSuchBucket") => {
                Error::BucketNotFound(bucket.unwrap_or_default().to_string())
            }
            Some(code) if AUTH_ERROR_CODES.contains(&code) => {
                Error::Auth(Self::format_sdk_error(&error))
            }
            _ => Error::Network(Self::format_sdk_error(&error)),
        }
    }
}

/// Translate the configured policy into the SDK's retry configuration
fn sdk_retry_config(retry: &RetryConfig) -> aws_smithy_types::retry::RetryConfig {
    let base = match retry.mode {
        RetryMode::Standard => aws_smithy_types::retry::RetryConfig::standard(),
        RetryMode::Adaptive => aws_smithy_types::retry::RetryConfig::adaptive(),
    };
    base.with_max_attempts(retry.max_attempts.max(1))
        .with_initial_backoff(Duration::from_millis(retry.initial_backoff_ms))
        .with_max_backoff(Duration::from_millis(retry.max_backoff_ms))
}

fn validate_endpoint(endpoint: &str) -> Result<()> {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Endpoint must start with http:// or https://: '{endpoint}'"
        )))
    }
}

fn to_timestamp(dt: &aws_smithy_types::DateTime) -> Option<Timestamp> {
    Timestamp::new(dt.secs(), dt.subsec_nanos() as i32).ok()
}

fn to_size(size: Option<i64>) -> u64 {
    size.and_then(|s| u64::try_from(s).ok()).unwrap_or(0)
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list_buckets(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let response = self
                .inner
                .list_buckets()
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .map_err(|e| Self::map_sdk_error(None, e))?;

            names.extend(
                response
                    .buckets()
                    .iter()
                    .filter_map(|b| b.name())
                    .map(str::to_string),
            );

            match response.continuation_token() {
                Some(token) if !token.is_empty() => continuation_token = Some(token.to_string()),
                _ => break,
            }
        }

        tracing::debug!(count = names.len(), "Listed buckets");
        Ok(names)
    }

    async fn list_objects(&self, bucket: &str, options: &ListOptions) -> Result<ObjectPage> {
        let response = self
            .inner
            .list_objects_v2()
            .bucket(bucket)
            .set_prefix(options.prefix.clone())
            .set_continuation_token(options.continuation_token.clone())
            .set_max_keys(options.max_keys)
            .send()
            .await
            .map_err(|e| Self::map_sdk_error(Some(bucket), e))?;

        let objects = response
            .contents()
            .iter()
            .map(|object| ObjectEntry {
                key: object.key().unwrap_or_default().to_string(),
                size: to_size(object.size()),
                last_modified: object.last_modified().and_then(to_timestamp),
                storage_class: object.storage_class().map(|sc| sc.as_str().to_string()),
            })
            .collect();

        let next_token = if response.is_truncated().unwrap_or(false) {
            response.next_continuation_token().map(str::to_string)
        } else {
            None
        };

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
        let response = self
            .inner
            .list_object_versions()
            .bucket(bucket)
            .set_prefix(options.prefix.clone())
            .set_key_marker(options.key_marker.clone())
            .set_version_id_marker(options.version_id_marker.clone())
            .set_max_keys(options.max_keys)
            .send()
            .await
            .map_err(|e| Self::map_sdk_error(Some(bucket), e))?;

        let mut versions = Vec::new();

        for v in response.versions() {
            versions.push(VersionEntry {
                key: v.key().unwrap_or_default().to_string(),
                version_id: v.version_id().unwrap_or("null").to_string(),
                is_latest: v.is_latest().unwrap_or(false),
                is_delete_marker: false,
                size: Some(to_size(v.size())),
                last_modified: v.last_modified().and_then(to_timestamp),
            });
        }

        for m in response.delete_markers() {
            versions.push(VersionEntry {
                key: m.key().unwrap_or_default().to_string(),
                version_id: m.version_id().unwrap_or("null").to_string(),
                is_latest: m.is_latest().unwrap_or(false),
                is_delete_marker: true,
                size: None,
                last_modified: m.last_modified().and_then(to_timestamp),
            });
        }

        let (next_key_marker, next_version_id_marker) = if response.is_truncated().unwrap_or(false)
        {
            (
                response.next_key_marker().map(str::to_string),
                response.next_version_id_marker().map(str::to_string),
            )
        } else {
            (None, None)
        };

        Ok(VersionPage {
            versions,
            next_key_marker,
            next_version_id_marker,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::error::ErrorMetadata;
    use aws_sdk_s3::operation::list_object_versions::ListObjectVersionsError;
    use aws_smithy_runtime_api::http::{Response, StatusCode};
    use aws_smithy_types::body::SdkBody;

    fn service_error(status: u16, code: &str) -> SdkError<ListObjectVersionsError, HttpResponse> {
        let err = ListObjectVersionsError::generic(ErrorMetadata::builder().code(code).build());
        let raw = Response::new(StatusCode::try_from(status).unwrap(), SdkBody::empty());
        SdkError::service_error(err, raw)
    }

    #[test]
    fn test_no_such_bucket_maps_to_bucket_not_found() {
        let err = S3Client::map_sdk_error(Some("gone"), service_error(404, "NoSuchBucket"));
        assert!(matches!(err, Error::BucketNotFound(ref b) if b == "gone"));
    }

    #[test]
    fn test_access_denied_maps_to_auth() {
        let err = S3Client::map_sdk_error(Some("b"), service_error(403, "AccessDenied"));
        assert!(matches!(err, Error::Auth(_)));
        assert!(err.to_string().contains("AccessDenied"));
    }

    #[test]
    fn test_other_service_errors_map_to_network() {
        let err = S3Client::map_sdk_error(Some("b"), service_error(503, "SlowDown"));
        assert!(matches!(err, Error::Network(_)));
    }

    #[test]
    fn test_sdk_retry_config() {
        let retry = RetryConfig {
            mode: RetryMode::Standard,
            max_attempts: 10,
            initial_backoff_ms: 250,
            max_backoff_ms: 5000,
        };
        let sdk = sdk_retry_config(&retry);
        assert_eq!(sdk.max_attempts(), 10);
        assert_eq!(sdk.initial_backoff(), Duration::from_millis(250));
        assert_eq!(sdk.max_backoff(), Duration::from_millis(5000));
        assert_eq!(sdk.mode(), aws_smithy_types::retry::RetryMode::Standard);

        let adaptive = RetryConfig {
            mode: RetryMode::Adaptive,
            ..Default::default()
        };
        assert_eq!(
            sdk_retry_config(&adaptive).mode(),
            aws_smithy_types::retry::RetryMode::Adaptive
        );
    }

    #[test]
    fn test_validate_endpoint() {
        assert!(validate_endpoint("http://localhost:9000").is_ok());
        assert!(validate_endpoint("https://s3.example.com").is_ok());
        assert!(matches!(
            validate_endpoint("localhost:9000"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_to_timestamp() {
        let dt = aws_smithy_types::DateTime::from_secs(1_704_110_400);
        let ts = to_timestamp(&dt).unwrap();
        assert_eq!(ts.as_second(), 1_704_110_400);
    }

    #[test]
    fn test_to_size_clamps_negative() {
        assert_eq!(to_size(Some(2048)), 2048);
        assert_eq!(to_size(Some(-1)), 0);
        assert_eq!(to_size(None), 0);
    }
}
