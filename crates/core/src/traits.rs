//! ObjectBackend trait definition
//!
//! This trait defines the transport primitives object-storage operations are
//! built from. It allows the operation logic to be decoupled from the specific
//! S3 SDK implementation.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::progress::TransferProgress;
use crate::types::{ListPage, UploadArguments};

/// Trait for S3-compatible transport operations
///
/// Errors reported by the service must surface as `Error::Service` carrying
/// the service's machine-readable code. This trait is implemented by the S3
/// adapter and can be mocked for testing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    /// Metadata-only bucket existence and permission check
    async fn head_bucket(&self, bucket: &str) -> Result<()>;

    /// Metadata-only object query, returning the content length
    async fn head_object(&self, bucket: &str, key: &str) -> Result<i64>;

    /// Fetch one page of keys under `prefix`
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ListPage>;

    /// Stream an object into `target`, returning bytes written
    async fn download(
        &self,
        bucket: &str,
        key: &str,
        target: &Path,
        progress: Arc<dyn TransferProgress>,
    ) -> Result<u64>;

    /// Transfer a local file, choosing single or multipart upload as needed
    async fn upload(
        &self,
        source: &Path,
        bucket: &str,
        key: &str,
        arguments: &UploadArguments,
        progress: Arc<dyn TransferProgress>,
    ) -> Result<()>;

    /// Delete a single object
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;
}
