//! S3 service and backend
//!
//! `S3Service` builds a fresh client for every operation and runs the
//! operation logic from skiff-core over `S3Backend`, which wraps aws-sdk-s3.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::primitives::{ByteStream, Length};
use aws_sdk_s3::types::{
    CompletedMultipartUpload, CompletedPart, ObjectCannedAcl, ServerSideEncryption, StorageClass,
};
use tokio::io::AsyncWriteExt;

use skiff_core::{
    AccessOutcome, Delete, Download, Error, List, ListPage, ObjectBackend, ObjectEntry,
    ObjectStorage, Result, Settings, TransferProgress, Upload, UploadArguments,
};

use crate::error::from_sdk_error;
use crate::multipart::{MultipartConfig, calculate_parts, part_byte_range};
use crate::service::{AuthenticatedService, AwsService, ServiceId};

/// Object storage service
#[derive(Debug, Clone)]
pub struct S3Service {
    base: AuthenticatedService,
    multipart: MultipartConfig,
}

impl AwsService for S3Service {
    const SERVICE: ServiceId = ServiceId::S3;

    fn base(&self) -> &AuthenticatedService {
        &self.base
    }
}

impl S3Service {
    pub fn new(settings: Settings) -> Self {
        Self::with_base(AuthenticatedService::for_service(settings, Self::SERVICE))
    }

    /// Build on a customized base (prompt, credential files)
    pub fn with_base(base: AuthenticatedService) -> Self {
        Self {
            base,
            multipart: MultipartConfig::default(),
        }
    }

    /// Override multipart sizing
    pub fn with_multipart(mut self, multipart: MultipartConfig) -> Self {
        self.multipart = multipart;
        self
    }

    /// Build a new S3 client; not cached between calls
    pub async fn client(&self) -> Result<aws_sdk_s3::Client> {
        let config = self.base.sdk_config().await?;
        let mut builder = aws_sdk_s3::config::Builder::from(&config);

        // Custom endpoints are usually S3-compatible gateways without DNS-style buckets
        if let Some(endpoint) = self.settings().endpoint() {
            builder = builder.endpoint_url(endpoint.as_str()).force_path_style(true);
        }

        Ok(aws_sdk_s3::Client::from_conf(builder.build()))
    }

    async fn backend(&self) -> Result<S3Backend> {
        Ok(S3Backend::new(self.client().await?).with_multipart(self.multipart.clone()))
    }

    /// Probe a bucket, reporting why it is not accessible
    pub async fn access_outcome(&self, bucket_name: &str) -> AccessOutcome {
        match self.backend().await {
            Ok(backend) => {
                ObjectStorage::new(&backend, self.settings())
                    .access_outcome(bucket_name)
                    .await
            }
            Err(e) => AccessOutcome::from_error(bucket_name, &e),
        }
    }

    /// `true` only when the bucket exists and the credentials may use it
    pub async fn access(&self, bucket_name: &str) -> bool {
        self.access_outcome(bucket_name).await.is_granted()
    }

    pub async fn list(&self, config: &List) -> Result<Vec<ObjectEntry>> {
        let backend = self.backend().await?;
        ObjectStorage::new(&backend, self.settings())
            .list(config)
            .await
    }

    pub async fn download(&self, config: &Download) -> Result<PathBuf> {
        let backend = self.backend().await?;
        ObjectStorage::new(&backend, self.settings())
            .download(config)
            .await
    }

    pub async fn upload(&self, config: &Upload) -> Result<(String, u64)> {
        // Local checks run before credentials are resolved
        config.validate()?;

        let backend = self.backend().await?;
        ObjectStorage::new(&backend, self.settings())
            .upload(config)
            .await
    }

    pub async fn delete(&self, config: &Delete) -> Result<()> {
        let backend = self.backend().await?;
        ObjectStorage::new(&backend, self.settings())
            .delete(config)
            .await
    }
}

/// Apply upload arguments to a put or create-multipart request builder
macro_rules! apply_upload_arguments {
    ($builder:expr, $args:expr) => {{
        let args: &UploadArguments = $args;
        let mut builder = $builder
            .set_content_type(args.content_type.clone())
            .set_cache_control(args.cache_control.clone())
            .set_content_disposition(args.content_disposition.clone())
            .set_content_encoding(args.content_encoding.clone())
            .set_content_language(args.content_language.clone())
            .set_storage_class(args.storage_class.as_deref().map(StorageClass::from))
            .set_acl(args.acl.as_deref().map(ObjectCannedAcl::from))
            .set_server_side_encryption(
                args.server_side_encryption
                    .as_deref()
                    .map(ServerSideEncryption::from),
            )
            .set_ssekms_key_id(args.sse_kms_key_id.clone())
            .set_tagging(args.tagging.clone());
        for (name, value) in &args.metadata {
            builder = builder.metadata(name, value);
        }
        builder
    }};
}

/// ObjectBackend over aws-sdk-s3
pub struct S3Backend {
    inner: aws_sdk_s3::Client,
    multipart: MultipartConfig,
}

impl S3Backend {
    pub fn new(inner: aws_sdk_s3::Client) -> Self {
        Self {
            inner,
            multipart: MultipartConfig::default(),
        }
    }

    pub fn with_multipart(mut self, multipart: MultipartConfig) -> Self {
        self.multipart = multipart;
        self
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }

    async fn put_single(
        &self,
        source: &Path,
        bucket: &str,
        key: &str,
        arguments: &UploadArguments,
        size: u64,
        progress: &dyn TransferProgress,
    ) -> Result<()> {
        let body = ByteStream::from_path(source)
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;

        let request = self.inner.put_object().bucket(bucket).key(key).body(body);
        apply_upload_arguments!(request, arguments)
            .send()
            .await
            .map_err(from_sdk_error)?;

        progress.advance(size);
        Ok(())
    }

    async fn put_multipart(
        &self,
        source: &Path,
        bucket: &str,
        key: &str,
        arguments: &UploadArguments,
        size: u64,
        progress: &dyn TransferProgress,
    ) -> Result<()> {
        let request = self.inner.create_multipart_upload().bucket(bucket).key(key);
        let created = apply_upload_arguments!(request, arguments)
            .send()
            .await
            .map_err(from_sdk_error)?;

        let upload_id = created
            .upload_id()
            .ok_or_else(|| Error::service("MissingUploadId", "No upload id returned"))?
            .to_string();

        match self
            .upload_parts(source, bucket, key, &upload_id, size, progress)
            .await
        {
            Ok(parts) => {
                self.inner
                    .complete_multipart_upload()
                    .bucket(bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .multipart_upload(
                        CompletedMultipartUpload::builder()
                            .set_parts(Some(parts))
                            .build(),
                    )
                    .send()
                    .await
                    .map_err(from_sdk_error)?;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Aborting multipart upload {upload_id} for {bucket}/{key}: {e}");
                if let Err(abort) = self
                    .inner
                    .abort_multipart_upload()
                    .bucket(bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .send()
                    .await
                {
                    tracing::error!("Failed to abort multipart upload {upload_id}: {abort}");
                }
                Err(e)
            }
        }
    }

    async fn upload_parts(
        &self,
        source: &Path,
        bucket: &str,
        key: &str,
        upload_id: &str,
        size: u64,
        progress: &dyn TransferProgress,
    ) -> Result<Vec<CompletedPart>> {
        let part_size = self.multipart.calculate_part_size(size);
        let count = calculate_parts(size, part_size);
        tracing::debug!("Uploading {key} in {count} part(s) of {part_size} bytes");

        let mut parts = Vec::with_capacity(count);
        for part_number in 1..=count as i32 {
            let (start, end) = part_byte_range(part_number, part_size, size);
            let body = ByteStream::read_from()
                .path(source)
                .offset(start)
                .length(Length::Exact(end - start))
                .build()
                .await
                .map_err(|e| Error::Io(std::io::Error::other(e)))?;

            let uploaded = self
                .inner
                .upload_part()
                .bucket(bucket)
                .key(key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(body)
                .send()
                .await
                .map_err(from_sdk_error)?;

            parts.push(
                CompletedPart::builder()
                    .set_e_tag(uploaded.e_tag().map(str::to_string))
                    .part_number(part_number)
                    .build(),
            );
            progress.advance(end - start);
        }

        Ok(parts)
    }
}

#[async_trait]
impl ObjectBackend for S3Backend {
    async fn head_bucket(&self, bucket: &str) -> Result<()> {
        self.inner
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(from_sdk_error)?;

        Ok(())
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<i64> {
        let response = self
            .inner
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(from_sdk_error)?;

        Ok(response.content_length().unwrap_or(0))
    }

    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ListPage> {
        let response = self
            .inner
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .set_continuation_token(continuation_token)
            .send()
            .await
            .map_err(from_sdk_error)?;

        let entries = response
            .contents()
            .iter()
            .map(|object| {
                let mut entry =
                    ObjectEntry::new(object.key().unwrap_or_default(), object.size().unwrap_or(0));
                entry.last_modified = object.last_modified().map(|t| t.as_secs_f64());
                entry.etag = object.e_tag().map(|e| e.trim_matches('"').to_string());
                entry.storage_class = object.storage_class().map(|s| s.as_str().to_string());
                entry
            })
            .collect();

        let next_token = if response.is_truncated().unwrap_or(false) {
            response.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(ListPage {
            entries,
            next_token,
        })
    }

    async fn download(
        &self,
        bucket: &str,
        key: &str,
        target: &Path,
        progress: Arc<dyn TransferProgress>,
    ) -> Result<u64> {
        let response = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(from_sdk_error)?;

        let mut body = response.body;
        let mut file = tokio::fs::File::create(target).await?;
        let mut written = 0u64;

        while let Some(chunk) = body
            .try_next()
            .await
            .map_err(|e| Error::Network(e.to_string()))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            progress.advance(chunk.len() as u64);
        }
        file.flush().await?;

        Ok(written)
    }

    async fn upload(
        &self,
        source: &Path,
        bucket: &str,
        key: &str,
        arguments: &UploadArguments,
        progress: Arc<dyn TransferProgress>,
    ) -> Result<()> {
        let size = tokio::fs::metadata(source).await?.len();

        if self.multipart.is_multipart(size) {
            self.put_multipart(source, bucket, key, arguments, size, progress.as_ref())
                .await
        } else {
            self.put_single(source, bucket, key, arguments, size, progress.as_ref())
                .await
        }
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.inner
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(from_sdk_error)?;

        Ok(())
    }
}
