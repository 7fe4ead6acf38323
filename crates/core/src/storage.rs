//! Object storage operations
//!
//! Access probing, listing, download, upload and delete, expressed over any
//! [`ObjectBackend`]. Local validation always happens before the backend is
//! touched.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::progress::ProgressBar;
use crate::settings::Settings;
use crate::traits::ObjectBackend;
use crate::types::{Delete, Download, List, ObjectEntry, Upload, strip_leading_separator};

/// Prefix for directories created when a download names none
pub const DOWNLOAD_DIR_PREFIX: &str = "aws-s3-bucket-objects-";

/// Why a bucket is not accessible
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDenial {
    /// Session token has expired
    ExpiredToken,
    /// Bucket does not exist
    NoSuchBucket,
    /// Malformed or unauthenticated request (HTTP 400)
    BadRequest,
    /// Anything else, with the underlying error text
    Other(String),
}

impl fmt::Display for AccessDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessDenial::ExpiredToken => write!(f, "expired access token"),
            AccessDenial::NoSuchBucket => write!(f, "no such bucket"),
            AccessDenial::BadRequest => write!(f, "bad request, likely an unauthenticated session"),
            AccessDenial::Other(reason) => write!(f, "{reason}"),
        }
    }
}

impl From<&Error> for AccessDenial {
    fn from(err: &Error) -> Self {
        match err.code() {
            Some("ExpiredToken") => AccessDenial::ExpiredToken,
            // HeadBucket carries no body, so a missing bucket may only surface as 404
            Some("NoSuchBucket" | "NotFound" | "404") => AccessDenial::NoSuchBucket,
            Some("400" | "BadRequest") => AccessDenial::BadRequest,
            _ => AccessDenial::Other(err.to_string()),
        }
    }
}

/// Result of probing a bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessOutcome {
    Granted,
    Denied(AccessDenial),
}

impl AccessOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessOutcome::Granted)
    }

    /// Outcome for a failure that happened before the probe could be sent
    pub fn from_error(bucket: &str, err: &Error) -> Self {
        let denial = AccessDenial::from(err);
        match &denial {
            AccessDenial::ExpiredToken => tracing::error!("Expired AWS access token"),
            AccessDenial::NoSuchBucket => tracing::error!("No such bucket \"{bucket}\""),
            AccessDenial::BadRequest => {
                tracing::error!("Bad request, likely unauthenticated AWS session: {err}")
            }
            AccessDenial::Other(_) => tracing::error!("Unhandled error probing \"{bucket}\": {err}"),
        }
        AccessOutcome::Denied(denial)
    }
}

/// Object storage operations over a backend
pub struct ObjectStorage<'a, B: ObjectBackend + ?Sized> {
    backend: &'a B,
    settings: &'a Settings,
}

impl<'a, B: ObjectBackend + ?Sized> ObjectStorage<'a, B> {
    pub fn new(backend: &'a B, settings: &'a Settings) -> Self {
        Self { backend, settings }
    }

    /// Probe a bucket; never fails, denial is a typed outcome
    pub async fn access_outcome(&self, bucket_name: &str) -> AccessOutcome {
        tracing::debug!("Attempting to verify access to bucket \"{bucket_name}\"");

        match self.backend.head_bucket(bucket_name).await {
            Ok(()) => {
                tracing::info!("Successfully verified access to bucket \"{bucket_name}\"");
                AccessOutcome::Granted
            }
            Err(e) => AccessOutcome::from_error(bucket_name, &e),
        }
    }

    /// `true` only when the bucket exists and is accessible
    pub async fn access(&self, bucket_name: &str) -> bool {
        self.access_outcome(bucket_name).await.is_granted()
    }

    /// List every object under the prefix, flattening all pages in order
    pub async fn list(&self, config: &List) -> Result<Vec<ObjectEntry>> {
        self.warn_insecure_transport();

        let bucket = config.bucket_name.as_str();
        let prefix = strip_leading_separator(&config.key);
        tracing::debug!("Attempting to list \"{prefix}\" from \"{bucket}\"");

        let mut contents = Vec::new();
        let mut token = None;

        loop {
            let page = self.backend.list_page(bucket, prefix, token.take()).await?;
            contents.extend(page.entries);

            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        Ok(contents)
    }

    /// Download an object, returning the verified local path
    pub async fn download(&self, config: &Download) -> Result<PathBuf> {
        self.warn_insecure_transport();

        let bucket = config.bucket_name.as_str();
        let key = strip_leading_separator(&config.key);
        let filename = key
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                Error::InvalidArgument(format!("Object key has no file name: {}", config.key))
            })?;

        tracing::debug!("Attempting to download \"{key}\" from \"{bucket}\"");

        let size = self.backend.head_object(bucket, key).await?;
        tracing::debug!("Total S3 object size ({key}): {size}");

        let (directory, created) = match &config.directory {
            Some(directory) => {
                std::fs::create_dir_all(directory)?;
                tracing::debug!("Using user-provided directory: {}", directory.display());
                (directory.clone(), false)
            }
            None => {
                let directory = tempfile::Builder::new()
                    .prefix(DOWNLOAD_DIR_PREFIX)
                    .tempdir()?
                    .keep();
                (directory, true)
            }
        };

        let target = directory.join(filename);
        tracing::debug!("Downloading S3 object: file://{}", target.display());

        let progress = Arc::new(self.progress_bar(size.max(0) as u64));
        let result = self
            .backend
            .download(bucket, key, &target, progress.clone())
            .await;
        progress.finish_and_clear();

        if let Err(e) = result {
            discard_partial_download(&target, created.then_some(directory.as_path()));
            return Err(e);
        }

        if !target.is_file() {
            return Err(Error::DownloadVerificationFailed(target));
        }

        Ok(target)
    }

    /// Upload a local file, returning the stored key and the source size
    pub async fn upload(&self, config: &Upload) -> Result<(String, u64)> {
        self.warn_insecure_transport();

        let key = strip_leading_separator(&config.key);
        let bucket = config.bucket_name.as_str();
        let source = config.source.as_path();

        let arguments = config.validate()?;

        tracing::debug!(
            "Attempting to upload \"{key}\" from \"{}\" to \"{bucket}\"",
            source.display()
        );

        let size = std::fs::metadata(source)?.len();

        let progress = Arc::new(self.progress_bar(size));
        let result = self
            .backend
            .upload(source, bucket, key, &arguments, progress.clone())
            .await;
        progress.finish_and_clear();
        result?;

        Ok((key.to_string(), size))
    }

    /// Delete a single object; no existence check is made
    pub async fn delete(&self, config: &Delete) -> Result<()> {
        self.warn_insecure_transport();

        let key = strip_leading_separator(&config.key);
        tracing::debug!("Attempting to delete \"{key}\" from \"{}\"", config.bucket_name);

        self.backend.delete_object(&config.bucket_name, key).await
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if self.settings.show_progress() {
            ProgressBar::for_transfer(total)
        } else {
            ProgressBar::hidden()
        }
    }

    fn warn_insecure_transport(&self) {
        if self.settings.is_insecure_transport() && !self.settings.suppress_insecure_warnings() {
            if let Some(endpoint) = self.settings.endpoint() {
                tracing::warn!("Unverified transport: requests to {endpoint} are not encrypted");
            }
        }
    }
}

/// Remove what a failed download left behind
///
/// `created_directory` is only removed when the download created it.
fn discard_partial_download(target: &Path, created_directory: Option<&Path>) {
    if let Err(e) = std::fs::remove_file(target)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!("Failed to remove partial download {}: {e}", target.display());
    }

    if let Some(directory) = created_directory
        && let Err(e) = std::fs::remove_dir_all(directory)
    {
        tracing::warn!(
            "Failed to remove download directory {}: {e}",
            directory.display()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockObjectBackend;
    use crate::types::ListPage;
    use mockall::predicate::{always, eq};
    use serde_json::json;
    use tempfile::TempDir;

    fn settings() -> Settings {
        Settings::default()
    }

    fn entry(key: &str, modified: f64) -> ObjectEntry {
        let mut entry = ObjectEntry::new(key, 10);
        entry.last_modified = Some(modified);
        entry
    }

    #[tokio::test]
    async fn test_access_granted() {
        let mut backend = MockObjectBackend::new();
        backend
            .expect_head_bucket()
            .with(eq("data"))
            .times(1)
            .returning(|_| Ok(()));

        let settings = settings();
        let storage = ObjectStorage::new(&backend, &settings);
        assert!(storage.access("data").await);
    }

    #[tokio::test]
    async fn test_access_no_such_bucket_is_false() {
        let mut backend = MockObjectBackend::new();
        backend
            .expect_head_bucket()
            .returning(|_| Err(Error::service("NoSuchBucket", "missing")));

        let settings = settings();
        let storage = ObjectStorage::new(&backend, &settings);
        assert!(!storage.access("nonexistent-bucket").await);
        assert_eq!(
            storage.access_outcome("nonexistent-bucket").await,
            AccessOutcome::Denied(AccessDenial::NoSuchBucket)
        );
    }

    #[tokio::test]
    async fn test_access_expired_token_is_false() {
        let mut backend = MockObjectBackend::new();
        backend
            .expect_head_bucket()
            .returning(|_| Err(Error::service("ExpiredToken", "expired")));

        let settings = settings();
        let storage = ObjectStorage::new(&backend, &settings);
        assert!(!storage.access("expired-credentials-bucket").await);
        assert_eq!(
            storage.access_outcome("expired-credentials-bucket").await,
            AccessOutcome::Denied(AccessDenial::ExpiredToken)
        );
    }

    #[tokio::test]
    async fn test_access_bad_request_and_other_errors_are_false() {
        let mut backend = MockObjectBackend::new();
        backend
            .expect_head_bucket()
            .with(eq("bad"))
            .returning(|_| Err(Error::service("400", "Bad Request")));
        backend
            .expect_head_bucket()
            .with(eq("flaky"))
            .returning(|_| Err(Error::Network("connection reset".into())));

        let settings = settings();
        let storage = ObjectStorage::new(&backend, &settings);
        assert_eq!(
            storage.access_outcome("bad").await,
            AccessOutcome::Denied(AccessDenial::BadRequest)
        );
        assert!(matches!(
            storage.access_outcome("flaky").await,
            AccessOutcome::Denied(AccessDenial::Other(_))
        ));
    }

    #[tokio::test]
    async fn test_list_strips_prefix_and_flattens_pages() {
        let mut backend = MockObjectBackend::new();
        backend
            .expect_list_page()
            .with(eq("data"), eq("a/b"), eq(None::<String>))
            .times(1)
            .returning(|_, _, _| {
                Ok(ListPage {
                    entries: vec![entry("a/b/1", 1.0), entry("a/b/2", 2.0)],
                    next_token: Some("page-2".into()),
                })
            });
        backend
            .expect_list_page()
            .with(eq("data"), eq("a/b"), eq(Some("page-2".to_string())))
            .times(1)
            .returning(|_, _, _| {
                Ok(ListPage {
                    entries: vec![entry("a/b/3", 3.5)],
                    next_token: None,
                })
            });

        let settings = settings();
        let storage = ObjectStorage::new(&backend, &settings);
        let contents = storage
            .list(&List {
                key: "/a/b".into(),
                bucket_name: "data".into(),
            })
            .await
            .unwrap();

        let keys: Vec<&str> = contents.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["a/b/1", "a/b/2", "a/b/3"]);
        assert_eq!(contents[2].last_modified, Some(3.5));
    }

    #[tokio::test]
    async fn test_list_propagates_errors() {
        let mut backend = MockObjectBackend::new();
        backend
            .expect_list_page()
            .returning(|_, _, _| Err(Error::service("AccessDenied", "denied")));

        let settings = settings();
        let storage = ObjectStorage::new(&backend, &settings);
        let err = storage
            .list(&List {
                key: "".into(),
                bucket_name: "data".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("AccessDenied"));
    }

    #[tokio::test]
    async fn test_download_into_temporary_directory() {
        let mut backend = MockObjectBackend::new();
        backend
            .expect_head_object()
            .with(eq("data"), eq("reports/2026/q3.csv"))
            .returning(|_, _| Ok(5));
        backend
            .expect_download()
            .times(1)
            .returning(|_, _, target, _| {
                std::fs::write(target, b"a,b,c")?;
                Ok(5)
            });

        let settings = settings();
        let storage = ObjectStorage::new(&backend, &settings);
        let path = storage
            .download(&Download {
                key: "/reports/2026/q3.csv".into(),
                bucket_name: "data".into(),
                directory: None,
            })
            .await
            .unwrap();

        assert_eq!(path.file_name().unwrap(), "q3.csv");
        let parent = path.parent().unwrap();
        assert!(
            parent
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with(DOWNLOAD_DIR_PREFIX)
        );
        assert_eq!(std::fs::read(&path).unwrap(), b"a,b,c");

        std::fs::remove_dir_all(parent).unwrap();
    }

    #[tokio::test]
    async fn test_download_creates_given_directory() {
        let temp_dir = TempDir::new().unwrap();
        let directory = temp_dir.path().join("nested").join("out");

        let mut backend = MockObjectBackend::new();
        backend.expect_head_object().returning(|_, _| Ok(2));
        backend.expect_download().returning(|_, _, target, _| {
            std::fs::write(target, b"ok")?;
            Ok(2)
        });

        let settings = settings();
        let storage = ObjectStorage::new(&backend, &settings);
        let path = storage
            .download(&Download {
                key: "file.txt".into(),
                bucket_name: "data".into(),
                directory: Some(directory.clone()),
            })
            .await
            .unwrap();

        assert_eq!(path, directory.join("file.txt"));
        assert!(path.is_file());
    }

    #[tokio::test]
    async fn test_download_verification_failed() {
        let temp_dir = TempDir::new().unwrap();

        let mut backend = MockObjectBackend::new();
        backend.expect_head_object().returning(|_, _| Ok(0));
        backend.expect_download().returning(|_, _, _, _| Ok(0));

        let settings = settings();
        let storage = ObjectStorage::new(&backend, &settings);
        let err = storage
            .download(&Download {
                key: "missing.bin".into(),
                bucket_name: "data".into(),
                directory: Some(temp_dir.path().to_path_buf()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::DownloadVerificationFailed(_)));
    }

    #[tokio::test]
    async fn test_failed_download_removes_temporary_directory() {
        let written = Arc::new(std::sync::Mutex::new(None::<PathBuf>));
        let seen = written.clone();

        let mut backend = MockObjectBackend::new();
        backend.expect_head_object().returning(|_, _| Ok(10));
        backend
            .expect_download()
            .returning(move |_, _, target, _| {
                std::fs::write(target, b"part")?;
                *seen.lock().unwrap() = Some(target.to_path_buf());
                Err(Error::Network("connection reset".into()))
            });

        let settings = settings();
        let storage = ObjectStorage::new(&backend, &settings);
        let err = storage
            .download(&Download {
                key: "big.bin".into(),
                bucket_name: "data".into(),
                directory: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network(_)));

        let target = written.lock().unwrap().clone().unwrap();
        assert!(!target.exists());
        assert!(!target.parent().unwrap().exists());
    }

    #[tokio::test]
    async fn test_failed_download_keeps_given_directory() {
        let temp_dir = TempDir::new().unwrap();

        let mut backend = MockObjectBackend::new();
        backend.expect_head_object().returning(|_, _| Ok(10));
        backend.expect_download().returning(|_, _, target, _| {
            std::fs::write(target, b"part")?;
            Err(Error::service("InternalError", "try again"))
        });

        let settings = settings();
        let storage = ObjectStorage::new(&backend, &settings);
        let err = storage
            .download(&Download {
                key: "big.bin".into(),
                bucket_name: "data".into(),
                directory: Some(temp_dir.path().to_path_buf()),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("InternalError"));

        assert!(temp_dir.path().is_dir());
        assert!(!temp_dir.path().join("big.bin").exists());
    }

    #[tokio::test]
    async fn test_download_key_without_filename() {
        let mut backend = MockObjectBackend::new();
        backend.expect_head_object().never();

        let settings = settings();
        let storage = ObjectStorage::new(&backend, &settings);
        let err = storage
            .download(&Download {
                key: "folder/".into(),
                bucket_name: "data".into(),
                directory: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_upload_missing_source_makes_no_calls() {
        let temp_dir = TempDir::new().unwrap();

        let mut backend = MockObjectBackend::new();
        backend.expect_upload().times(0);

        let settings = settings();
        let storage = ObjectStorage::new(&backend, &settings);
        let err = storage
            .upload(&Upload {
                key: "k".into(),
                bucket_name: "data".into(),
                source: temp_dir.path().join("absent.bin"),
                extra_arguments: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::SourceNotFound(_)));
    }

    #[tokio::test]
    async fn test_upload_directory_source_rejected() {
        let temp_dir = TempDir::new().unwrap();

        let mut backend = MockObjectBackend::new();
        backend.expect_upload().times(0);

        let settings = settings();
        let storage = ObjectStorage::new(&backend, &settings);
        let err = storage
            .upload(&Upload {
                key: "k".into(),
                bucket_name: "data".into(),
                source: temp_dir.path().to_path_buf(),
                extra_arguments: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::SourceNotAFile(_)));
    }

    #[tokio::test]
    async fn test_upload_returns_stripped_key_and_size() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("payload.json");
        std::fs::write(&source, b"{\"hello\":\"world\"}").unwrap();

        let mut backend = MockObjectBackend::new();
        backend
            .expect_upload()
            .with(always(), eq("data"), eq("in/payload.json"), always(), always())
            .times(1)
            .returning(|_, _, _, arguments, _| {
                assert_eq!(arguments.content_type.as_deref(), Some("application/json"));
                Ok(())
            });

        let settings = settings();
        let storage = ObjectStorage::new(&backend, &settings);
        let (key, size) = storage
            .upload(&Upload {
                key: "/in/payload.json".into(),
                bucket_name: "data".into(),
                source,
                extra_arguments: json!({"ContentType": "application/json"})
                    .as_object()
                    .cloned(),
            })
            .await
            .unwrap();

        assert_eq!(key, "in/payload.json");
        assert_eq!(size, 17);
    }

    #[tokio::test]
    async fn test_upload_rejects_unknown_arguments_before_transfer() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("f");
        std::fs::write(&source, b"x").unwrap();

        let mut backend = MockObjectBackend::new();
        backend.expect_upload().never();

        let settings = settings();
        let storage = ObjectStorage::new(&backend, &settings);
        let err = storage
            .upload(&Upload {
                key: "f".into(),
                bucket_name: "data".into(),
                source,
                extra_arguments: json!({"Bogus": "1"}).as_object().cloned(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_delete_strips_key() {
        let mut backend = MockObjectBackend::new();
        backend
            .expect_delete_object()
            .with(eq("data"), eq("old/file.txt"))
            .times(1)
            .returning(|_, _| Ok(()));

        let settings = settings();
        let storage = ObjectStorage::new(&backend, &settings);
        storage
            .delete(&Delete {
                key: "/old/file.txt".into(),
                bucket_name: "data".into(),
            })
            .await
            .unwrap();
    }
}
