//! Operation configurations and result records
//!
//! Configurations are plain carriers; the operation that consumes one is
//! responsible for validating it.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Download an object into a local directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub key: String,
    pub bucket_name: String,
    /// Target directory; a fresh temporary directory when `None`
    pub directory: Option<PathBuf>,
}

/// Upload a local file to a bucket
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub key: String,
    pub bucket_name: String,
    pub source: PathBuf,
    /// Per-object transfer arguments keyed by S3 request field (`ContentType`, `Metadata`, ...)
    pub extra_arguments: Option<Map<String, Value>>,
}

impl Upload {
    /// Check everything an upload needs locally, before any network activity
    ///
    /// The source must exist and be a regular file (checked in that order),
    /// and every extra argument must be supported.
    pub fn validate(&self) -> Result<UploadArguments> {
        if !self.source.exists() {
            return Err(Error::SourceNotFound(self.source.clone()));
        }
        if !self.source.is_file() {
            return Err(Error::SourceNotAFile(self.source.clone()));
        }

        match &self.extra_arguments {
            Some(map) => UploadArguments::from_map(map),
            None => Ok(UploadArguments::default()),
        }
    }
}

/// Delete a single object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delete {
    pub key: String,
    pub bucket_name: String,
}

/// List objects under a prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    /// Prefix to list under
    pub key: String,
    pub bucket_name: String,
}

/// Metadata for one listed object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub key: String,

    /// Size in bytes
    pub size: i64,

    /// Last modified time in seconds since the Unix epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

impl ObjectEntry {
    pub fn new(key: impl Into<String>, size: i64) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified: None,
            etag: None,
            storage_class: None,
        }
    }

    /// Human-readable size
    pub fn size_human(&self) -> String {
        humansize::format_size(self.size.max(0) as u64, humansize::BINARY)
    }
}

/// One page of a listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage {
    pub entries: Vec<ObjectEntry>,
    /// Token for the next page, `None` on the last page
    pub next_token: Option<String>,
}

/// Identity behind the active credentials
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Typed view of the upload extra arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadArguments {
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    pub content_disposition: Option<String>,
    pub content_encoding: Option<String>,
    pub content_language: Option<String>,
    pub storage_class: Option<String>,
    pub acl: Option<String>,
    pub server_side_encryption: Option<String>,
    pub sse_kms_key_id: Option<String>,
    pub tagging: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl UploadArguments {
    /// Parse `ExtraArgs`-style keys, rejecting anything unsupported
    pub fn from_map(map: &Map<String, Value>) -> Result<Self> {
        let mut args = Self::default();

        for (key, value) in map {
            let slot = match key.as_str() {
                "ContentType" => &mut args.content_type,
                "CacheControl" => &mut args.cache_control,
                "ContentDisposition" => &mut args.content_disposition,
                "ContentEncoding" => &mut args.content_encoding,
                "ContentLanguage" => &mut args.content_language,
                "StorageClass" => &mut args.storage_class,
                "ACL" => &mut args.acl,
                "ServerSideEncryption" => &mut args.server_side_encryption,
                "SSEKMSKeyId" => &mut args.sse_kms_key_id,
                "Tagging" => &mut args.tagging,
                "Metadata" => {
                    let entries = value.as_object().ok_or_else(|| {
                        Error::InvalidArgument("Metadata must be an object".into())
                    })?;
                    for (name, v) in entries {
                        args.metadata.insert(name.clone(), string_value(name, v)?);
                    }
                    continue;
                }
                other => {
                    return Err(Error::InvalidArgument(format!(
                        "Unsupported upload argument: {other}"
                    )));
                }
            };
            *slot = Some(string_value(key, value)?);
        }

        Ok(args)
    }
}

fn string_value(key: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidArgument(format!("{key} must be a string")))
}

/// Remove one leading `/` from a key or prefix
pub fn strip_leading_separator(key: &str) -> &str {
    key.strip_prefix('/').unwrap_or(key)
}
