//! put command - Upload a local file

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use serde_json::{Map, Value};
use skiff_aws::S3Service;
use skiff_core::{Error, Settings, Upload};

use super::report;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Upload a local file to a bucket
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Local file to upload
    pub source: PathBuf,

    /// Bucket name
    pub bucket: String,

    /// Object key; defaults to the source file name
    pub key: Option<String>,

    /// Content type; guessed from the file extension when omitted
    #[arg(long)]
    pub content_type: Option<String>,

    /// Storage class (e.g. STANDARD_IA, GLACIER)
    #[arg(long)]
    pub storage_class: Option<String>,

    /// User metadata as KEY=VALUE (repeatable)
    #[arg(long = "metadata", value_name = "KEY=VALUE", value_parser = parse_metadata)]
    pub metadata: Vec<(String, String)>,

    /// Extra upload arguments as a JSON object, e.g. '{"CacheControl": "no-cache"}'
    #[arg(long, value_name = "JSON", value_parser = parse_extra_args)]
    pub extra_args: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
struct PutOutput<'a> {
    status: &'static str,
    bucket: &'a str,
    key: String,
    size_bytes: u64,
    size_human: String,
}

impl PutArgs {
    /// Requested key, or the source file name
    fn object_key(&self) -> skiff_core::Result<String> {
        if let Some(key) = &self.key {
            return Ok(key.clone());
        }
        self.source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "Cannot derive an object key from {}",
                    self.source.display()
                ))
            })
    }

    /// Merge the dedicated flags into the extra-arguments map
    fn extra_arguments(&self) -> Option<Map<String, Value>> {
        let mut map = self.extra_args.clone().unwrap_or_default();

        let content_type = self.content_type.clone().or_else(|| {
            (!map.contains_key("ContentType"))
                .then(|| mime_guess::from_path(&self.source).first())
                .flatten()
                .map(|mime| mime.essence_str().to_string())
        });
        if let Some(content_type) = content_type {
            map.insert("ContentType".into(), Value::String(content_type));
        }

        if let Some(class) = &self.storage_class {
            map.insert("StorageClass".into(), Value::String(class.clone()));
        }

        if !self.metadata.is_empty() {
            let entry = map
                .entry("Metadata")
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(metadata) = entry {
                for (name, value) in &self.metadata {
                    metadata.insert(name.clone(), Value::String(value.clone()));
                }
            }
        }

        (!map.is_empty()).then_some(map)
    }
}

fn parse_metadata(input: &str) -> Result<(String, String), String> {
    match input.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{input}'")),
    }
}

fn parse_extra_args(input: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(input) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("extra arguments must be a JSON object".to_string()),
        Err(e) => Err(format!("invalid JSON: {e}")),
    }
}

/// Execute the put command
pub async fn execute(args: PutArgs, settings: Settings, formatter: &Formatter) -> ExitCode {
    let key = match args.object_key() {
        Ok(key) => key,
        Err(e) => return report(formatter, "Invalid upload", &e),
    };

    let s3 = S3Service::new(settings);
    let config = Upload {
        key,
        bucket_name: args.bucket.clone(),
        source: args.source.clone(),
        extra_arguments: args.extra_arguments(),
    };

    match s3.upload(&config).await {
        Ok((key, size)) => {
            let size_human = humansize::format_size(size, humansize::BINARY);
            if formatter.is_json() {
                formatter.json(&PutOutput {
                    status: "success",
                    bucket: &args.bucket,
                    key,
                    size_bytes: size,
                    size_human,
                });
            } else {
                formatter.success(&format!(
                    "Uploaded {} to s3://{}/{} {}",
                    args.source.display(),
                    args.bucket,
                    formatter.emphasis(&key),
                    formatter.muted(&format!("({size_human})"))
                ));
            }
            ExitCode::Success
        }
        Err(e) => report(
            formatter,
            &format!("Failed to upload {}", args.source.display()),
            &e,
        ),
    }
}
