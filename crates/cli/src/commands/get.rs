//! get command - Download an object

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use skiff_aws::S3Service;
use skiff_core::{Download, Settings};

use super::report;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Download an object into a local directory
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Bucket name
    pub bucket: String,

    /// Object key
    pub key: String,

    /// Target directory, created if missing; a new temporary directory otherwise
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct GetOutput<'a> {
    bucket: &'a str,
    key: &'a str,
    path: PathBuf,
}

/// Execute the get command
pub async fn execute(args: GetArgs, settings: Settings, formatter: &Formatter) -> ExitCode {
    let s3 = S3Service::new(settings);
    let config = Download {
        key: args.key.clone(),
        bucket_name: args.bucket.clone(),
        directory: args.dir.clone(),
    };

    match s3.download(&config).await {
        Ok(path) => {
            if formatter.is_json() {
                formatter.json(&GetOutput {
                    bucket: &args.bucket,
                    key: &args.key,
                    path,
                });
            } else {
                formatter.success(&format!(
                    "Downloaded {} to {}",
                    formatter.emphasis(&args.key),
                    path.display()
                ));
            }
            ExitCode::Success
        }
        Err(e) => report(formatter, &format!("Failed to download {}", args.key), &e),
    }
}
