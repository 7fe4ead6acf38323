//! rm command - Remove an object

use clap::Args;
use serde::Serialize;
use skiff_aws::S3Service;
use skiff_core::{Delete, Settings};

use super::report;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Remove a single object
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Bucket name
    pub bucket: String,

    /// Object key
    pub key: String,
}

#[derive(Debug, Serialize)]
struct RmOutput<'a> {
    status: &'static str,
    bucket: &'a str,
    key: &'a str,
}

/// Execute the rm command
///
/// S3 reports success for keys that do not exist, so this does too.
pub async fn execute(args: RmArgs, settings: Settings, formatter: &Formatter) -> ExitCode {
    let s3 = S3Service::new(settings);
    let config = Delete {
        key: args.key.clone(),
        bucket_name: args.bucket.clone(),
    };

    match s3.delete(&config).await {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&RmOutput {
                    status: "success",
                    bucket: &args.bucket,
                    key: &args.key,
                });
            } else {
                formatter.success(&format!("Removed {}", formatter.emphasis(&args.key)));
            }
            ExitCode::Success
        }
        Err(e) => report(formatter, &format!("Failed to remove {}", args.key), &e),
    }
}
