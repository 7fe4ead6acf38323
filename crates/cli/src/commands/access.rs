//! access command - Probe a bucket

use clap::Args;
use serde::Serialize;
use skiff_aws::S3Service;
use skiff_core::{AccessOutcome, Settings};

use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Check bucket access
#[derive(Args, Debug)]
pub struct AccessArgs {
    /// Bucket name
    pub bucket: String,
}

#[derive(Debug, Serialize)]
struct AccessOutput<'a> {
    bucket: &'a str,
    accessible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

/// Execute the access command
pub async fn execute(args: AccessArgs, settings: Settings, formatter: &Formatter) -> ExitCode {
    let outcome = S3Service::new(settings).access_outcome(&args.bucket).await;

    let reason = match &outcome {
        AccessOutcome::Granted => None,
        AccessOutcome::Denied(denial) => Some(denial.to_string()),
    };

    if formatter.is_json() {
        formatter.json(&AccessOutput {
            bucket: &args.bucket,
            accessible: outcome.is_granted(),
            reason,
        });
    } else {
        let bucket = formatter.emphasis(&args.bucket);
        match &reason {
            None => formatter.success(&format!("Bucket {bucket} is accessible")),
            Some(reason) => formatter.error(&format!("Bucket {bucket} is not accessible: {reason}")),
        }
    }

    match &outcome {
        AccessOutcome::Granted => ExitCode::Success,
        AccessOutcome::Denied(denial) => ExitCode::from(denial),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: AccessArgs,
    }

    #[test]
    fn test_requires_bucket() {
        assert!(Harness::try_parse_from(["access"]).is_err());
        let harness = Harness::try_parse_from(["access", "data"]).unwrap();
        assert_eq!(harness.args.bucket, "data");
    }

    #[test]
    fn test_output_omits_reason_when_granted() {
        let json = serde_json::to_value(AccessOutput {
            bucket: "data",
            accessible: true,
            reason: None,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "bucket": "data", "accessible": true }));
    }
}
