//! ls command - List objects under a prefix

use clap::Args;
use jiff::Timestamp;
use serde::Serialize;
use skiff_aws::S3Service;
use skiff_core::{List, ObjectEntry, Settings};

use super::report;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// List objects
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Bucket name
    pub bucket: String,

    /// Key prefix; a leading '/' is ignored
    #[arg(default_value = "")]
    pub prefix: String,

    /// Summarize output (show totals)
    #[arg(long)]
    pub summarize: bool,
}

/// Output structure for ls command (JSON format)
#[derive(Debug, Serialize)]
struct LsOutput {
    items: Vec<ObjectEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Summary>,
}

#[derive(Debug, Serialize)]
struct Summary {
    total_objects: usize,
    total_size_bytes: i64,
    total_size_human: String,
}

impl Summary {
    fn of(entries: &[ObjectEntry]) -> Self {
        let total_size_bytes: i64 = entries.iter().map(|e| e.size).sum();
        Self {
            total_objects: entries.len(),
            total_size_bytes,
            total_size_human: humansize::format_size(
                total_size_bytes.max(0) as u64,
                humansize::BINARY,
            ),
        }
    }
}

/// Execute the ls command
pub async fn execute(args: LsArgs, settings: Settings, formatter: &Formatter) -> ExitCode {
    let s3 = S3Service::new(settings);
    let config = List {
        key: args.prefix.clone(),
        bucket_name: args.bucket.clone(),
    };

    let entries = match s3.list(&config).await {
        Ok(entries) => entries,
        Err(e) => {
            return report(
                formatter,
                &format!("Failed to list objects in {}", args.bucket),
                &e,
            );
        }
    };

    let summary = args.summarize.then(|| Summary::of(&entries));

    if formatter.is_json() {
        formatter.json(&LsOutput {
            items: entries,
            summary,
        });
        return ExitCode::Success;
    }

    if !entries.is_empty() {
        let mut table = formatter.table(&["Last Modified", "Size", "Class", "Key"]);
        for entry in &entries {
            table.add_row(vec![
                format_modified(entry.last_modified),
                entry.size_human(),
                entry.storage_class.clone().unwrap_or_default(),
                entry.key.clone(),
            ]);
        }
        formatter.println(&table.to_string());
    }

    if let Some(summary) = summary {
        formatter.println(&formatter.muted(&format!(
            "Total: {} objects, {}",
            summary.total_objects, summary.total_size_human
        )));
    }

    ExitCode::Success
}

/// Render epoch seconds as a UTC timestamp
fn format_modified(seconds: Option<f64>) -> String {
    seconds
        .and_then(|s| Timestamp::from_millisecond((s * 1000.0) as i64).ok())
        .map(|t| t.strftime("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}
