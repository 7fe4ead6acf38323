//! Integration tests for the skiff CLI
//!
//! These tests require an S3-compatible server with an existing bucket.
//!
//! Run with:
//! ```bash
//! export TEST_S3_ENDPOINT=http://localhost:9000
//! export TEST_S3_ACCESS_KEY=accesskey
//! export TEST_S3_SECRET_KEY=secretkey
//! export TEST_S3_BUCKET=skiff-tests
//! cargo test -p skiff-cli --features integration
//! ```

#![cfg(feature = "integration")]

use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const PROFILE: &str = "skiff-integration";

struct TestEnv {
    dir: TempDir,
    endpoint: String,
    bucket: String,
}

impl TestEnv {
    /// Write credentials for the test server into isolated AWS files
    fn from_env() -> Option<Self> {
        let endpoint = std::env::var("TEST_S3_ENDPOINT").ok()?;
        let access_key = std::env::var("TEST_S3_ACCESS_KEY").ok()?;
        let secret_key = std::env::var("TEST_S3_SECRET_KEY").ok()?;
        let bucket = std::env::var("TEST_S3_BUCKET").ok()?;

        let dir = tempfile::tempdir().ok()?;
        std::fs::write(
            dir.path().join("credentials"),
            format!(
                "[{PROFILE}]\naws_access_key_id = {access_key}\naws_secret_access_key = {secret_key}\n"
            ),
        )
        .ok()?;
        std::fs::write(
            dir.path().join("config"),
            format!("[profile {PROFILE}]\nregion = us-east-2\n"),
        )
        .ok()?;

        Some(Self {
            dir,
            endpoint,
            bucket,
        })
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_skiff"))
            .args(args)
            .args([
                "--profile",
                PROFILE,
                "--region",
                "us-east-2",
                "--endpoint-url",
                &self.endpoint,
                "--suppress-insecure-warnings",
            ])
            .env("SKIFF_CONFIG_DIR", self.path())
            .env("AWS_SHARED_CREDENTIALS_FILE", self.path().join("credentials"))
            .env("AWS_CONFIG_FILE", self.path().join("config"))
            .stdin(Stdio::null())
            .output()
            .expect("Failed to execute skiff")
    }
}

fn unique_key(name: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("skiff-it-{:x}/{name}", nanos % 0xFFFF_FFFF)
}

#[test]
fn test_access_existing_bucket() {
    let Some(env) = TestEnv::from_env() else {
        eprintln!("Skipping: TEST_S3_* not set");
        return;
    };

    let output = env.run(&["access", &env.bucket, "--json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["accessible"], true);
}

#[test]
fn test_access_missing_bucket_exits_not_found() {
    let Some(env) = TestEnv::from_env() else {
        eprintln!("Skipping: TEST_S3_* not set");
        return;
    };

    let output = env.run(&["access", "skiff-no-such-bucket-7f3a", "--json"]);
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_put_ls_get_rm() {
    let Some(env) = TestEnv::from_env() else {
        eprintln!("Skipping: TEST_S3_* not set");
        return;
    };

    let source = env.path().join("notes.txt");
    std::fs::write(&source, "integration payload").unwrap();
    let key = unique_key("notes.txt");
    let prefix = key.rsplit_once('/').map(|(p, _)| p).unwrap_or_default();

    let output = env.run(&[
        "put",
        source.to_str().unwrap(),
        &env.bucket,
        &format!("/{key}"),
        "--metadata",
        "suite=integration",
        "--json",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["key"], key.as_str());
    assert_eq!(json["size_bytes"], 19);

    let output = env.run(&["ls", &env.bucket, prefix, "--json"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["key"], key.as_str());

    let out_dir = env.path().join("downloads");
    let output = env.run(&[
        "get",
        &env.bucket,
        &key,
        "--dir",
        out_dir.to_str().unwrap(),
        "--json",
    ]);
    assert!(output.status.success());
    assert_eq!(
        std::fs::read_to_string(out_dir.join("notes.txt")).unwrap(),
        "integration payload"
    );

    let output = env.run(&["rm", &env.bucket, &key]);
    assert!(output.status.success());

    let output = env.run(&["ls", &env.bucket, prefix, "--json"]);
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json["items"].as_array().unwrap().is_empty());
}

#[test]
fn test_get_missing_object_exits_not_found() {
    let Some(env) = TestEnv::from_env() else {
        eprintln!("Skipping: TEST_S3_* not set");
        return;
    };

    let key = unique_key("absent.bin");
    let output = env.run(&["get", &env.bucket, &key]);
    assert_eq!(output.status.code(), Some(5));
}
