//! configure command - Store credentials for a profile
//!
//! Runs the same prompt used when credentials are missing, without first
//! trying to resolve existing ones.

use std::path::Path;

use serde::Serialize;
use skiff_core::{ConsolePrompt, CredentialFiles, Error, Settings, bootstrap};

use super::report;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

#[derive(Debug, Serialize)]
struct ConfigureOutput<'a> {
    profile: &'a str,
    region: &'a str,
    credentials_file: &'a Path,
    config_file: &'a Path,
}

/// Execute the configure command
pub fn execute(settings: Settings, formatter: &Formatter) -> ExitCode {
    let files = match CredentialFiles::new() {
        Ok(files) => files,
        Err(e) => return report(formatter, "Failed to locate AWS files", &e),
    };
    let profile = settings.profile_or_default();

    let stored = match bootstrap(&ConsolePrompt::new(), &files, profile) {
        Ok(Some(stored)) => stored,
        Ok(None) => {
            let e = Error::InvalidArgument("configure needs an interactive terminal".into());
            return report(formatter, "Cannot prompt for credentials", &e);
        }
        Err(e) => return report(formatter, "Failed to store credentials", &e),
    };

    if formatter.is_json() {
        formatter.json(&ConfigureOutput {
            profile,
            region: &stored.region,
            credentials_file: files.credentials_path(),
            config_file: files.config_path(),
        });
    } else {
        formatter.success(&format!(
            "Stored credentials for profile {} in {}",
            formatter.emphasis(profile),
            files.credentials_path().display()
        ));
    }

    ExitCode::Success
}
