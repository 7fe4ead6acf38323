//! Shared AWS credential and config files
//!
//! Writes the `~/.aws/credentials` and `~/.aws/config` files read by the AWS
//! CLI and SDKs. Field names must stay compatible with that tooling.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Overrides the credentials file location (same variable the AWS CLI reads)
pub const CREDENTIALS_FILE_ENV: &str = "AWS_SHARED_CREDENTIALS_FILE";

/// Overrides the config file location (same variable the AWS CLI reads)
pub const CONFIG_FILE_ENV: &str = "AWS_CONFIG_FILE";

/// Output format written to the config file
const OUTPUT_FORMAT: &str = "json";

/// Credentials collected during the interactive bootstrap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: String,
    pub region: String,
}

/// Locations of the credentials and config files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialFiles {
    credentials_path: PathBuf,
    config_path: PathBuf,
}

impl CredentialFiles {
    /// Resolve the standard locations, honoring the AWS CLI overrides
    pub fn new() -> Result<Self> {
        let aws_dir = || -> Result<PathBuf> {
            dirs::home_dir()
                .map(|home| home.join(".aws"))
                .ok_or_else(|| Error::Config("Could not determine home directory".into()))
        };

        let credentials_path = match std::env::var_os(CREDENTIALS_FILE_ENV) {
            Some(path) => PathBuf::from(path),
            None => aws_dir()?.join("credentials"),
        };
        let config_path = match std::env::var_os(CONFIG_FILE_ENV) {
            Some(path) => PathBuf::from(path),
            None => aws_dir()?.join("config"),
        };

        Ok(Self {
            credentials_path,
            config_path,
        })
    }

    /// Use explicit file locations (useful for testing)
    pub fn with_paths(credentials_path: PathBuf, config_path: PathBuf) -> Self {
        Self {
            credentials_path,
            config_path,
        }
    }

    pub fn credentials_path(&self) -> &Path {
        &self.credentials_path
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Persist credentials and region under `profile`
    ///
    /// Replaces an existing section of the same profile and keeps every other
    /// section untouched. Parent directories are created as needed.
    pub fn write_profile(&self, profile: &str, credentials: &StoredCredentials) -> Result<()> {
        let profile = if profile.is_empty() { "default" } else { profile };

        let mut document = IniDocument::load(&self.credentials_path)?;
        document.set_section(
            profile,
            vec![
                ("aws_access_key_id", credentials.access_key_id.clone()),
                ("aws_secret_access_key", credentials.secret_access_key.clone()),
                ("aws_session_token", quote(&credentials.session_token)),
                ("aws_expiration", credentials.expiration.clone()),
            ],
        );
        tracing::info!(
            "Writing AWS credentials file: {}",
            self.credentials_path.display()
        );
        document.save(&self.credentials_path)?;

        let mut document = IniDocument::load(&self.config_path)?;
        document.set_section(
            &config_section_name(profile),
            vec![
                ("region", credentials.region.clone()),
                ("output", OUTPUT_FORMAT.to_string()),
            ],
        );
        tracing::info!("Writing AWS config file: {}", self.config_path.display());
        document.save(&self.config_path)
    }
}

/// Section header used for a profile in the config file
///
/// The config file prefixes non-default profiles with `profile `; the
/// credentials file does not.
pub fn config_section_name(profile: &str) -> String {
    if profile == "default" {
        profile.to_string()
    } else {
        format!("profile {profile}")
    }
}

/// Wrap a value in double quotes without doubling existing ones
fn quote(value: &str) -> String {
    let inner = value.strip_prefix('"').unwrap_or(value);
    let inner = inner.strip_suffix('"').unwrap_or(inner);
    format!("\"{inner}\"")
}

/// Minimal INI document preserving sections it does not touch
#[derive(Debug, Default, Clone)]
pub struct IniDocument {
    preamble: Vec<String>,
    sections: Vec<(String, Vec<String>)>,
}

impl IniDocument {
    /// Parse INI text
    pub fn parse(content: &str) -> Self {
        let mut document = Self::default();

        for line in content.lines() {
            let trimmed = line.trim();
            if let Some(name) = trimmed
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
            {
                document.sections.push((name.trim().to_string(), Vec::new()));
                continue;
            }

            match document.sections.last_mut() {
                Some((_, lines)) => lines.push(line.to_string()),
                None => document.preamble.push(line.to_string()),
            }
        }

        document
    }

    /// Load a file, treating a missing file as empty
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace (or append) a section with the given key/value pairs
    pub fn set_section(&mut self, name: &str, entries: Vec<(&str, String)>) {
        let lines: Vec<String> = entries
            .into_iter()
            .map(|(key, value)| format!("{key} = {value}"))
            .collect();

        match self.sections.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = lines,
            None => self.sections.push((name.to_string(), lines)),
        }
    }

    /// Look up a value inside a section
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        let (_, lines) = self.sections.iter().find(|(n, _)| n == section)?;
        lines.iter().find_map(|line| {
            let (k, v) = line.split_once('=')?;
            (k.trim() == key).then(|| v.trim())
        })
    }

    /// Names of all sections in file order
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(n, _)| n.as_str())
    }

    /// Render back to INI text
    pub fn render(&self) -> String {
        let mut out = String::new();

        for line in self.preamble.iter().filter(|l| !l.trim().is_empty()) {
            out.push_str(line);
            out.push('\n');
        }

        for (name, lines) in &self.sections {
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = writeln!(out, "[{name}]");
            for line in lines.iter().filter(|l| !l.trim().is_empty()) {
                out.push_str(line);
                out.push('\n');
            }
        }

        out
    }

    /// Write to disk, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            tracing::info!("Creating AWS configuration directory: {}", parent.display());
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.render())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}
