//! Interactive credential bootstrap
//!
//! When no credentials resolve, an interactive user is asked for them and the
//! answers are persisted to the shared credential files. The prompt is a trait
//! so automated contexts can supply their own implementation.

use std::io::{BufRead, Write};

use crate::credentials::{CredentialFiles, StoredCredentials};
use crate::error::{Error, Result};
use crate::terminal;

/// Source of credentials when none can be resolved
#[cfg_attr(test, mockall::automock)]
pub trait CredentialPrompt: Send + Sync {
    /// Whether a user is available to answer
    fn is_interactive(&self) -> bool;

    /// Ask for credentials
    fn prompt(&self) -> Result<StoredCredentials>;
}

/// Prompt reading plain-text answers from stdin
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePrompt;

impl ConsolePrompt {
    pub fn new() -> Self {
        Self
    }

    /// Print guidance to `output` and read the five answers from `input`
    pub fn read_from(
        &self,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> Result<StoredCredentials> {
        write_guidance(output)?;

        Ok(StoredCredentials {
            access_key_id: ask(input, output, "AWS Access Key ID: ")?,
            secret_access_key: ask(input, output, "AWS Secret Access Key: ")?,
            session_token: ask(input, output, "AWS Session Token: ")?,
            expiration: ask(input, output, "AWS Session Expiration: ")?,
            region: ask(input, output, "AWS Region: ")?,
        })
    }
}

impl CredentialPrompt for ConsolePrompt {
    fn is_interactive(&self) -> bool {
        terminal::stdin_is_interactive()
    }

    fn prompt(&self) -> Result<StoredCredentials> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        self.read_from(&mut stdin.lock(), &mut stdout.lock())
    }
}

fn write_guidance(output: &mut impl Write) -> Result<()> {
    writeln!(output)?;
    writeln!(output, "{}", terminal::red("No AWS Credentials Were Found"))?;
    writeln!(output)?;
    writeln!(
        output,
        "{}",
        terminal::underline("Credentials can be retrieved via the AWS-CLI:")
    )?;
    writeln!(output)?;

    for field in [
        "aws_access_key_id",
        "aws_secret_access_key",
        "aws_session_token",
        "aws_expiration",
        "region",
    ] {
        writeln!(
            output,
            "{}{}",
            terminal::dim("  $ "),
            terminal::bold(&format!("aws configure get {field}"))
        )?;
        writeln!(output)?;
    }

    Ok(())
}

fn ask(input: &mut impl BufRead, output: &mut impl Write, label: &str) -> Result<String> {
    write!(output, "{label}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(Error::NoCredentials);
    }
    Ok(line.trim().to_string())
}

/// Run the interactive bootstrap for `profile`
///
/// Returns `None` without side effects when the prompt is not interactive.
/// Otherwise collects credentials, writes them to `files` and returns them.
/// The region is persisted for other tools; clients keep using the region
/// from their `Settings`.
pub fn bootstrap(
    prompt: &dyn CredentialPrompt,
    files: &CredentialFiles,
    profile: &str,
) -> Result<Option<StoredCredentials>> {
    if !prompt.is_interactive() {
        tracing::debug!("No interactive input available, skipping credential prompt");
        return Ok(None);
    }

    let credentials = prompt.prompt()?;
    files.write_profile(profile, &credentials)?;

    Ok(Some(credentials))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::IniDocument;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn temp_files(dir: &TempDir) -> CredentialFiles {
        CredentialFiles::with_paths(
            dir.path().join("aws").join("credentials"),
            dir.path().join("aws").join("config"),
        )
    }

    fn answers() -> StoredCredentials {
        StoredCredentials {
            access_key_id: "AKIAEXAMPLE".into(),
            secret_access_key: "secret".into(),
            session_token: "abc123".into(),
            expiration: "2026-10-19T12:00:00Z".into(),
            region: "us-east-2".into(),
        }
    }

    #[test]
    fn test_console_prompt_reads_trimmed_lines() {
        let mut input = Cursor::new("  AKIA \nsecret\ntoken\n2026-10-19\nus-east-2\n");
        let mut output = Vec::new();

        let credentials = ConsolePrompt::new()
            .read_from(&mut input, &mut output)
            .unwrap();

        assert_eq!(credentials.access_key_id, "AKIA");
        assert_eq!(credentials.secret_access_key, "secret");
        assert_eq!(credentials.session_token, "token");
        assert_eq!(credentials.expiration, "2026-10-19");
        assert_eq!(credentials.region, "us-east-2");

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("No AWS Credentials Were Found"));
        assert!(printed.contains("aws configure get aws_session_token"));
        assert!(printed.contains("AWS Region: "));
    }

    #[test]
    fn test_console_prompt_eof() {
        let mut input = Cursor::new("AKIA\n");
        let mut output = Vec::new();

        let result = ConsolePrompt::new().read_from(&mut input, &mut output);
        assert!(matches!(result, Err(Error::NoCredentials)));
    }

    #[test]
    fn test_bootstrap_not_interactive() {
        let dir = TempDir::new().unwrap();
        let files = temp_files(&dir);

        let mut prompt = MockCredentialPrompt::new();
        prompt.expect_is_interactive().return_const(false);
        prompt.expect_prompt().times(0);

        let result = bootstrap(&prompt, &files, "default").unwrap();
        assert!(result.is_none());
        assert!(!files.credentials_path().exists());
    }

    #[test]
    fn test_bootstrap_writes_profile() {
        let dir = TempDir::new().unwrap();
        let files = temp_files(&dir);

        let mut prompt = MockCredentialPrompt::new();
        prompt.expect_is_interactive().return_const(true);
        prompt.expect_prompt().times(1).returning(|| Ok(answers()));

        let result = bootstrap(&prompt, &files, "work").unwrap();
        assert_eq!(result.unwrap().region, "us-east-2");

        let credentials = std::fs::read_to_string(files.credentials_path()).unwrap();
        assert!(credentials.contains("aws_session_token = \"abc123\""));

        let config = IniDocument::load(files.config_path()).unwrap();
        assert_eq!(config.get("profile work", "region"), Some("us-east-2"));
        assert_eq!(config.get("profile work", "output"), Some("json"));
    }
}
