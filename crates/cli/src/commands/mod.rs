//! CLI command definitions and execution
//!
//! Global flags are layered over the defaults file to build the `Settings`
//! every command runs with.

use clap::{Args, Parser, Subcommand, ValueEnum};
use skiff_core::config::Defaults;
use skiff_core::terminal::{self, ColorMode};
use skiff_core::{ConfigManager, Error, Settings};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod access;
mod completions;
mod configure;
mod get;
mod ls;
mod put;
mod rm;
mod whoami;

/// skiff - credential-aware AWS object storage client
///
/// Resolves credentials from the shared AWS files, prompting for them when
/// none are found, and runs object operations against S3.
#[derive(Parser, Debug)]
#[command(name = "skiff")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags accepted by every subcommand
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// Credential profile to use
    #[arg(long, global = true, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// AWS region
    #[arg(long, global = true, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Custom S3 endpoint URL
    #[arg(long, global = true, env = "SKIFF_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Do not warn about unencrypted transport to an http:// endpoint
    #[arg(long, global = true)]
    pub suppress_insecure_warnings: bool,

    /// Output format: human-readable or JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Disable progress bar
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log verbosity
    #[arg(long, global = true, value_enum, ignore_case = true)]
    pub log_level: Option<LogLevel>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Levels accepted by `--log-level`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Error,
}

impl LogLevel {
    pub const fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Error => "error",
        }
    }
}

impl GlobalArgs {
    /// Log filter directive requested by flags, if any
    pub fn log_directive(&self) -> Option<&'static str> {
        if self.debug {
            Some(LogLevel::Debug.as_directive())
        } else {
            self.log_level.map(LogLevel::as_directive)
        }
    }

    /// Settings from flags (and their environment variables) over file defaults
    pub fn settings(&self, defaults: &Defaults) -> skiff_core::Result<Settings> {
        let profile = self.profile.clone().or_else(|| defaults.profile.clone());
        let region = self.region.clone().or_else(|| defaults.region.clone());

        let mut settings = Settings::new(profile, region)?
            .with_insecure_warnings_suppressed(self.suppress_insecure_warnings)
            .with_progress(defaults.progress && !self.no_progress && !self.json && !self.quiet);

        if let Some(endpoint) = self
            .endpoint_url
            .as_deref()
            .or(defaults.endpoint.as_deref())
        {
            settings = settings.with_endpoint(endpoint)?;
        }

        Ok(settings)
    }

    pub fn output_config(&self, defaults: &Defaults) -> OutputConfig {
        OutputConfig {
            json: self.json || defaults.output == "json",
            no_color: self.no_color || ColorMode::from_name(&defaults.color) == ColorMode::Never,
            force_color: ColorMode::from_name(&defaults.color) == ColorMode::Always,
            quiet: self.quiet,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the identity behind the active credentials
    Whoami,

    /// Check whether a bucket exists and is accessible
    Access(access::AccessArgs),

    /// List objects under a prefix
    Ls(ls::LsArgs),

    /// Download an object
    Get(get::GetArgs),

    /// Upload a local file
    Put(put::PutArgs),

    /// Remove an object
    Rm(rm::RmArgs),

    /// Prompt for credentials and store them in the shared AWS files
    Configure,

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let Cli { global, command } = cli;

    if let Commands::Completions(args) = &command {
        return completions::execute(args);
    }

    let defaults = match ConfigManager::new().and_then(|manager| {
        tracing::debug!("Loading defaults from {}", manager.config_path().display());
        manager.load()
    }) {
        Ok(config) => config.defaults,
        Err(e) => {
            Formatter::new(global.output_config(&Defaults::default()))
                .error(&format!("Failed to load configuration: {e}"));
            return ExitCode::from(&e);
        }
    };

    let output = global.output_config(&defaults);
    terminal::set_color_mode(output.color_mode());
    let formatter = Formatter::new(output);
    let settings = match global.settings(&defaults) {
        Ok(settings) => settings,
        Err(e) => return report(&formatter, "Invalid settings", &e),
    };

    match command {
        Commands::Whoami => whoami::execute(settings, &formatter).await,
        Commands::Access(args) => access::execute(args, settings, &formatter).await,
        Commands::Ls(args) => ls::execute(args, settings, &formatter).await,
        Commands::Get(args) => get::execute(args, settings, &formatter).await,
        Commands::Put(args) => put::execute(args, settings, &formatter).await,
        Commands::Rm(args) => rm::execute(args, settings, &formatter).await,
        Commands::Configure => configure::execute(settings, &formatter),
        Commands::Completions(_) => ExitCode::Success,
    }
}

/// Print `err` with context and map it to an exit code
fn report(formatter: &Formatter, context: &str, err: &Error) -> ExitCode {
    formatter.error(&format!("{context}: {err}"));
    ExitCode::from(err)
}
