//! Error types for skiff-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for skiff-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for skiff operations
#[derive(Error, Debug)]
pub enum Error {
    /// Settings rejected at construction (e.g. region outside the allow-list)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The base service was used without a concrete service identifier
    #[error("Service identifier missing: the base service has no target service")]
    ServiceIdentifierMissing,

    /// No credentials could be resolved, even after the interactive bootstrap
    #[error("No AWS credentials were found")]
    NoCredentials,

    /// Upload source does not exist
    #[error("Source does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Upload source exists but is not a regular file
    #[error("Source isn't a valid file: {}", .0.display())]
    SourceNotAFile(PathBuf),

    /// Downloaded target is missing or not a regular file
    #[error("Downloaded file does not exist or isn't a valid file: {}", .0.display())]
    DownloadVerificationFailed(PathBuf),

    /// Error reported by the remote service, carrying its machine-readable code
    #[error("Service error ({code}): {message}")]
    Service { code: String, message: String },

    /// Transport failure with no service response (timeout, DNS, TLS)
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid argument supplied by the caller
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Build a service error from a code and message
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Service {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Machine-readable service code, if this error came from the service
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Service { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidConfiguration(_)
            | Error::InvalidArgument(_)
            | Error::Config(_)
            | Error::InvalidUrl(_)
            | Error::SourceNotAFile(_) => 2, // UsageError
            Error::Network(_) => 3, // NetworkError
            Error::NoCredentials => 4, // AuthError
            Error::SourceNotFound(_) => 5, // NotFound
            Error::Service { code, .. } => match code.as_str() {
                "ExpiredToken" | "AccessDenied" | "InvalidAccessKeyId" | "403" => 4,
                "NoSuchBucket" | "NoSuchKey" | "NotFound" | "404" => 5,
                _ => 3,
            },
            _ => 1, // GeneralError
        }
    }
}
