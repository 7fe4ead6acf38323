//! Exit code definitions for the skiff CLI
//!
//! Scripts rely on these values; changing one is a breaking change.

use skiff_core::{AccessDenial, Error};

/// Exit codes for the skiff CLI application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed successfully
    Success = 0,

    /// General/unspecified error
    GeneralError = 1,

    /// User input error: invalid arguments, region, endpoint, etc.
    UsageError = 2,

    /// Network or service error: timeout, connection reset, 503, etc.
    NetworkError = 3,

    /// Missing, expired or rejected credentials
    AuthError = 4,

    /// Resource not found: local source, bucket or object does not exist
    NotFound = 5,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Create exit code from i32 value
    ///
    /// Returns None if the value doesn't correspond to a known exit code.
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            3 => Some(Self::NetworkError),
            4 => Some(Self::AuthError),
            5 => Some(Self::NotFound),
            _ => None,
        }
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::GeneralError => "General error",
            Self::UsageError => "Invalid arguments or configuration",
            Self::NetworkError => "Network or service error",
            Self::AuthError => "Authentication failure",
            Self::NotFound => "Resource not found",
        }
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        Self::from_i32(err.exit_code()).unwrap_or(Self::GeneralError)
    }
}

impl From<&AccessDenial> for ExitCode {
    fn from(denial: &AccessDenial) -> Self {
        match denial {
            AccessDenial::ExpiredToken | AccessDenial::BadRequest => Self::AuthError,
            AccessDenial::NoSuchBucket => Self::NotFound,
            AccessDenial::Other(_) => Self::GeneralError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}
