//! Exit codes for CLI operations following Unix conventions.
//!
//! # Exit Code Semantics
//!
//! - `0`: Success, including queries that legitimately match nothing
//! - `1`: General error
//! - `3`: Address, package or symbol not found
//! - `4`: Malformed address
//! - `5`: File I/O error while loading
//! - `6`: Configuration error
//! - `8`: Malformed pattern or scope expression

use crate::error::{LoadError, SpathError};

/// Standard exit codes for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Operation succeeded (code 0)
    Success = 0,

    /// Unspecified error occurred (code 1)
    GeneralError = 1,

    /// Address did not resolve (code 3)
    NotFound = 3,

    /// Address failed to parse (code 4)
    ParseError = 4,

    /// File I/O error (code 5)
    IoError = 5,

    /// Configuration error (code 6)
    ConfigError = 6,

    /// Invalid wildcard pattern or scope expression (code 8)
    InvalidPattern = 8,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl ExitCode {
    /// `Success` when a query produced something, `NotFound` otherwise.
    pub fn from_found(found: bool) -> Self {
        if found {
            ExitCode::Success
        } else {
            ExitCode::NotFound
        }
    }

    /// Map an error to the exit code scripts can branch on.
    pub fn from_error(error: &SpathError) -> Self {
        match error {
            SpathError::Resolve(_) => ExitCode::NotFound,
            SpathError::Parse(_) => ExitCode::ParseError,
            SpathError::Pattern(_) | SpathError::Scope(_) => ExitCode::InvalidPattern,
            SpathError::Load(LoadError::Io { .. }) => ExitCode::IoError,
            SpathError::Load(LoadError::NoPackages { .. }) => ExitCode::NotFound,
            SpathError::Config { .. } => ExitCode::ConfigError,
            SpathError::Load(_) | SpathError::General(_) => ExitCode::GeneralError,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }

    /// Get a human-readable description of the exit code.
    pub fn description(&self) -> &str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::NotFound => "Not found",
            ExitCode::ParseError => "Parse error",
            ExitCode::IoError => "I/O error",
            ExitCode::ConfigError => "Configuration error",
            ExitCode::InvalidPattern => "Invalid pattern",
        }
    }
}
