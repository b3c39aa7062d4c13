//! Error types for the semantic addressing engine
//!
//! This module provides structured error types using thiserror, one enum per
//! concern, plus the umbrella [`SpathError`] used at the command layer.

use std::path::PathBuf;
use thiserror::Error;

/// Malformed address syntax. Always fatal to the request that produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty address")]
    Empty,

    #[error("Address '{input}' names a symbol but no package")]
    MissingPackage { input: String },

    #[error("Address '{input}' ends with '.' but names no symbol")]
    MissingSymbol { input: String },

    #[error("Address '{input}' contains doubled delimiter '{delimiter}'")]
    DoubledDelimiter {
        input: String,
        delimiter: &'static str,
    },

    #[error("Address '{input}' has an empty path component")]
    EmptyComponent { input: String },

    #[error("Address '{input}' has an empty selector '[]'")]
    EmptySelector { input: String },

    #[error("Address '{input}' has an unclosed '['")]
    UnclosedBracket { input: String },

    #[error("Address '{input}' has an unmatched ']'")]
    UnmatchedBracket { input: String },

    #[error("Address '{input}' has a selector with no preceding category")]
    MissingCategory { input: String },

    #[error("Unknown category '{category}' in '{input}'")]
    UnknownCategory { input: String, category: String },

    #[error("Invalid selector '{selector}' in '{input}'")]
    InvalidSelector { input: String, selector: String },

    #[error("Invalid identifier '{ident}' in '{input}'")]
    InvalidIdentifier { input: String, ident: String },

    #[error("Invalid package path component '{component}' in '{input}'")]
    InvalidComponent { input: String, component: String },
}

/// Malformed wildcard pattern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("Empty pattern")]
    Empty,

    #[error("Pattern '{pattern}' contains a run of more than two '*'")]
    StarRun { pattern: String },

    #[error("Pattern '{pattern}' has unbalanced brackets")]
    UnbalancedBrackets { pattern: String },

    #[error("Pattern '{pattern}' could not be compiled: {reason}")]
    Compile { pattern: String, reason: String },
}

/// Failure to locate an address in the loaded program.
///
/// Every variant past the symbol stage carries `resolved`, the longest prefix
/// of the address that did resolve.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Package '{package}' not found")]
    PackageNotFound { package: String },

    #[error("Symbol '{symbol}' not found in package '{package}'")]
    SymbolNotFound { package: String, symbol: String },

    #[error("Type '{resolved}' has no method '{method}'")]
    MethodNotFound { resolved: String, method: String },

    #[error("'{resolved}' ({node}) has no '{category}' children")]
    InvalidCategory {
        resolved: String,
        node: &'static str,
        category: String,
    },

    #[error("Category '{category}' on '{resolved}' requires a selector")]
    MissingSelector { resolved: String, category: String },

    #[error("Category '{category}' on '{resolved}' does not take a selector")]
    UnexpectedSelector { resolved: String, category: String },

    #[error("'{resolved}' has no {category}")]
    MissingChild { resolved: String, category: String },

    #[error("'{resolved}' has no {category} '{selector}'")]
    ChildNotFound {
        resolved: String,
        category: String,
        selector: String,
    },

    #[error("'{name}' is ambiguous: {}", candidates.join(", "))]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },
}

impl ResolveError {
    /// The part of the address that resolved before the failure, if any.
    pub fn partial(&self) -> Option<&str> {
        match self {
            Self::MethodNotFound { resolved, .. }
            | Self::InvalidCategory { resolved, .. }
            | Self::MissingSelector { resolved, .. }
            | Self::UnexpectedSelector { resolved, .. }
            | Self::MissingChild { resolved, .. }
            | Self::ChildNotFound { resolved, .. } => Some(resolved),
            Self::SymbolNotFound { package, .. } => Some(package),
            _ => None,
        }
    }

    /// Misses are recoverable through suggestions; syntax errors are not.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Parse(_))
    }
}

/// Invalid scope expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    #[error("Keyword '{keyword}' cannot be negated")]
    NegatedKeyword { keyword: String },

    #[error("Scope token '{token}' is empty after '-'")]
    EmptyExclusion { token: String },

    #[error("Scope keyword 'package' needs a default target package")]
    MissingDefaultTarget,

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Failure to load a program from disk.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to initialize Go parser: {reason}")]
    ParserInit { reason: String },

    #[error("No Go packages found under '{root}'")]
    NoPackages { root: PathBuf },
}

/// Umbrella error for command-level operations.
#[derive(Error, Debug)]
pub enum SpathError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    Resolve(ResolveError),

    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("{0}")]
    General(String),
}

impl From<ResolveError> for SpathError {
    fn from(error: ResolveError) -> Self {
        match error {
            ResolveError::Parse(e) => Self::Parse(e),
            other => Self::Resolve(other),
        }
    }
}

impl SpathError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::Parse(_) => "PARSE_ERROR",
            Self::Pattern(_) => "INVALID_PATTERN",
            Self::Resolve(ResolveError::PackageNotFound { .. }) => "PACKAGE_NOT_FOUND",
            Self::Resolve(ResolveError::SymbolNotFound { .. })
            | Self::Resolve(ResolveError::MethodNotFound { .. }) => "SYMBOL_NOT_FOUND",
            Self::Resolve(ResolveError::Ambiguous { .. }) => "AMBIGUOUS_MATCH",
            Self::Resolve(_) => "RESOLUTION_ERROR",
            Self::Scope(_) => "SCOPE_ERROR",
            Self::Load(LoadError::Io { .. }) => "IO_ERROR",
            Self::Load(_) => "LOAD_ERROR",
            Self::Config { .. } => "CONFIG_ERROR",
            Self::General(_) => "GENERAL_ERROR",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::Parse(_) => vec![
                "Addresses look like pkg.Symbol, pkg.Type.Method or pkg.Symbol/category[selector]",
                "Selectors are identifiers or zero-based indexes, e.g. params[0]",
            ],
            Self::Pattern(_) => vec![
                "'*' matches within one segment, '**' crosses '.', '/' and brackets",
                "Use at most two consecutive '*'",
            ],
            Self::Resolve(ResolveError::PackageNotFound { .. }) => vec![
                "Use the full import path or the module-relative path",
                "Run 'spath list \"**\" --limit 20' to see available addresses",
            ],
            Self::Resolve(ResolveError::SymbolNotFound { .. })
            | Self::Resolve(ResolveError::MethodNotFound { .. }) => vec![
                "Run 'spath lookup <name>' to find the symbol in other packages",
            ],
            Self::Resolve(ResolveError::Ambiguous { .. }) => {
                vec!["Retry with one of the qualified candidates"]
            }
            Self::Resolve(_) => vec![
                "Run 'spath list \"<address>/**\"' to see valid children",
            ],
            Self::Scope(_) => vec![
                "Scope expressions are comma-separated: all, project, package, pkg/..., -excluded",
            ],
            Self::Load(LoadError::NoPackages { .. }) => vec![
                "Point --root at a directory containing .go files",
                "Check loader.exclude_dirs in .spath/settings.toml",
            ],
            Self::Load(_) => vec!["Check that the files exist and are readable"],
            Self::Config { .. } => vec!["Run 'spath init --force' to regenerate settings"],
            Self::General(_) => vec![],
        }
    }
}

/// Result type alias for address parsing
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type alias for resolution
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Result type alias for command-level operations
pub type SpathResult<T> = Result<T, SpathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_path_reported() {
        let err = ResolveError::ChildNotFound {
            resolved: "pkg.Config".to_string(),
            category: "fields".to_string(),
            selector: "Missing".to_string(),
        };
        assert_eq!(err.partial(), Some("pkg.Config"));
        assert_eq!(err.to_string(), "'pkg.Config' has no fields 'Missing'");
    }

    #[test]
    fn test_parse_errors_are_not_recoverable() {
        let err: ResolveError = ParseError::Empty.into();
        assert!(!err.is_recoverable());
        assert!(
            ResolveError::PackageNotFound {
                package: "x".to_string()
            }
            .is_recoverable()
        );
    }

    #[test]
    fn test_resolve_parse_error_unwraps_to_parse() {
        let err: SpathError = ResolveError::Parse(ParseError::Empty).into();
        assert_eq!(err.status_code(), "PARSE_ERROR");
    }

    #[test]
    fn test_ambiguous_message_lists_candidates() {
        let err = ResolveError::Ambiguous {
            name: "Config".to_string(),
            candidates: vec!["a.Config".to_string(), "b.Config".to_string()],
        };
        assert_eq!(err.to_string(), "'Config' is ambiguous: a.Config, b.Config");
        let err: SpathError = err.into();
        assert_eq!(err.status_code(), "AMBIGUOUS_MATCH");
        assert!(!err.recovery_suggestions().is_empty());
    }
}
