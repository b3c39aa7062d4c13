//! Semantic addressing for Go programs.
//!
//! Every declaration, and every field, parameter, tag and body inside one,
//! gets a stable textual address such as `example.com/app/store.Store/fields[Name]/tag[json]`.
//! Addresses can be resolved, enumerated, globbed and filtered by package scope.

pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod display;
pub mod error;
pub mod io;
pub mod program;
pub mod reachability;
pub mod scope;
pub mod spath;
pub mod suggest;
pub mod symbol;
pub mod types;

// Explicit exports for better API clarity
pub use config::Settings;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use error::{
    LoadError, ParseError, ParseResult, PatternError, ResolveError, ResolveResult, ScopeError,
    SpathError, SpathResult,
};
pub use program::{Package, Program, ProgramLoader, SourceInput};
pub use reachability::{NameReferenceOracle, Reachability, ReachabilityOracle, find_dead_code};
pub use scope::{ScopeFilter, ScopeReport};
pub use spath::{
    Category, MatchResult, Path, Pattern, Resolution, Resolver, Segment, Selector, SpathEntry,
    enumerate_all, enumerate_where, is_pattern, match_entries,
};
pub use symbol::{Symbol, SymbolId, SymbolIndex};
pub use types::{FileId, Kind, Span};
