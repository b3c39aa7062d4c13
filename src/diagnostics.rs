//! Per-run diagnostics collected alongside normal results.
//!
//! Ambiguity, unanalyzable symbols and unmatched scope patterns never abort a
//! run; they are recorded here and surfaced next to the output.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    AmbiguousMatch,
    UnanalyzableSymbol,
    UnmatchedScopePattern,
    LoadWarning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{label}: {}", self.message)?;
        for candidate in &self.candidates {
            write!(f, "\n  - {candidate}")?;
        }
        Ok(())
    }
}

/// Accumulates diagnostics for one invocation.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::debug!("diagnostic: {}", diagnostic.message);
        self.items.push(diagnostic);
    }

    /// Several declarations answer to one name. Candidates are sorted.
    pub fn ambiguous(&mut self, name: &str, mut candidates: Vec<String>) {
        candidates.sort();
        candidates.dedup();
        self.push(Diagnostic {
            kind: DiagnosticKind::AmbiguousMatch,
            severity: Severity::Warning,
            message: format!("'{name}' matches {} declarations", candidates.len()),
            candidates,
        });
    }

    pub fn unanalyzable(&mut self, address: &str, reason: &str) {
        self.push(Diagnostic {
            kind: DiagnosticKind::UnanalyzableSymbol,
            severity: Severity::Warning,
            message: format!("reachability of '{address}' could not be determined: {reason}"),
            candidates: Vec::new(),
        });
    }

    pub fn unmatched_scope_pattern(&mut self, pattern: &str) {
        self.push(Diagnostic {
            kind: DiagnosticKind::UnmatchedScopePattern,
            severity: Severity::Warning,
            message: format!("scope pattern '{pattern}' matched no packages"),
            candidates: Vec::new(),
        });
    }

    pub fn load_warning(&mut self, message: impl Into<String>) {
        self.push(Diagnostic {
            kind: DiagnosticKind::LoadWarning,
            severity: Severity::Info,
            message: message.into(),
            candidates: Vec::new(),
        });
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}
