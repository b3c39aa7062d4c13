//! Command implementations shared by the binary and the integration tests.
//!
//! Each command answers one request against a loaded [`Workspace`] and writes
//! the result through an [`OutputManager`]. Errors are rendered, not
//! returned; the `io::Result` only covers writing the output itself.

use crate::config::Settings;
use crate::diagnostics::Diagnostics;
use crate::display::{THEME, create_entries_table, create_package_table, create_scope_table};
use crate::error::{LoadError, ResolveError, SpathError};
use crate::io::{ExitCode, OutputManager};
use crate::program::{Program, ProgramLoader};
use crate::reachability::{NameReferenceOracle, find_dead_code};
use crate::scope::{ScopeFilter, ScopeReport};
use crate::spath::{
    Pattern, Resolver, SpathEntry, enumerate_all, enumerate_where, is_pattern, match_entries,
};
use crate::suggest::suggestions_for;
use crate::symbol::{Symbol, SymbolIndex};
use crate::types::Kind;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::Path;

/// A loaded program with its index and the settings it was loaded with.
pub struct Workspace {
    pub settings: Settings,
    pub program: Program,
    pub index: SymbolIndex,
    /// Warnings raised while loading, reported with every command.
    pub load_diagnostics: Diagnostics,
}

impl Workspace {
    pub fn load(root: &Path, settings: Settings) -> Result<Self, LoadError> {
        let program = ProgramLoader::new(settings.loader.clone()).load(root)?;
        Ok(Self::from_program(program, settings))
    }

    pub fn from_program(program: Program, settings: Settings) -> Self {
        let mut load_diagnostics = Diagnostics::new();
        for package in program.packages().iter().filter(|p| p.has_errors) {
            load_diagnostics.load_warning(format!(
                "package {} has syntax errors; its declarations may be incomplete",
                package.path()
            ));
        }
        let index = SymbolIndex::build(&program);
        Self {
            settings,
            program,
            index,
            load_diagnostics,
        }
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.program, &self.index)
    }

    fn diagnostics(&self) -> Diagnostics {
        self.load_diagnostics.clone()
    }

    fn location(&self, symbol: &Symbol) -> String {
        self.program.location(symbol.span)
    }
}

#[derive(Debug, Serialize)]
pub struct ResolveOutput {
    pub address: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    pub package: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl fmt::Display for ResolveOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            THEME.apply(&THEME.code, &self.address),
            THEME.apply(&THEME.kind, self.kind)
        )?;
        if let Some(annotation) = &self.annotation {
            write!(f, " {}", THEME.apply(&THEME.dim, annotation))?;
        }
        writeln!(f)?;
        if let Some(location) = &self.location {
            writeln!(f, "  at {}", THEME.apply(&THEME.path, location))?;
        }
        if let Some(source) = &self.source {
            writeln!(f)?;
            writeln!(f, "{source}")?;
        }
        Ok(())
    }
}

/// Resolve one address or bare name.
pub fn resolve(
    ws: &Workspace,
    out: &mut OutputManager,
    address: &str,
    with_source: bool,
) -> io::Result<ExitCode> {
    let mut diagnostics = ws.diagnostics();
    match ws.resolver().resolve_address(address, &mut diagnostics) {
        Ok(resolution) => {
            let output = ResolveOutput {
                address: resolution.address(),
                kind: resolution.kind(),
                annotation: resolution.annotation(),
                package: resolution.package().path().to_string(),
                location: resolution.location(&ws.program),
                source: with_source
                    .then(|| resolution.source(&ws.program))
                    .flatten(),
            };
            out.success(output, &diagnostics)
        }
        Err(error) => report_resolve_error(ws, out, error, &diagnostics),
    }
}

fn report_resolve_error(
    ws: &Workspace,
    out: &mut OutputManager,
    error: ResolveError,
    diagnostics: &Diagnostics,
) -> io::Result<ExitCode> {
    let did_you_mean = suggestions_for(&error, &ws.program, &ws.index);
    tracing::debug!("resolution failed: {error}");
    out.error(&SpathError::from(error), did_you_mean, diagnostics)
}

#[derive(Debug, Serialize)]
pub struct ListOutput {
    pub pattern: String,
    pub total: usize,
    pub truncated: bool,
    pub entries: Vec<SpathEntry>,
}

impl fmt::Display for ListOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return Ok(());
        }
        writeln!(f, "{}", create_entries_table(&self.entries))?;
        if self.truncated {
            writeln!(
                f,
                "{}",
                THEME.apply(
                    &THEME.dim,
                    format!(
                        "Showing {} of {} matches (use --limit to see more)",
                        self.entries.len(),
                        self.total
                    )
                )
            )?;
        } else {
            writeln!(f, "{} matches", self.total)?;
        }
        Ok(())
    }
}

/// Glob over the enumeration universe. Literal addresses resolve instead.
pub fn list(
    ws: &Workspace,
    out: &mut OutputManager,
    pattern: &str,
    limit: Option<usize>,
    scope: Option<&str>,
    target: Option<&str>,
) -> io::Result<ExitCode> {
    if !is_pattern(pattern) {
        return resolve(ws, out, pattern, false);
    }

    let mut diagnostics = ws.diagnostics();
    let compiled = match Pattern::compile(pattern) {
        Ok(compiled) => compiled,
        Err(e) => return out.error(&SpathError::from(e), Vec::new(), &diagnostics),
    };

    let universe = match scope {
        Some(expr) => match ScopeFilter::parse(expr, target, &ws.program, &mut diagnostics) {
            Ok(filter) => enumerate_where(&ws.program, &ws.index, |p| filter.in_scope(p.path())),
            Err(e) => return out.error(&SpathError::from(e), Vec::new(), &diagnostics),
        },
        None => enumerate_all(&ws.program, &ws.index),
    };

    let limit = limit.or(Some(ws.settings.query.default_limit)).filter(|l| *l > 0);
    let result = match_entries(&compiled, &universe, limit);
    tracing::debug!(
        "pattern {} matched {} of {} addresses",
        compiled.as_str(),
        result.total,
        universe.len()
    );

    let output = ListOutput {
        pattern: pattern.to_string(),
        total: result.total,
        truncated: result.is_truncated(),
        entries: result.matches,
    };
    if output.total == 0 {
        let message = format!("No addresses match '{pattern}'");
        out.result(output, ExitCode::NotFound, &message, &diagnostics)
    } else {
        out.success(output, &diagnostics)
    }
}

#[derive(Debug, Serialize)]
pub struct SymbolLine {
    pub address: String,
    pub kind: Kind,
    pub location: String,
}

#[derive(Debug, Serialize)]
pub struct PackageSummary {
    pub package: String,
    pub short_package: String,
    pub counts: BTreeMap<Kind, usize>,
    pub symbols: Vec<SymbolLine>,
}

#[derive(Debug, Serialize)]
pub struct SymbolsOutput {
    pub scope: String,
    pub packages: Vec<PackageSummary>,
}

impl fmt::Display for SymbolsOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<_> = self
            .packages
            .iter()
            .map(|p| {
                let kinds = p
                    .counts
                    .iter()
                    .map(|(kind, n)| (kind.to_string(), *n))
                    .collect();
                (p.package.clone(), kinds, p.symbols.len())
            })
            .collect();
        writeln!(f, "{}", create_package_table(&rows))
    }
}

/// Indexed symbols of every in-scope package.
pub fn symbols(
    ws: &Workspace,
    out: &mut OutputManager,
    scope: Option<&str>,
    target: Option<&str>,
    kind: Option<Kind>,
) -> io::Result<ExitCode> {
    let mut diagnostics = ws.diagnostics();
    let expr = scope.unwrap_or(&ws.settings.query.default_scope);
    let filter = match ScopeFilter::parse(expr, target, &ws.program, &mut diagnostics) {
        Ok(filter) => filter,
        Err(e) => return out.error(&SpathError::from(e), Vec::new(), &diagnostics),
    };

    let packages: Vec<PackageSummary> = filter
        .packages()
        .into_iter()
        .filter_map(|path| ws.program.package(path))
        .map(|package| {
            let mut counts = BTreeMap::new();
            let symbols = ws
                .index
                .in_package(package.path())
                .into_iter()
                .filter(|s| kind.is_none_or(|k| s.kind == k))
                .map(|s| {
                    *counts.entry(s.kind).or_insert(0) += 1;
                    SymbolLine {
                        address: s.address(),
                        kind: s.kind,
                        location: ws.location(s),
                    }
                })
                .collect();
            PackageSummary {
                package: package.path().to_string(),
                short_package: package.id.short_path.clone(),
                counts,
                symbols,
            }
        })
        .collect();

    let found = packages.iter().any(|p| !p.symbols.is_empty());
    let output = SymbolsOutput {
        scope: filter.expression().to_string(),
        packages,
    };
    if found {
        out.success(output, &diagnostics)
    } else {
        out.result(
            output,
            ExitCode::NotFound,
            "No symbols in scope",
            &diagnostics,
        )
    }
}

#[derive(Debug, Serialize)]
pub struct Candidate {
    pub address: String,
    pub kind: Kind,
    pub location: String,
}

#[derive(Debug, Serialize)]
pub struct LookupOutput {
    pub name: String,
    pub candidates: Vec<Candidate>,
}

impl fmt::Display for LookupOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.candidates {
            writeln!(
                f,
                "{}  {}  {}",
                THEME.apply(&THEME.code, &c.address),
                THEME.apply(&THEME.kind, c.kind),
                THEME.apply(&THEME.path, &c.location)
            )?;
        }
        Ok(())
    }
}

/// Every qualified declaration answering to a bare name.
pub fn lookup(ws: &Workspace, out: &mut OutputManager, name: &str) -> io::Result<ExitCode> {
    let diagnostics = ws.diagnostics();
    let mut candidates: Vec<Candidate> = ws
        .index
        .lookup(name)
        .into_iter()
        .map(|s| Candidate {
            address: s.address(),
            kind: s.kind,
            location: ws.location(s),
        })
        .collect();
    candidates.sort_by(|a, b| a.address.cmp(&b.address));

    if candidates.is_empty() {
        let error = ResolveError::SymbolNotFound {
            package: "*".to_string(),
            symbol: name.to_string(),
        };
        return report_resolve_error(ws, out, error, &diagnostics);
    }

    out.success(
        LookupOutput {
            name: name.to_string(),
            candidates,
        },
        &diagnostics,
    )
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ScopeOutput(pub ScopeReport);

impl fmt::Display for ScopeOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = &self.0;
        writeln!(f, "Scope: {}", THEME.apply(&THEME.header, &report.expression))?;
        writeln!(f, "{}", create_scope_table(report))?;
        writeln!(f, "{} package(s) in scope", report.in_scope.len())
    }
}

/// Resolve a scope expression and report both sets.
pub fn scope(
    ws: &Workspace,
    out: &mut OutputManager,
    expr: &str,
    target: Option<&str>,
) -> io::Result<ExitCode> {
    let mut diagnostics = ws.diagnostics();
    match ScopeFilter::parse(expr, target, &ws.program, &mut diagnostics) {
        Ok(filter) => out.success(ScopeOutput(filter.report()), &diagnostics),
        Err(e) => out.error(&SpathError::from(e), Vec::new(), &diagnostics),
    }
}

#[derive(Debug, Serialize)]
pub struct DeadOutput {
    pub scope: String,
    pub symbols: Vec<Candidate>,
}

impl fmt::Display for DeadOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.symbols.is_empty() {
            return writeln!(f, "{}", THEME.success_with_icon("No unreachable declarations"));
        }
        for c in &self.symbols {
            writeln!(
                f,
                "{}  {}  {}",
                THEME.apply(&THEME.code, &c.address),
                THEME.apply(&THEME.kind, c.kind),
                THEME.apply(&THEME.path, &c.location)
            )?;
        }
        writeln!(f, "{} unreachable declaration(s)", self.symbols.len())
    }
}

/// Dead-code report over the in-scope packages.
pub fn dead(
    ws: &Workspace,
    out: &mut OutputManager,
    scope: Option<&str>,
    target: Option<&str>,
) -> io::Result<ExitCode> {
    let mut diagnostics = ws.diagnostics();
    let expr = scope.unwrap_or(&ws.settings.query.default_scope);
    let filter = match ScopeFilter::parse(expr, target, &ws.program, &mut diagnostics) {
        Ok(filter) => filter,
        Err(e) => return out.error(&SpathError::from(e), Vec::new(), &diagnostics),
    };

    let oracle = NameReferenceOracle::build(&ws.program, &ws.index, &ws.settings.dead_code);
    let symbols = find_dead_code(&ws.index, &oracle, &filter, &mut diagnostics)
        .into_iter()
        .map(|s| Candidate {
            address: s.address(),
            kind: s.kind,
            location: ws.location(s),
        })
        .collect();

    out.success(
        DeadOutput {
            scope: filter.expression().to_string(),
            symbols,
        },
        &diagnostics,
    )
}
