//! Scope expressions: which packages a query considers.
//!
//! An expression such as `internal/...,-internal/testdata/...` is resolved
//! against the loaded package list once, at parse time. Membership is then a
//! set lookup: a package is in scope when some token included it and no token
//! excluded it, whatever order the tokens were written in.

use crate::diagnostics::Diagnostics;
use crate::error::ScopeError;
use crate::program::{Package, Program};
use crate::spath::glob::{Pattern, is_pattern};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

const KEYWORDS: [&str; 3] = ["all", "project", "package"];

/// Resolved include and exclude sets of one scope expression.
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    expression: String,
    include_patterns: Vec<String>,
    exclude_patterns: Vec<String>,
    included: BTreeSet<String>,
    excluded: BTreeSet<String>,
    /// Module-relative path to import path, for `in_scope` lookups.
    aliases: HashMap<String, String>,
}

/// Audit view of a [`ScopeFilter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeReport {
    pub expression: String,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub included: Vec<String>,
    pub excluded: Vec<String>,
    pub in_scope: Vec<String>,
}

impl ScopeFilter {
    /// Parse `expr` and resolve every token against `program`.
    ///
    /// `default_target` is the package the `package` keyword (and an empty
    /// expression) stands for. Tokens that match nothing are reported to
    /// `diagnostics` and otherwise ignored.
    pub fn parse(
        expr: &str,
        default_target: Option<&str>,
        program: &Program,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self, ScopeError> {
        let expression = if expr.trim().is_empty() {
            "package".to_string()
        } else {
            expr.trim().to_string()
        };

        let mut filter = Self {
            expression: expression.clone(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            included: BTreeSet::new(),
            excluded: BTreeSet::new(),
            aliases: program
                .packages()
                .iter()
                .filter(|p| !p.id.short_path.is_empty())
                .map(|p| (p.id.short_path.clone(), p.id.path.clone()))
                .collect(),
        };

        for raw in expression.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (negated, token) = match raw.strip_prefix('-') {
                Some(rest) => (true, rest.trim()),
                None => (false, raw),
            };
            if negated && token.is_empty() {
                return Err(ScopeError::EmptyExclusion {
                    token: raw.to_string(),
                });
            }
            if negated && KEYWORDS.contains(&token) {
                return Err(ScopeError::NegatedKeyword {
                    keyword: token.to_string(),
                });
            }

            let resolved = resolve_token(token, default_target, program)?;
            tracing::debug!(
                "scope token '{raw}' resolved to {} package(s)",
                resolved.len()
            );
            if resolved.is_empty() {
                diagnostics.unmatched_scope_pattern(raw);
            }

            if negated {
                filter.exclude_patterns.push(token.to_string());
                filter.excluded.extend(resolved);
            } else {
                filter.include_patterns.push(token.to_string());
                filter.included.extend(resolved);
            }
        }

        Ok(filter)
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Membership by import path or module-relative path.
    pub fn in_scope(&self, package: &str) -> bool {
        let path = self
            .aliases
            .get(package)
            .map(String::as_str)
            .unwrap_or(package);
        self.included.contains(path) && !self.excluded.contains(path)
    }

    /// In-scope import paths, sorted.
    pub fn packages(&self) -> Vec<&str> {
        self.included
            .difference(&self.excluded)
            .map(String::as_str)
            .collect()
    }

    pub fn report(&self) -> ScopeReport {
        ScopeReport {
            expression: self.expression.clone(),
            include_patterns: self.include_patterns.clone(),
            exclude_patterns: self.exclude_patterns.clone(),
            included: self.included.iter().cloned().collect(),
            excluded: self.excluded.iter().cloned().collect(),
            in_scope: self.packages().into_iter().map(str::to_string).collect(),
        }
    }
}

fn resolve_token(
    token: &str,
    default_target: Option<&str>,
    program: &Program,
) -> Result<BTreeSet<String>, ScopeError> {
    match token {
        "all" => return Ok(select(program, |_| true)),
        "project" => return Ok(select(program, |p| p.project)),
        "package" => {
            let target = default_target.ok_or(ScopeError::MissingDefaultTarget)?;
            return Ok(program
                .package(target)
                .map(|p| p.id.path.clone())
                .into_iter()
                .collect());
        }
        _ => {}
    }

    let token = token.strip_prefix("./").unwrap_or(token);
    if token == "..." {
        return Ok(select(program, |p| p.project));
    }

    if is_pattern(token) {
        let pattern = Pattern::compile(token)?;
        return Ok(select(program, |p| {
            pattern.is_match_raw(&p.id.path)
                || (!p.id.short_path.is_empty() && pattern.is_match_raw(&p.id.short_path))
        }));
    }

    if let Some(base) = token.strip_suffix("/...") {
        return Ok(select(program, |p| {
            under(&p.id.path, base)
                || (!p.id.short_path.is_empty() && under(&p.id.short_path, base))
        }));
    }

    Ok(program
        .package(token)
        .map(|p| p.id.path.clone())
        .into_iter()
        .collect())
}

fn select(program: &Program, keep: impl Fn(&Package) -> bool) -> BTreeSet<String> {
    program
        .packages()
        .iter()
        .filter(|p| keep(p))
        .map(|p| p.id.path.clone())
        .collect()
}

/// `path` is `base` or lies below it.
fn under(path: &str, base: &str) -> bool {
    path.strip_prefix(base)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
