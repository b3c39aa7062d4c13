//! Dead-code detection over the symbol index.
//!
//! Whether a declaration is reachable comes from a [`ReachabilityOracle`].
//! The bundled [`NameReferenceOracle`] approximates the call graph by name:
//! starting from entry points it follows every identifier a reachable
//! declaration mentions to every declaration with that name.

use crate::config::DeadCodeConfig;
use crate::diagnostics::Diagnostics;
use crate::program::Program;
use crate::scope::ScopeFilter;
use crate::symbol::{Symbol, SymbolId, SymbolIndex};
use crate::types::Kind;
use std::collections::{HashSet, VecDeque};

const TEST_PREFIXES: [&str; 4] = ["Test", "Benchmark", "Example", "Fuzz"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reachability {
    Reachable,
    Unreachable,
    /// Could not be determined; carries the reason.
    Unknown(String),
}

pub trait ReachabilityOracle {
    fn reachability(&self, symbol: &Symbol) -> Reachability;
}

/// Name-based reachability computed once over the whole program.
#[derive(Debug, Clone, Default)]
pub struct NameReferenceOracle {
    reachable: HashSet<SymbolId>,
    broken_packages: HashSet<String>,
}

impl NameReferenceOracle {
    pub fn build(program: &Program, index: &SymbolIndex, config: &DeadCodeConfig) -> Self {
        let broken_packages: HashSet<String> = program
            .packages()
            .iter()
            .filter(|p| p.has_errors)
            .map(|p| p.id.path.clone())
            .collect();

        let mut reachable = HashSet::new();
        let mut queue: VecDeque<SymbolId> = index
            .symbols()
            .iter()
            .filter(|s| is_root(program, s, config))
            .map(|s| s.id)
            .collect();
        tracing::debug!("reachability: {} roots", queue.len());

        while let Some(id) = queue.pop_front() {
            if !reachable.insert(id) {
                continue;
            }
            let Some(symbol) = index.get(id) else {
                continue;
            };

            // A live type keeps its exported methods: they may satisfy an
            // interface without ever being named.
            if symbol.kind.is_type() {
                queue.extend(
                    index
                        .methods_of(symbol)
                        .filter(|m| m.is_exported())
                        .map(|m| m.id),
                );
            }

            let Some(decl) = symbol.decl(program) else {
                continue;
            };
            for name in &decl.references {
                queue.extend(
                    index
                        .lookup(name)
                        .into_iter()
                        .map(|s| s.id)
                        .filter(|id| !reachable.contains(id)),
                );
            }
        }

        tracing::debug!(
            "reachability: {} of {} symbols reachable",
            reachable.len(),
            index.len()
        );
        Self {
            reachable,
            broken_packages,
        }
    }
}

impl ReachabilityOracle for NameReferenceOracle {
    fn reachability(&self, symbol: &Symbol) -> Reachability {
        if self.broken_packages.contains(&symbol.package) {
            return Reachability::Unknown("package has syntax errors".to_string());
        }
        if self.reachable.contains(&symbol.id) {
            Reachability::Reachable
        } else {
            Reachability::Unreachable
        }
    }
}

/// Entry points: `main.main`, `init`, test functions, blank declarations and,
/// optionally, the exported API of library packages.
fn is_root(program: &Program, symbol: &Symbol, config: &DeadCodeConfig) -> bool {
    let Some(package) = program.package(&symbol.package) else {
        return false;
    };
    let in_main = package.name == "main";

    if symbol.name == "_" {
        return true;
    }
    if symbol.kind == Kind::Func {
        if symbol.name == "init" || (in_main && symbol.name == "main") {
            return true;
        }
        let in_test_file = program
            .file(symbol.span.file)
            .is_some_and(|f| f.is_test());
        if in_test_file && TEST_PREFIXES.iter().any(|p| symbol.name.starts_with(p)) {
            return true;
        }
    }
    config.exported_are_roots && !in_main && symbol.is_exported()
}

/// Unreachable in-scope symbols, sorted by address.
///
/// Entry points themselves are never reported. Symbols the oracle cannot
/// decide are left out and reported as diagnostics.
pub fn find_dead_code<'i>(
    index: &'i SymbolIndex,
    oracle: &dyn ReachabilityOracle,
    scope: &ScopeFilter,
    diagnostics: &mut Diagnostics,
) -> Vec<&'i Symbol> {
    let mut dead: Vec<&Symbol> = Vec::new();

    for symbol in index.symbols().iter().filter(|s| scope.in_scope(&s.package)) {
        if symbol.name == "_" || symbol.name == "init" {
            continue;
        }
        match oracle.reachability(symbol) {
            Reachability::Reachable => {}
            Reachability::Unreachable => dead.push(symbol),
            Reachability::Unknown(reason) => diagnostics.unanalyzable(&symbol.address(), &reason),
        }
    }

    dead.sort_by_cached_key(|s| s.address());
    dead
}
