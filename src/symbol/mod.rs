//! Flat catalog of every declaration in a loaded program.
//!
//! Built once from a [`Program`] and read-only afterwards. Names are not
//! globally unique, so [`SymbolIndex::lookup`] always returns every match.

use crate::program::{Decl, Program};
use crate::types::{Kind, Span};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SymbolId(usize);

impl SymbolId {
    fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

/// Position of a declaration inside the program snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DeclRef {
    pub package: usize,
    pub decl: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Symbol {
    pub id: SymbolId,
    pub kind: Kind,
    pub name: String,
    /// Full import path of the owning package.
    pub package: String,
    /// Module-relative path of the owning package.
    pub short_package: String,
    /// Receiver base type, for methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    #[serde(skip)]
    pub decl: DeclRef,
    pub span: Span,
    /// Methods declared on this type, in source order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<SymbolId>,
}

impl Symbol {
    /// Canonical address: `pkg.Name` or `pkg.Type.Method`.
    pub fn address(&self) -> String {
        match &self.receiver {
            Some(recv) => format!("{}.{recv}.{}", self.package, self.name),
            None => format!("{}.{}", self.package, self.name),
        }
    }

    pub fn decl<'p>(&self, program: &'p Program) -> Option<&'p Decl> {
        program
            .packages()
            .get(self.decl.package)
            .and_then(|p| p.decls.get(self.decl.decl))
    }

    pub fn is_exported(&self) -> bool {
        crate::program::decl::is_exported(&self.name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    symbols: Vec<Symbol>,
    by_name: HashMap<String, Vec<SymbolId>>,
    by_package: HashMap<String, Vec<SymbolId>>,
}

impl SymbolIndex {
    /// One pass over every package; methods are attached to the first type
    /// of their receiver's name in the same package.
    pub fn build(program: &Program) -> Self {
        let mut index = Self::default();

        for (package_index, package) in program.packages().iter().enumerate() {
            let first = index.symbols.len();

            for (decl_index, decl) in package.decls.iter().enumerate() {
                let id = SymbolId::new(index.symbols.len());
                index.symbols.push(Symbol {
                    id,
                    kind: decl.kind,
                    name: decl.name.clone(),
                    package: package.id.path.clone(),
                    short_package: package.id.short_path.clone(),
                    receiver: decl.receiver_type().map(str::to_string),
                    decl: DeclRef {
                        package: package_index,
                        decl: decl_index,
                    },
                    span: decl.span,
                    methods: Vec::new(),
                });
                index.by_name.entry(decl.name.clone()).or_default().push(id);
                index
                    .by_package
                    .entry(package.id.path.clone())
                    .or_default()
                    .push(id);
            }

            let mut owners: HashMap<&str, usize> = HashMap::new();
            for i in first..index.symbols.len() {
                let symbol = &index.symbols[i];
                if symbol.kind.is_type() {
                    owners.entry(&package.decls[symbol.decl.decl].name).or_insert(i);
                }
            }
            for i in first..index.symbols.len() {
                let owner = index.symbols[i]
                    .receiver
                    .as_deref()
                    .and_then(|recv| owners.get(recv).copied());
                if let Some(owner) = owner {
                    let id = index.symbols[i].id;
                    index.symbols[owner].methods.push(id);
                }
            }
        }

        tracing::debug!("indexed {} symbols", index.symbols.len());
        index
    }

    /// Every symbol, grouped by package in package order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    /// All symbols with exactly this bare name, across packages.
    pub fn lookup(&self, name: &str) -> Vec<&Symbol> {
        self.by_name
            .get(name)
            .map(|ids| ids.iter().filter_map(|id| self.get(*id)).collect())
            .unwrap_or_default()
    }

    pub fn in_package(&self, package: &str) -> Vec<&Symbol> {
        self.by_package
            .get(package)
            .map(|ids| ids.iter().filter_map(|id| self.get(*id)).collect())
            .unwrap_or_default()
    }

    /// Top-level (non-method) symbols named `name` in `package`, in source order.
    pub fn find(&self, package: &str, name: &str) -> Vec<&Symbol> {
        self.in_package(package)
            .into_iter()
            .filter(|s| s.name == name && s.receiver.is_none())
            .collect()
    }

    pub fn methods_of<'a>(&'a self, symbol: &'a Symbol) -> impl Iterator<Item = &'a Symbol> + 'a {
        symbol.methods.iter().filter_map(|id| self.get(*id))
    }

    pub fn find_by_kind(&self, kind: Kind) -> Vec<&Symbol> {
        self.symbols.iter().filter(|s| s.kind == kind).collect()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
