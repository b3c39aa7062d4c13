//! The enumeration universe: every valid address of a loaded program.

use crate::program::{Package, Program};
use crate::spath::path::{Category, Path};
use crate::spath::resolve::{Node, Resolver};
use crate::symbol::{Symbol, SymbolIndex};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpathEntry {
    /// Canonical address, with the full import path.
    pub path: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    pub package: String,
    pub short_package: String,
}

impl SpathEntry {
    /// The address with the module-relative package, when that differs.
    pub fn short_form(&self) -> Option<String> {
        if self.short_package.is_empty() || self.short_package == self.package {
            return None;
        }
        let rest = self.path.strip_prefix(&self.package)?;
        Some(format!("{}{rest}", self.short_package))
    }
}

/// Every address in every package, packages in path order.
pub fn enumerate_all(program: &Program, index: &SymbolIndex) -> Vec<SpathEntry> {
    let mut entries = Vec::new();
    for package in program.packages() {
        enumerate_package(program, index, package, &mut entries);
    }
    tracing::debug!("enumerated {} addresses", entries.len());
    entries
}

/// Every address of the packages accepted by `keep`.
pub fn enumerate_where(
    program: &Program,
    index: &SymbolIndex,
    keep: impl Fn(&Package) -> bool,
) -> Vec<SpathEntry> {
    let mut entries = Vec::new();
    for package in program.packages().iter().filter(|p| keep(p)) {
        enumerate_package(program, index, package, &mut entries);
    }
    entries
}

fn enumerate_package(
    program: &Program,
    index: &SymbolIndex,
    package: &Package,
    entries: &mut Vec<SpathEntry>,
) {
    let mut walker = Walker {
        resolver: Resolver::new(program, index),
        package,
        seen: HashSet::new(),
        entries,
    };

    walker.emit(&Path::package(package.path()), &Node::Package(package));

    for symbol in index.in_package(package.path()) {
        let Some(decl) = symbol.decl(program) else {
            continue;
        };
        let path = match &symbol.receiver {
            Some(receiver) => {
                if !has_owner(index, symbol, receiver) {
                    continue;
                }
                Path::method(package.path(), receiver, &symbol.name)
            }
            None => Path::symbol(package.path(), &symbol.name),
        };
        walker.walk(path, Node::Decl(decl));

        // Interface method elements get the Type.Method form as well.
        if let Some(shape) = decl.type_shape() {
            for method in shape.interface_methods() {
                let path = Path::method(package.path(), &symbol.name, &method.name);
                walker.walk(path, Node::InterfaceMethod(method));
            }
        }
    }
}

/// Methods only resolve through a type declared in the same package.
fn has_owner(index: &SymbolIndex, method: &Symbol, receiver: &str) -> bool {
    index
        .find(&method.package, receiver)
        .first()
        .is_some_and(|owner| owner.methods.contains(&method.id))
}

struct Walker<'p, 'e> {
    resolver: Resolver<'p>,
    package: &'p Package,
    seen: HashSet<String>,
    entries: &'e mut Vec<SpathEntry>,
}

impl<'p> Walker<'p, '_> {
    /// Emit `node` and everything below it. `methods[...]` children are
    /// leaves; their substructure lives under the `Type.Method` form.
    fn walk(&mut self, path: Path, node: Node<'p>) {
        if !self.emit(&path, &node) {
            return;
        }
        for (segment, child) in self.resolver.children(self.package, &node) {
            let child_path = path.child(segment);
            if child_path
                .subpath
                .last()
                .is_some_and(|s| s.category == Category::Methods)
            {
                self.emit(&child_path, &child);
            } else {
                self.walk(child_path, child);
            }
        }
    }

    /// Record one entry; false when the address was already emitted.
    fn emit(&mut self, path: &Path, node: &Node<'p>) -> bool {
        let address = path.to_string();
        if !self.seen.insert(address.clone()) {
            return false;
        }
        self.entries.push(SpathEntry {
            path: address,
            kind: node.kind_label(),
            annotation: node.annotation(),
            package: self.package.id.path.clone(),
            short_package: self.package.id.short_path.clone(),
        });
        true
    }
}
