//! Immutable program snapshot.
//!
//! A [`Program`] is built once by the [`ProgramLoader`] and then only read:
//! the symbol index, resolver, enumerator and scope filter all borrow it.
//! Packages are kept sorted by import path so every consumer iterates them in
//! the same order.

pub mod decl;
pub mod go;
pub mod loader;

pub use decl::{
    Decl, Embed, Field, FuncShape, InterfaceMethod, Param, Shape, Snippet, Tag, TypeParam,
    TypeShape, TypeStructure, ValueShape,
};
pub use go::GoExtractor;
pub use loader::{ProgramLoader, SourceInput};

use crate::types::{FileId, Span};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Identity of a loaded package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PackageId {
    /// Fully-qualified import path.
    pub path: String,
    /// Module-relative path; empty for the module root package.
    pub short_path: String,
    pub dir: PathBuf,
    /// Implementation-private to its module (`.../internal/...`).
    pub internal: bool,
}

impl PackageId {
    pub fn new(path: impl Into<String>, short_path: impl Into<String>, dir: PathBuf) -> Self {
        let path = path.into();
        let internal = path.split('/').any(|c| c == "internal");
        Self {
            path,
            short_path: short_path.into(),
            dir,
            internal,
        }
    }

    /// Short path for display, falling back to the full path at the module root.
    pub fn display_path(&self) -> &str {
        if self.short_path.is_empty() {
            &self.path
        } else {
            &self.short_path
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path relative to the program root, always `/`-separated.
    pub rel_path: String,
    pub source: Arc<str>,
    pub has_errors: bool,
}

impl SourceFile {
    pub fn is_test(&self) -> bool {
        self.rel_path.ends_with("_test.go")
    }
}

#[derive(Debug, Clone)]
pub struct Package {
    pub id: PackageId,
    /// Name from the `package` clause.
    pub name: String,
    pub files: Vec<FileId>,
    pub decls: Vec<Decl>,
    /// Belongs to the loaded module rather than a dependency.
    pub project: bool,
    pub has_errors: bool,
}

impl Package {
    pub fn path(&self) -> &str {
        &self.id.path
    }

    /// Top-level (non-method) declarations with the given name, in source order.
    pub fn top_level<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Decl> + 'a {
        self.decls
            .iter()
            .filter(move |d| d.name == name && d.receiver_type().is_none())
    }

    /// Methods declared with `type_name` as receiver base type, in source order.
    pub fn methods_of<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a Decl> + 'a {
        self.decls
            .iter()
            .filter(move |d| d.receiver_type() == Some(type_name))
    }
}

/// The loaded program: files, packages and their declarations.
#[derive(Debug, Clone)]
pub struct Program {
    module_path: String,
    root: PathBuf,
    files: Vec<SourceFile>,
    packages: Vec<Package>,
    by_path: HashMap<String, usize>,
    by_short_path: HashMap<String, usize>,
}

impl Program {
    pub fn new(
        module_path: impl Into<String>,
        root: PathBuf,
        files: Vec<SourceFile>,
        mut packages: Vec<Package>,
    ) -> Self {
        packages.sort_by(|a, b| a.id.path.cmp(&b.id.path));

        let mut by_path = HashMap::with_capacity(packages.len());
        let mut by_short_path = HashMap::with_capacity(packages.len());
        for (i, pkg) in packages.iter().enumerate() {
            by_path.insert(pkg.id.path.clone(), i);
            if pkg.project && !pkg.id.short_path.is_empty() {
                by_short_path.insert(pkg.id.short_path.clone(), i);
            }
        }

        Self {
            module_path: module_path.into(),
            root,
            files,
            packages,
            by_path,
            by_short_path,
        }
    }

    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn package_ids(&self) -> impl Iterator<Item = &PackageId> {
        self.packages.iter().map(|p| &p.id)
    }

    /// Looks a package up by import path, then by module-relative path.
    pub fn package(&self, path: &str) -> Option<&Package> {
        self.by_path
            .get(path)
            .or_else(|| self.by_short_path.get(path))
            .map(|&i| &self.packages[i])
    }

    pub fn package_index(&self, path: &str) -> Option<usize> {
        self.by_path
            .get(path)
            .or_else(|| self.by_short_path.get(path))
            .copied()
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.index())
    }

    /// Source text covered by a span.
    pub fn text(&self, span: Span) -> Option<&str> {
        self.file(span.file)
            .and_then(|f| f.source.get(span.byte_range()))
    }

    /// `path:line` with a one-based line, for display.
    pub fn location(&self, span: Span) -> String {
        match self.file(span.file) {
            Some(f) => format!("{}:{}", f.rel_path, span.start_line + 1),
            None => format!("<unknown>:{}", span.start_line + 1),
        }
    }

    /// Whether an import path lies inside the loaded module.
    pub fn is_project_path(&self, path: &str) -> bool {
        path == self.module_path
            || path
                .strip_prefix(&self.module_path)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    pub fn decl_count(&self) -> usize {
        self.packages.iter().map(|p| p.decls.len()).sum()
    }
}
