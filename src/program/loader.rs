//! Program loading: walk a Go module, parse every file and group the
//! declarations into packages.
//!
//! Walking honours `.gitignore` and `.spathignore`. Parsing runs on the rayon
//! pool with one [`GoExtractor`] per worker; the assembled [`Program`] does not
//! depend on the order workers finish in.

use crate::config::{IGNORE_FILE, LoaderConfig};
use crate::error::LoadError;
use crate::program::go::{ExtractedFile, GoExtractor};
use crate::program::{Package, PackageId, Program, SourceFile};
use crate::types::FileId;
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One source file handed to the assembler.
#[derive(Debug, Clone)]
pub struct SourceInput {
    /// `/`-separated path relative to the program root.
    pub rel_path: String,
    pub path: PathBuf,
    pub source: String,
}

impl SourceInput {
    /// In-memory file, mainly for synthetic programs.
    pub fn new(rel_path: impl Into<String>, source: impl Into<String>) -> Self {
        let rel_path = rel_path.into();
        Self {
            path: PathBuf::from(&rel_path),
            rel_path,
            source: source.into(),
        }
    }

    fn dir(&self) -> &str {
        self.rel_path.rsplit_once('/').map_or("", |(dir, _)| dir)
    }
}

/// Loads Go modules into [`Program`] snapshots.
#[derive(Debug, Clone, Default)]
pub struct ProgramLoader {
    config: LoaderConfig,
}

impl ProgramLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Load every package under `root`.
    pub fn load(&self, root: &Path) -> Result<Program, LoadError> {
        let root = root.canonicalize().map_err(|source| LoadError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        let module_path = self.module_path(&root);
        tracing::debug!("loading module {module_path} from {}", root.display());

        let inputs = self.collect(&root);
        if inputs.is_empty() {
            return Err(LoadError::NoPackages { root });
        }

        Self::assemble(&module_path, root, inputs)
    }

    /// Build a program from in-memory sources.
    pub fn load_sources(
        module_path: &str,
        inputs: Vec<SourceInput>,
    ) -> Result<Program, LoadError> {
        if inputs.is_empty() {
            return Err(LoadError::NoPackages {
                root: PathBuf::from(module_path),
            });
        }
        Self::assemble(module_path, PathBuf::new(), inputs)
    }

    /// `module` directive of go.mod, then the configured path, then the
    /// directory name.
    fn module_path(&self, root: &Path) -> String {
        let go_mod = root.join("go.mod");
        if let Ok(content) = std::fs::read_to_string(&go_mod) {
            if let Some(path) = parse_module_directive(&content) {
                return path;
            }
            tracing::warn!("{} has no module directive", go_mod.display());
        }

        if let Some(path) = &self.config.module_path {
            return path.clone();
        }

        root.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("main")
            .to_string()
    }

    /// Walk the tree and read every Go file that passes the filters.
    fn collect(&self, root: &Path) -> Vec<SourceInput> {
        let mut builder = WalkBuilder::new(root);

        builder
            .hidden(true) // Skip hidden files and directories
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .follow_links(false)
            .require_git(false); // Allow gitignore to work in non-git directories

        builder.add_custom_ignore_filename(IGNORE_FILE);

        let exclude_dirs = self.config.exclude_dirs.clone();
        let include_vendor = self.config.include_vendor;
        builder.filter_entry(move |entry| {
            if !entry.file_type().is_some_and(|ft| ft.is_dir()) || entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            if name == "vendor" && !include_vendor {
                return false;
            }
            !exclude_dirs.iter().any(|d| d.as_str() == name)
        });

        let mut inputs = Vec::new();
        for entry in builder.build().filter_map(Result::ok) {
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("go") {
                continue;
            }
            let Some(rel_path) = relative_path(root, path) else {
                continue;
            };
            if rel_path.ends_with("_test.go") && !self.config.include_tests {
                continue;
            }

            match std::fs::read_to_string(path) {
                Ok(source) => inputs.push(SourceInput {
                    rel_path,
                    path: path.to_path_buf(),
                    source,
                }),
                Err(e) => tracing::warn!("skipping {}: {e}", path.display()),
            }
        }

        inputs.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
        tracing::debug!("collected {} Go files", inputs.len());
        inputs
    }

    fn assemble(
        module_path: &str,
        root: PathBuf,
        mut inputs: Vec<SourceInput>,
    ) -> Result<Program, LoadError> {
        inputs.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));

        // Fail once up front instead of once per worker.
        GoExtractor::new()?;

        let extracted: Vec<Option<ExtractedFile>> = inputs
            .par_iter()
            .enumerate()
            .map_init(GoExtractor::new, |extractor, (i, input)| {
                extractor
                    .as_mut()
                    .ok()
                    .and_then(|ex| ex.extract(&input.source, FileId::new(i)))
            })
            .collect();

        let mut builders: BTreeMap<String, PackageBuilder> = BTreeMap::new();
        let mut files = Vec::with_capacity(inputs.len());

        for (i, (input, result)) in inputs.into_iter().zip(extracted).enumerate() {
            let file_id = FileId::new(i);
            let dir = input.dir().to_string();
            let (mut path, mut short_path, project) = package_paths(module_path, &dir);

            let has_errors = result.as_ref().is_none_or(|r| r.has_errors);
            if has_errors {
                tracing::warn!("syntax errors in {}", input.rel_path);
            }

            let (name, decls) = match result {
                Some(file) => (file.package_name, file.decls),
                None => (String::new(), Vec::new()),
            };

            // External test packages share the directory but not the package.
            if name.ends_with("_test") {
                path.push_str("_test");
                short_path.push_str("_test");
            }

            let builder = builders.entry(path.clone()).or_insert_with(|| PackageBuilder {
                id: PackageId::new(path, short_path, root.join(&dir)),
                name: String::new(),
                files: Vec::new(),
                decls: Vec::new(),
                project,
                has_errors: false,
            });
            if builder.name.is_empty() {
                builder.name = name;
            }
            builder.files.push(file_id);
            builder.decls.extend(decls);
            builder.has_errors |= has_errors;

            files.push(SourceFile {
                path: input.path,
                rel_path: input.rel_path,
                source: Arc::from(input.source),
                has_errors,
            });
        }

        let packages: Vec<Package> = builders
            .into_values()
            .map(PackageBuilder::build)
            .collect();

        tracing::info!(
            "loaded {} files into {} packages",
            files.len(),
            packages.len()
        );

        Ok(Program::new(module_path, root, files, packages))
    }
}

struct PackageBuilder {
    id: PackageId,
    name: String,
    files: Vec<FileId>,
    decls: Vec<crate::program::Decl>,
    project: bool,
    has_errors: bool,
}

impl PackageBuilder {
    fn build(self) -> Package {
        Package {
            id: self.id,
            name: self.name,
            files: self.files,
            decls: self.decls,
            project: self.project,
            has_errors: self.has_errors,
        }
    }
}

/// Import path, short path and project flag for a root-relative directory.
///
/// Vendored packages keep their own import path, which doubles as their
/// short path since they are not module-relative.
fn package_paths(module_path: &str, dir: &str) -> (String, String, bool) {
    if let Some(vendored) = dir.strip_prefix("vendor/") {
        return (vendored.to_string(), vendored.to_string(), false);
    }
    if dir.is_empty() {
        (module_path.to_string(), String::new(), true)
    } else {
        (format!("{module_path}/{dir}"), dir.to_string(), true)
    }
}

fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

fn parse_module_directive(go_mod: &str) -> Option<String> {
    go_mod.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or(line).trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let path = rest.trim().trim_matches('"');
        (!path.is_empty()).then(|| path.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Kind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_module_directive() {
        let go_mod = "// comment\nmodule example.com/app // trailing\n\ngo 1.22\n";
        assert_eq!(
            parse_module_directive(go_mod).as_deref(),
            Some("example.com/app")
        );
        assert_eq!(
            parse_module_directive("module \"quoted/path\"\n").as_deref(),
            Some("quoted/path")
        );
        assert_eq!(parse_module_directive("modules x\n"), None);
    }

    #[test]
    fn test_package_paths() {
        assert_eq!(
            package_paths("example.com/app", ""),
            ("example.com/app".to_string(), String::new(), true)
        );
        assert_eq!(
            package_paths("example.com/app", "internal/db"),
            (
                "example.com/app/internal/db".to_string(),
                "internal/db".to_string(),
                true
            )
        );
        assert_eq!(
            package_paths("example.com/app", "vendor/golang.org/x/sync"),
            (
                "golang.org/x/sync".to_string(),
                "golang.org/x/sync".to_string(),
                false
            )
        );
    }

    #[test]
    fn test_load_sources_groups_by_directory() {
        let program = ProgramLoader::load_sources(
            "example.com/app",
            vec![
                SourceInput::new("util/b.go", "package util\n\nfunc B() {}\n"),
                SourceInput::new("main.go", "package main\n\nfunc main() {}\n"),
                SourceInput::new("util/a.go", "package util\n\nfunc A() {}\n"),
            ],
        )
        .unwrap();

        let paths: Vec<_> = program.package_ids().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["example.com/app", "example.com/app/util"]);

        let util = program.package("util").unwrap();
        assert_eq!(util.name, "util");
        // Files are assembled in path order, so a.go's decls come first.
        let names: Vec<_> = util.decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(util.decls[0].kind, Kind::Func);
        assert!(util.project);
        assert_eq!(program.files().len(), 3);
        assert_eq!(program.files()[0].rel_path, "main.go");
    }

    #[test]
    fn test_parse_errors_mark_package() {
        let program = ProgramLoader::load_sources(
            "example.com/app",
            vec![SourceInput::new("bad/x.go", "package bad\n\nfunc (\n")],
        )
        .unwrap();
        let bad = program.package("bad").unwrap();
        assert!(bad.has_errors);
        assert!(program.files()[0].has_errors);
    }

    #[test]
    fn test_load_from_disk_applies_filters() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("go.mod"), "module example.com/shop\n\ngo 1.22\n").unwrap();
        fs::write(root.join("main.go"), "package main\n\nfunc main() {}\n").unwrap();
        fs::write(
            root.join("main_test.go"),
            "package main\n\nfunc TestMain() {}\n",
        )
        .unwrap();

        fs::create_dir_all(root.join("cart")).unwrap();
        fs::write(root.join("cart/cart.go"), "package cart\n\ntype Cart struct{}\n").unwrap();

        fs::create_dir_all(root.join("testdata/fixture")).unwrap();
        fs::write(
            root.join("testdata/fixture/f.go"),
            "package fixture\n\nvar X = 1\n",
        )
        .unwrap();

        fs::create_dir_all(root.join("gen")).unwrap();
        fs::write(root.join("gen/gen.go"), "package gen\n\nvar Y = 1\n").unwrap();
        fs::write(root.join(IGNORE_FILE), "gen/\n").unwrap();

        fs::create_dir_all(root.join("vendor/golang.org/x/sync")).unwrap();
        fs::write(
            root.join("vendor/golang.org/x/sync/sync.go"),
            "package sync\n\nfunc Go() {}\n",
        )
        .unwrap();

        let program = ProgramLoader::default().load(root).unwrap();
        assert_eq!(program.module_path(), "example.com/shop");
        let paths: Vec<_> = program.package_ids().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["example.com/shop", "example.com/shop/cart"]);
        let main = program.package("example.com/shop").unwrap();
        assert_eq!(main.decls.len(), 1);

        let loader = ProgramLoader::new(LoaderConfig {
            include_tests: true,
            include_vendor: true,
            ..LoaderConfig::default()
        });
        let program = loader.load(root).unwrap();
        let sync = program.package("golang.org/x/sync").unwrap();
        assert!(!sync.project);
        assert_eq!(program.package("example.com/shop").unwrap().decls.len(), 2);
    }

    #[test]
    fn test_module_path_fallbacks() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.go"), "package a\n").unwrap();

        let loader = ProgramLoader::new(LoaderConfig {
            module_path: Some("example.com/fallback".to_string()),
            ..LoaderConfig::default()
        });
        let program = loader.load(temp_dir.path()).unwrap();
        assert_eq!(program.module_path(), "example.com/fallback");
    }

    #[test]
    fn test_empty_tree_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = ProgramLoader::default().load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::NoPackages { .. }));
    }
}
