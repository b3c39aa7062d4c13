//! "Did you mean" candidates for resolution misses.

use crate::diagnostics::Diagnostics;
use crate::error::ResolveError;
use crate::program::Program;
use crate::spath::{Path, Resolver};
use crate::symbol::SymbolIndex;

const MAX_SUGGESTIONS: usize = 5;

/// Edit distance over chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Rank `candidates` by closeness to `target`.
///
/// `key` extracts the part of a candidate compared against `target`; a
/// candidate is kept when it is within a third of the target's length (at
/// least 2 edits) or contains the target, ignoring case.
pub fn suggest<'a>(
    target: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    key: impl Fn(&str) -> &str,
    limit: usize,
) -> Vec<String> {
    let target_lower = target.to_lowercase();
    let threshold = (target.chars().count() / 3).max(2);

    let mut ranked: Vec<(usize, &str)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let compared = key(candidate).to_lowercase();
            let distance = levenshtein(&target_lower, &compared);
            let contains = !target_lower.is_empty() && compared.contains(&target_lower);
            (distance <= threshold || contains).then_some((distance, candidate))
        })
        .collect();

    ranked.sort();
    ranked.dedup_by(|a, b| a.1 == b.1);
    ranked
        .into_iter()
        .take(limit)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}

/// Candidate addresses for a failed resolution, best first.
pub fn suggestions_for(error: &ResolveError, program: &Program, index: &SymbolIndex) -> Vec<String> {
    match error {
        ResolveError::Parse(_) => Vec::new(),
        ResolveError::PackageNotFound { package } => {
            let paths: Vec<&str> = program
                .package_ids()
                .flat_map(|id| [id.path.as_str(), id.short_path.as_str()])
                .filter(|p| !p.is_empty())
                .collect();
            let mut found = suggest(package, paths.iter().copied(), |p| p, MAX_SUGGESTIONS);
            if found.is_empty() {
                // Compare the last path component alone.
                let last = package.rsplit('/').next().unwrap_or(package);
                found = suggest(last, paths.iter().copied(), last_component, MAX_SUGGESTIONS);
            }
            found
        }
        ResolveError::SymbolNotFound { package, symbol } => {
            let addresses: Vec<String> = if package == "*" {
                index.symbols().iter().map(|s| s.address()).collect()
            } else {
                index.in_package(package).iter().map(|s| s.address()).collect()
            };
            suggest(
                symbol,
                addresses.iter().map(String::as_str),
                last_name,
                MAX_SUGGESTIONS,
            )
        }
        ResolveError::MethodNotFound { resolved, method } => {
            let children = child_addresses(resolved, program, index);
            let prefix = format!("{resolved}/methods[");
            let methods: Vec<String> = children
                .iter()
                .filter_map(|child| child.strip_prefix(&prefix))
                .filter_map(|rest| rest.strip_suffix(']'))
                .map(|name| format!("{resolved}.{name}"))
                .collect();
            suggest(method, methods.iter().map(String::as_str), last_name, MAX_SUGGESTIONS)
        }
        ResolveError::ChildNotFound {
            resolved,
            category,
            selector,
        } => {
            let wanted = format!("{category}[{selector}]");
            let children = child_addresses(resolved, program, index);
            let mut found = suggest(
                &wanted,
                children.iter().map(String::as_str),
                last_segment,
                MAX_SUGGESTIONS,
            );
            if found.is_empty() {
                let prefix = format!("{resolved}/{category}");
                found = children
                    .into_iter()
                    .filter(|c| c.starts_with(&prefix))
                    .take(MAX_SUGGESTIONS)
                    .collect();
            }
            found
        }
        ResolveError::InvalidCategory {
            resolved, category, ..
        }
        | ResolveError::MissingSelector { resolved, category }
        | ResolveError::UnexpectedSelector { resolved, category }
        | ResolveError::MissingChild { resolved, category } => {
            let children = child_addresses(resolved, program, index);
            let prefix = format!("{resolved}/{category}");
            let matching: Vec<String> = children
                .iter()
                .filter(|c| c.starts_with(&prefix))
                .take(MAX_SUGGESTIONS)
                .cloned()
                .collect();
            if matching.is_empty() {
                children.into_iter().take(MAX_SUGGESTIONS).collect()
            } else {
                matching
            }
        }
        ResolveError::Ambiguous { candidates, .. } => candidates.clone(),
    }
}

/// Direct children of an already-resolved address.
fn child_addresses(resolved: &str, program: &Program, index: &SymbolIndex) -> Vec<String> {
    let Ok(path) = Path::parse(resolved) else {
        return Vec::new();
    };
    let resolver = Resolver::new(program, index);
    let Ok(resolution) = resolver.resolve(&path, &mut Diagnostics::new()) else {
        return Vec::new();
    };
    resolver
        .children(resolution.package(), resolution.node())
        .into_iter()
        .map(|(segment, _)| resolution.path().child(segment).to_string())
        .collect()
}

fn last_component(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// `Name` of `pkg.Name` or `pkg.Type.Name`.
fn last_name(address: &str) -> &str {
    address.rsplit('.').next().unwrap_or(address)
}

/// `category[selector]` of the final segment.
fn last_segment(address: &str) -> &str {
    address.rsplit('/').next().unwrap_or(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{ProgramLoader, SourceInput};

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("Config", "Config"), 0);
        assert_eq!(levenshtein("héllo", "hello"), 1);
    }

    #[test]
    fn test_suggest_ranks_by_distance() {
        let names = ["Config", "Conf", "Loader", "Configure"];
        let found = suggest("Confg", names, |n| n, 3);
        // Ties break alphabetically; "Configure" is too far and lacks "confg".
        assert_eq!(found, vec!["Conf".to_string(), "Config".to_string()]);
    }

    fn fixture() -> (Program, SymbolIndex) {
        let program = ProgramLoader::load_sources(
            "example.com/app",
            vec![SourceInput::new(
                "config/config.go",
                "package config\n\ntype Config struct {\n\tName string\n\tPort int\n}\n\nfunc (c Config) Validate() error { return nil }\n\nfunc Load() Config { return Config{} }\n",
            )],
        )
        .unwrap();
        let index = SymbolIndex::build(&program);
        (program, index)
    }

    fn miss(program: &Program, index: &SymbolIndex, address: &str) -> Vec<String> {
        let err = Resolver::new(program, index)
            .resolve_address(address, &mut Diagnostics::new())
            .unwrap_err();
        suggestions_for(&err, program, index)
    }

    #[test]
    fn test_suggestions_for_misses() {
        let (program, index) = fixture();

        assert_eq!(
            miss(&program, &index, "confg.Config"),
            vec!["config".to_string()]
        );
        assert_eq!(
            miss(&program, &index, "config.Confg"),
            vec!["example.com/app/config.Config".to_string()]
        );
        assert_eq!(
            miss(&program, &index, "config.Config.Validat"),
            vec!["example.com/app/config.Config.Validate".to_string()]
        );
        assert_eq!(
            miss(&program, &index, "config.Config/fields[Nam]")[0],
            "example.com/app/config.Config/fields[Name]"
        );
        assert!(
            miss(&program, &index, "config.Config/fields")
                .iter()
                .all(|s| s.contains("/fields["))
        );
        assert_eq!(
            miss(&program, &index, "Lod"),
            vec!["example.com/app/config.Load".to_string()]
        );
    }
}
