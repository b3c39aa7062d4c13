//! Wildcard matching over a loaded module.

use crate::common::TestProject;
use spath::{PatternError, Pattern, enumerate_all, match_entries};

fn matched(pattern: &str, limit: Option<usize>) -> (Vec<String>, usize) {
    let project = TestProject::shop();
    let ws = project.workspace();
    let universe = enumerate_all(&ws.program, &ws.index);
    let compiled = Pattern::compile(pattern).unwrap();
    let result = match_entries(&compiled, &universe, limit);
    let paths = result.matches.into_iter().map(|e| e.path).collect();
    (paths, result.total)
}

#[test]
fn test_double_star_finds_methods_across_types() {
    let (paths, total) = matched("**.Get", None);
    assert_eq!(
        paths,
        vec![
            "example.com/shop/store.Getter.Get".to_string(),
            "example.com/shop/store.Store.Get".to_string(),
        ]
    );
    assert_eq!(total, 2);
}

#[test]
fn test_single_star_stays_within_one_segment() {
    let (paths, _) = matched("store.*", None);
    assert!(paths.contains(&"example.com/shop/store.Store".to_string()));
    assert!(paths.contains(&"example.com/shop/store.New".to_string()));
    assert!(!paths.iter().any(|p| p.ends_with("store.Store.Get")));
    assert!(!paths.iter().any(|p| p.contains("fields[")));
}

#[test]
fn test_optional_leading_path_matches_tags_everywhere() {
    let (paths, total) = matched("**/tag[json]", None);
    assert_eq!(
        paths,
        vec![
            "example.com/shop/store.Item/fields[ID]/tag[json]".to_string(),
            "example.com/shop/store.Item/fields[Price]/tag[json]".to_string(),
            "example.com/shop/store.Store/fields[Name]/tag[json]".to_string(),
        ]
    );
    assert_eq!(total, 3);
}

#[test]
fn test_optional_trailing_subpath_includes_the_base() {
    let (paths, _) = matched("store.Item/**", None);
    assert!(paths.contains(&"example.com/shop/store.Item".to_string()));
    assert!(paths.contains(&"example.com/shop/store.Item/fields[Price]/type".to_string()));
    assert!(paths.iter().all(|p| p.starts_with("example.com/shop/store.Item")));
    assert!(!paths.iter().any(|p| p.contains("legacy")));
}

#[test]
fn test_limit_truncates_but_reports_total() {
    let project = TestProject::shop();
    let ws = project.workspace();
    let universe = enumerate_all(&ws.program, &ws.index);
    let everything = Pattern::compile("**").unwrap();

    let result = match_entries(&everything, &universe, Some(5));
    assert_eq!(result.matches.len(), 5);
    assert_eq!(result.total, universe.len());
    assert!(result.is_truncated());

    let full = match_entries(&everything, &universe, None);
    assert_eq!(full.matches.len(), universe.len());
    assert!(!full.is_truncated());
    // The truncated set is a prefix of the sorted full set.
    assert_eq!(&full.matches[..5], &result.matches[..]);
}

#[test]
fn test_results_are_sorted_and_repeatable() {
    let (first, _) = matched("**/params[*]", None);
    let (second, _) = matched("**/params[*]", None);
    assert_eq!(first, second);
    let mut sorted = first.clone();
    sorted.sort();
    assert_eq!(first, sorted);
    assert!(first.contains(&"example.com/shop/store.Keys/params[m]".to_string()));
}

#[test]
fn test_invalid_patterns_are_rejected() {
    assert!(matches!(Pattern::compile(""), Err(PatternError::Empty)));
    assert!(matches!(
        Pattern::compile("store.***"),
        Err(PatternError::StarRun { .. })
    ));
    assert!(matches!(
        Pattern::compile("store.Item/fields[*"),
        Err(PatternError::UnbalancedBrackets { .. })
    ));
}
