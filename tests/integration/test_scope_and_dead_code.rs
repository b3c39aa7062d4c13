//! Scope expressions and dead-code reports against a loaded module.

use crate::common::TestProject;
use spath::{
    DiagnosticKind, Diagnostics, NameReferenceOracle, ScopeError, ScopeFilter, Settings,
    enumerate_all, enumerate_where, find_dead_code,
};

fn in_scope(expr: &str, settings: Settings) -> Vec<String> {
    let project = TestProject::shop();
    let ws = project.workspace_with(settings);
    let filter = ScopeFilter::parse(expr, None, &ws.program, &mut Diagnostics::new()).unwrap();
    filter.packages().into_iter().map(str::to_string).collect()
}

#[test]
fn test_exclusion_wins_in_either_order() {
    let expected = vec!["example.com/shop/internal/util".to_string()];
    assert_eq!(
        in_scope("internal/...,-internal/legacy/...", Settings::default()),
        expected
    );
    assert_eq!(
        in_scope("-internal/legacy/...,internal/...", Settings::default()),
        expected
    );
}

#[test]
fn test_project_keyword_excludes_vendored_packages() {
    let mut settings = Settings::default();
    settings.loader.include_vendor = true;

    let all = in_scope("all", settings.clone());
    assert!(all.contains(&"github.com/acme/log".to_string()));

    let project = in_scope("project", settings.clone());
    assert_eq!(project.len(), 4);
    assert!(!project.contains(&"github.com/acme/log".to_string()));

    // `...` alone means every project package.
    assert_eq!(in_scope("./...", settings), project);
}

#[test]
fn test_glob_tokens_and_literal_packages() {
    assert_eq!(
        in_scope("**/legacy,store", Settings::default()),
        vec![
            "example.com/shop/internal/legacy".to_string(),
            "example.com/shop/store".to_string(),
        ]
    );
}

#[test]
fn test_unmatched_token_is_a_warning_not_an_error() {
    let project = TestProject::shop();
    let ws = project.workspace();
    let mut diagnostics = Diagnostics::new();

    let filter = ScopeFilter::parse("store,nothing/...", None, &ws.program, &mut diagnostics)
        .unwrap();
    assert_eq!(filter.packages(), vec!["example.com/shop/store"]);
    assert_eq!(
        diagnostics
            .of_kind(DiagnosticKind::UnmatchedScopePattern)
            .count(),
        1
    );
}

#[test]
fn test_invalid_scope_expressions() {
    let project = TestProject::shop();
    let ws = project.workspace();
    let parse = |expr: &str| ScopeFilter::parse(expr, None, &ws.program, &mut Diagnostics::new());

    assert!(matches!(parse("-project"), Err(ScopeError::NegatedKeyword { .. })));
    assert!(matches!(parse("store,-"), Err(ScopeError::EmptyExclusion { .. })));
    assert!(matches!(parse("package"), Err(ScopeError::MissingDefaultTarget)));
}

#[test]
fn test_scoped_enumeration_only_lists_in_scope_packages() {
    let project = TestProject::shop();
    let ws = project.workspace();
    let filter =
        ScopeFilter::parse("internal/...", None, &ws.program, &mut Diagnostics::new()).unwrap();

    let entries = enumerate_where(&ws.program, &ws.index, |p| filter.in_scope(p.path()));
    assert!(!entries.is_empty());
    assert!(entries.iter().all(|e| e.package.contains("/internal/")));
    assert!(entries.len() < enumerate_all(&ws.program, &ws.index).len());
}

#[test]
fn test_dead_code_with_exported_roots() {
    let project = TestProject::shop();
    let ws = project.workspace();
    let mut diagnostics = Diagnostics::new();
    let filter = ScopeFilter::parse("project", None, &ws.program, &mut diagnostics).unwrap();

    let oracle = NameReferenceOracle::build(&ws.program, &ws.index, &ws.settings.dead_code);
    let dead: Vec<String> = find_dead_code(&ws.index, &oracle, &filter, &mut diagnostics)
        .into_iter()
        .map(|s| s.address())
        .collect();

    assert_eq!(
        dead,
        vec![
            "example.com/shop/internal/legacy.convert".to_string(),
            "example.com/shop/internal/util.unused".to_string(),
        ]
    );
}

#[test]
fn test_dead_code_from_main_only() {
    let project = TestProject::shop();
    let mut settings = Settings::default();
    settings.dead_code.exported_are_roots = false;
    let ws = project.workspace_with(settings);
    let mut diagnostics = Diagnostics::new();
    let filter = ScopeFilter::parse("project", None, &ws.program, &mut diagnostics).unwrap();

    let oracle = NameReferenceOracle::build(&ws.program, &ws.index, &ws.settings.dead_code);
    let dead: Vec<String> = find_dead_code(&ws.index, &oracle, &filter, &mut diagnostics)
        .into_iter()
        .map(|s| s.address())
        .collect();

    for unreachable in [
        "example.com/shop/store.Keys",
        "example.com/shop/internal/util.Clamp",
        "example.com/shop/internal/legacy.convert",
    ] {
        assert!(dead.contains(&unreachable.to_string()), "{unreachable} in {dead:?}");
    }
    for live in [
        "example.com/shop/cmd/shop.main",
        "example.com/shop/store.New",
        "example.com/shop/store.Store",
        "example.com/shop/store.Store.Put",
        "example.com/shop/store.Store.Get",
        "example.com/shop/store.ErrMissing",
    ] {
        assert!(!dead.contains(&live.to_string()), "{live} reported dead");
    }
}
