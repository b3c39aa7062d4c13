//! Command envelopes and exit codes, captured through in-memory writers.

use crate::common::{Buffer, TestProject};
use spath::commands::{self, Workspace};
use spath::io::{ExitCode, OutputFormat, OutputManager};

fn capture(
    format: OutputFormat,
    run: impl FnOnce(&Workspace, &mut OutputManager) -> std::io::Result<ExitCode>,
) -> (ExitCode, Buffer, Buffer) {
    let project = TestProject::shop();
    let ws = project.workspace();
    let stdout = Buffer::default();
    let stderr = Buffer::default();
    let mut out =
        OutputManager::with_writers(format, Box::new(stdout.clone()), Box::new(stderr.clone()));
    let code = run(&ws, &mut out).unwrap();
    (code, stdout, stderr)
}

#[test]
fn test_resolve_json_envelope() {
    let (code, stdout, _) = capture(OutputFormat::Json, |ws, out| {
        commands::resolve(ws, out, "store.Store/fields[Name]/tag[json]", true)
    });
    assert_eq!(code, ExitCode::Success);

    let json = stdout.json();
    assert_eq!(json["status"], "success");
    assert_eq!(json["exit_code"], 0);
    assert_eq!(
        json["data"]["address"],
        "example.com/shop/store.Store/fields[Name]/tag[json]"
    );
    assert_eq!(json["data"]["kind"], "tag");
    assert_eq!(json["data"]["source"], "name");
    assert!(json["meta"]["version"].is_string());
}

#[test]
fn test_resolve_miss_suggests_neighbours() {
    let (code, stdout, _) = capture(OutputFormat::Json, |ws, out| {
        commands::resolve(ws, out, "store.Stor", false)
    });
    assert_eq!(code, ExitCode::NotFound);

    let json = stdout.json();
    assert_eq!(json["status"], "error");
    assert_eq!(json["exit_code"], 3);
    assert_eq!(json["error"]["resolved"], "example.com/shop/store");
    let did_you_mean = json["error"]["did_you_mean"].as_array().unwrap();
    assert!(
        did_you_mean
            .iter()
            .any(|s| s == "example.com/shop/store.Store"),
        "{did_you_mean:?}"
    );
}

#[test]
fn test_malformed_address_is_a_parse_error() {
    let (code, stdout, _) = capture(OutputFormat::Json, |ws, out| {
        commands::resolve(ws, out, "store..Store", false)
    });
    assert_eq!(code, ExitCode::ParseError);
    assert_eq!(stdout.json()["exit_code"], 4);
}

#[test]
fn test_ambiguous_bare_name_lists_candidates() {
    let (code, stdout, _) = capture(OutputFormat::Json, |ws, out| {
        commands::resolve(ws, out, "Item", false)
    });
    assert_eq!(code, ExitCode::NotFound);

    let json = stdout.json();
    assert_eq!(json["code"], "AMBIGUOUS_MATCH");
    let diagnostics = json["diagnostics"].as_array().unwrap();
    assert!(diagnostics.iter().any(|d| d["kind"] == "ambiguous_match"));
}

#[test]
fn test_list_reports_truncation() {
    let (code, stdout, _) = capture(OutputFormat::Json, |ws, out| {
        commands::list(ws, out, "**/fields[*]", Some(2), None, None)
    });
    assert_eq!(code, ExitCode::Success);

    let data = stdout.json()["data"].clone();
    assert_eq!(data["entries"].as_array().unwrap().len(), 2);
    assert_eq!(data["total"], 5);
    assert_eq!(data["truncated"], true);
}

#[test]
fn test_list_without_matches_is_not_found() {
    let (code, stdout, _) = capture(OutputFormat::Json, |ws, out| {
        commands::list(ws, out, "**.Nothing*", None, None, None)
    });
    assert_eq!(code, ExitCode::NotFound);
    let json = stdout.json();
    assert_eq!(json["exit_code"], 3);
    assert_eq!(json["data"]["total"], 0);
}

#[test]
fn test_list_rejects_bad_patterns_and_scopes() {
    let (code, _, _) = capture(OutputFormat::Json, |ws, out| {
        commands::list(ws, out, "store.***", None, None, None)
    });
    assert_eq!(code, ExitCode::InvalidPattern);

    let (code, _, _) = capture(OutputFormat::Json, |ws, out| {
        commands::list(ws, out, "**.Get", None, Some("-all"), None)
    });
    assert_eq!(code, ExitCode::InvalidPattern);
}

#[test]
fn test_list_honours_scope() {
    let (code, stdout, _) = capture(OutputFormat::Json, |ws, out| {
        commands::list(ws, out, "**.Item", None, Some("internal/..."), None)
    });
    assert_eq!(code, ExitCode::Success);
    let entries = stdout.json()["data"]["entries"].clone();
    let paths: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["example.com/shop/internal/legacy.Item"]);
}

#[test]
fn test_package_keyword_uses_target() {
    let (code, stdout, _) = capture(OutputFormat::Json, |ws, out| {
        commands::list(ws, out, "**.Item", None, Some("package"), Some("internal/legacy"))
    });
    assert_eq!(code, ExitCode::Success);
    let entries = stdout.json()["data"]["entries"].clone();
    assert_eq!(entries.as_array().unwrap().len(), 1);
    assert_eq!(entries[0]["path"], "example.com/shop/internal/legacy.Item");

    let (code, stdout, _) = capture(OutputFormat::Json, |ws, out| {
        commands::symbols(ws, out, Some("package"), Some("store"), None)
    });
    assert_eq!(code, ExitCode::Success);
    let packages = stdout.json()["data"]["packages"].clone();
    assert_eq!(packages.as_array().unwrap().len(), 1);
    assert_eq!(packages[0]["short_package"], "store");

    let (code, _, _) = capture(OutputFormat::Json, |ws, out| {
        commands::dead(ws, out, Some("package"), Some("internal/legacy"))
    });
    assert_eq!(code, ExitCode::Success);

    // Without a target the keyword has nothing to refer to.
    let (code, _, _) = capture(OutputFormat::Json, |ws, out| {
        commands::dead(ws, out, Some("package"), None)
    });
    assert_eq!(code, ExitCode::InvalidPattern);
}

#[test]
fn test_lookup_and_symbols() {
    let (code, stdout, _) =
        capture(OutputFormat::Json, |ws, out| commands::lookup(ws, out, "Item"));
    assert_eq!(code, ExitCode::Success);
    let candidates = stdout.json()["data"]["candidates"].clone();
    assert_eq!(candidates.as_array().unwrap().len(), 2);

    let (code, stdout, _) = capture(OutputFormat::Json, |ws, out| {
        commands::symbols(ws, out, Some("store"), None, None)
    });
    assert_eq!(code, ExitCode::Success);
    let packages = stdout.json()["data"]["packages"].clone();
    assert_eq!(packages.as_array().unwrap().len(), 1);
    assert_eq!(packages[0]["short_package"], "store");
    assert_eq!(packages[0]["counts"]["method"], 2);
}

#[test]
fn test_scope_and_dead_commands() {
    let (code, stdout, _) = capture(OutputFormat::Json, |ws, out| {
        commands::scope(ws, out, "internal/...,-internal/legacy/...", None)
    });
    assert_eq!(code, ExitCode::Success);
    let data = stdout.json()["data"].clone();
    assert_eq!(data["in_scope"][0], "example.com/shop/internal/util");
    assert_eq!(data["excluded"][0], "example.com/shop/internal/legacy");

    let (code, stdout, _) =
        capture(OutputFormat::Json, |ws, out| commands::dead(ws, out, None, None));
    assert_eq!(code, ExitCode::Success);
    let symbols = stdout.json()["data"]["symbols"].clone();
    assert_eq!(symbols.as_array().unwrap().len(), 2);
}

#[test]
fn test_text_output_goes_to_the_right_stream() {
    let (code, stdout, stderr) = capture(OutputFormat::Text, |ws, out| {
        commands::resolve(ws, out, "store.New", false)
    });
    assert_eq!(code, ExitCode::Success);
    assert!(stdout.contents().contains("example.com/shop/store.New"));
    assert!(stderr.contents().is_empty());

    let (code, stdout, stderr) = capture(OutputFormat::Text, |ws, out| {
        commands::resolve(ws, out, "store.Nope", false)
    });
    assert_eq!(code, ExitCode::NotFound);
    assert!(stdout.contents().is_empty());
    assert!(stderr.contents().contains("Nope"));
}
