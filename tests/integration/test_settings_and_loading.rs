//! Settings files and loader filters working together.

use crate::common::{Buffer, TestProject};
use spath::commands::{self, Workspace};
use spath::io::{ExitCode, OutputFormat, OutputManager};
use spath::{DiagnosticKind, LoadError, Settings};

#[test]
fn test_init_template_ignores_generated_files() {
    let project = TestProject::shop();
    project.add_file(
        "store/store_gen.go",
        "package store\n\nfunc Generated() {}\n",
    );

    let before = project.workspace();
    assert_eq!(before.index.lookup("Generated").len(), 1);

    let config = Settings::init_config_file(project.path(), false).unwrap();
    let settings = Settings::load_from(&config).unwrap();
    let after = project.workspace_with(settings);
    assert!(after.index.lookup("Generated").is_empty());
    assert_eq!(after.index.lookup("New").len(), 1);
}

#[test]
fn test_settings_file_drives_list_limit() {
    let project = TestProject::shop();
    let config = project.add_file(
        ".spath/settings.toml",
        "[query]\ndefault_limit = 3\n",
    );
    let ws = project.workspace_with(Settings::load_from(&config).unwrap());
    assert_eq!(ws.settings.query.default_limit, 3);

    let stdout = Buffer::default();
    let mut out = OutputManager::with_writers(
        OutputFormat::Json,
        Box::new(stdout.clone()),
        Box::new(Buffer::default()),
    );
    let code = commands::list(&ws, &mut out, "**", None, None, None).unwrap();
    assert_eq!(code, ExitCode::Success);
    let data = stdout.json()["data"].clone();
    assert_eq!(data["entries"].as_array().unwrap().len(), 3);
    assert_eq!(data["truncated"], true);

    // An explicit zero lifts the limit.
    let stdout = Buffer::default();
    let mut out = OutputManager::with_writers(
        OutputFormat::Json,
        Box::new(stdout.clone()),
        Box::new(Buffer::default()),
    );
    commands::list(&ws, &mut out, "**", Some(0), None, None).unwrap();
    assert_eq!(stdout.json()["data"]["truncated"], false);
}

#[test]
fn test_include_tests_adds_test_functions_as_roots() {
    let project = TestProject::shop();
    let mut settings = Settings::default();
    settings.loader.include_tests = true;
    let ws = project.workspace_with(settings);

    let found = ws.index.lookup("TestGet");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].package, "example.com/shop/store");
}

#[test]
fn test_missing_go_mod_falls_back_to_configured_module_path() {
    let project = TestProject::new();
    project.add_file("api/api.go", "package api\n\nfunc Serve() {}\n");

    let mut settings = Settings::default();
    settings.loader.module_path = Some("example.org/svc".to_string());
    let ws = project.workspace_with(settings);
    assert_eq!(ws.program.module_path(), "example.org/svc");
    assert!(ws.program.package("example.org/svc/api").is_some());
}

#[test]
fn test_load_errors() {
    let project = TestProject::new();
    project.add_file("README.md", "no Go here\n");
    assert!(matches!(
        Workspace::load(project.path(), Settings::default()),
        Err(LoadError::NoPackages { .. })
    ));

    let missing = project.path().join("does-not-exist");
    assert!(matches!(
        Workspace::load(&missing, Settings::default()),
        Err(LoadError::Io { .. })
    ));
}

#[test]
fn test_broken_package_is_loaded_with_a_warning() {
    let project = TestProject::shop();
    project.add_file(
        "internal/broken/broken.go",
        "package broken\n\nfunc Good() {}\n\nfunc Oops( {\n",
    );
    let ws = project.workspace();

    let warnings: Vec<_> = ws
        .load_diagnostics
        .of_kind(DiagnosticKind::LoadWarning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("internal/broken"));

    // The rest of the module still resolves.
    let stdout = Buffer::default();
    let mut out = OutputManager::with_writers(
        OutputFormat::Json,
        Box::new(stdout.clone()),
        Box::new(Buffer::default()),
    );
    let code = commands::resolve(&ws, &mut out, "store.Store.Get", false).unwrap();
    assert_eq!(code, ExitCode::Success);
    let json = stdout.json();
    assert!(
        json["diagnostics"]
            .as_array()
            .unwrap()
            .iter()
            .any(|d| d["kind"] == "load_warning")
    );
}
