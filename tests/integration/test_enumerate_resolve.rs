//! Enumeration and resolution agree on a module loaded from disk.

use crate::common::TestProject;
use spath::{Diagnostics, Path, enumerate_all};

#[test]
fn test_every_enumerated_address_resolves_to_itself() {
    for project in [TestProject::shop(), TestProject::versioned_shop()] {
        let ws = project.workspace();
        let resolver = ws.resolver();

        let entries = enumerate_all(&ws.program, &ws.index);
        assert!(entries.len() > 40, "only {} entries", entries.len());

        for entry in &entries {
            let resolution = resolver
                .resolve_address(&entry.path, &mut Diagnostics::new())
                .unwrap_or_else(|e| panic!("{} failed to resolve: {e}", entry.path));
            assert_eq!(resolution.address(), entry.path);
            assert_eq!(resolution.kind(), entry.kind, "kind of {}", entry.path);

            let reparsed = Path::parse(&entry.path).unwrap();
            assert_eq!(reparsed.to_string(), entry.path);
            assert_eq!(&reparsed, resolution.path(), "reading back {}", entry.path);
        }
    }
}

#[test]
fn test_versioned_module_packages_and_symbols() {
    let project = TestProject::versioned_shop();
    let ws = project.workspace();
    let resolver = ws.resolver();
    let paths: Vec<String> = enumerate_all(&ws.program, &ws.index)
        .into_iter()
        .map(|e| e.path)
        .collect();

    for (address, kind) in [
        ("example.com/shop.v2", "package"),
        ("example.com/shop.v2.Version", "const"),
        ("example.com/shop.v2/store", "package"),
        ("example.com/shop.v2/internal/legacy", "package"),
        ("example.com/shop.v2/store.Store.Get/params[key]", "param"),
        ("example.com/shop.v2/store.Item/fields[ID]/tag[json]", "tag"),
    ] {
        assert!(paths.iter().any(|p| p == address), "missing {address}");
        let resolution = resolver
            .resolve_address(address, &mut Diagnostics::new())
            .unwrap_or_else(|e| panic!("{address} failed to resolve: {e}"));
        assert_eq!(resolution.kind(), kind, "kind of {address}");
    }

    // A subpackage address is a package address, not a parse error.
    assert!(Path::parse("example.com/shop.v2/internal/util").unwrap().is_package_only());
}

#[test]
fn test_short_forms_resolve_to_canonical_addresses() {
    let project = TestProject::shop();
    let ws = project.workspace();
    let resolver = ws.resolver();

    let entries = enumerate_all(&ws.program, &ws.index);
    let mut checked = 0;
    for entry in entries.iter().filter(|e| e.path != e.package) {
        let Some(short) = entry.short_form() else {
            continue;
        };
        let resolution = resolver
            .resolve_address(&short, &mut Diagnostics::new())
            .unwrap_or_else(|e| panic!("{short} failed to resolve: {e}"));
        assert_eq!(resolution.address(), entry.path);
        checked += 1;
    }
    assert!(checked > 0);
}

#[test]
fn test_expected_addresses_are_enumerated() {
    let project = TestProject::shop();
    let ws = project.workspace();
    let paths: Vec<String> = enumerate_all(&ws.program, &ws.index)
        .into_iter()
        .map(|e| e.path)
        .collect();

    for expected in [
        "example.com/shop/store",
        "example.com/shop/store.Store",
        "example.com/shop/store.Store.Get",
        "example.com/shop/store.Store.Get/params[key]",
        "example.com/shop/store.Store.Get/returns[1]",
        "example.com/shop/store.Store/fields[Name]/tag[json]",
        "example.com/shop/store.Store/embeds[Base]",
        "example.com/shop/store.Item/fields[ID]/doc",
        "example.com/shop/store.Getter.Get",
        "example.com/shop/store.Keys/typeparams[K]/constraint",
        "example.com/shop/store.DefaultSize/value",
        "example.com/shop/cmd/shop.main/body",
        "example.com/shop/internal/legacy.Item",
    ] {
        assert!(
            paths.iter().any(|p| p == expected),
            "missing {expected}"
        );
    }
}

#[test]
fn test_default_loader_skips_tests_testdata_and_vendor() {
    let project = TestProject::shop();
    let ws = project.workspace();

    let packages: Vec<&str> = ws.program.packages().iter().map(|p| p.path()).collect();
    assert_eq!(
        packages,
        vec![
            "example.com/shop/cmd/shop",
            "example.com/shop/internal/legacy",
            "example.com/shop/internal/util",
            "example.com/shop/store",
        ]
    );
    assert!(ws.index.lookup("TestGet").is_empty());
    assert!(ws.index.lookup("Fixture").is_empty());
    assert!(ws.index.lookup("Printf").is_empty());
}

#[test]
fn test_resolve_reads_source_text_from_disk() {
    let project = TestProject::shop();
    let ws = project.workspace();
    let resolver = ws.resolver();
    let mut diagnostics = Diagnostics::new();

    let tag = resolver
        .resolve_address("store.Item/fields[ID]/tag[db]", &mut diagnostics)
        .unwrap();
    assert_eq!(tag.source(&ws.program).as_deref(), Some("item_id"));

    let location = tag.location(&ws.program).unwrap();
    assert!(location.starts_with("store/store.go:"), "{location}");

    let doc = resolver
        .resolve_address("store.Item/fields[ID]/doc", &mut diagnostics)
        .unwrap();
    assert_eq!(doc.source(&ws.program).as_deref(), Some("ID identifies the item."));
}
