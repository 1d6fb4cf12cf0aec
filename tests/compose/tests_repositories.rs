//! Repository roots, precedence and index caches on disk.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::time::{Duration, SystemTime};

use reqm::hir::codes;
use reqm::{ComposeError, Composer, ElementKind, QualifiedId};

use crate::helpers::diagnostic_helpers::assert_code_count;
use crate::helpers::workspace::{CONTEXT, Workspace, write};

fn property_type(composed: &reqm::ComposedModel, class: &str, key: &str) -> Option<String> {
    composed
        .model
        .source
        .element(ElementKind::Class, &QualifiedId::new(class))
        .and_then(|c| c.property(key))
        .and_then(|p| p.type_name.as_ref())
        .map(|t| t.to_string())
}

#[test]
fn test_compose_writes_index_caches_for_every_stdlib_folder() {
    let workspace = Workspace::new().with_project(&[("app.reqm", "application Shop;")]);

    workspace.compose().unwrap();

    for folder in ["core", "model", "ui"] {
        let index = workspace.stdlib().join(folder).join("index");
        assert!(index.is_file(), "{} should exist", index.display());
    }
    let core = fs::read_to_string(workspace.stdlib().join("core/index")).unwrap();
    assert!(core.contains("content;app;reqm.Application;application.reqm"));
    assert!(!workspace.project().join("index").exists());
}

#[test]
fn test_user_cache_supplies_missing_elements() {
    let workspace = Workspace::new()
        .with_user_cache(&[(
            "ext/money.reqm",
            "domain ext; class Money { amount: Decimal; currency: String; }",
        )])
        .with_project(&[
            ("app.reqm", "application Shop;"),
            ("model.reqm", "class Price from Money;"),
        ]);

    let composed = workspace.compose().unwrap();

    assert_eq!(
        property_type(&composed, "Price", "amount").as_deref(),
        Some("Decimal")
    );
    assert!(workspace.user_cache().join("ext/index").is_file());
}

#[test]
fn test_standard_library_wins_over_user_cache() {
    let workspace = Workspace::new()
        .with_user_cache(&[("base.reqm", "domain reqm; class Base { id: Integer; }")])
        .with_project(&[
            ("app.reqm", "application Shop;"),
            ("model.reqm", "class Order from Base;"),
        ]);

    let composed = workspace.compose().unwrap();

    assert_eq!(property_type(&composed, "Order", "id").as_deref(), Some("Uuid"));
}

#[test]
fn test_second_run_uses_cache_and_sees_newer_documents() {
    let workspace = Workspace::new().with_project(&[
        ("app.reqm", "application Shop;"),
        ("model.reqm", "class Order from Base;"),
    ]);
    workspace.compose().unwrap();

    let base = workspace.stdlib().join("model/base.reqm");
    write(
        &workspace.stdlib(),
        "model/base.reqm",
        "domain reqm; class Base { id: Uuid; code: Text; }",
    );
    fs::File::options()
        .write(true)
        .open(&base)
        .unwrap()
        .set_modified(SystemTime::now() + Duration::from_secs(120))
        .unwrap();

    let composed = workspace.compose().unwrap();

    assert_eq!(property_type(&composed, "Order", "code").as_deref(), Some("Text"));
}

#[test]
fn test_library_action_not_owned_by_module_of_equally_named_file() {
    let workspace = Workspace::new().with_project(&[(
        "app.reqm",
        "application Sample { events { onStart: foo; } } module Main from Ui;",
    )]);
    write(&workspace.stdlib(), "a/actions.reqm", "domain reqm; action foo;");
    write(&workspace.stdlib(), "b/actions.reqm", "domain reqm; module Ui;");

    let composed = workspace.compose().unwrap();

    let foo = composed
        .model
        .dependencies
        .element(ElementKind::Action, &QualifiedId::parse("reqm.foo"))
        .unwrap();
    assert_eq!(
        foo.owner.as_ref().map(|o| o.to_string()).as_deref(),
        Some("sample.Sample")
    );
    assert!(
        composed
            .with_code(codes::NO_MODULE_IN_FILE)
            .any(|d| d.element.as_deref() == Some("reqm.foo"))
    );
}

#[test]
fn test_deleted_library_document_degrades_to_unresolved_ancestor() {
    let workspace = Workspace::new().with_project(&[
        ("app.reqm", "application Shop;"),
        ("model.reqm", "class Local from Gone;"),
    ]);
    write(&workspace.stdlib(), "extra/gone.reqm", "domain reqm; class Gone { id: Uuid; }");
    write(&workspace.stdlib(), "extra/keep.reqm", "domain reqm; class Keep;");
    let first = workspace.compose().unwrap();
    assert_eq!(property_type(&first, "Local", "id").as_deref(), Some("Uuid"));

    fs::remove_file(workspace.stdlib().join("extra/gone.reqm")).unwrap();
    let composed = workspace.compose().unwrap();

    assert_code_count(&composed, codes::UNRESOLVED_ANCESTOR, 1);
    let rebuilt = fs::read_to_string(workspace.stdlib().join("extra/index")).unwrap();
    assert!(!rebuilt.contains("gone.reqm"));
    assert!(rebuilt.contains("content;cls;reqm.Keep;keep.reqm"));
}

#[test]
fn test_corrupt_index_cache_is_rebuilt() {
    let workspace = Workspace::new().with_project(&[
        ("app.reqm", "application Shop;"),
        ("model.reqm", "class Order from Base;"),
    ]);
    workspace.compose().unwrap();
    fs::write(workspace.stdlib().join("model/index"), "garbage\n").unwrap();

    let composed = workspace.compose().unwrap();

    assert_eq!(property_type(&composed, "Order", "id").as_deref(), Some("Uuid"));
    let rebuilt = fs::read_to_string(workspace.stdlib().join("model/index")).unwrap();
    assert!(rebuilt.contains("content;cls;reqm.Base;base.reqm"));
}

#[test]
fn test_missing_standard_library_fails_connect() {
    let workspace = Workspace::new();
    let mut composer = Composer::new(CONTEXT.clone());

    let result = composer.connect(&workspace.project(), &workspace.user_home());

    assert!(matches!(result, Err(ComposeError::StdlibMissing(_))));
}
