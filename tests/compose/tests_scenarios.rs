//! End-to-end scenarios over a standard library on disk.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use reqm::hir::codes;
use reqm::{ElementKind, QualifiedId};

use crate::helpers::diagnostic_helpers::{assert_code_count, codes_of, validation_errors};
use crate::helpers::workspace::Workspace;

fn owner(composed: &reqm::ComposedModel, action: &str) -> Option<String> {
    let reference = QualifiedId::parse(action);
    let model = &composed.model;
    model
        .source
        .element(ElementKind::Action, &reference)
        .or_else(|| model.dependencies.element(ElementKind::Action, &reference))
        .and_then(|a| a.owner.as_ref())
        .map(|o| o.to_string())
}

#[test]
fn test_application_event_action_owned_by_module_in_same_file() {
    let workspace = Workspace::new().with_project(&[
        (
            "app.reqm",
            "application Sample { events { onStart: doInit; } }",
        ),
        ("core.reqm", "module Core; action doInit {}"),
    ]);

    let composed = workspace.compose().unwrap();

    assert_eq!(owner(&composed, "doInit").as_deref(), Some("Core"));
    assert!(composed.diagnostics.iter().all(|d| !d.is_error()));
    // Inherited from the standard application type.
    assert_eq!(owner(&composed, "reportError").as_deref(), Some("sample.Sample"));
}

#[test]
fn test_derived_class_inherits_mandatory_property() {
    let workspace = Workspace::new().with_project(&[
        ("app.reqm", "domain shop; application Shop from reqm.Application;"),
        ("model.reqm", "domain shop; class Derived from Base;"),
    ]);

    let composed = workspace.compose().unwrap();

    let derived = composed
        .model
        .source
        .element(ElementKind::Class, &QualifiedId::parse("shop.Derived"))
        .unwrap();
    let name = derived.property("name").unwrap();
    assert_eq!(name.type_name.as_deref(), Some("String"));
    assert_eq!(name.optionality, Some(reqm::syntax::Optionality::Mandatory));
    let base = composed
        .model
        .dependencies
        .element(ElementKind::Class, &QualifiedId::parse("reqm.Base"))
        .unwrap();
    assert_eq!(base.ref_count, 1);
}

#[test]
fn test_missing_event_handler_becomes_placeholder() {
    let workspace = Workspace::new().with_project(&[(
        "app.reqm",
        "application Sample { events { onStart: missingHandler; } }",
    )]);

    let composed = workspace.compose().unwrap();

    let placeholder = composed
        .model
        .dependencies
        .element(ElementKind::Action, &QualifiedId::new("missingHandler"))
        .expect("placeholder action should be in the dependencies");
    assert!(placeholder.definition.is_empty());
    assert_code_count(&composed, codes::PLACEHOLDER_ACTION, 1);
}

#[test]
fn test_unrelated_modules_binding_one_action_fail() {
    let workspace = Workspace::new().with_project(&[
        ("app.reqm", "application Sample;"),
        ("m1.reqm", "module M1 { events { a: shared; } }"),
        ("m2.reqm", "module M2 { events { b: shared; } }"),
        ("shared.reqm", "action shared {}"),
    ]);

    let errors = validation_errors(workspace.compose());

    assert_eq!(codes_of(&errors), vec![codes::OWNERSHIP_CONFLICT]);
    let message = errors[0].message.as_ref();
    for name in ["shared", "M1", "M2"] {
        assert!(message.contains(name), "'{message}' should name {name}");
    }
}

#[test]
fn test_every_bound_action_has_one_owner_or_an_error() {
    let workspace = Workspace::new().with_project(&[
        (
            "app.reqm",
            "application Sample { events { onStart: boot; onStop: halt; } }",
        ),
        (
            "core.reqm",
            "module Core { events { onSave: save; } } action boot { call save; }",
        ),
        ("ops.reqm", "module Ops; module Backup; action halt;"),
        ("save.reqm", "action save;"),
    ]);

    let errors = validation_errors(workspace.compose());

    assert_eq!(codes_of(&errors), vec![codes::AMBIGUOUS_OWNER]);
    assert!(errors[0].message.contains("halt"));
}
