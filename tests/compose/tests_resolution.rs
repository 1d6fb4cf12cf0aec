//! Cross-repository merge behaviour seen through the full pipeline.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use reqm::hir::codes;
use reqm::{ComposeError, ElementKind, QualifiedId};

use crate::helpers::diagnostic_helpers::assert_code_count;
use crate::helpers::workspace::{Workspace, write};

fn property_types(element: &reqm::Element) -> Vec<(String, Option<String>)> {
    element
        .definition
        .properties
        .iter()
        .map(|p| (p.key.to_string(), p.type_name.as_ref().map(|t| t.to_string())))
        .collect()
}

fn pair(key: &str, type_name: &str) -> (String, Option<String>) {
    (key.to_string(), Some(type_name.to_string()))
}

#[test]
fn test_multi_level_chain_and_feature() {
    let workspace = Workspace::new().with_project(&[
        ("app.reqm", "application Shop;"),
        (
            "model.reqm",
            r#"
            domain shop;
            entity Customer from Persistent {
                use Auditing;
                name: Text;
                email;
            }
            "#,
        ),
    ]);

    let composed = workspace.compose().unwrap();

    let customer = composed
        .model
        .source
        .element(ElementKind::Entity, &QualifiedId::parse("shop.Customer"))
        .unwrap();
    assert_eq!(
        property_types(customer),
        vec![
            pair("name", "Text"),
            pair("email", "String"),
            pair("version", "Long"),
            pair("id", "Uuid"),
            pair("createdAt", "DateTime"),
            pair("createdBy", "String"),
        ]
    );
    // `email` had no type anywhere and was defaulted.
    assert_code_count(&composed, codes::DEFAULTED_TYPE, 1);
}

#[test]
fn test_library_property_type_is_defaulted_in_dependencies() {
    let workspace = Workspace::new().with_project(&[
        ("app.reqm", "application Shop;"),
        ("model.reqm", "class Customer { home: Address; }"),
    ]);
    write(
        &workspace.stdlib(),
        "extra/address.reqm",
        "domain reqm; class Address { street; city: String; }",
    );

    let composed = workspace.compose().unwrap();

    let address = composed
        .model
        .dependencies
        .element(ElementKind::Class, &QualifiedId::parse("reqm.Address"))
        .unwrap();
    assert_eq!(
        property_types(address),
        vec![pair("street", "String"), pair("city", "String")]
    );
    assert!(
        composed
            .with_code(codes::DEFAULTED_TYPE)
            .any(|d| d.element.as_deref() == Some("reqm.Address"))
    );
}

#[test]
fn test_view_layout_expanded_from_library() {
    let workspace = Workspace::new().with_project(&[
        ("app.reqm", "application Shop;"),
        (
            "views.reqm",
            r#"
            view Home from Page {
                title = "Welcome";
                layout {
                    Header;
                    Promotions;
                }
            }
            "#,
        ),
    ]);

    let composed = workspace.compose().unwrap();

    let home = composed
        .model
        .source
        .element(ElementKind::View, &QualifiedId::new("Home"))
        .unwrap();
    let layout = home.property("layout").unwrap();
    let header = layout.attribute("Header").unwrap();
    assert_eq!(
        header.attribute("logo").and_then(|l| l.type_name.as_deref()),
        Some("Image")
    );
    assert_eq!(home.property("title").unwrap().value.as_deref(), Some("Welcome"));
    assert_code_count(&composed, codes::UNRESOLVED_LAYOUT, 1);
}

#[test]
fn test_project_elements_shadow_repositories() {
    let workspace = Workspace::new().with_project(&[
        ("app.reqm", "application Shop;"),
        (
            "model.reqm",
            "domain reqm; class Base { id: Integer; } class Order from Base;",
        ),
    ]);

    let composed = workspace.compose().unwrap();

    let order = composed
        .model
        .source
        .element(ElementKind::Class, &QualifiedId::new("Order"))
        .unwrap();
    assert_eq!(property_types(order), vec![pair("id", "Integer")]);
    assert!(
        composed
            .model
            .dependencies
            .element(ElementKind::Class, &QualifiedId::parse("reqm.Base"))
            .is_none()
    );
}

#[test]
fn test_authored_elements_are_never_removed() {
    let workspace = Workspace::new().with_project(&[
        ("app.reqm", "application Shop { events { onStart: nowhere; } }"),
        ("model.reqm", "class Lost from Nothing; view Broken { layout { Gone; } }"),
    ]);

    let composed = workspace.compose().unwrap();

    assert_eq!(composed.model.source.len(), 3);
    assert_code_count(&composed, codes::UNRESOLVED_ANCESTOR, 1);
    assert_code_count(&composed, codes::PLACEHOLDER_ACTION, 1);
    assert_code_count(&composed, codes::UNRESOLVED_LAYOUT, 1);
}

#[test]
fn test_ancestor_cycle_aborts_composition() {
    let workspace = Workspace::new().with_project(&[
        ("app.reqm", "application Shop;"),
        ("model.reqm", "class A from B; class B from C; class C from A;"),
    ]);

    let result = workspace.compose();

    match result {
        Err(ComposeError::CyclicReference { kind, chain }) => {
            assert_eq!(kind, "ancestor");
            assert_eq!(chain.first(), chain.last());
        }
        other => panic!("expected cycle, got {other:?}"),
    }
}

#[test]
fn test_recursive_calls_are_legal() {
    let workspace = Workspace::new().with_project(&[
        ("app.reqm", "application Shop { events { onStart: ping; } }"),
        (
            "net.reqm",
            "module Net; action ping { call pong; } action pong { call ping; }",
        ),
    ]);

    let composed = workspace.compose().unwrap();

    let pong = composed
        .model
        .source
        .element(ElementKind::Action, &QualifiedId::new("pong"))
        .unwrap();
    assert_eq!(pong.owner.as_ref().map(|o| o.to_string()).as_deref(), Some("Net"));
}

#[test]
fn test_parse_failure_is_fatal() {
    let workspace = Workspace::new().with_project(&[
        ("app.reqm", "application Shop;"),
        ("broken.reqm", "class Broken { name: ; }"),
    ]);

    let result = workspace.compose();

    match result {
        Err(ComposeError::Parse { file, error }) => {
            assert!(file.ends_with("broken.reqm"));
            assert_eq!(error.line, 0);
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}
