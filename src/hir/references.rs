//! Reference extraction — pure functions from a document to its references.
//!
//! Every element yields a content reference (what the document provides);
//! ancestors, parents, calls and feature uses yield dependency references;
//! non-standard property types yield type references. The result feeds the
//! repository index and never touches the filesystem.

use std::fmt;

use super::properties::property_types;
use crate::base::QualifiedId;
use crate::config::ComposeConfig;
use crate::syntax::{Document, Element, ElementKind};

// ============================================================================
// REFERENCE KINDS
// ============================================================================

/// The kind of a reference, as persisted in index records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RefKind {
    Application,
    Module,
    Actor,
    Class,
    Entity,
    Action,
    View,
    Feature,
    Style,
    /// `from` edge to an ancestor.
    Source,
    /// `extends` edge of a class or entity.
    Parent,
    /// Property type edge.
    Type,
}

impl RefKind {
    const ALL: [RefKind; 12] = [
        RefKind::Application,
        RefKind::Module,
        RefKind::Actor,
        RefKind::Class,
        RefKind::Entity,
        RefKind::Action,
        RefKind::View,
        RefKind::Feature,
        RefKind::Style,
        RefKind::Source,
        RefKind::Parent,
        RefKind::Type,
    ];

    /// Three-letter code used in index cache files.
    pub fn code(&self) -> &'static str {
        match self {
            RefKind::Application => "app",
            RefKind::Module => "mod",
            RefKind::Actor => "act",
            RefKind::Class => "cls",
            RefKind::Entity => "ent",
            RefKind::Action => "acn",
            RefKind::View => "vie",
            RefKind::Feature => "ftr",
            RefKind::Style => "sty",
            RefKind::Source => "src",
            RefKind::Parent => "par",
            RefKind::Type => "typ",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// The reference kind naming an element of `kind`.
    pub fn from_element(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Application => RefKind::Application,
            ElementKind::Module => RefKind::Module,
            ElementKind::Actor => RefKind::Actor,
            ElementKind::Class => RefKind::Class,
            ElementKind::Entity => RefKind::Entity,
            ElementKind::Action => RefKind::Action,
            ElementKind::View => RefKind::View,
            ElementKind::Feature => RefKind::Feature,
            ElementKind::Style => RefKind::Style,
        }
    }
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// REFERENCES
// ============================================================================

/// A single reference emitted by the extractor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ref {
    pub kind: RefKind,
    /// The element the reference belongs to.
    pub owner: QualifiedId,
    /// The referenced element; `None` for content references.
    pub referred: Option<QualifiedId>,
    pub filename: Option<String>,
}

/// All references of one document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct References {
    /// Content references: what the document declares.
    pub items: Vec<Ref>,
    /// Ancestor, parent, call and feature edges.
    pub source_refs: Vec<Ref>,
    /// Property type edges.
    pub types: Vec<Ref>,
}

impl References {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.source_refs.is_empty() && self.types.is_empty()
    }

    /// Dependency references of both kinds.
    pub fn dependencies(&self) -> impl Iterator<Item = &Ref> {
        self.source_refs.iter().chain(self.types.iter())
    }
}

/// Class and entity names already known locally.
///
/// References to these do not leave the project and are not emitted as
/// dependencies.
#[derive(Clone, Debug, Default)]
pub struct LocalScope {
    types: Vec<QualifiedId>,
}

impl LocalScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope of the classes and entities declared in `document`.
    pub fn of_document(document: &Document) -> Self {
        let mut scope = Self::new();
        scope.extend_with(document);
        scope
    }

    pub fn extend_with(&mut self, document: &Document) {
        self.types.extend(
            document
                .elements
                .iter()
                .filter(|e| e.kind.is_type_like())
                .map(|e| e.qid.clone()),
        );
    }

    pub fn contains(&self, reference: &QualifiedId) -> bool {
        self.types.iter().any(|local| reference.matches(local))
    }
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Extract all references of `document`.
pub fn extract_references(
    document: &Document,
    scope: &LocalScope,
    config: &ComposeConfig,
) -> References {
    let mut refs = References::default();
    for element in &document.elements {
        extract_element(element, scope, config, &mut refs);
    }
    refs
}

fn extract_element(
    element: &Element,
    scope: &LocalScope,
    config: &ComposeConfig,
    refs: &mut References,
) {
    let filename = Some(element.source_file_name.clone());
    let edge = |kind: RefKind, referred: &QualifiedId| Ref {
        kind,
        owner: element.qid.clone(),
        referred: Some(referred.clone()),
        filename: filename.clone(),
    };

    refs.items.push(Ref {
        kind: RefKind::from_element(element.kind),
        owner: element.qid.clone(),
        referred: None,
        filename: filename.clone(),
    });

    if let Some(source) = element.source_ref.as_defined() {
        if !scope.contains(source) {
            refs.source_refs.push(edge(RefKind::Source, source));
        }
    }
    if element.kind.is_type_like() {
        if let Some(parent) = element.parent.as_defined() {
            if !scope.contains(parent) {
                refs.source_refs.push(edge(RefKind::Parent, parent));
            }
        }
    }

    // Calls are emitted even when the target is declared locally.
    if element.kind == ElementKind::Action {
        for target in &element.definition.calls {
            refs.source_refs.push(edge(RefKind::Action, target));
        }
    }
    for feature in &element.definition.feature_refs {
        refs.source_refs.push(edge(RefKind::Feature, &feature.feature));
    }

    for type_name in property_types(element) {
        if config.is_builtin_type(&type_name) {
            continue;
        }
        let referred = QualifiedId::parse(&type_name);
        if !scope.contains(&referred) {
            refs.types.push(edge(RefKind::Type, &referred));
        }
    }
}
