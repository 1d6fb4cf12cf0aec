//! Element and property types of a parsed ReqM document.

use std::fmt;

use smol_str::SmolStr;

use crate::base::constants::EVENTS_PROPERTY;
use crate::base::{QualifiedId, SourceRef};

// ============================================================================
// ELEMENT KIND
// ============================================================================

/// The kind of a top-level document element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    Application,
    Module,
    Actor,
    Class,
    Entity,
    Action,
    View,
    Feature,
    Style,
}

impl ElementKind {
    pub const ALL: [ElementKind; 9] = [
        ElementKind::Application,
        ElementKind::Module,
        ElementKind::Actor,
        ElementKind::Class,
        ElementKind::Entity,
        ElementKind::Action,
        ElementKind::View,
        ElementKind::Feature,
        ElementKind::Style,
    ];

    /// The keyword that introduces this element in a document.
    pub fn keyword(&self) -> &'static str {
        match self {
            ElementKind::Application => "application",
            ElementKind::Module => "module",
            ElementKind::Actor => "actor",
            ElementKind::Class => "class",
            ElementKind::Entity => "entity",
            ElementKind::Action => "action",
            ElementKind::View => "view",
            ElementKind::Feature => "feature",
            ElementKind::Style => "style",
        }
    }

    /// Parse an element keyword.
    pub fn from_keyword(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.keyword() == text)
    }

    /// Returns true for kinds that can be used as property types.
    pub fn is_type_like(&self) -> bool {
        matches!(self, ElementKind::Class | ElementKind::Entity)
    }

    /// Kinds a reference from an element of this kind may resolve to.
    ///
    /// Classes and entities are interchangeable as ancestors and types.
    pub fn lookup_kinds(&self) -> &'static [ElementKind] {
        match self {
            ElementKind::Class | ElementKind::Entity => &[ElementKind::Class, ElementKind::Entity],
            ElementKind::Application => &[ElementKind::Application],
            ElementKind::Module => &[ElementKind::Module],
            ElementKind::Actor => &[ElementKind::Actor],
            ElementKind::Action => &[ElementKind::Action],
            ElementKind::View => &[ElementKind::View],
            ElementKind::Feature => &[ElementKind::Feature],
            ElementKind::Style => &[ElementKind::Style],
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

// ============================================================================
// PROPERTIES
// ============================================================================

/// Whether a property must be provided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Optionality {
    Mandatory,
    Optional,
}

impl Optionality {
    pub fn keyword(&self) -> &'static str {
        match self {
            Optionality::Mandatory => "mandatory",
            Optionality::Optional => "optional",
        }
    }
}

/// A (possibly compound) property of an element.
///
/// `type_name == None` marks a typeless property: a gap that merge may fill
/// from an ancestor and that the completeness check defaults otherwise.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Property {
    pub key: SmolStr,
    pub type_name: Option<SmolStr>,
    pub optionality: Option<Optionality>,
    pub value: Option<SmolStr>,
    pub list_of: bool,
    pub value_list: Vec<SmolStr>,
    pub simple_attributes: Vec<Property>,
}

impl Property {
    /// Create a typeless property.
    pub fn new(key: impl Into<SmolStr>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, type_name: impl Into<SmolStr>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_list_of(mut self, type_name: impl Into<SmolStr>) -> Self {
        self.type_name = Some(type_name.into());
        self.list_of = true;
        self
    }

    pub fn with_optionality(mut self, optionality: Optionality) -> Self {
        self.optionality = Some(optionality);
        self
    }

    pub fn with_value(mut self, value: impl Into<SmolStr>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_attribute(mut self, attribute: Property) -> Self {
        self.simple_attributes.push(attribute);
        self
    }

    pub fn is_typeless(&self) -> bool {
        self.type_name.is_none()
    }

    /// Find a nested attribute by key.
    pub fn attribute(&self, key: &str) -> Option<&Property> {
        self.simple_attributes.iter().find(|p| p.key == key)
    }
}

// ============================================================================
// ELEMENTS
// ============================================================================

/// A reference to a feature mixed into an element (`use X;`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FeatureRef {
    pub feature: QualifiedId,
}

/// The body of an element.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Definition {
    pub properties: Vec<Property>,
    pub feature_refs: Vec<FeatureRef>,
    /// Outbound action calls (`call X;`). Only meaningful on actions.
    pub calls: Vec<QualifiedId>,
}

impl Definition {
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.feature_refs.is_empty() && self.calls.is_empty()
    }

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.key == key)
    }

    pub fn property_mut(&mut self, key: &str) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| p.key == key)
    }
}

/// An `event = action` binding read from an `events` property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventBinding {
    pub event: SmolStr,
    pub handler: QualifiedId,
}

/// Visited-set key for resolution chases.
pub type ElementKey = (ElementKind, String);

/// A top-level document element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub kind: ElementKind,
    pub qid: QualifiedId,
    pub source_ref: SourceRef,
    pub parent: SourceRef,
    pub definition: Definition,
    /// Owning module or application. Only assigned on actions.
    pub owner: Option<QualifiedId>,
    pub source_file_name: String,
    /// How often this element was used as a resolution target. Only increases.
    pub ref_count: u32,
}

impl Element {
    pub fn new(kind: ElementKind, qid: QualifiedId) -> Self {
        Self {
            kind,
            qid,
            source_ref: SourceRef::Undefined,
            parent: SourceRef::Undefined,
            definition: Definition::default(),
            owner: None,
            source_file_name: String::new(),
            ref_count: 0,
        }
    }

    /// An empty action standing in for a handler that exists nowhere.
    pub fn placeholder_action(qid: QualifiedId) -> Self {
        Self::new(ElementKind::Action, qid)
    }

    pub fn with_source_ref(mut self, source_ref: QualifiedId) -> Self {
        self.source_ref = SourceRef::Defined(source_ref);
        self
    }

    pub fn with_parent(mut self, parent: QualifiedId) -> Self {
        self.parent = SourceRef::Defined(parent);
        self
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.definition.properties.push(property);
        self
    }

    pub fn with_call(mut self, target: QualifiedId) -> Self {
        self.definition.calls.push(target);
        self
    }

    pub fn with_file(mut self, file_name: impl Into<String>) -> Self {
        self.source_file_name = file_name.into();
        self
    }

    pub fn key(&self) -> ElementKey {
        (self.kind, self.qid.to_string())
    }

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.definition.property(key)
    }

    pub fn increment_ref_count(&mut self) {
        self.ref_count = self.ref_count.saturating_add(1);
    }

    /// Bindings declared in this element's `events` property, in order.
    ///
    /// The handler is the attribute's value (`onStart = doInit;`) or, when
    /// no value is given, its type slot (`onStart: doInit;`).
    pub fn event_bindings(&self) -> Vec<EventBinding> {
        let Some(events) = self.property(EVENTS_PROPERTY) else {
            return Vec::new();
        };
        events
            .simple_attributes
            .iter()
            .filter_map(|binding| {
                let handler = binding.value.as_ref().or(binding.type_name.as_ref())?;
                Some(EventBinding {
                    event: binding.key.clone(),
                    handler: QualifiedId::parse(handler),
                })
            })
            .collect()
    }
}
