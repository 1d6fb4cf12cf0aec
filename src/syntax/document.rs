//! Document aggregates.

use smol_str::SmolStr;

use super::element::{Element, ElementKind};
use crate::base::QualifiedId;

/// A collection of elements, either one parsed file or an aggregate of many.
///
/// Elements keep their `source_file_name`, so an aggregate still knows where
/// each element came from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    /// Domain declared by the document (`domain acme;`), if any.
    pub domain: Option<SmolStr>,
    pub elements: Vec<Element>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Append an element, returning its index.
    pub fn push(&mut self, element: Element) -> usize {
        self.elements.push(element);
        self.elements.len() - 1
    }

    /// Move every element of `other` into this aggregate.
    pub fn absorb(&mut self, other: Document) {
        if self.domain.is_none() {
            self.domain = other.domain;
        }
        self.elements.extend(other.elements);
    }

    pub fn get(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.elements.get_mut(index)
    }

    /// Iterate over elements of one kind.
    pub fn elements_of(&self, kind: ElementKind) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(move |e| e.kind == kind)
    }

    /// Index of the first element of one of `kinds` designated by `reference`.
    pub fn find(&self, kinds: &[ElementKind], reference: &QualifiedId) -> Option<usize> {
        self.elements
            .iter()
            .position(|e| kinds.contains(&e.kind) && reference.matches(&e.qid))
    }

    /// Find an element by kind and reference.
    pub fn element(&self, kind: ElementKind, reference: &QualifiedId) -> Option<&Element> {
        self.find(&[kind], reference).map(|i| &self.elements[i])
    }

    /// Index of the lead application: the first application in the aggregate.
    pub fn lead_application(&self) -> Option<usize> {
        self.elements
            .iter()
            .position(|e| e.kind == ElementKind::Application)
    }
}
