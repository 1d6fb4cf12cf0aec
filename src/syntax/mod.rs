//! Syntax: the typed document tree consumed by the composition engine.
//!
//! - [`Document`] - an element collection (one file, or an aggregate)
//! - [`Element`], [`Property`] - typed elements and their (nested) properties
//! - [`DocumentParser`], [`ParseError`] - the parsing seam

pub mod document;
pub mod element;
pub mod parser;

pub use document::Document;
pub use element::{
    Definition, Element, ElementKey, ElementKind, EventBinding, FeatureRef, Optionality, Property,
};
pub use parser::{DocumentParser, ParseError};
