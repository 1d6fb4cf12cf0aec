//! Fill-gap property merge.
//!
//! Inherited properties only fill gaps: a destination property that already
//! has a type is left exactly as it is. A typeless destination adopts the
//! incoming type, list flag and missing optionality, and its nested
//! attributes are merged the same way. Incoming properties with no
//! counterpart are appended.

use smol_str::SmolStr;

use crate::base::constants::{EVENTS_PROPERTY, LAYOUT_PROPERTY};
use crate::syntax::{Element, Property};

/// Type names used by the properties of `element`, nested attributes
/// included. `events` and `layout` name actions and views, not types.
pub fn property_types(element: &Element) -> Vec<SmolStr> {
    let mut types = Vec::new();
    for property in &element.definition.properties {
        if property.key != EVENTS_PROPERTY && property.key != LAYOUT_PROPERTY {
            collect_types(property, &mut types);
        }
    }
    types
}

fn collect_types(property: &Property, out: &mut Vec<SmolStr>) {
    if let Some(type_name) = &property.type_name {
        out.push(type_name.clone());
    }
    for attribute in &property.simple_attributes {
        collect_types(attribute, out);
    }
}

/// Merge `incoming` into `destination` using fill-gap semantics.
pub fn merge_properties(destination: &mut Vec<Property>, incoming: &[Property]) {
    for property in incoming {
        match destination.iter_mut().find(|p| p.key == property.key) {
            Some(existing) => fill_gap(existing, property),
            None => {
                tracing::trace!("Appending inherited property '{}'", property.key);
                destination.push(property.clone());
            }
        }
    }
}

fn fill_gap(existing: &mut Property, incoming: &Property) {
    if !existing.is_typeless() {
        return;
    }
    if let Some(type_name) = &incoming.type_name {
        tracing::trace!("Filling type of '{}' with {}", existing.key, type_name);
        existing.type_name = Some(type_name.clone());
        existing.list_of = incoming.list_of;
    }
    if existing.optionality.is_none() {
        existing.optionality = incoming.optionality;
    }
    merge_properties(&mut existing.simple_attributes, &incoming.simple_attributes);
}
