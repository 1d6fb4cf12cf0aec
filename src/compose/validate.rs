//! Model validator — pre-merge normalization and post-merge checks.
//!
//! ## Ownership
//!
//! Every action should end up with exactly one owner:
//!
//! 1. A module whose `events` bind the action claims it. Two modules
//!    claiming one action is a conflict; one module binding it twice is a
//!    duplicate reference.
//! 2. An unclaimed action goes to the one module declared in the same file.
//!    Several such modules make the owner ambiguous; none is a warning.
//! 3. An action still unowned but bound by an application belongs to that
//!    application.
//!
//! Anything left over is reported as orphaned by the completeness check.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::base::constants::{EVENTS_PROPERTY, LAYOUT_PROPERTY};
use crate::base::{QualifiedId, SourceRef};
use crate::context::ComposeContext;
use crate::hir::{Diagnostic, DiagnosticCollector, codes};
use crate::project::ProjectModel;
use crate::syntax::{Document, Element, ElementKind, EventBinding, Property};

use super::merge::Location;

/// Runs the validation passes and keeps their diagnostics.
pub struct ModelValidator<'a> {
    ctx: &'a ComposeContext,
    diagnostics: DiagnosticCollector,
}

impl<'a> ModelValidator<'a> {
    pub fn new(ctx: &'a ComposeContext) -> Self {
        Self {
            ctx,
            diagnostics: DiagnosticCollector::new(),
        }
    }

    pub fn diagnostics(&self) -> &DiagnosticCollector {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> DiagnosticCollector {
        self.diagnostics
    }

    /// Take over diagnostics collected elsewhere (e.g. by the merger).
    pub fn absorb(&mut self, other: DiagnosticCollector) {
        self.diagnostics.extend(other);
    }

    // ========================================================================
    // PRE-MERGE
    // ========================================================================

    /// Normalize the lead application's name, domain and type.
    pub fn pre_validate(&mut self, source: &mut Document) {
        let Some(index) = source.lead_application() else {
            self.diagnostics.add(
                Diagnostic::warning("No application declared").with_code(codes::MISSING_APPLICATION),
            );
            return;
        };
        let config = &self.ctx.config;
        let app = &mut source.elements[index];
        let mut notes = Vec::new();

        if app.qid.id.starts_with(|c: char| c.is_lowercase()) {
            let capitalized = capitalize(&app.qid.id);
            notes.push(format!(
                "Application name '{}' capitalized to '{}'",
                app.qid.id, capitalized
            ));
            app.qid.id = capitalized.into();
        }
        if app.qid.domain.is_none() {
            notes.push(format!(
                "Application '{}' has no domain, using '{}'",
                app.qid.id, config.default_domain
            ));
            app.qid.domain = Some(config.default_domain.clone());
        }
        if app.source_ref.is_undefined() {
            notes.push(format!(
                "Application '{}' has no type, using '{}'",
                app.qid, config.default_application_type
            ));
            app.source_ref = SourceRef::Defined(config.default_application_type.clone());
        }

        let (qid, file) = (app.qid.clone(), app.source_file_name.clone());
        for note in notes {
            self.diagnostics.add(
                Diagnostic::warning(note)
                    .with_code(codes::NORMALIZED_APPLICATION)
                    .with_element(&qid)
                    .with_file(&file),
            );
        }
    }

    // ========================================================================
    // OWNERSHIP
    // ========================================================================

    /// Assign an owner to every action that has exactly one candidate.
    ///
    /// Returns the errors found by this pass; they are also kept with the
    /// other diagnostics.
    pub fn resolve_ownership(&mut self, model: &mut ProjectModel) -> Vec<Diagnostic> {
        let mut pass = DiagnosticCollector::new();
        let mut claimed: IndexMap<Location, QualifiedId> = IndexMap::new();
        let mut bound_by_application: IndexMap<Location, QualifiedId> = IndexMap::new();
        let mut conflicted: FxHashSet<Location> = FxHashSet::default();

        for (index, binder) in model.source.elements.iter().enumerate() {
            if !matches!(binder.kind, ElementKind::Application | ElementKind::Module) {
                continue;
            }
            for binding in inherited_bindings(model, index) {
                let Some(location) = find_action(model, &binding.handler) else {
                    pass.add(
                        Diagnostic::error(format!(
                            "Event '{}' of '{}' names unknown action '{}'",
                            binding.event, binder.qid, binding.handler
                        ))
                        .with_code(codes::UNKNOWN_ACTION)
                        .with_element(&binder.qid)
                        .with_file(&binder.source_file_name),
                    );
                    continue;
                };

                if binder.kind == ElementKind::Application {
                    bound_by_application
                        .entry(location)
                        .or_insert_with(|| binder.qid.clone());
                    continue;
                }

                let action = action_at(model, location);
                match claimed.get(&location) {
                    None => {
                        claimed.insert(location, binder.qid.clone());
                    }
                    Some(owner) if *owner == binder.qid => pass.add(
                        Diagnostic::error(format!(
                            "Module '{}' binds action '{}' more than once",
                            owner, action.qid
                        ))
                        .with_code(codes::DUPLICATE_REFERENCE)
                        .with_element(&action.qid)
                        .with_file(&binder.source_file_name),
                    ),
                    Some(owner) => {
                        pass.add(
                            Diagnostic::error(format!(
                                "Action '{}' is claimed by both '{}' and '{}'",
                                action.qid, owner, binder.qid
                            ))
                            .with_code(codes::OWNERSHIP_CONFLICT)
                            .with_element(&action.qid)
                            .with_file(&action.source_file_name),
                        );
                        conflicted.insert(location);
                    }
                }
            }
        }

        for (location, owner) in claimed {
            if !conflicted.contains(&location) {
                action_at_mut(model, location).owner = Some(owner);
            }
        }

        for location in unowned_actions(model) {
            if conflicted.contains(&location) {
                continue;
            }
            let action = action_at(model, location);
            if action.source_file_name.is_empty() {
                continue;
            }
            let document = match location {
                Location::Source(_) => &model.source,
                Location::Dependency(_) => &model.dependencies,
            };
            let candidates: Vec<QualifiedId> = document
                .elements_of(ElementKind::Module)
                .filter(|m| m.source_file_name == action.source_file_name)
                .map(|m| m.qid.clone())
                .collect();
            match candidates.as_slice() {
                [] => pass.add(
                    Diagnostic::warning(format!(
                        "No module declared in '{}' to own action '{}'",
                        action.source_file_name, action.qid
                    ))
                    .with_code(codes::NO_MODULE_IN_FILE)
                    .with_element(&action.qid)
                    .with_file(&action.source_file_name),
                ),
                [owner] => {
                    tracing::debug!("Action {} owned by {} (same file)", action.qid, owner);
                    let owner = owner.clone();
                    action_at_mut(model, location).owner = Some(owner);
                }
                _ => {
                    let names: Vec<String> = candidates.iter().map(|c| c.to_string()).collect();
                    pass.add(
                        Diagnostic::error(format!(
                            "Action '{}' could belong to any of {}",
                            action.qid,
                            names.join(", ")
                        ))
                        .with_code(codes::AMBIGUOUS_OWNER)
                        .with_element(&action.qid)
                        .with_file(&action.source_file_name),
                    );
                    conflicted.insert(location);
                }
            }
        }

        for (location, application) in bound_by_application {
            if conflicted.contains(&location) {
                continue;
            }
            let action = action_at_mut(model, location);
            if action.owner.is_none() {
                action.owner = Some(application);
            }
        }

        let errors: Vec<Diagnostic> = pass.errors().cloned().collect();
        tracing::info!("Ownership resolved with {} error(s)", errors.len());
        self.diagnostics.extend(pass);
        errors
    }

    // ========================================================================
    // COMPLETENESS
    // ========================================================================

    /// Default every typeless property and report orphaned actions.
    ///
    /// Returns false if any error has been collected so far.
    pub fn validate_completeness(&mut self, model: &mut ProjectModel) -> bool {
        self.default_property_types(&mut model.source);
        self.default_property_types(&mut model.dependencies);

        for location in unowned_actions(model) {
            let action = action_at(model, location);
            self.diagnostics.add(
                Diagnostic::warning(format!("Action '{}' has no owner", action.qid))
                    .with_code(codes::ORPHANED_ACTION)
                    .with_element(&action.qid)
                    .with_file(&action.source_file_name),
            );
        }

        let complete = !self.diagnostics.has_errors();
        tracing::info!(
            "Completeness check finished with {} warning(s)",
            self.diagnostics.warnings().count()
        );
        complete
    }

    fn default_property_types(&mut self, document: &mut Document) {
        let ctx = self.ctx;
        let default_type = &ctx.config.default_property_type;
        for element in &mut document.elements {
            let mut defaulted = Vec::new();
            for property in &mut element.definition.properties {
                if property.key != EVENTS_PROPERTY && property.key != LAYOUT_PROPERTY {
                    default_types(property, default_type, "", &mut defaulted);
                }
            }
            for path in defaulted {
                self.diagnostics.add(
                    Diagnostic::warning(format!(
                        "Property '{}' of '{}' has no type, using {}",
                        path, element.qid, default_type
                    ))
                    .with_code(codes::DEFAULTED_TYPE)
                    .with_element(&element.qid)
                    .with_file(&element.source_file_name),
                );
            }
        }
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Bindings of an element followed by those inherited along its `from`
/// chain, first binding per event wins.
fn inherited_bindings(model: &ProjectModel, index: usize) -> Vec<EventBinding> {
    let element = &model.source.elements[index];
    let mut events: FxHashSet<_> = FxHashSet::default();
    let mut visited = FxHashSet::default();
    visited.insert(element.key());
    let mut bindings: Vec<EventBinding> = element
        .event_bindings()
        .into_iter()
        .filter(|b| events.insert(b.event.clone()))
        .collect();

    let mut next = element.source_ref.as_defined().cloned();
    while let Some(reference) = next {
        let ancestor = model
            .dependencies
            .elements
            .iter()
            .chain(model.source.elements.iter())
            .find(|e| e.kind == element.kind && reference.matches(&e.qid));
        let Some(ancestor) = ancestor else {
            break;
        };
        if !visited.insert(ancestor.key()) {
            break;
        }
        bindings.extend(
            ancestor
                .event_bindings()
                .into_iter()
                .filter(|b| events.insert(b.event.clone())),
        );
        next = ancestor.source_ref.as_defined().cloned();
    }
    bindings
}

/// Authored actions first, then resolved ones.
fn find_action(model: &ProjectModel, reference: &QualifiedId) -> Option<Location> {
    let kinds = [ElementKind::Action];
    model
        .source
        .find(&kinds, reference)
        .map(Location::Source)
        .or_else(|| model.dependencies.find(&kinds, reference).map(Location::Dependency))
}

fn action_at(model: &ProjectModel, location: Location) -> &Element {
    match location {
        Location::Source(i) => &model.source.elements[i],
        Location::Dependency(i) => &model.dependencies.elements[i],
    }
}

fn action_at_mut(model: &mut ProjectModel, location: Location) -> &mut Element {
    match location {
        Location::Source(i) => &mut model.source.elements[i],
        Location::Dependency(i) => &mut model.dependencies.elements[i],
    }
}

fn unowned_actions(model: &ProjectModel) -> Vec<Location> {
    let unowned = |e: &Element| e.kind == ElementKind::Action && e.owner.is_none();
    let source = model
        .source
        .elements
        .iter()
        .enumerate()
        .filter(|(_, e)| unowned(*e))
        .map(|(i, _)| Location::Source(i));
    let dependencies = model
        .dependencies
        .elements
        .iter()
        .enumerate()
        .filter(|(_, e)| unowned(*e))
        .map(|(i, _)| Location::Dependency(i));
    source.chain(dependencies).collect()
}

/// Give typeless leaf properties the default type, recording their paths.
///
/// Compound properties are described by their attributes and keep no type.
fn default_types(property: &mut Property, default_type: &str, prefix: &str, out: &mut Vec<String>) {
    let path = if prefix.is_empty() {
        property.key.to_string()
    } else {
        format!("{}.{}", prefix, property.key)
    };
    if property.simple_attributes.is_empty() {
        if property.is_typeless() {
            property.type_name = Some(default_type.into());
            out.push(path);
        }
        return;
    }
    for attribute in &mut property.simple_attributes {
        default_types(attribute, default_type, &path, out);
    }
}
