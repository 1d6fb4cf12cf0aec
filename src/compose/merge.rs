//! Model merger — cross-repository resolution of authored elements.
//!
//! Every reference is looked up in the authored source first, then in the
//! dependency document built so far, then through the [`RepositoryFinder`].
//! Elements found on disk are copied into the dependency document; authored
//! elements receive their ancestors' and features' properties by fill-gap
//! merge.
//!
//! ## Passes
//!
//! 1. Ancestor chains (`from`) are merged nearest first; `extends` targets
//!    are resolved but not merged.
//! 2. Feature uses (`use X;`) are merged like ancestors.
//! 3. Non-standard property types are resolved into the dependencies.
//! 4. Actions named by `events` bindings are pulled in, then everything they
//!    call, with placeholders for actions that exist nowhere.
//! 5. View layout trees are expanded with the views they name.

use std::collections::VecDeque;
use std::collections::hash_map::Entry;
use std::path::PathBuf;

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use crate::base::QualifiedId;
use crate::base::constants::LAYOUT_PROPERTY;
use crate::context::ComposeContext;
use crate::error::ComposeError;
use crate::hir::{
    Diagnostic, DiagnosticCollector, RefKind, codes, merge_properties, property_types,
};
use crate::project::{FoundItem, RepositoryFinder, RepositoryKind, file_loader};
use crate::syntax::{Document, Element, ElementKey, ElementKind, Property};

/// Where a resolved element lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Location {
    Source(usize),
    Dependency(usize),
}

/// Result of a merge run.
#[derive(Debug, Default)]
pub struct MergeOutcome {
    /// Every element resolved outside the authored source.
    pub dependencies: Document,
    pub diagnostics: DiagnosticCollector,
}

/// Resolve and merge every reference of `source`.
pub fn merge(
    source: &mut Document,
    finder: &mut RepositoryFinder,
    ctx: &ComposeContext,
) -> Result<MergeOutcome, ComposeError> {
    ModelMerger::new(finder, ctx).run(source)
}

/// One merge run. Parsed repository files are cached for its duration.
pub struct ModelMerger<'a> {
    finder: &'a mut RepositoryFinder,
    ctx: &'a ComposeContext,
    dependencies: Document,
    parsed: FxHashMap<PathBuf, Document>,
    diagnostics: DiagnosticCollector,
}

impl<'a> ModelMerger<'a> {
    pub fn new(finder: &'a mut RepositoryFinder, ctx: &'a ComposeContext) -> Self {
        Self {
            finder,
            ctx,
            dependencies: Document::new(),
            parsed: FxHashMap::default(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    pub fn run(mut self, source: &mut Document) -> Result<MergeOutcome, ComposeError> {
        self.merge_ancestors(source)?;
        self.merge_features(source)?;
        self.resolve_types(source)?;
        self.resolve_actions(source)?;
        self.resolve_layouts(source)?;

        tracing::info!(
            "Merge resolved {} dependency element(s) from {} file(s)",
            self.dependencies.len(),
            self.parsed.len()
        );
        Ok(MergeOutcome {
            dependencies: self.dependencies,
            diagnostics: self.diagnostics,
        })
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    fn element<'s>(&'s self, source: &'s Document, location: Location) -> &'s Element {
        match location {
            Location::Source(i) => &source.elements[i],
            Location::Dependency(i) => &self.dependencies.elements[i],
        }
    }

    /// Resolve `reference` to an element of one of `kinds`.
    ///
    /// `from` is never returned, so an element may derive from a library
    /// element of the same name. The resolved element's usage count is
    /// incremented.
    fn resolve(
        &mut self,
        kinds: &[ElementKind],
        reference: &QualifiedId,
        source: &mut Document,
        from: Option<Location>,
    ) -> Result<Option<Location>, ComposeError> {
        let local = source
            .elements
            .iter()
            .enumerate()
            .find(|(i, e)| {
                from != Some(Location::Source(*i))
                    && kinds.contains(&e.kind)
                    && reference.matches(&e.qid)
            })
            .map(|(i, _)| i);
        if let Some(i) = local {
            source.elements[i].increment_ref_count();
            return Ok(Some(Location::Source(i)));
        }

        let known = self
            .dependencies
            .elements
            .iter()
            .enumerate()
            .find(|(i, e)| {
                from != Some(Location::Dependency(*i))
                    && kinds.contains(&e.kind)
                    && reference.matches(&e.qid)
            })
            .map(|(i, _)| i);
        if let Some(i) = known {
            self.dependencies.elements[i].increment_ref_count();
            return Ok(Some(Location::Dependency(i)));
        }

        for &kind in kinds {
            let hits = self.finder.find(
                RefKind::from_element(kind),
                &reference.id,
                reference.domain.as_deref(),
                self.ctx,
            )?;
            for hit in hits {
                // Project hits are the authored source, already searched.
                if hit.repository == RepositoryKind::Project {
                    continue;
                }
                let found = self
                    .load(&hit)?
                    .elements
                    .iter()
                    .find(|e| e.kind == kind && reference.matches(&e.qid))
                    .cloned();
                if let Some(mut element) = found {
                    tracing::debug!(
                        "Resolved {} {} from {}",
                        kind,
                        element.qid,
                        hit.path().display()
                    );
                    element.increment_ref_count();
                    let index = self.dependencies.push(element);
                    return Ok(Some(Location::Dependency(index)));
                }
            }
        }
        Ok(None)
    }

    /// Parse a repository file once per run.
    ///
    /// Elements are named after the file's full path, so equally named files
    /// in different folders stay apart.
    fn load(&mut self, hit: &FoundItem) -> Result<&Document, ComposeError> {
        let document = match self.parsed.entry(hit.path()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let file_name = entry.key().to_string_lossy().replace('\\', "/");
                let document = file_loader::load_and_parse(entry.key(), &file_name, self.ctx)?;
                entry.insert(document)
            }
        };
        Ok(document)
    }

    /// Resolve the `from` chain starting at `start`, nearest ancestor first.
    ///
    /// An element reached twice is a cycle. An unresolved link ends the chain
    /// with a warning.
    fn ancestor_chain(
        &mut self,
        source: &mut Document,
        start: Location,
    ) -> Result<Vec<Location>, ComposeError> {
        let origin = self.element(source, start);
        let (origin_qid, origin_file) = (origin.qid.clone(), origin.source_file_name.clone());
        let mut visited: FxHashSet<ElementKey> = FxHashSet::default();
        visited.insert(origin.key());
        let mut names = vec![origin.qid.to_string()];
        let mut kinds = origin.kind.lookup_kinds();
        let mut next = origin.source_ref.as_defined().cloned();
        let mut current = start;
        let mut chain = Vec::new();

        while let Some(reference) = next {
            let Some(location) = self.resolve(kinds, &reference, source, Some(current))? else {
                self.diagnostics.add(
                    Diagnostic::warning(format!(
                        "Ancestor '{}' of '{}' not found",
                        reference, origin_qid
                    ))
                    .with_code(codes::UNRESOLVED_ANCESTOR)
                    .with_element(&origin_qid)
                    .with_file(&origin_file),
                );
                break;
            };
            let ancestor = self.element(source, location);
            names.push(ancestor.qid.to_string());
            if !visited.insert(ancestor.key()) {
                return Err(ComposeError::CyclicReference {
                    kind: "ancestor",
                    chain: names,
                });
            }
            kinds = ancestor.kind.lookup_kinds();
            next = ancestor.source_ref.as_defined().cloned();
            current = location;
            chain.push(location);
        }
        Ok(chain)
    }

    // ------------------------------------------------------------------------
    // Ancestors, parents, features
    // ------------------------------------------------------------------------

    fn merge_ancestors(&mut self, source: &mut Document) -> Result<(), ComposeError> {
        for index in 0..source.len() {
            if source.elements[index].source_ref.is_defined() {
                let chain = self.ancestor_chain(source, Location::Source(index))?;
                for location in chain {
                    let ancestor = self.element(source, location);
                    let properties = ancestor.definition.properties.clone();
                    let features = ancestor.definition.feature_refs.clone();
                    let target = &mut source.elements[index];
                    tracing::trace!("Merging ancestor into {}", target.qid);
                    merge_properties(&mut target.definition.properties, &properties);
                    for feature in features {
                        if !target.definition.feature_refs.contains(&feature) {
                            target.definition.feature_refs.push(feature);
                        }
                    }
                }
            }

            let element = &source.elements[index];
            if !element.kind.is_type_like() {
                continue;
            }
            let Some(parent) = element.parent.as_defined().cloned() else {
                continue;
            };
            let kinds = element.kind.lookup_kinds();
            let (qid, file) = (element.qid.clone(), element.source_file_name.clone());
            let from = Some(Location::Source(index));
            match self.resolve(kinds, &parent, source, from)? {
                Some(location) => {
                    // The parent's own ancestors still belong in the dependencies.
                    self.ancestor_chain(source, location)?;
                }
                None => self.diagnostics.add(
                    Diagnostic::warning(format!("Parent '{}' of '{}' not found", parent, qid))
                        .with_code(codes::UNRESOLVED_ANCESTOR)
                        .with_element(&qid)
                        .with_file(&file),
                ),
            }
        }
        Ok(())
    }

    fn merge_features(&mut self, source: &mut Document) -> Result<(), ComposeError> {
        for index in 0..source.len() {
            let element = &source.elements[index];
            let (qid, file) = (element.qid.clone(), element.source_file_name.clone());
            for feature in element.definition.feature_refs.clone() {
                let Some(location) =
                    self.resolve(&[ElementKind::Feature], &feature.feature, source, None)?
                else {
                    self.diagnostics.add(
                        Diagnostic::warning(format!(
                            "Feature '{}' used by '{}' not found",
                            feature.feature, qid
                        ))
                        .with_code(codes::UNRESOLVED_ANCESTOR)
                        .with_element(&qid)
                        .with_file(&file),
                    );
                    continue;
                };

                let mut layers = vec![location];
                layers.extend(self.ancestor_chain(source, location)?);
                for layer in layers {
                    let properties = self.element(source, layer).definition.properties.clone();
                    merge_properties(&mut source.elements[index].definition.properties, &properties);
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------------

    fn resolve_types(&mut self, source: &mut Document) -> Result<(), ComposeError> {
        let mut seen: FxHashSet<SmolStr> = FxHashSet::default();
        for index in 0..source.len() {
            for type_name in property_types(&source.elements[index]) {
                if self.ctx.config.is_builtin_type(&type_name) || !seen.insert(type_name.clone()) {
                    continue;
                }
                let reference = QualifiedId::parse(&type_name);
                let kinds = ElementKind::Class.lookup_kinds();
                match self.resolve(kinds, &reference, source, None)? {
                    Some(location @ Location::Dependency(_)) => {
                        self.ancestor_chain(source, location)?;
                    }
                    Some(Location::Source(_)) => {}
                    None => tracing::debug!("Type {} not found in any repository", type_name),
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------------

    fn resolve_actions(&mut self, source: &mut Document) -> Result<(), ComposeError> {
        let mut queue: VecDeque<(QualifiedId, QualifiedId)> = source
            .elements
            .iter()
            .flat_map(|e| {
                e.event_bindings()
                    .into_iter()
                    .map(move |binding| (binding.handler, e.qid.clone()))
            })
            .collect();
        let mut included: FxHashSet<ElementKey> = FxHashSet::default();

        while let Some((reference, requester)) = queue.pop_front() {
            let location = match self.resolve(&[ElementKind::Action], &reference, source, None)? {
                Some(location) => location,
                None => {
                    self.diagnostics.add(
                        Diagnostic::warning(format!(
                            "Action '{}' named by '{}' does not exist; using an empty placeholder",
                            reference, requester
                        ))
                        .with_code(codes::PLACEHOLDER_ACTION)
                        .with_element(&reference),
                    );
                    let mut placeholder = Element::placeholder_action(reference.clone());
                    placeholder.increment_ref_count();
                    Location::Dependency(self.dependencies.push(placeholder))
                }
            };

            let action = self.element(source, location);
            if !included.insert(action.key()) {
                continue;
            }
            let caller = action.qid.clone();
            for target in action.definition.calls.clone() {
                queue.push_back((target, caller.clone()));
            }
        }
        tracing::debug!("Included {} action(s)", included.len());
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Layouts
    // ------------------------------------------------------------------------

    fn resolve_layouts(&mut self, source: &mut Document) -> Result<(), ComposeError> {
        for index in 0..source.len() {
            let view = &source.elements[index];
            if view.kind != ElementKind::View {
                continue;
            }
            let (qid, file, key) = (view.qid.clone(), view.source_file_name.clone(), view.key());
            let Some(layout) = source.elements[index]
                .definition
                .property_mut(LAYOUT_PROPERTY)
            else {
                continue;
            };

            let mut nodes = std::mem::take(&mut layout.simple_attributes);
            let mut path = vec![key];
            let result = self.expand_layout(&mut nodes, source, &mut path, &qid, &file);
            if let Some(layout) = source.elements[index]
                .definition
                .property_mut(LAYOUT_PROPERTY)
            {
                layout.simple_attributes = nodes;
            }
            result?;
        }
        Ok(())
    }

    /// Expand layout nodes naming views with those views' properties.
    ///
    /// A node is a view reference when it has neither a type nor a value.
    /// `path` holds the views being expanded; reaching one again is a cycle.
    fn expand_layout(
        &mut self,
        nodes: &mut [Property],
        source: &mut Document,
        path: &mut Vec<ElementKey>,
        view: &QualifiedId,
        file: &str,
    ) -> Result<(), ComposeError> {
        for node in nodes.iter_mut() {
            if node.key == LAYOUT_PROPERTY {
                self.expand_layout(&mut node.simple_attributes, source, path, view, file)?;
                continue;
            }
            if !is_view_reference(node) {
                continue;
            }

            let reference = QualifiedId::parse(&node.key);
            match self.resolve(&[ElementKind::View], &reference, source, None)? {
                Some(location) => {
                    let child = self.element(source, location);
                    let child_key = child.key();
                    if path.contains(&child_key) {
                        let mut chain: Vec<String> = path.iter().map(|(_, name)| name.clone()).collect();
                        chain.push(child_key.1);
                        return Err(ComposeError::CyclicReference {
                            kind: "layout",
                            chain,
                        });
                    }
                    let properties = child.definition.properties.clone();
                    merge_properties(&mut node.simple_attributes, &properties);
                    path.push(child_key);
                    self.expand_layout(&mut node.simple_attributes, source, path, view, file)?;
                    path.pop();
                }
                None => {
                    self.diagnostics.add(
                        Diagnostic::warning(format!(
                            "Layout child '{}' of view '{}' is not a known view",
                            node.key, view
                        ))
                        .with_code(codes::UNRESOLVED_LAYOUT)
                        .with_element(view)
                        .with_file(file),
                    );
                    self.expand_layout(&mut node.simple_attributes, source, path, view, file)?;
                }
            }
        }
        Ok(())
    }
}

fn is_view_reference(node: &Property) -> bool {
    node.is_typeless() && node.value.is_none() && node.value_list.is_empty()
}
