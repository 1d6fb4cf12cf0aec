//! Entry point running the composition stages in their fixed order.
//!
//! ## Quick start
//!
//! ```ignore
//! use reqm::compose::Composer;
//!
//! let mut composer = Composer::default();
//! composer.connect(app_home, user_home)?;
//! let composed = composer.compose_directory(project_dir)?;
//! for action in composed.model.source.elements_of(ElementKind::Action) {
//!     println!("{} owned by {:?}", action.qid, action.owner);
//! }
//! ```

use std::path::Path;

use super::merge::merge;
use super::validate::ModelValidator;
use crate::context::ComposeContext;
use crate::error::ComposeError;
use crate::hir::Diagnostic;
use crate::project::{ProjectModel, RepositoryFinder};
use crate::syntax::Document;

/// A successfully composed project.
#[derive(Clone, Debug)]
pub struct ComposedModel {
    /// Merged authored elements plus their resolved dependencies.
    pub model: ProjectModel,
    /// Warnings of every stage, in the order they were found.
    pub diagnostics: Vec<Diagnostic>,
}

impl ComposedModel {
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    /// Diagnostics carrying `code`.
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics
            .iter()
            .filter(move |d| d.code.as_deref() == Some(code))
    }
}

/// Owns the context and the repository finder across composition runs.
#[derive(Debug, Default)]
pub struct Composer {
    ctx: ComposeContext,
    finder: RepositoryFinder,
}

impl Composer {
    pub fn new(ctx: ComposeContext) -> Self {
        Self {
            ctx,
            finder: RepositoryFinder::new(),
        }
    }

    /// Use a prepared finder, e.g. one with extra repository roots.
    pub fn with_finder(ctx: ComposeContext, finder: RepositoryFinder) -> Self {
        Self { ctx, finder }
    }

    pub fn context(&self) -> &ComposeContext {
        &self.ctx
    }

    pub fn finder(&self) -> &RepositoryFinder {
        &self.finder
    }

    pub fn finder_mut(&mut self) -> &mut RepositoryFinder {
        &mut self.finder
    }

    /// Register the standard library and user cache roots.
    pub fn connect(&mut self, app_home: &Path, user_home: &Path) -> Result<(), ComposeError> {
        self.finder.connect(app_home, user_home, &self.ctx)
    }

    /// Parse every document below `dir` and compose it.
    pub fn compose_directory(&mut self, dir: &Path) -> Result<ComposedModel, ComposeError> {
        let model = ProjectModel::load(dir, &self.ctx)?;
        self.compose_model(model)
    }

    /// Compose an already parsed authored document.
    pub fn compose(&mut self, source: Document) -> Result<ComposedModel, ComposeError> {
        self.compose_model(ProjectModel::new(source))
    }

    fn compose_model(&mut self, mut model: ProjectModel) -> Result<ComposedModel, ComposeError> {
        if !self.finder.is_connected() {
            return Err(ComposeError::NotConnected);
        }
        let mut validator = ModelValidator::new(&self.ctx);

        validator.pre_validate(&mut model.source);
        self.finder.add_project_index(&model.source, &self.ctx);

        let outcome = merge(&mut model.source, &mut self.finder, &self.ctx)?;
        model.dependencies = outcome.dependencies;
        validator.absorb(outcome.diagnostics);

        let errors = validator.resolve_ownership(&mut model);
        if !errors.is_empty() {
            return Err(ComposeError::Validation { errors });
        }

        if !validator.validate_completeness(&mut model) {
            let errors = validator.diagnostics().errors().cloned().collect();
            return Err(ComposeError::Validation { errors });
        }

        let diagnostics = validator.into_diagnostics().into_diagnostics();
        tracing::info!(
            "Composed {} authored and {} dependency element(s), {} diagnostic(s)",
            model.source.len(),
            model.dependencies.len(),
            diagnostics.len()
        );
        Ok(ComposedModel { model, diagnostics })
    }
}
