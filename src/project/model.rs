//! The authored/dependency document pair.

use std::path::Path;

use super::file_loader;
use crate::context::ComposeContext;
use crate::error::ComposeError;
use crate::syntax::Document;

/// The authored documents of a project plus the dependencies resolved for
/// them in the current run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectModel {
    /// Authored elements, mutated in place by merge and validation.
    pub source: Document,
    /// Externally resolved elements, rebuilt on every run.
    pub dependencies: Document,
}

impl ProjectModel {
    pub fn new(source: Document) -> Self {
        Self {
            source,
            dependencies: Document::new(),
        }
    }

    /// Parse every document below `dir` as the authored source.
    pub fn load(dir: &Path, ctx: &ComposeContext) -> Result<Self, ComposeError> {
        let source = file_loader::load_directory(dir, ctx)?;
        tracing::info!(
            "Loaded {} authored element(s) from {}",
            source.len(),
            dir.display()
        );
        Ok(Self::new(source))
    }
}
