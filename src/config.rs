//! Composition settings.

use smol_str::SmolStr;

use crate::base::QualifiedId;
use crate::base::constants::{
    DEFAULT_APPLICATION_TYPE, DEFAULT_DOMAIN, DEFAULT_PROPERTY_TYPE, DOCUMENT_EXT, INDEX_FILE,
    STANDARD_TYPES, STDLIB_DIR, USER_CACHE_DIR,
};

/// Settings for a composition run.
#[derive(Debug, Clone)]
pub struct ComposeConfig {
    /// Domain given to a lead application without one.
    pub default_domain: SmolStr,
    /// Ancestor given to a lead application without a `from` clause.
    pub default_application_type: QualifiedId,
    /// Type given to typeless properties after merge.
    pub default_property_type: SmolStr,
    /// Standard library directory below the application home.
    pub stdlib_dir: String,
    /// User cache directory below the user home.
    pub user_cache_dir: String,
    /// Name of the per-folder index cache file.
    pub index_file_name: String,
    /// Extension of documents, without the dot.
    pub document_extension: String,
    /// Types that never leave the document.
    pub builtin_types: Vec<SmolStr>,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            default_domain: DEFAULT_DOMAIN.into(),
            default_application_type: QualifiedId::parse(DEFAULT_APPLICATION_TYPE),
            default_property_type: DEFAULT_PROPERTY_TYPE.into(),
            stdlib_dir: STDLIB_DIR.to_string(),
            user_cache_dir: USER_CACHE_DIR.to_string(),
            index_file_name: INDEX_FILE.to_string(),
            document_extension: DOCUMENT_EXT.to_string(),
            builtin_types: STANDARD_TYPES.iter().map(|t| SmolStr::new(t)).collect(),
        }
    }
}

impl ComposeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_domain(mut self, domain: impl Into<SmolStr>) -> Self {
        self.default_domain = domain.into();
        self
    }

    pub fn with_default_application_type(mut self, qid: QualifiedId) -> Self {
        self.default_application_type = qid;
        self
    }

    pub fn with_default_property_type(mut self, type_name: impl Into<SmolStr>) -> Self {
        self.default_property_type = type_name.into();
        self
    }

    pub fn with_stdlib_dir(mut self, dir: impl Into<String>) -> Self {
        self.stdlib_dir = dir.into();
        self
    }

    pub fn with_user_cache_dir(mut self, dir: impl Into<String>) -> Self {
        self.user_cache_dir = dir.into();
        self
    }

    /// Returns true if `type_name` (optionally domain-qualified) is built in.
    pub fn is_builtin_type(&self, type_name: &str) -> bool {
        let simple = type_name.rsplit('.').next().unwrap_or(type_name);
        self.builtin_types.iter().any(|t| t == simple)
    }

    /// Returns true if `path` has the document extension.
    pub fn is_document(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == self.document_extension)
    }
}
