//! The explicit context threaded through every composition stage.

use std::sync::Arc;

use crate::config::ComposeConfig;
use crate::parser::ReqmParser;
use crate::syntax::{Document, DocumentParser, ParseError};

/// Settings plus the document parser, passed by reference to the extractor,
/// finder, merger and validator.
#[derive(Clone)]
pub struct ComposeContext {
    pub config: ComposeConfig,
    parser: Arc<dyn DocumentParser>,
}

impl ComposeContext {
    /// Context using the built-in ReqM parser.
    pub fn new(config: ComposeConfig) -> Self {
        Self::with_parser(config, Arc::new(ReqmParser))
    }

    pub fn with_parser(config: ComposeConfig, parser: Arc<dyn DocumentParser>) -> Self {
        Self { config, parser }
    }

    pub fn parse(&self, source: &str, file_name: &str) -> Result<Document, ParseError> {
        self.parser.parse(source, file_name)
    }
}

impl Default for ComposeContext {
    fn default() -> Self {
        Self::new(ComposeConfig::default())
    }
}

impl std::fmt::Debug for ComposeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposeContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
