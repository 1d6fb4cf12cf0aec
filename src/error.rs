//! Fatal composition errors.
//!
//! Everything that aborts a composition run is a [`ComposeError`]. Findings
//! that let the run continue are [`Diagnostic`]s instead.

use std::path::PathBuf;

use thiserror::Error;

use crate::hir::Diagnostic;
use crate::syntax::ParseError;

/// Errors that abort composition before anything is generated.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// IO error while reading documents or index caches.
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document failed to parse.
    #[error("Parse error in {file}: {error}")]
    Parse { file: String, error: ParseError },

    /// The standard library root does not exist.
    #[error("Standard library not found at {0}")]
    StdlibMissing(PathBuf),

    /// `find` was called before `connect`.
    #[error("Repository finder is not connected")]
    NotConnected,

    /// A reference chain leads back to an element already on the chain.
    #[error("Cyclic {kind} reference: {}", .chain.join(" -> "))]
    CyclicReference { kind: &'static str, chain: Vec<String> },

    /// An index cache line could not be read.
    #[error("Invalid index record at {path}:{line}: {message}")]
    InvalidIndexRecord {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Semantic checks collected errors.
    #[error("Composition failed with {} error(s): {}", .errors.len(), summarize(.errors))]
    Validation { errors: Vec<Diagnostic> },
}

impl ComposeError {
    /// Create an IO error for a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error for a file.
    pub fn parse(file: impl Into<String>, error: ParseError) -> Self {
        Self::Parse {
            file: file.into(),
            error,
        }
    }
}

fn summarize(errors: &[Diagnostic]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_ref())
        .collect::<Vec<_>>()
        .join("; ")
}
