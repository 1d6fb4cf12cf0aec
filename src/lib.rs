//! # reqm-base
//!
//! Composition and resolution engine for ReqM requirement documents.
//!
//! Authors write small documents that derive from shared elements stored in
//! several repositories (the project, the bundled standard library, the user
//! cache). This crate resolves every reference, merges inherited definitions
//! and validates the result before anything is generated.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! compose   → Merger, validator, Composer pipeline
//!   ↓
//! project   → Document loading, per-folder index caches, repository finder
//!   ↓
//! hir       → Reference extraction, fill-gap property merge, diagnostics
//!   ↓
//! syntax    → Document/Element/Property tree, DocumentParser seam
//!   ↓
//! parser    → Logos lexer, recursive-descent ReqM grammar
//!   ↓
//! base      → Primitives (QualifiedId, SourceRef, LineIndex, constants)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → hir → project → compose)
// ============================================================================

/// Foundation types: QualifiedId, SourceRef, line/column conversion
pub mod base;

/// Parser: Logos lexer and recursive-descent grammar for ReqM documents
pub mod parser;

/// Syntax: the typed element tree and the parsing seam
pub mod syntax;

/// High-level IR: reference extraction, property merge, diagnostics
pub mod hir;

/// Project management: document loading, repository indices, finder
pub mod project;

/// Composition: merge, validation, and the stage pipeline
pub mod compose;

/// Composition settings
pub mod config;

/// Context threaded through every stage
pub mod context;

/// Fatal errors
pub mod error;

// Re-export foundation types
pub use base::{LineCol, LineIndex, QualifiedId, SourceRef};

// Re-export the pipeline surface
pub use compose::{ComposedModel, Composer};
pub use config::ComposeConfig;
pub use context::ComposeContext;
pub use error::ComposeError;
pub use hir::{Diagnostic, DiagnosticCollector, Severity};
pub use project::{ProjectModel, RepositoryFinder};
pub use syntax::{Document, Element, ElementKind, Property};
