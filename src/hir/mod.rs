//! High-level IR (HIR) — pure analyses over parsed documents.
//!
//! ## Key Types
//!
//! - [`References`] — content/dependency/type references of one document
//! - [`RefKind`] — reference kinds as persisted in index records
//! - [`LocalScope`] — locally known classes and entities
//! - [`Diagnostic`], [`DiagnosticCollector`] — collected findings
//!
//! Nothing in this layer performs I/O.

mod diagnostics;
mod properties;
mod references;

pub use diagnostics::{Diagnostic, DiagnosticCollector, Severity, codes};
pub use properties::{merge_properties, property_types};
pub use references::{LocalScope, Ref, RefKind, References, extract_references};
