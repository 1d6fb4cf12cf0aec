//! Diagnostics — Semantic error and warning reporting.
//!
//! Non-fatal findings of the merge and validation passes. Errors are
//! collected rather than thrown, so a pass reports every problem at once.

use std::fmt;
use std::sync::Arc;

use crate::base::QualifiedId;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        })
    }
}

/// A diagnostic message about an element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// Error/warning code (e.g., "E0101").
    pub code: Option<Arc<str>>,
    /// The diagnostic message.
    pub message: Arc<str>,
    /// Qualified name of the element the diagnostic is about.
    pub element: Option<Arc<str>>,
    /// Source file of that element, if known.
    pub file: Option<Arc<str>>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Warning, message)
    }

    fn new(severity: Severity, message: impl Into<Arc<str>>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            element: None,
            file: None,
        }
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach the element this diagnostic is about.
    pub fn with_element(mut self, qid: &QualifiedId) -> Self {
        self.element = Some(Arc::from(qid.to_string()));
        self
    }

    /// Attach the source file. Empty names are ignored.
    pub fn with_file(mut self, file: &str) -> Self {
        if !file.is_empty() {
            self.file = Some(Arc::from(file));
        }
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.severity)?;
        if let Some(code) = &self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(file) = &self.file {
            write!(f, " ({})", file)?;
        }
        Ok(())
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes for composition findings.
///
/// ## Code Ranges
///
/// - **E0101-E0199**: Ownership and resolution errors
/// - **W0101-W0199**: Degraded resolution and defaulting warnings
pub mod codes {
    // ========================================================================
    // ERRORS (E0101-E0199)
    // ========================================================================

    /// Two different owners discovered for one action.
    pub const OWNERSHIP_CONFLICT: &str = "E0101";
    /// The same owner binds one action more than once.
    pub const DUPLICATE_REFERENCE: &str = "E0102";
    /// More than one module shares an unowned action's source file.
    pub const AMBIGUOUS_OWNER: &str = "E0103";
    /// An event binding names an action that was never resolved.
    pub const UNKNOWN_ACTION: &str = "E0104";

    // ========================================================================
    // WARNINGS (W0101-W0199)
    // ========================================================================

    /// Lead application was normalized (name, domain or type).
    pub const NORMALIZED_APPLICATION: &str = "W0101";
    /// An event or call names an action that exists nowhere.
    pub const PLACEHOLDER_ACTION: &str = "W0102";
    /// A layout child does not name any known view.
    pub const UNRESOLVED_LAYOUT: &str = "W0103";
    /// A typeless property was given the default type.
    pub const DEFAULTED_TYPE: &str = "W0104";
    /// An action has no owner.
    pub const ORPHANED_ACTION: &str = "W0105";
    /// An ancestor or feature reference could not be resolved.
    pub const UNRESOLVED_ANCESTOR: &str = "W0106";
    /// No application is declared.
    pub const MISSING_APPLICATION: &str = "W0107";
    /// No module shares an unclaimed action's source file.
    pub const NO_MODULE_IN_FILE: &str = "W0108";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during merge and validation.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic, logging it at the matching level.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => tracing::error!("{}", diagnostic),
            Severity::Warning => tracing::warn!("{}", diagnostic),
            Severity::Info => tracing::info!("{}", diagnostic),
        }
        self.diagnostics.push(diagnostic);
    }

    /// Move all diagnostics of `other` into this collector without re-logging.
    pub fn extend(&mut self, other: DiagnosticCollector) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }
}
