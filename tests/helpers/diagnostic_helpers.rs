//! Diagnostic assertion helpers.

use reqm::{ComposeError, ComposedModel, Diagnostic};

/// Codes of all diagnostics, in order.
pub fn codes_of(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics
        .iter()
        .filter_map(|d| d.code.as_deref())
        .collect()
}

/// Assert the composed model carries exactly `expected` diagnostics of `code`.
pub fn assert_code_count(composed: &ComposedModel, code: &str, expected: usize) {
    let found: Vec<_> = composed.with_code(code).collect();
    assert_eq!(
        found.len(),
        expected,
        "Expected {} diagnostic(s) {}, got:\n{}",
        expected,
        code,
        found
            .iter()
            .map(|d| format!("  {}", d))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Unwrap the error list of a failed composition.
pub fn validation_errors(result: Result<ComposedModel, ComposeError>) -> Vec<Diagnostic> {
    match result {
        Err(ComposeError::Validation { errors }) => errors,
        Err(other) => panic!("expected validation errors, got {other}"),
        Ok(composed) => panic!(
            "expected validation errors, composition succeeded with {} diagnostic(s)",
            composed.diagnostics.len()
        ),
    }
}
