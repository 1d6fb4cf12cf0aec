//! Foundation types for the composition engine.
//!
//! - [`QualifiedId`] - Two-part `domain.id` names
//! - [`SourceRef`] - A reference that is either defined or explicitly undefined
//! - [`LineCol`], [`LineIndex`] - Line/column conversion for diagnostics
//! - Domain constants (file names, standard types, well-known property keys)
//!
//! This module has NO dependencies on other reqm modules.

pub mod constants;
mod line_index;
mod qualified_id;

pub use line_index::{LineCol, LineIndex};
pub use qualified_id::{QualifiedId, SourceRef};
