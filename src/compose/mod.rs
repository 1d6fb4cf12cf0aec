//! Composition: cross-repository merge, validation and the stage pipeline.
//!
//! ```text
//! pre_validate → add_project_index → merge → resolve_ownership → validate_completeness
//! ```
//!
//! - [`Composer`] - runs the stages in order over one project
//! - [`ModelMerger`] - resolves references and fills inherited properties
//! - [`ModelValidator`] - normalizes the lead application, assigns action owners,
//!   defaults missing types

mod composer;
mod merge;
mod validate;

pub use composer::{ComposedModel, Composer};
pub use merge::{Location, MergeOutcome, ModelMerger, merge};
pub use validate::ModelValidator;
