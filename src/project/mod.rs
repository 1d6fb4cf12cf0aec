//! Project management: document loading, repository indices, lookup.

pub mod file_loader;
pub mod finder;
pub mod index;
mod model;

pub use finder::{FoundItem, ItemCollection, RepositoryFinder, RepositoryKind};
pub use index::{IndexRecord, RecordKey, RecordType, RepositoryIndex};
pub use model::ProjectModel;
