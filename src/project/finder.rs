//! Repository finder — aggregated lookups over ordered repository roots.
//!
//! Roots are searched in precedence order: the in-memory project index,
//! then the standard library, then the user cache, then any extra roots.
//! Matches from every root are concatenated; callers take the first hit.

use std::fs;
use std::path::{Path, PathBuf};

use super::file_loader;
use super::index::{IndexRecord, RepositoryIndex};
use crate::base::QualifiedId;
use crate::context::ComposeContext;
use crate::error::ComposeError;
use crate::hir::{LocalScope, RefKind, extract_references};
use crate::syntax::Document;

/// Where a repository root comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RepositoryKind {
    Project,
    StdLib,
    UserCache,
    Extra,
}

/// An on-disk repository root whose folder indices load on first use.
#[derive(Debug)]
struct Repository {
    kind: RepositoryKind,
    root: PathBuf,
    folders: Option<Vec<RepositoryIndex>>,
}

impl Repository {
    fn new(kind: RepositoryKind, root: PathBuf) -> Self {
        Self {
            kind,
            root,
            folders: None,
        }
    }

    fn folders(&mut self, ctx: &ComposeContext) -> Result<&[RepositoryIndex], ComposeError> {
        if self.folders.is_none() {
            let mut folders = Vec::new();
            for folder in file_loader::collect_repository_folders(&self.root, ctx) {
                folders.push(RepositoryIndex::load_or_build(&folder, ctx)?);
            }
            tracing::debug!(
                "Indexed {:?} repository {} ({} folders)",
                self.kind,
                self.root.display(),
                folders.len()
            );
            self.folders = Some(folders);
        }
        Ok(self.folders.as_deref().unwrap_or_default())
    }
}

/// A content record found by [`RepositoryFinder::find`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FoundItem {
    pub repository: RepositoryKind,
    pub folder: PathBuf,
    pub record: IndexRecord,
}

impl FoundItem {
    /// Path of the declaring document.
    pub fn path(&self) -> PathBuf {
        self.folder.join(&self.record.filename)
    }
}

/// Matches of one lookup, highest precedence first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemCollection {
    items: Vec<FoundItem>,
}

impl ItemCollection {
    pub fn first(&self) -> Option<&FoundItem> {
        self.items.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FoundItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for ItemCollection {
    type Item = FoundItem;
    type IntoIter = std::vec::IntoIter<FoundItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Answers `find(kind, name, domain)` across all repository roots.
#[derive(Debug)]
pub struct RepositoryFinder {
    /// Populated from the live parse, never persisted.
    project: RepositoryIndex,
    repositories: Vec<Repository>,
    connected: bool,
}

impl Default for RepositoryFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryFinder {
    pub fn new() -> Self {
        Self {
            project: RepositoryIndex::new("."),
            repositories: Vec::new(),
            connected: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn project_index(&self) -> &RepositoryIndex {
        &self.project
    }

    /// Register the standard library and user cache roots.
    ///
    /// The standard library must exist under `<app_home>/<stdlib_dir>`. The
    /// user cache under `<user_home>/<user_cache_dir>` is created if needed;
    /// when that fails the cache is skipped with a warning.
    pub fn connect(
        &mut self,
        app_home: &Path,
        user_home: &Path,
        ctx: &ComposeContext,
    ) -> Result<(), ComposeError> {
        let stdlib = app_home.join(&ctx.config.stdlib_dir);
        if !stdlib.is_dir() {
            return Err(ComposeError::StdlibMissing(stdlib));
        }
        self.repositories
            .retain(|r| !matches!(r.kind, RepositoryKind::StdLib | RepositoryKind::UserCache));
        let mut roots = vec![Repository::new(RepositoryKind::StdLib, stdlib)];

        let cache = user_home.join(&ctx.config.user_cache_dir);
        match fs::create_dir_all(&cache) {
            Ok(()) => roots.push(Repository::new(RepositoryKind::UserCache, cache)),
            Err(e) => tracing::warn!(
                "User cache {} unavailable, continuing without it: {}",
                cache.display(),
                e
            ),
        }

        // Extra roots registered earlier keep their place after the cache.
        roots.append(&mut self.repositories);
        self.repositories = roots;
        self.connected = true;
        tracing::info!(
            "Connected {} repository root(s)",
            self.repositories.len() + 1
        );
        Ok(())
    }

    /// Append a root searched after the standard roots.
    pub fn add_repository(&mut self, root: impl Into<PathBuf>) {
        self.repositories
            .push(Repository::new(RepositoryKind::Extra, root.into()));
    }

    /// Fold a parsed project document into the in-memory project index.
    pub fn add_project_index(&mut self, document: &Document, ctx: &ComposeContext) {
        let refs = extract_references(document, &LocalScope::of_document(document), &ctx.config);
        self.project.fold(&refs);
    }

    /// Find content records of `kind` named `name` in `domain` (any domain if
    /// `None`), highest precedence root first.
    pub fn find(
        &mut self,
        kind: RefKind,
        name: &str,
        domain: Option<&str>,
        ctx: &ComposeContext,
    ) -> Result<ItemCollection, ComposeError> {
        if !self.connected {
            return Err(ComposeError::NotConnected);
        }
        let reference = match domain {
            Some(domain) => QualifiedId::with_domain(name, domain),
            None => QualifiedId::parse(name),
        };

        let mut items: Vec<FoundItem> = self
            .project
            .content(kind, &reference)
            .map(|record| FoundItem {
                repository: RepositoryKind::Project,
                folder: self.project.folder().to_path_buf(),
                record: record.clone(),
            })
            .collect();

        for repository in &mut self.repositories {
            let repository_kind = repository.kind;
            for index in repository.folders(ctx)? {
                items.extend(index.content(kind, &reference).map(|record| FoundItem {
                    repository: repository_kind,
                    folder: index.folder().to_path_buf(),
                    record: record.clone(),
                }));
            }
        }

        tracing::debug!("find {} {} -> {} hit(s)", kind, reference, items.len());
        Ok(ItemCollection { items })
    }
}
