//! Per-folder repository index with a write-through cache file.
//!
//! Each repository folder has an index mapping (kind, qualified name) to the
//! file declaring or using it. The index is read from the folder's cache file
//! when that file is present and newer than every document; otherwise it is
//! rebuilt by parsing the folder and extracting references, then written back.
//!
//! Cache format: one record per line, four `;`-joined fields:
//!
//! ```text
//! content;cls;std.Base;base.reqm
//! dependency;src;std.Root;base.reqm
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::file_loader;
use crate::base::QualifiedId;
use crate::base::constants::INDEX_DELIMITER;
use crate::context::ComposeContext;
use crate::error::ComposeError;
use crate::hir::{LocalScope, Ref, RefKind, References, extract_references};

// ============================================================================
// RECORDS
// ============================================================================

/// Whether a record declares an element or uses one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordType {
    Content,
    Dependency,
}

impl RecordType {
    pub fn code(&self) -> &'static str {
        match self {
            RecordType::Content => "content",
            RecordType::Dependency => "dependency",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "content" => Some(RecordType::Content),
            "dependency" => Some(RecordType::Dependency),
            _ => None,
        }
    }
}

/// Deduplication key of a record within one folder.
pub type RecordKey = (RecordType, RefKind, SmolStr);

/// One line of an index.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IndexRecord {
    pub rec_type: RecordType,
    pub kind: RefKind,
    /// Qualified name of the declared (content) or used (dependency) element.
    pub name: SmolStr,
    /// Document declaring the element or containing the use.
    pub filename: String,
}

impl IndexRecord {
    pub fn key(&self) -> RecordKey {
        (self.rec_type, self.kind, self.name.clone())
    }

    pub fn qualified_id(&self) -> QualifiedId {
        QualifiedId::parse(&self.name)
    }

    /// Build a record from an extracted reference.
    ///
    /// Content references are named after their owner, dependency
    /// references after the referred element.
    pub fn from_ref(rec_type: RecordType, reference: &Ref) -> Self {
        let name = match (rec_type, &reference.referred) {
            (RecordType::Dependency, Some(referred)) => referred.to_string(),
            _ => reference.owner.to_string(),
        };
        Self {
            rec_type,
            kind: reference.kind,
            name: name.into(),
            filename: reference.filename.clone().unwrap_or_default(),
        }
    }

    /// Returns false if a field would corrupt the line format.
    fn is_writable(&self) -> bool {
        let clean = |field: &str| !field.contains(INDEX_DELIMITER) && !field.contains('\n');
        clean(&self.name) && clean(&self.filename)
    }

    fn parse_line(line: &str) -> Result<Self, String> {
        let fields: Vec<&str> = line.split(INDEX_DELIMITER).collect();
        let [rec_type, kind, name, filename] = fields.as_slice() else {
            return Err(format!("expected 4 fields, found {}", fields.len()));
        };
        let rec_type = RecordType::from_code(rec_type)
            .ok_or_else(|| format!("unknown record type '{}'", rec_type))?;
        let kind = RefKind::from_code(kind).ok_or_else(|| format!("unknown kind '{}'", kind))?;
        if name.is_empty() {
            return Err("empty name".to_string());
        }
        Ok(Self {
            rec_type,
            kind,
            name: SmolStr::new(name),
            filename: filename.to_string(),
        })
    }
}

impl fmt::Display for IndexRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = INDEX_DELIMITER;
        write!(
            f,
            "{}{d}{}{d}{}{d}{}",
            self.rec_type.code(),
            self.kind.code(),
            self.name,
            self.filename
        )
    }
}

// ============================================================================
// REPOSITORY INDEX
// ============================================================================

/// Deduplicated records of one repository folder.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RepositoryIndex {
    folder: PathBuf,
    records: IndexMap<RecordKey, IndexRecord>,
}

impl RepositoryIndex {
    /// Create an empty index for `folder`.
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            records: IndexMap::new(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &IndexRecord> {
        self.records.values()
    }

    /// Insert a record. The first record for a key wins.
    ///
    /// Returns true if the record was new.
    pub fn insert(&mut self, record: IndexRecord) -> bool {
        let key = record.key();
        if self.records.contains_key(&key) {
            return false;
        }
        self.records.insert(key, record);
        true
    }

    /// Fold every reference of a document into the index.
    pub fn fold(&mut self, refs: &References) {
        for item in &refs.items {
            self.insert(IndexRecord::from_ref(RecordType::Content, item));
        }
        for dependency in refs.dependencies() {
            self.insert(IndexRecord::from_ref(RecordType::Dependency, dependency));
        }
    }

    /// Content records of `kind` designated by `reference`.
    pub fn content<'a>(
        &'a self,
        kind: RefKind,
        reference: &'a QualifiedId,
    ) -> impl Iterator<Item = &'a IndexRecord> + 'a {
        self.records.values().filter(move |record| {
            record.rec_type == RecordType::Content
                && record.kind == kind
                && reference.matches(&record.qualified_id())
        })
    }

    // ------------------------------------------------------------------------
    // Cache file
    // ------------------------------------------------------------------------

    /// Read an index cache file for `folder`.
    pub fn read(folder: impl Into<PathBuf>, path: &Path) -> Result<Self, ComposeError> {
        let text = fs::read_to_string(path).map_err(|e| ComposeError::io(path, e))?;
        let mut index = Self::new(folder);
        for (number, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record =
                IndexRecord::parse_line(line).map_err(|message| ComposeError::InvalidIndexRecord {
                    path: path.to_path_buf(),
                    line: number + 1,
                    message,
                })?;
            index.insert(record);
        }
        Ok(index)
    }

    /// Write the index to a cache file.
    ///
    /// Records with a field containing the delimiter cannot be represented
    /// and are left out of the file.
    pub fn write(&self, path: &Path) -> Result<(), ComposeError> {
        let mut text = String::new();
        for record in self.records.values() {
            if !record.is_writable() {
                tracing::warn!(
                    "Skipping index record '{}' for {}: field contains the delimiter",
                    record.name,
                    path.display()
                );
                continue;
            }
            text.push_str(&record.to_string());
            text.push('\n');
        }
        fs::write(path, text).map_err(|e| ComposeError::io(path, e))
    }

    /// Build the index of `folder` by parsing and extracting every document.
    ///
    /// Documents are visited in path order, so rebuilding an unchanged
    /// folder yields the same records in the same order.
    pub fn build(folder: &Path, ctx: &ComposeContext) -> Result<Self, ComposeError> {
        let mut index = Self::new(folder);
        for path in file_loader::collect_document_paths(folder, ctx)? {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let document = file_loader::load_and_parse(&path, &file_name, ctx)?;
            let refs = extract_references(&document, &LocalScope::of_document(&document), &ctx.config);
            index.fold(&refs);
        }
        tracing::debug!(
            "Built index for {} ({} records)",
            folder.display(),
            index.len()
        );
        Ok(index)
    }

    /// Load the cached index of `folder`, rebuilding it on a miss.
    ///
    /// A missing, stale or unreadable cache file triggers a rebuild that is
    /// written back. Failing to write the cache is only logged.
    pub fn load_or_build(folder: &Path, ctx: &ComposeContext) -> Result<Self, ComposeError> {
        let index_path = folder.join(&ctx.config.index_file_name);

        if index_path.is_file() {
            match Self::read(folder, &index_path) {
                Ok(index) if index.is_fresh(&index_path, ctx) => {
                    tracing::debug!("Loaded index {}", index_path.display());
                    return Ok(index);
                }
                Ok(_) => tracing::debug!("Index {} is stale, rebuilding", index_path.display()),
                Err(e) => tracing::warn!("Rebuilding unreadable index: {}", e),
            }
        }

        let index = Self::build(folder, ctx)?;
        if let Err(e) = index.write(&index_path) {
            tracing::warn!("Could not write index cache: {}", e);
        }
        Ok(index)
    }

    /// A cache is fresh when no document in the folder is newer than it and
    /// every document it names still exists.
    fn is_fresh(&self, index_path: &Path, ctx: &ComposeContext) -> bool {
        let Some(index_time) = modified(index_path) else {
            return false;
        };
        let Ok(documents) = file_loader::collect_document_paths(&self.folder, ctx) else {
            return false;
        };
        if documents
            .iter()
            .any(|doc| modified(doc).is_none_or(|doc_time| doc_time > index_time))
        {
            return false;
        }
        self.records.values().all(|record| {
            documents
                .iter()
                .any(|doc| doc.file_name().is_some_and(|name| name == record.filename.as_str()))
        })
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
