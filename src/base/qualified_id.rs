//! Qualified identifiers and the defined/undefined reference type.

use std::fmt;

use smol_str::SmolStr;

/// A two-part global name: `domain.id`, or just `id` when no domain is known.
///
/// Domains may themselves contain dots (`com.acme`); the id is always the
/// last segment of the string form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedId {
    pub id: SmolStr,
    pub domain: Option<SmolStr>,
}

impl QualifiedId {
    /// Create an id without a domain.
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self {
            id: id.into(),
            domain: None,
        }
    }

    /// Create an id inside a domain.
    pub fn with_domain(id: impl Into<SmolStr>, domain: impl Into<SmolStr>) -> Self {
        Self {
            id: id.into(),
            domain: Some(domain.into()),
        }
    }

    /// Parse the string form. The last dot separates the domain from the id.
    pub fn parse(text: &str) -> Self {
        match text.rsplit_once('.') {
            Some((domain, id)) if !domain.is_empty() => Self::with_domain(id, domain),
            Some((_, id)) => Self::new(id),
            None => Self::new(text),
        }
    }

    /// Returns true if `self`, used as a reference, designates `target`.
    ///
    /// Ids must be equal. A reference without a domain matches any domain;
    /// a qualified reference only matches the same domain.
    pub fn matches(&self, target: &QualifiedId) -> bool {
        if self.id != target.id {
            return false;
        }
        match (&self.domain, &target.domain) {
            (None, _) => true,
            (Some(a), Some(b)) => a == b,
            (Some(_), None) => false,
        }
    }

    /// Fill in the domain if none is set.
    pub fn or_domain(mut self, domain: Option<&SmolStr>) -> Self {
        if self.domain.is_none() {
            self.domain = domain.cloned();
        }
        self
    }
}

impl fmt::Display for QualifiedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.domain {
            Some(domain) => write!(f, "{}.{}", domain, self.id),
            None => f.write_str(&self.id),
        }
    }
}

impl From<&str> for QualifiedId {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

/// A reference that may be absent.
///
/// `Undefined` is a distinct variant rather than a sentinel id, so it can
/// never compare equal to a defined reference and has no id to dereference.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SourceRef {
    #[default]
    Undefined,
    Defined(QualifiedId),
}

impl SourceRef {
    pub fn is_defined(&self) -> bool {
        matches!(self, SourceRef::Defined(_))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, SourceRef::Undefined)
    }

    /// The referenced id, if defined.
    pub fn as_defined(&self) -> Option<&QualifiedId> {
        match self {
            SourceRef::Defined(qid) => Some(qid),
            SourceRef::Undefined => None,
        }
    }
}

impl From<QualifiedId> for SourceRef {
    fn from(qid: QualifiedId) -> Self {
        SourceRef::Defined(qid)
    }
}

impl From<Option<QualifiedId>> for SourceRef {
    fn from(qid: Option<QualifiedId>) -> Self {
        qid.map_or(SourceRef::Undefined, SourceRef::Defined)
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRef::Defined(qid) => qid.fmt(f),
            SourceRef::Undefined => f.write_str("<undefined>"),
        }
    }
}
