//! Class handles and metadata.
//!
//! Classes of both ontologies live in one handle space so that a single
//! [`HierarchyIndex`](crate::hierarchy::HierarchyIndex) can answer queries
//! about the merged hierarchy. The core only ever sees [`ClassId`]; the
//! descriptive [`ClassMeta`] is kept by the taxonomy for diagnostics.

use serde::{Deserialize, Serialize};

/// Opaque identifier for a class.
///
/// Ordering follows allocation order, which the conflict-set builder relies on
/// for deterministic traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct ClassId(u32);

impl ClassId {
    /// Create a `ClassId` from a raw handle.
    pub const fn new(raw: u32) -> Self {
        ClassId(raw)
    }

    /// Get the underlying handle.
    pub fn get(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ClassId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "class:{}", self.0)
    }
}

/// Which side of the alignment a class comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Ontology {
    #[default]
    Source,
    Target,
}

impl std::fmt::Display for Ontology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ontology::Source => write!(f, "source"),
            Ontology::Target => write!(f, "target"),
        }
    }
}

/// Metadata describing a class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassMeta {
    /// Handle of the class.
    pub id: ClassId,
    /// URI the class was loaded from.
    pub uri: String,
    /// Human-readable label (falls back to the URI fragment).
    pub label: String,
    /// Ontology the class belongs to.
    pub ontology: Ontology,
    /// Whether the class is marked `owl:deprecated`.
    pub deprecated: bool,
}

impl ClassMeta {
    /// Create metadata for a class, deriving the label from the URI.
    pub fn new(id: ClassId, uri: impl Into<String>, ontology: Ontology) -> Self {
        let uri = uri.into();
        let label = local_name(&uri).to_string();
        Self {
            id,
            uri,
            label,
            ontology,
            deprecated: false,
        }
    }

    /// Override the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Mark the class as deprecated.
    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }
}

/// The fragment or last path segment of a URI.
pub fn local_name(uri: &str) -> &str {
    uri.rsplit(['#', '/']).next().filter(|s| !s.is_empty()).unwrap_or(uri)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_ids_order_by_allocation() {
        assert!(ClassId::new(1) < ClassId::new(2));
        assert_eq!(ClassId::new(7).get(), 7);
        assert_eq!(ClassId::new(3).to_string(), "class:3");
    }

    #[test]
    fn local_name_strips_namespace() {
        assert_eq!(local_name("http://example.org/onto#Heart"), "Heart");
        assert_eq!(local_name("http://example.org/onto/Liver"), "Liver");
        assert_eq!(local_name("Plain"), "Plain");
        assert_eq!(local_name("http://example.org/onto/"), "http://example.org/onto/");
    }

    #[test]
    fn meta_defaults_label_from_uri() {
        let meta = ClassMeta::new(ClassId::new(0), "http://a.org/x#Bone", Ontology::Target);
        assert_eq!(meta.label, "Bone");
        assert!(!meta.deprecated);
        let meta = meta.with_label("bone tissue").deprecated(true);
        assert_eq!(meta.label, "bone tissue");
        assert!(meta.deprecated);
    }
}
