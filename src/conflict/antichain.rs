//! Subset-minimal collections of paths.

use super::path::Path;

/// Outcome of inserting into an [`Antichain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// An existing member is a subset of the candidate; nothing changed.
    Redundant,
    /// The candidate was added and `evicted` supersets were dropped.
    Inserted { evicted: usize },
}

/// A list of paths in which no member is a subset of another.
///
/// Insertion order is preserved for members that survive, which keeps the
/// builder's output deterministic.
#[derive(Debug, Clone, Default)]
pub struct Antichain {
    members: Vec<Path>,
}

impl Antichain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `path` unless an existing member is a subset of it; evict members
    /// that are strict supersets of it.
    pub fn insert(&mut self, path: Path) -> Insertion {
        if self.members.iter().any(|m| m.is_subset(&path)) {
            return Insertion::Redundant;
        }
        let before = self.members.len();
        self.members.retain(|m| !path.is_subset(m));
        let evicted = before - self.members.len();
        self.members.push(path);
        Insertion::Inserted { evicted }
    }

    /// Insert every path, in order.
    pub fn extend(&mut self, paths: impl IntoIterator<Item = Path>) {
        for p in paths {
            self.insert(p);
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn as_slice(&self) -> &[Path] {
        &self.members
    }

    pub fn into_vec(self) -> Vec<Path> {
        self.members
    }
}
