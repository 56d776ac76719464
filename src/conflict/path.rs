//! Paths: sets of mapping indices, and the arena that holds them during
//! ancestor expansion.

use serde::{Deserialize, Serialize};

/// A set of mapping indices.
///
/// Stored as a sorted, duplicate-free vector so subset tests and merges are
/// linear walks. A path never contains the same mapping twice, which is what
/// keeps traversal over cyclic mapping graphs finite.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<usize>);

/// A finalized minimal path in the builder's output.
pub type ConflictSet = Path;

impl Path {
    /// The empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// A path holding a single mapping.
    pub fn singleton(index: usize) -> Self {
        Path(vec![index])
    }

    /// Build a path from arbitrary indices; duplicates collapse.
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut v: Vec<usize> = indices.into_iter().collect();
        v.sort_unstable();
        v.dedup();
        Path(v)
    }

    /// Insert a mapping. Returns `false` if it was already present.
    pub fn insert(&mut self, index: usize) -> bool {
        match self.0.binary_search(&index) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, index);
                true
            }
        }
    }

    /// A copy of this path extended by one mapping.
    pub fn with(&self, index: usize) -> Path {
        let mut p = self.clone();
        p.insert(index);
        p
    }

    /// Whether the mapping is on this path.
    pub fn contains(&self, index: usize) -> bool {
        self.0.binary_search(&index).is_ok()
    }

    /// Whether every mapping of `self` is also in `other`.
    pub fn is_subset(&self, other: &Path) -> bool {
        if self.0.len() > other.0.len() {
            return false;
        }
        let mut theirs = other.0.iter();
        'outer: for x in &self.0 {
            for y in theirs.by_ref() {
                if y == x {
                    continue 'outer;
                }
                if y > x {
                    return false;
                }
            }
            return false;
        }
        true
    }

    /// Symmetric difference `(P ∪ Q) − (P ∩ Q)`.
    ///
    /// Mappings shared by two routes from a common class cancel out, leaving
    /// the mappings that make the two routes diverge.
    pub fn merge(&self, other: &Path) -> Path {
        let (a, b) = (&self.0, &other.0);
        let mut out = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                std::cmp::Ordering::Less => {
                    out.push(a[i]);
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    out.push(b[j]);
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
        }
        out.extend_from_slice(&a[i..]);
        out.extend_from_slice(&b[j..]);
        Path(out)
    }

    /// Number of mappings on the path.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the path crosses no mapping.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Mapping indices, ascending.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Mapping indices as a slice, ascending.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (n, i) in self.0.iter().enumerate() {
            if n > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{i}")?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<usize> for Path {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Path::from_indices(iter)
    }
}

/// Index of a path inside a [`PathArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathId(usize);

/// Append-only storage for paths discovered during one traversal.
///
/// Buckets and frontiers hold [`PathId`]s instead of owned paths. A path that
/// gets superseded by a smaller one is retired rather than freed, so stale ids
/// in a frontier can be recognised and skipped.
#[derive(Debug, Default)]
pub struct PathArena {
    paths: Vec<Path>,
    live: Vec<bool>,
}

impl PathArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a path and return its id.
    pub fn alloc(&mut self, path: Path) -> PathId {
        let id = PathId(self.paths.len());
        self.paths.push(path);
        self.live.push(true);
        id
    }

    pub fn get(&self, id: PathId) -> &Path {
        &self.paths[id.0]
    }

    /// Mark a path as superseded.
    pub fn retire(&mut self, id: PathId) {
        self.live[id.0] = false;
    }

    pub fn is_live(&self, id: PathId) -> bool {
        self.live[id.0]
    }

    /// Number of paths ever allocated.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
