//! Disjointness declarations between classes.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::class::ClassId;

/// Set of declared disjointness clauses.
///
/// Pairs are stored both ways for O(1) lookup, and each class keeps a sorted
/// list of its disjoint partners so the index can hand out slices.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisjointnessConstraints {
    pairs: HashSet<(ClassId, ClassId)>,
    partners: BTreeMap<ClassId, Vec<ClassId>>,
}

impl DisjointnessConstraints {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare two classes disjoint. Returns `false` if already declared.
    pub fn declare_disjoint(&mut self, a: ClassId, b: ClassId) -> bool {
        if !self.pairs.insert((a, b)) {
            return false;
        }
        self.pairs.insert((b, a));
        for (x, y) in [(a, b), (b, a)] {
            let list = self.partners.entry(x).or_default();
            if let Err(pos) = list.binary_search(&y) {
                list.insert(pos, y);
            }
        }
        true
    }

    /// Check if two classes are declared disjoint.
    pub fn are_disjoint(&self, a: ClassId, b: ClassId) -> bool {
        self.pairs.contains(&(a, b))
    }

    /// Classes declared disjoint with `class`, ascending.
    pub fn partners_of(&self, class: ClassId) -> &[ClassId] {
        self.partners
            .get(&class)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Every class taking part in some clause, ascending.
    pub fn classes(&self) -> Vec<ClassId> {
        self.partners.keys().copied().collect()
    }

    /// Number of clauses (counting each pair once).
    pub fn len(&self) -> usize {
        self.pairs.len() / 2
    }

    /// Whether no clauses are declared.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
