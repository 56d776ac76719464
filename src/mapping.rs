//! Candidate mappings between source and target classes.
//!
//! A [`MappingSet`] is an ordered collection: a mapping's index is its position
//! and never changes, even after removal, so conflict sets can refer to
//! mappings by index. Removal leaves a tombstone; [`MappingSet::compact`]
//! produces a fresh set for the downstream pipeline.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::class::ClassId;
use crate::error::{MappingError, MappingResult};

/// Review status of a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MappingStatus {
    #[default]
    Unknown,
    Correct,
    Incorrect,
    Flagged,
}

impl std::fmt::Display for MappingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MappingStatus::Unknown => write!(f, "unknown"),
            MappingStatus::Correct => write!(f, "correct"),
            MappingStatus::Incorrect => write!(f, "incorrect"),
            MappingStatus::Flagged => write!(f, "flagged"),
        }
    }
}

/// A candidate correspondence between two classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    /// Class from the source ontology.
    pub source: ClassId,
    /// Class from the target ontology.
    pub target: ClassId,
    /// Similarity score in [0.0, 1.0].
    pub similarity: f64,
    /// Review status.
    pub status: MappingStatus,
}

impl Mapping {
    /// Create a mapping with unknown status. Similarity is clamped into [0, 1].
    pub fn new(source: ClassId, target: ClassId, similarity: f64) -> Self {
        Self {
            source,
            target,
            similarity: clamp_similarity(similarity),
            status: MappingStatus::Unknown,
        }
    }

    /// Set the initial status.
    pub fn with_status(mut self, status: MappingStatus) -> Self {
        self.status = status;
        self
    }

    /// The class on the other end of the mapping, if `class` is one end.
    pub fn other_end(&self, class: ClassId) -> Option<ClassId> {
        if self.source == class {
            Some(self.target)
        } else if self.target == class {
            Some(self.source)
        } else {
            None
        }
    }
}

fn clamp_similarity(similarity: f64) -> f64 {
    if similarity.is_nan() {
        0.0
    } else {
        similarity.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    mapping: Mapping,
    removed: bool,
}

/// Ordered set of candidate mappings with lookup by class and by class pair.
#[derive(Debug, Clone, Default)]
pub struct MappingSet {
    slots: Vec<Slot>,
    by_class: HashMap<ClassId, BTreeSet<usize>>,
    by_pair: HashMap<(ClassId, ClassId), usize>,
}

impl MappingSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping and return its index.
    ///
    /// If the pair is already present the existing index is returned and its
    /// similarity is raised to the higher of the two scores.
    pub fn add(&mut self, mapping: Mapping) -> usize {
        if let Some(&index) = self.by_pair.get(&(mapping.source, mapping.target)) {
            let slot = &mut self.slots[index];
            if !slot.removed {
                if mapping.similarity > slot.mapping.similarity {
                    slot.mapping.similarity = mapping.similarity;
                }
                return index;
            }
        }
        let index = self.slots.len();
        self.by_pair.insert((mapping.source, mapping.target), index);
        self.by_class.entry(mapping.source).or_default().insert(index);
        self.by_class.entry(mapping.target).or_default().insert(index);
        self.slots.push(Slot {
            mapping,
            removed: false,
        });
        index
    }

    /// Shorthand for `add(Mapping::new(source, target, similarity))`.
    pub fn insert(&mut self, source: ClassId, target: ClassId, similarity: f64) -> usize {
        self.add(Mapping::new(source, target, similarity))
    }

    /// The mapping at `index`, unless out of range or removed.
    pub fn get(&self, index: usize) -> Option<&Mapping> {
        self.slots
            .get(index)
            .filter(|s| !s.removed)
            .map(|s| &s.mapping)
    }

    /// Number of index slots, including removed mappings.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the set holds no slots at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether the mapping takes part in repair: present and not incorrect.
    pub fn is_active(&self, index: usize) -> bool {
        self.get(index)
            .is_some_and(|m| m.status != MappingStatus::Incorrect)
    }

    /// Indices of active mappings, ascending.
    pub fn active_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.slots.len()).filter(|&i| self.is_active(i))
    }

    /// Number of active mappings.
    pub fn active_len(&self) -> usize {
        self.active_indices().count()
    }

    /// Iterate over present (non-removed) mappings with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Mapping)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.removed)
            .map(|(i, s)| (i, &s.mapping))
    }

    /// Indices of active mappings with `class` as source or target, ascending.
    pub fn mappings_involving(&self, class: ClassId) -> Vec<usize> {
        self.by_class
            .get(&class)
            .map(|set| set.iter().copied().filter(|&i| self.is_active(i)).collect())
            .unwrap_or_default()
    }

    /// Number of active mappings involving `class`.
    pub fn count_involving(&self, class: ClassId) -> usize {
        self.by_class
            .get(&class)
            .map(|set| set.iter().filter(|&&i| self.is_active(i)).count())
            .unwrap_or(0)
    }

    /// Whether `class` takes part in any active mapping.
    pub fn is_mapped(&self, class: ClassId) -> bool {
        self.count_involving(class) > 0
    }

    /// Index of the present mapping between `a` and `b`, in either orientation.
    pub fn index_of(&self, a: ClassId, b: ClassId) -> Option<usize> {
        [(a, b), (b, a)]
            .into_iter()
            .filter_map(|pair| self.by_pair.get(&pair).copied())
            .find(|&i| !self.slots[i].removed)
    }

    /// Change the status of a mapping.
    pub fn set_status(&mut self, index: usize, status: MappingStatus) -> MappingResult<()> {
        self.slot_mut(index)?.mapping.status = status;
        Ok(())
    }

    /// Logically remove a mapping. Its index stays reserved.
    pub fn remove_index(&mut self, index: usize) -> MappingResult<Mapping> {
        let slot = self.slot_mut(index)?;
        slot.removed = true;
        Ok(slot.mapping.clone())
    }

    /// Build a new set holding only mappings that are present and not
    /// `Incorrect`. Indices are renumbered.
    pub fn compact(&self) -> MappingSet {
        let mut out = MappingSet::new();
        for (_, m) in self.iter() {
            if m.status != MappingStatus::Incorrect {
                out.add(m.clone());
            }
        }
        out
    }

    /// Count of present mappings per status.
    pub fn status_counts(&self) -> HashMap<MappingStatus, usize> {
        let mut counts = HashMap::new();
        for (_, m) in self.iter() {
            *counts.entry(m.status).or_insert(0) += 1;
        }
        counts
    }

    fn slot_mut(&mut self, index: usize) -> MappingResult<&mut Slot> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(MappingError::IndexOutOfRange { index, len })?;
        if slot.removed {
            return Err(MappingError::Removed { index });
        }
        Ok(slot)
    }
}

impl FromIterator<Mapping> for MappingSet {
    fn from_iter<I: IntoIterator<Item = Mapping>>(iter: I) -> Self {
        let mut set = MappingSet::new();
        for m in iter {
            set.add(m);
        }
        set
    }
}
