//! Ancestor expansion: minimal mapping paths from one origin to every
//! class-list class it reaches.
//!
//! The expansion is breadth-first in the number of mappings crossed. Level 0 is
//! the origin and its class-list ancestors, all with the empty path. Level k+1
//! crosses one more mapping from a class reached at level k and lands on the
//! mapped class and its class-list ancestors.

use std::collections::{BTreeMap, BTreeSet};

use crate::class::ClassId;
use crate::error::{ConflictError, ConflictResult};
use crate::hierarchy::HierarchyIndex;
use crate::mapping::MappingSet;

use super::path::{Path, PathArena, PathId};

/// Minimal paths from one origin class to each class it reaches.
#[derive(Debug)]
pub struct AncestorMap {
    origin: ClassId,
    arena: PathArena,
    buckets: BTreeMap<ClassId, Vec<PathId>>,
    paths_to_process: usize,
    rounds: usize,
}

impl AncestorMap {
    /// Expand from `origin` until no new relation appears.
    ///
    /// `max_rounds` bounds the number of levels; since every level adds one
    /// distinct mapping to each path, exceeding it means a cycle guard failed.
    pub fn expand(
        origin: ClassId,
        hierarchy: &dyn HierarchyIndex,
        mappings: &MappingSet,
        class_list: &BTreeSet<ClassId>,
        max_rounds: usize,
    ) -> ConflictResult<Self> {
        let mut map = Self {
            origin,
            arena: PathArena::new(),
            buckets: BTreeMap::new(),
            paths_to_process: 0,
            rounds: 0,
        };

        let start = map.arena.alloc(Path::new());
        let mut frontier: Vec<(ClassId, PathId)> = vec![(origin, start)];
        for &ancestor in hierarchy.super_classes(origin, true) {
            if ancestor == origin || !class_list.contains(&ancestor) {
                continue;
            }
            if let Some(id) = map.record(hierarchy, ancestor, Path::new()) {
                frontier.push((ancestor, id));
            }
        }

        while !frontier.is_empty() {
            if map.rounds >= max_rounds {
                return Err(ConflictError::FixpointDiverged {
                    origin,
                    cap: max_rounds,
                });
            }
            map.rounds += 1;

            let mut next = Vec::new();
            for (class, id) in frontier {
                if !map.arena.is_live(id) {
                    continue;
                }
                for index in mappings.mappings_involving(class) {
                    let Some(other) = mappings.get(index).and_then(|m| m.other_end(class)) else {
                        continue;
                    };
                    let extended = {
                        let path = map.arena.get(id);
                        if path.contains(index) {
                            continue;
                        }
                        path.with(index)
                    };
                    let landing = std::iter::once(other).chain(
                        hierarchy
                            .super_classes(other, true)
                            .iter()
                            .copied()
                            .filter(|c| class_list.contains(c)),
                    );
                    for reached in landing {
                        if reached == origin {
                            continue;
                        }
                        if let Some(new_id) = map.record(hierarchy, reached, extended.clone()) {
                            next.push((reached, new_id));
                        }
                    }
                }
            }
            frontier = next;
        }

        Ok(map)
    }

    /// Store `path` for `(origin, class)` if no stored path is a subset of it.
    fn record(
        &mut self,
        hierarchy: &dyn HierarchyIndex,
        class: ClassId,
        path: Path,
    ) -> Option<PathId> {
        let Self { arena, buckets, .. } = self;
        let bucket = buckets.entry(class).or_default();
        if bucket.iter().any(|&id| arena.get(id).is_subset(&path)) {
            return None;
        }
        bucket.retain(|&id| {
            let superseded = path.is_subset(arena.get(id));
            if superseded {
                arena.retire(id);
            }
            !superseded
        });
        let id = arena.alloc(path);
        bucket.push(id);
        if hierarchy.has_disjoint(class) {
            self.paths_to_process += 1;
        }
        Some(id)
    }

    /// The traversal origin.
    pub fn origin(&self) -> ClassId {
        self.origin
    }

    /// Classes reached from the origin, ascending.
    pub fn reached(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.buckets.keys().copied()
    }

    /// Minimal paths from the origin to `class`.
    pub fn paths_to(&self, class: ClassId) -> Vec<&Path> {
        self.buckets
            .get(&class)
            .map(|ids| ids.iter().map(|&id| self.arena.get(id)).collect())
            .unwrap_or_default()
    }

    /// Relations recorded towards disjointness-bearing classes.
    pub fn paths_to_process(&self) -> usize {
        self.paths_to_process
    }

    /// Levels expanded before the fixpoint was reached.
    pub fn rounds(&self) -> usize {
        self.rounds
    }
}
