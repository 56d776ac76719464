//! Greedy minimal-removal loop over conflict sets.
//!
//! Two incidence maps are kept in sync: conflict → its unresolved mappings, and
//! mapping → the unresolved conflicts it takes part in. Each step picks the
//! mapping in the most conflicts (lowest similarity, then lowest index, on
//! ties), applies the removal action, and drops every conflict it resolved.

use std::collections::{BTreeMap, BTreeSet};

use crate::conflict::ConflictSet;
use crate::error::{MappingError, RepairError, RepairResult};
use crate::mapping::{MappingSet, MappingStatus};

use super::arbiter::{Arbiter, Verdict};
use super::{RemovalAction, RepairReport};

/// Resolves a fixed list of conflict sets against a mapping set.
#[derive(Debug, Clone)]
pub struct GreedyRepairer {
    conflicts: Vec<ConflictSet>,
    conflict_to_mappings: BTreeMap<usize, BTreeSet<usize>>,
    mapping_to_conflicts: BTreeMap<usize, BTreeSet<usize>>,
    excluded: BTreeSet<usize>,
    action: RemovalAction,
}

impl GreedyRepairer {
    /// Index the conflict sets.
    ///
    /// Every index must refer to a present mapping. Conflicts that already
    /// contain an inactive mapping are resolved and skipped. Mappings already
    /// confirmed `Correct` are never selected.
    pub fn new(mappings: &MappingSet, conflicts: &[ConflictSet]) -> RepairResult<Self> {
        let mut conflict_to_mappings = BTreeMap::new();
        let mut mapping_to_conflicts: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
        let mut excluded = BTreeSet::new();

        for (c, set) in conflicts.iter().enumerate() {
            for index in set.iter() {
                if mappings.get(index).is_none() {
                    return Err(RepairError::UnknownMapping { conflict: c, index });
                }
            }
            if set.is_empty() || set.iter().any(|i| !mappings.is_active(i)) {
                continue;
            }
            for index in set.iter() {
                mapping_to_conflicts.entry(index).or_default().insert(c);
                if mappings
                    .get(index)
                    .is_some_and(|m| m.status == MappingStatus::Correct)
                {
                    excluded.insert(index);
                }
            }
            conflict_to_mappings.insert(c, set.iter().collect());
        }

        Ok(Self {
            conflicts: conflicts.to_vec(),
            conflict_to_mappings,
            mapping_to_conflicts,
            excluded,
            action: RemovalAction::default(),
        })
    }

    /// Use a different removal action.
    pub fn with_action(mut self, action: RemovalAction) -> Self {
        self.action = action;
        self
    }

    /// Number of conflict sets not yet resolved.
    pub fn pending(&self) -> usize {
        self.conflict_to_mappings.len()
    }

    /// The next mapping to remove, if any selectable mapping is left.
    pub fn select_worst(&self, mappings: &MappingSet) -> Option<usize> {
        let mut best: Option<(usize, f64, usize)> = None;
        for (&index, conflicts) in &self.mapping_to_conflicts {
            if self.excluded.contains(&index) {
                continue;
            }
            let similarity = mappings.get(index).map_or(0.0, |m| m.similarity);
            let count = conflicts.len();
            let better = match best {
                None => true,
                // BTreeMap iterates ascending, so equal keys keep the lower index.
                Some((_, s, n)) => count > n || (count == n && similarity < s),
            };
            if better {
                best = Some((index, similarity, count));
            }
        }
        best.map(|(index, _, _)| index)
    }

    /// Drop every conflict containing `index` from both maps.
    fn resolve(&mut self, index: usize) {
        let Some(resolved) = self.mapping_to_conflicts.remove(&index) else {
            return;
        };
        for c in resolved {
            let Some(members) = self.conflict_to_mappings.remove(&c) else {
                continue;
            };
            for other in members {
                if other == index {
                    continue;
                }
                if let Some(set) = self.mapping_to_conflicts.get_mut(&other) {
                    set.remove(&c);
                    if set.is_empty() {
                        self.mapping_to_conflicts.remove(&other);
                    }
                }
            }
        }
    }

    /// Run until every conflict is resolved or only confirmed mappings remain.
    pub fn run(
        mut self,
        mappings: &mut MappingSet,
        mut arbiter: Option<&mut dyn Arbiter>,
    ) -> RepairResult<RepairReport> {
        let mut report = RepairReport {
            conflict_sets: self.pending(),
            ..Default::default()
        };

        while let Some(index) = self.select_worst(mappings) {
            if let Some(arbiter) = arbiter.as_deref_mut() {
                let mapping = mappings.get(index).ok_or(MappingError::Removed { index })?;
                if arbiter.review(index, mapping)? == Verdict::Correct {
                    mappings.set_status(index, MappingStatus::Correct)?;
                    self.excluded.insert(index);
                    report.confirmed.push(index);
                    tracing::debug!(index, "mapping confirmed, kept");
                    continue;
                }
            }

            self.action.apply(mappings, index)?;
            tracing::debug!(
                index,
                action = ?self.action,
                pending = self.pending(),
                "mapping removed"
            );
            self.resolve(index);
            report.removed_indices.push(index);
        }

        report.removed_count = report.removed_indices.len();
        report.unresolved_conflicts = self
            .conflict_to_mappings
            .keys()
            .map(|&c| self.conflicts[c].clone())
            .collect();
        if !report.is_consistent() {
            tracing::warn!(
                unresolved = report.unresolved_conflicts.len(),
                "conflicts left with only confirmed mappings"
            );
        }
        Ok(report)
    }
}
