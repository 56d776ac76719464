//! Cardinality repair: enforce a one-to-one alignment.

use std::collections::BTreeSet;

use crate::conflict::{ConflictSet, Path};
use crate::error::OntoResult;
use crate::hierarchy::HierarchyIndex;
use crate::mapping::MappingSet;

use super::greedy::GreedyRepairer;
use super::{RemovalAction, RepairReport, Repairer};

/// Treats every two active mappings that share a class as a conflict.
#[derive(Debug, Clone, Default)]
pub struct CardinalityRepairer;

impl CardinalityRepairer {
    pub fn new() -> Self {
        Self
    }

    /// Pairs of active mappings sharing a class, ordered by the lower index.
    pub fn conflict_sets(mappings: &MappingSet) -> Vec<ConflictSet> {
        let mut pairs = BTreeSet::new();
        let classes: BTreeSet<_> = mappings
            .active_indices()
            .filter_map(|i| mappings.get(i))
            .flat_map(|m| [m.source, m.target])
            .collect();
        for class in classes {
            let involved = mappings.mappings_involving(class);
            for (n, &i) in involved.iter().enumerate() {
                for &j in &involved[n + 1..] {
                    pairs.insert((i, j));
                }
            }
        }
        pairs
            .into_iter()
            .map(|(i, j)| Path::from_indices([i, j]))
            .collect()
    }
}

impl Repairer for CardinalityRepairer {
    fn name(&self) -> &str {
        "cardinality"
    }

    fn repair(
        &mut self,
        mappings: &mut MappingSet,
        _hierarchy: &dyn HierarchyIndex,
        action: RemovalAction,
    ) -> OntoResult<RepairReport> {
        let conflicts = Self::conflict_sets(mappings);
        let report = GreedyRepairer::new(mappings, &conflicts)?
            .with_action(action)
            .run(mappings, None)?;
        tracing::info!(
            conflict_sets = report.conflict_sets,
            removed = report.removed_count,
            "cardinality repair finished"
        );
        Ok(report)
    }
}
