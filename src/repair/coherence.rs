//! Coherence repair: conflict sets from disjointness, resolved greedily.

use crate::conflict::{BuilderConfig, ConflictSetBuilder};
use crate::error::OntoResult;
use crate::hierarchy::HierarchyIndex;
use crate::mapping::MappingSet;

use super::arbiter::Arbiter;
use super::greedy::GreedyRepairer;
use super::{RemovalAction, RepairReport, Repairer};

/// Removes mappings that make the merged hierarchy violate a disjointness
/// declaration.
#[derive(Default)]
pub struct CoherenceRepairer {
    builder: ConflictSetBuilder,
    arbiter: Option<Box<dyn Arbiter>>,
}

impl CoherenceRepairer {
    pub fn new(config: BuilderConfig) -> Self {
        Self {
            builder: ConflictSetBuilder::new(config),
            arbiter: None,
        }
    }

    /// Ask `arbiter` before each removal.
    pub fn with_arbiter(mut self, arbiter: Box<dyn Arbiter>) -> Self {
        self.arbiter = Some(arbiter);
        self
    }
}

impl Repairer for CoherenceRepairer {
    fn name(&self) -> &str {
        "coherence"
    }

    fn repair(
        &mut self,
        mappings: &mut MappingSet,
        hierarchy: &dyn HierarchyIndex,
        action: RemovalAction,
    ) -> OntoResult<RepairReport> {
        let built = self.builder.build(mappings, hierarchy)?;
        let greedy = GreedyRepairer::new(mappings, &built.conflict_sets)?.with_action(action);
        let arbiter = self.arbiter.as_deref_mut().map(|a| a as &mut dyn Arbiter);
        let report = greedy.run(mappings, arbiter)?;
        tracing::info!(
            conflict_sets = report.conflict_sets,
            removed = report.removed_count,
            confirmed = report.confirmed.len(),
            "coherence repair finished"
        );
        Ok(report)
    }
}
