//! Repair strategies: deactivate mappings until the alignment is consistent.
//!
//! Every strategy implements [`Repairer`]. The coherence strategy is the core:
//! it builds conflict sets and resolves them with the [`GreedyRepairer`]. The
//! cardinality and obsolete strategies reuse the same removal machinery for
//! simpler defects.

pub mod arbiter;
pub mod cardinality;
pub mod coherence;
pub mod greedy;
pub mod obsolete;

pub use arbiter::{Arbiter, PromptArbiter, ReferenceOracle, Verdict};
pub use cardinality::CardinalityRepairer;
pub use coherence::CoherenceRepairer;
pub use greedy::GreedyRepairer;
pub use obsolete::ObsoleteRepairer;

use serde::{Deserialize, Serialize};

use crate::conflict::ConflictSet;
use crate::error::{MappingResult, OntoResult, RepairResult};
use crate::hierarchy::HierarchyIndex;
use crate::mapping::{MappingSet, MappingStatus};

/// What happens to a mapping selected for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalAction {
    /// Set status to `Incorrect`; the slot stays, the mapping becomes inactive.
    #[default]
    MarkIncorrect,
    /// Set status to `Flagged` for later review.
    Flag,
    /// Remove the mapping from the set.
    Delete,
}

impl RemovalAction {
    /// Apply the action to one mapping.
    pub fn apply(self, mappings: &mut MappingSet, index: usize) -> MappingResult<()> {
        match self {
            RemovalAction::MarkIncorrect => mappings.set_status(index, MappingStatus::Incorrect),
            RemovalAction::Flag => mappings.set_status(index, MappingStatus::Flagged),
            RemovalAction::Delete => mappings.remove_index(index).map(|_| ()),
        }
    }
}

/// Outcome of one repair run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepairReport {
    /// Number of mappings the removal action was applied to.
    pub removed_count: usize,
    /// Indices of those mappings, in removal order.
    pub removed_indices: Vec<usize>,
    /// Mappings confirmed as correct during the run (kept despite conflicts).
    pub confirmed: Vec<usize>,
    /// Conflict sets left intact because only confirmed mappings remained.
    pub unresolved_conflicts: Vec<ConflictSet>,
    /// Number of conflict sets the run started from.
    pub conflict_sets: usize,
}

impl RepairReport {
    /// Whether every conflict set was resolved.
    pub fn is_consistent(&self) -> bool {
        self.unresolved_conflicts.is_empty()
    }

    /// Fold another run's report into this one.
    pub fn absorb(&mut self, other: RepairReport) {
        self.removed_count += other.removed_count;
        self.removed_indices.extend(other.removed_indices);
        self.confirmed.extend(other.confirmed);
        self.unresolved_conflicts.extend(other.unresolved_conflicts);
        self.conflict_sets += other.conflict_sets;
    }
}

/// How selected mappings are decided on.
pub enum RepairPolicy<'a> {
    /// Remove every selected mapping.
    Automatic,
    /// Ask an arbiter before each removal.
    Interactive(&'a mut dyn Arbiter),
}

impl RepairPolicy<'_> {
    fn arbiter(&mut self) -> Option<&mut dyn Arbiter> {
        match self {
            RepairPolicy::Automatic => None,
            RepairPolicy::Interactive(a) => Some(&mut **a),
        }
    }
}

/// A strategy that filters an alignment.
pub trait Repairer {
    /// Short strategy name for logs and reports.
    fn name(&self) -> &str;

    /// Deactivate defective mappings in place.
    fn repair(
        &mut self,
        mappings: &mut MappingSet,
        hierarchy: &dyn HierarchyIndex,
        action: RemovalAction,
    ) -> OntoResult<RepairReport>;
}

/// Resolve precomputed conflict sets, marking removed mappings `Incorrect`.
pub fn repair(
    mappings: &mut MappingSet,
    conflicts: &[ConflictSet],
    mut policy: RepairPolicy<'_>,
) -> RepairResult<RepairReport> {
    GreedyRepairer::new(mappings, conflicts)?.run(mappings, policy.arbiter())
}
