//! Obsolete repair: drop mappings that involve deprecated classes.

use crate::error::OntoResult;
use crate::hierarchy::HierarchyIndex;
use crate::mapping::{MappingSet, MappingStatus};

use super::{RemovalAction, RepairReport, Repairer};

#[derive(Debug, Clone, Default)]
pub struct ObsoleteRepairer;

impl ObsoleteRepairer {
    pub fn new() -> Self {
        Self
    }
}

impl Repairer for ObsoleteRepairer {
    fn name(&self) -> &str {
        "obsolete"
    }

    fn repair(
        &mut self,
        mappings: &mut MappingSet,
        hierarchy: &dyn HierarchyIndex,
        action: RemovalAction,
    ) -> OntoResult<RepairReport> {
        let obsolete: Vec<usize> = mappings
            .active_indices()
            .filter(|&i| {
                mappings.get(i).is_some_and(|m| {
                    m.status != MappingStatus::Correct
                        && (hierarchy.is_deprecated(m.source) || hierarchy.is_deprecated(m.target))
                })
            })
            .collect();
        for &index in &obsolete {
            action.apply(mappings, index)?;
        }
        tracing::info!(removed = obsolete.len(), "obsolete repair finished");
        Ok(RepairReport {
            removed_count: obsolete.len(),
            removed_indices: obsolete,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Ontology;
    use crate::hierarchy::Taxonomy;

    #[test]
    fn deprecated_classes_lose_their_mappings() {
        let mut b = Taxonomy::builder();
        let a = b.add_class("s#A", Ontology::Source);
        let old = b.add_class("s#Old", Ontology::Source);
        let x = b.add_class("t#X", Ontology::Target);
        b.set_deprecated(old, true).unwrap();
        let h = b.build();
        let mut ms = MappingSet::new();
        ms.insert(a, x, 0.9);
        ms.insert(old, x, 0.95);

        let report = ObsoleteRepairer::new()
            .repair(&mut ms, &h, RemovalAction::Delete)
            .unwrap();
        assert_eq!(report.removed_indices, vec![1]);
        assert!(ms.get(1).is_none());
        assert!(ms.get(0).is_some());
    }
}
