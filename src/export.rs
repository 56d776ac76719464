//! Export types for conflict sets and mappings.
//!
//! These types provide human-readable, label-resolved representations of
//! mappings and conflict sets, suitable for JSON export or a plain-text dump.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::conflict::ConflictSet;
use crate::hierarchy::HierarchyIndex;
use crate::mapping::{MappingSet, MappingStatus};

/// Exported mapping with resolved class names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingExport {
    /// Index in the mapping set.
    pub index: usize,
    /// Source class name.
    pub source: String,
    /// Target class name.
    pub target: String,
    /// Similarity score.
    pub similarity: f64,
    /// Review status.
    pub status: MappingStatus,
}

/// Exported conflict set with its participants resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictSetExport {
    /// Position in the conflict-set list, starting at 1.
    pub id: usize,
    /// Participating mappings, ascending by index.
    pub mappings: Vec<MappingExport>,
}

/// Resolve one mapping; `None` if the index is not present.
pub fn export_mapping(
    mappings: &MappingSet,
    hierarchy: &dyn HierarchyIndex,
    index: usize,
) -> Option<MappingExport> {
    mappings.get(index).map(|m| MappingExport {
        index,
        source: hierarchy.class_name(m.source),
        target: hierarchy.class_name(m.target),
        similarity: m.similarity,
        status: m.status,
    })
}

/// Resolve every conflict set. Indices no longer present are skipped.
pub fn export_conflict_sets(
    conflicts: &[ConflictSet],
    mappings: &MappingSet,
    hierarchy: &dyn HierarchyIndex,
) -> Vec<ConflictSetExport> {
    conflicts
        .iter()
        .enumerate()
        .map(|(n, set)| ConflictSetExport {
            id: n + 1,
            mappings: set
                .iter()
                .filter_map(|i| export_mapping(mappings, hierarchy, i))
                .collect(),
        })
        .collect()
}

/// Write one labeled block per conflict set.
///
/// ```text
/// Conflict set 1:
///   [0] A -> X (0.90)
///   [1] B -> X (0.60)
/// ```
pub fn write_conflict_sets<W: Write>(
    out: &mut W,
    conflicts: &[ConflictSet],
    mappings: &MappingSet,
    hierarchy: &dyn HierarchyIndex,
) -> std::io::Result<()> {
    for block in export_conflict_sets(conflicts, mappings, hierarchy) {
        writeln!(out, "Conflict set {}:", block.id)?;
        for m in &block.mappings {
            writeln!(
                out,
                "  [{}] {} -> {} ({:.2})",
                m.index, m.source, m.target, m.similarity
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}
