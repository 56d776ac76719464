//! Conflict-set construction.
//!
//! Given a [`MappingSet`] and a [`HierarchyIndex`], find every minimal set of
//! mappings whose joint presence makes some class reach two classes that are
//! declared disjoint. The build runs in four phases:
//!
//! 1. **Class list**: classes with disjointness clauses plus all mapped classes.
//!    Without any clause there is nothing to do.
//! 2. **CheckList** ([`checklist`]): the traversal origins.
//! 3. **Ancestor expansion** ([`ancestors`]): minimal mapping paths from each
//!    origin to every class-list class it reaches.
//! 4. **Extraction**: for two reached classes declared disjoint, each pair of
//!    paths merges (symmetric difference) into a candidate conflict set, kept
//!    in a global [`Antichain`].
//!
//! Phase 3–4 per origin is independent and may run on rayon workers; the
//! antichain reduction always runs serially in CheckList order, so parallel and
//! serial builds return identical lists.

pub mod ancestors;
pub mod antichain;
pub mod checklist;
pub mod path;

pub use ancestors::AncestorMap;
pub use antichain::{Antichain, Insertion};
pub use path::{ConflictSet, Path, PathArena, PathId};

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::class::ClassId;
use crate::error::{ConflictError, ConflictResult};
use crate::hierarchy::HierarchyIndex;
use crate::mapping::MappingSet;

/// Tuning knobs for [`ConflictSetBuilder`].
#[derive(Debug, Clone, Default)]
pub struct BuilderConfig {
    /// Expand CheckList origins on the rayon thread pool.
    pub parallel: bool,
    /// Origins not started before this much time has passed are skipped.
    pub timeout: Option<Duration>,
    /// Override for the ancestor-expansion level cap
    /// (default: active mappings + 2).
    pub max_rounds: Option<usize>,
}

/// Outcome of a conflict-set build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConflictReport {
    /// Minimal conflict sets, as indices into the mapping set.
    pub conflict_sets: Vec<ConflictSet>,
    /// Size of the class list (phase 1).
    pub class_list_len: usize,
    /// Number of traversal origins (phase 2).
    pub checklist_len: usize,
    /// Relations recorded towards disjointness-bearing classes.
    pub paths_to_process: usize,
    /// Origins excluded because the timeout elapsed.
    pub skipped_classes: Vec<ClassId>,
}

impl ConflictReport {
    /// Whether every origin was traversed.
    pub fn is_complete(&self) -> bool {
        self.skipped_classes.is_empty()
    }
}

enum Traversal {
    Done {
        candidates: Vec<Path>,
        paths_to_process: usize,
    },
    Skipped(ClassId),
}

/// Builds the list of minimal conflict sets.
#[derive(Debug, Clone, Default)]
pub struct ConflictSetBuilder {
    config: BuilderConfig,
}

impl ConflictSetBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Run all four phases.
    pub fn build(
        &self,
        mappings: &MappingSet,
        hierarchy: &dyn HierarchyIndex,
    ) -> ConflictResult<ConflictReport> {
        validate(mappings, hierarchy)?;

        let with_disjoint = hierarchy.classes_with_disjoint();
        if with_disjoint.is_empty() {
            tracing::info!("no disjointness clauses, nothing to repair");
            return Ok(ConflictReport::default());
        }

        let mut class_list: BTreeSet<ClassId> = with_disjoint.into_iter().collect();
        for index in mappings.active_indices() {
            if let Some(m) = mappings.get(index) {
                class_list.insert(m.source);
                class_list.insert(m.target);
            }
        }

        let checklist: Vec<ClassId> = checklist::build_checklist(hierarchy, mappings, &class_list)
            .into_iter()
            .collect();
        tracing::info!(
            class_list = class_list.len(),
            checklist = checklist.len(),
            "building conflict sets"
        );

        let cap = self
            .config
            .max_rounds
            .unwrap_or_else(|| mappings.active_len() + 2);
        let deadline = self.config.timeout.map(|t| Instant::now() + t);
        let traverse = |origin: ClassId| -> ConflictResult<Traversal> {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Ok(Traversal::Skipped(origin));
            }
            let map = AncestorMap::expand(origin, hierarchy, mappings, &class_list, cap)?;
            Ok(Traversal::Done {
                candidates: extract(hierarchy, &map),
                paths_to_process: map.paths_to_process(),
            })
        };

        let outcomes: Vec<Traversal> = if self.config.parallel {
            checklist
                .par_iter()
                .map(|&origin| traverse(origin))
                .collect::<ConflictResult<_>>()?
        } else {
            checklist
                .iter()
                .map(|&origin| traverse(origin))
                .collect::<ConflictResult<_>>()?
        };

        let mut report = ConflictReport {
            class_list_len: class_list.len(),
            checklist_len: checklist.len(),
            ..Default::default()
        };
        let mut conflicts = Antichain::new();
        for outcome in outcomes {
            match outcome {
                Traversal::Done {
                    candidates,
                    paths_to_process,
                } => {
                    report.paths_to_process += paths_to_process;
                    conflicts.extend(candidates);
                }
                Traversal::Skipped(origin) => report.skipped_classes.push(origin),
            }
        }
        report.conflict_sets = conflicts.into_vec();

        if !report.is_complete() {
            tracing::warn!(
                skipped = report.skipped_classes.len(),
                "timeout elapsed, some classes were not checked"
            );
        }
        tracing::info!(
            conflict_sets = report.conflict_sets.len(),
            paths_to_process = report.paths_to_process,
            "conflict sets built"
        );
        Ok(report)
    }
}

/// Build conflict sets with the default serial configuration.
pub fn build_conflict_sets(
    mappings: &MappingSet,
    hierarchy: &dyn HierarchyIndex,
) -> ConflictResult<Vec<ConflictSet>> {
    ConflictSetBuilder::default()
        .build(mappings, hierarchy)
        .map(|r| r.conflict_sets)
}

fn validate(mappings: &MappingSet, hierarchy: &dyn HierarchyIndex) -> ConflictResult<()> {
    for index in mappings.active_indices() {
        let Some(m) = mappings.get(index) else {
            continue;
        };
        for class in [m.source, m.target] {
            if !hierarchy.contains(class) {
                return Err(ConflictError::UnknownClass {
                    class,
                    mapping: index,
                });
            }
        }
    }
    Ok(())
}

/// Phase 4 for one origin: merge path pairs towards disjoint class pairs.
fn extract(hierarchy: &dyn HierarchyIndex, map: &AncestorMap) -> Vec<Path> {
    let origin = map.origin();
    let empty = Path::new();

    let mut targets: Vec<(ClassId, Vec<&Path>)> = map
        .reached()
        .filter(|&c| hierarchy.has_disjoint(c))
        .map(|c| (c, map.paths_to(c)))
        .collect();
    // The origin's own clause pairs with routes to its disjoint partners.
    if hierarchy.has_disjoint(origin) {
        targets.push((origin, vec![&empty]));
        targets.sort_by_key(|(c, _)| *c);
    }

    let mut candidates = Vec::new();
    for (i, (d1, to_d1)) in targets.iter().enumerate() {
        let partners = hierarchy.disjoint_classes(*d1);
        for (d2, to_d2) in &targets[i + 1..] {
            if !partners.contains(d2) {
                continue;
            }
            for p in to_d1 {
                for q in to_d2 {
                    let merged = p.merge(q);
                    if !merged.is_empty() {
                        candidates.push(merged);
                    }
                }
            }
        }
    }
    candidates
}
