//! CheckList reduction: choosing the traversal origins.
//!
//! Starting a traversal from every class of the class list would find every
//! conflict many times over. Two populations are enough:
//!
//! - **descendant candidates**: classes below the class list that combine
//!   routes from two independent parent branches, or that carry a disjointness
//!   clause of their own;
//! - **mapped candidates**: one side of every mapping, preferring the side that
//!   is more likely to contribute to a clause.
//!
//! In both populations a class is dropped whenever a more specific class of
//! the same population, itself kept as an origin, reaches everything it
//! reaches. Being mapped alone does not make a subclass an origin.

use std::collections::BTreeSet;

use crate::class::ClassId;
use crate::hierarchy::HierarchyIndex;
use crate::mapping::MappingSet;

/// Compute the CheckList for a class list.
pub fn build_checklist(
    hierarchy: &dyn HierarchyIndex,
    mappings: &MappingSet,
    class_list: &BTreeSet<ClassId>,
) -> BTreeSet<ClassId> {
    let descendants = descendant_candidates(hierarchy, class_list);
    let mapped = mapped_candidates(hierarchy, mappings, &descendants);
    tracing::debug!(
        descendants = descendants.len(),
        mapped = mapped.len(),
        "checklist reduced"
    );
    descendants.union(&mapped).copied().collect()
}

fn descendant_candidates(
    hierarchy: &dyn HierarchyIndex,
    class_list: &BTreeSet<ClassId>,
) -> BTreeSet<ClassId> {
    let mut candidates = BTreeSet::new();
    for &class in class_list {
        for &sub in hierarchy.sub_classes(class, true) {
            if candidates.contains(&sub) {
                continue;
            }
            if hierarchy.has_disjoint(sub) || joins_branches(hierarchy, sub, class_list) {
                candidates.insert(sub);
            }
        }
    }

    // A more specific candidate reaches everything this one does.
    let shadowed: Vec<ClassId> = candidates
        .iter()
        .copied()
        .filter(|&c| {
            hierarchy
                .sub_classes(c, true)
                .iter()
                .any(|s| candidates.contains(s))
        })
        .collect();
    for c in shadowed {
        candidates.remove(&c);
    }

    let keyed: Vec<(ClassId, BTreeSet<ClassId>)> = candidates
        .iter()
        .map(|&c| (c, upward_class_list(hierarchy, c, class_list)))
        .collect();
    let mut kept = BTreeSet::new();
    'candidates: for (i, (class, reach)) in keyed.iter().enumerate() {
        for (j, (_, other)) in keyed.iter().enumerate() {
            if i == j || !reach.is_subset(other) {
                continue;
            }
            // Identical reach: the first in class order survives.
            if reach != other || j < i {
                continue 'candidates;
            }
        }
        kept.insert(*class);
    }
    kept
}

/// At least two direct parents, two of which lead back to the class list.
fn joins_branches(
    hierarchy: &dyn HierarchyIndex,
    class: ClassId,
    class_list: &BTreeSet<ClassId>,
) -> bool {
    let parents = hierarchy.super_classes(class, false);
    if parents.len() < 2 {
        return false;
    }
    parents
        .iter()
        .filter(|&&p| {
            class_list.contains(&p)
                || hierarchy
                    .super_classes(p, true)
                    .iter()
                    .any(|a| class_list.contains(a))
        })
        .take(2)
        .count()
        >= 2
}

/// The class-list members a class reaches through is-a alone, itself included.
fn upward_class_list(
    hierarchy: &dyn HierarchyIndex,
    class: ClassId,
    class_list: &BTreeSet<ClassId>,
) -> BTreeSet<ClassId> {
    std::iter::once(class)
        .chain(hierarchy.super_classes(class, true).iter().copied())
        .filter(|c| class_list.contains(c))
        .collect()
}

fn mapped_candidates(
    hierarchy: &dyn HierarchyIndex,
    mappings: &MappingSet,
    descendants: &BTreeSet<ClassId>,
) -> BTreeSet<ClassId> {
    let mut slated = BTreeSet::new();
    for index in mappings.active_indices() {
        let Some(m) = mappings.get(index) else {
            continue;
        };
        let pick = preferred_side(hierarchy, mappings, m.source, m.target);
        if slated.contains(&pick) {
            continue;
        }
        let covered = hierarchy
            .sub_classes(pick, true)
            .iter()
            .any(|d| descendants.contains(d) || slated.contains(d));
        if !covered {
            slated.insert(pick);
        }
    }

    let general: Vec<ClassId> = slated
        .iter()
        .copied()
        .filter(|&c| {
            hierarchy
                .sub_classes(c, true)
                .iter()
                .any(|s| slated.contains(s))
        })
        .collect();
    for c in general {
        slated.remove(&c);
    }
    slated
}

/// The side of a mapping to start a traversal from.
///
/// More mappings first; then more mapped ancestors; then the source side.
fn preferred_side(
    hierarchy: &dyn HierarchyIndex,
    mappings: &MappingSet,
    source: ClassId,
    target: ClassId,
) -> ClassId {
    let (ns, nt) = (
        mappings.count_involving(source),
        mappings.count_involving(target),
    );
    if ns != nt {
        return if ns > nt { source } else { target };
    }
    let mapped_ancestors = |c: ClassId| {
        hierarchy
            .super_classes(c, true)
            .iter()
            .filter(|&&a| mappings.is_mapped(a))
            .count()
    };
    if mapped_ancestors(target) > mapped_ancestors(source) {
        target
    } else {
        source
    }
}
