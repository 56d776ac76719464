//! Hierarchy index: the read-only view of both class taxonomies.
//!
//! The conflict-set builder never walks ontology structures directly; it asks a
//! [`HierarchyIndex`] for precomputed super/subclass closures and disjointness
//! declarations. [`Taxonomy`] is the in-memory implementation shipped with the
//! crate; loaders for real ontology formats can provide their own.

pub mod disjoint;
pub mod taxonomy;

pub use disjoint::DisjointnessConstraints;
pub use taxonomy::{Taxonomy, TaxonomyBuilder};

use crate::class::ClassId;

/// Read access to a class hierarchy with transitive closure precomputed.
///
/// Implementations must be side-effect free: the builder may query them from
/// several threads at once.
pub trait HierarchyIndex: Send + Sync {
    /// Whether the class is known to this index.
    fn contains(&self, class: ClassId) -> bool;

    /// Superclasses of `class`: direct parents, or all ancestors when
    /// `transitive` is set. Never includes `class` itself.
    fn super_classes(&self, class: ClassId, transitive: bool) -> &[ClassId];

    /// Subclasses of `class`: direct children, or all descendants when
    /// `transitive` is set. Never includes `class` itself.
    fn sub_classes(&self, class: ClassId, transitive: bool) -> &[ClassId];

    /// Classes explicitly declared disjoint with `class`.
    fn disjoint_classes(&self, class: ClassId) -> &[ClassId];

    /// Whether `class` appears in any disjointness declaration.
    fn has_disjoint(&self, class: ClassId) -> bool {
        !self.disjoint_classes(class).is_empty()
    }

    /// Every class that appears in a disjointness declaration, ascending.
    fn classes_with_disjoint(&self) -> Vec<ClassId>;

    /// Whether the class is marked deprecated in its ontology.
    fn is_deprecated(&self, _class: ClassId) -> bool {
        false
    }

    /// Display name used in diagnostic output.
    fn class_name(&self, class: ClassId) -> String {
        class.to_string()
    }

    /// Whether `sub` is a strict descendant of `sup`.
    fn is_subclass_of(&self, sub: ClassId, sup: ClassId) -> bool {
        self.super_classes(sub, true).contains(&sup)
    }
}
