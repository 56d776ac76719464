//! In-memory taxonomy backed by petgraph.
//!
//! Classes of both ontologies are nodes of one directed graph; an edge
//! `sub → sup` records `sub ⊑ sup`, and an equivalence is stored as two such
//! edges. [`TaxonomyBuilder::build`] computes the transitive closure in both
//! directions once, so every [`HierarchyIndex`] query is a slice lookup.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, Reversed};

use crate::class::{ClassId, ClassMeta, Ontology};
use crate::error::{HierarchyError, HierarchyResult};

use super::{DisjointnessConstraints, HierarchyIndex};

/// Incrementally assembles a [`Taxonomy`].
#[derive(Debug, Default)]
pub struct TaxonomyBuilder {
    graph: DiGraph<ClassId, ()>,
    classes: Vec<ClassMeta>,
    by_uri: HashMap<String, ClassId>,
    disjoint: DisjointnessConstraints,
}

impl TaxonomyBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class, returning its handle.
    ///
    /// Registering the same URI twice returns the existing handle.
    pub fn add_class(&mut self, uri: impl Into<String>, ontology: Ontology) -> ClassId {
        let uri = uri.into();
        if let Some(&id) = self.by_uri.get(&uri) {
            return id;
        }
        let id = ClassId::new(self.classes.len() as u32);
        let node = self.graph.add_node(id);
        debug_assert_eq!(node.index(), id.index());
        self.by_uri.insert(uri.clone(), id);
        self.classes.push(ClassMeta::new(id, uri, ontology));
        id
    }

    /// Look up a registered class by URI.
    pub fn lookup(&self, uri: &str) -> Option<ClassId> {
        self.by_uri.get(uri).copied()
    }

    /// Set the display label of a class.
    pub fn set_label(&mut self, class: ClassId, label: impl Into<String>) -> HierarchyResult<()> {
        self.meta_mut(class)?.label = label.into();
        Ok(())
    }

    /// Mark a class as deprecated.
    pub fn set_deprecated(&mut self, class: ClassId, deprecated: bool) -> HierarchyResult<()> {
        self.meta_mut(class)?.deprecated = deprecated;
        Ok(())
    }

    /// Declare `sub ⊑ sup`.
    pub fn add_subclass(&mut self, sub: ClassId, sup: ClassId) -> HierarchyResult<()> {
        let (s, p) = (self.node(sub)?, self.node(sup)?);
        if s != p && self.graph.find_edge(s, p).is_none() {
            self.graph.add_edge(s, p, ());
        }
        Ok(())
    }

    /// Declare `a ≡ b` (mutual subclasses).
    pub fn add_equivalence(&mut self, a: ClassId, b: ClassId) -> HierarchyResult<()> {
        self.add_subclass(a, b)?;
        self.add_subclass(b, a)
    }

    /// Declare `a` and `b` disjoint.
    pub fn add_disjoint(&mut self, a: ClassId, b: ClassId) -> HierarchyResult<()> {
        self.node(a)?;
        self.node(b)?;
        if a == b {
            return Err(HierarchyError::SelfDisjoint { class: a });
        }
        self.disjoint.declare_disjoint(a, b);
        Ok(())
    }

    /// Compute closures and freeze the taxonomy.
    pub fn build(self) -> Taxonomy {
        let n = self.classes.len();
        let mut direct_supers = Vec::with_capacity(n);
        let mut direct_subs = Vec::with_capacity(n);
        let mut all_supers = Vec::with_capacity(n);
        let mut all_subs = Vec::with_capacity(n);

        let reversed = Reversed(&self.graph);
        for node in self.graph.node_indices() {
            direct_supers.push(self.neighbors(node, Direction::Outgoing));
            direct_subs.push(self.neighbors(node, Direction::Incoming));

            let mut ups = Vec::new();
            let mut bfs = Bfs::new(&self.graph, node);
            while let Some(nx) = bfs.next(&self.graph) {
                if nx != node {
                    ups.push(self.graph[nx]);
                }
            }
            ups.sort_unstable();
            all_supers.push(ups);

            let mut downs = Vec::new();
            let mut bfs = Bfs::new(reversed, node);
            while let Some(nx) = bfs.next(reversed) {
                if nx != node {
                    downs.push(self.graph[nx]);
                }
            }
            downs.sort_unstable();
            all_subs.push(downs);
        }

        tracing::debug!(
            classes = n,
            subsumptions = self.graph.edge_count(),
            disjoint_clauses = self.disjoint.len(),
            "taxonomy closure computed"
        );

        Taxonomy {
            classes: self.classes,
            by_uri: self.by_uri,
            direct_supers,
            direct_subs,
            all_supers,
            all_subs,
            disjoint: self.disjoint,
        }
    }

    fn node(&self, class: ClassId) -> HierarchyResult<NodeIndex> {
        if class.index() < self.classes.len() {
            Ok(NodeIndex::new(class.index()))
        } else {
            Err(HierarchyError::UnknownClass { class })
        }
    }

    fn meta_mut(&mut self, class: ClassId) -> HierarchyResult<&mut ClassMeta> {
        self.classes
            .get_mut(class.index())
            .ok_or(HierarchyError::UnknownClass { class })
    }

    fn neighbors(&self, node: NodeIndex, dir: Direction) -> Vec<ClassId> {
        let mut out: Vec<ClassId> = self
            .graph
            .neighbors_directed(node, dir)
            .filter(|&nx| nx != node)
            .map(|nx| self.graph[nx])
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}

/// Frozen class hierarchy of both ontologies with precomputed closures.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    classes: Vec<ClassMeta>,
    by_uri: HashMap<String, ClassId>,
    direct_supers: Vec<Vec<ClassId>>,
    direct_subs: Vec<Vec<ClassId>>,
    all_supers: Vec<Vec<ClassId>>,
    all_subs: Vec<Vec<ClassId>>,
    disjoint: DisjointnessConstraints,
}

impl Taxonomy {
    /// Start building a taxonomy.
    pub fn builder() -> TaxonomyBuilder {
        TaxonomyBuilder::new()
    }

    /// Metadata of a class.
    pub fn meta(&self, class: ClassId) -> Option<&ClassMeta> {
        self.classes.get(class.index())
    }

    /// Look up a class by URI.
    pub fn lookup(&self, uri: &str) -> HierarchyResult<ClassId> {
        self.by_uri
            .get(uri)
            .copied()
            .ok_or_else(|| HierarchyError::UnknownUri { uri: uri.to_string() })
    }

    /// All class metadata in handle order.
    pub fn classes(&self) -> &[ClassMeta] {
        &self.classes
    }

    /// Number of classes across both ontologies.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the taxonomy has no classes.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Number of classes from one side of the alignment.
    pub fn count_in(&self, ontology: Ontology) -> usize {
        self.classes.iter().filter(|c| c.ontology == ontology).count()
    }

    /// The declared disjointness clauses.
    pub fn disjointness(&self) -> &DisjointnessConstraints {
        &self.disjoint
    }

    fn slot(table: &[Vec<ClassId>], class: ClassId) -> &[ClassId] {
        table
            .get(class.index())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

impl HierarchyIndex for Taxonomy {
    fn contains(&self, class: ClassId) -> bool {
        class.index() < self.classes.len()
    }

    fn super_classes(&self, class: ClassId, transitive: bool) -> &[ClassId] {
        if transitive {
            Self::slot(&self.all_supers, class)
        } else {
            Self::slot(&self.direct_supers, class)
        }
    }

    fn sub_classes(&self, class: ClassId, transitive: bool) -> &[ClassId] {
        if transitive {
            Self::slot(&self.all_subs, class)
        } else {
            Self::slot(&self.direct_subs, class)
        }
    }

    fn disjoint_classes(&self, class: ClassId) -> &[ClassId] {
        self.disjoint.partners_of(class)
    }

    fn classes_with_disjoint(&self) -> Vec<ClassId> {
        self.disjoint.classes()
    }

    fn is_deprecated(&self, class: ClassId) -> bool {
        self.meta(class).is_some_and(|m| m.deprecated)
    }

    fn class_name(&self, class: ClassId) -> String {
        self.meta(class)
            .map(|m| m.label.clone())
            .unwrap_or_else(|| class.to_string())
    }
}
