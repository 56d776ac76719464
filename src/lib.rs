// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # onto-repair
//!
//! Conflict detection and greedy repair for ontology alignments.
//!
//! Given two class taxonomies with disjointness declarations and a set of
//! candidate mappings between them, the crate finds every minimal set of
//! mappings whose joint presence makes the merged hierarchy violate a
//! disjointness clause, then removes mappings one at a time until no such set
//! survives.
//!
//! ## Architecture
//!
//! - **Hierarchy index** (`hierarchy`): closures over both taxonomies (petgraph)
//! - **Mapping set** (`mapping`): candidate mappings with stable indices
//! - **Conflict sets** (`conflict`): CheckList reduction, minimal-path expansion
//! - **Repair** (`repair`): greedy removal, arbiters, alternative strategies
//! - **Pipeline** (`pipeline`): filter/flag stage driven by `config`
//!
//! ## Library usage
//!
//! ```
//! use onto_repair::class::Ontology;
//! use onto_repair::conflict::build_conflict_sets;
//! use onto_repair::hierarchy::Taxonomy;
//! use onto_repair::mapping::MappingSet;
//! use onto_repair::repair::{repair, RepairPolicy};
//!
//! let mut b = Taxonomy::builder();
//! let heart = b.add_class("http://s#Heart", Ontology::Source);
//! let lung = b.add_class("http://s#Lung", Ontology::Source);
//! let organ = b.add_class("http://t#Organ", Ontology::Target);
//! b.add_disjoint(heart, lung).unwrap();
//! let taxonomy = b.build();
//!
//! let mut mappings = MappingSet::new();
//! mappings.insert(heart, organ, 0.9);
//! mappings.insert(lung, organ, 0.6);
//!
//! let conflicts = build_conflict_sets(&mappings, &taxonomy).unwrap();
//! let report = repair(&mut mappings, &conflicts, RepairPolicy::Automatic).unwrap();
//! assert_eq!(report.removed_indices, vec![1]);
//! ```

pub mod class;
pub mod config;
pub mod conflict;
pub mod error;
pub mod export;
pub mod hierarchy;
pub mod mapping;
pub mod pipeline;
pub mod problem;
pub mod repair;
