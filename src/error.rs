//! Rich diagnostic error types for onto-repair.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so callers know which input was
//! inconsistent and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

use crate::class::ClassId;
use crate::config::ConfigError;
use crate::problem::ProblemError;

/// Top-level error type for onto-repair.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum OntoError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Repair(#[from] RepairError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Problem(#[from] ProblemError),
}

// ---------------------------------------------------------------------------
// Hierarchy errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum HierarchyError {
    #[error("unknown class: {class}")]
    #[diagnostic(
        code(onto::hierarchy::unknown_class),
        help(
            "The class handle was not allocated by this taxonomy. \
             Register it with `TaxonomyBuilder::add_class` before relating it."
        )
    )]
    UnknownClass { class: ClassId },

    #[error("no class with URI \"{uri}\"")]
    #[diagnostic(
        code(onto::hierarchy::unknown_uri),
        help("Check the URI spelling, or declare the class before referencing it.")
    )]
    UnknownUri { uri: String },

    #[error("class {class} is declared disjoint with itself")]
    #[diagnostic(
        code(onto::hierarchy::self_disjoint),
        help(
            "A class disjoint with itself is unsatisfiable before any mapping is added. \
             Remove the declaration from the ontology."
        )
    )]
    SelfDisjoint { class: ClassId },
}

// ---------------------------------------------------------------------------
// Mapping errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum MappingError {
    #[error("mapping index {index} out of range (set holds {len} mappings)")]
    #[diagnostic(
        code(onto::mapping::index_out_of_range),
        help("Mapping indices are positions in the set they were created in.")
    )]
    IndexOutOfRange { index: usize, len: usize },

    #[error("mapping {index} was already removed")]
    #[diagnostic(
        code(onto::mapping::removed),
        help("Removed mappings keep their index slot but cannot be modified again.")
    )]
    Removed { index: usize },
}

// ---------------------------------------------------------------------------
// Conflict-set errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConflictError {
    #[error("mapping {mapping} references {class}, which the hierarchy index does not know")]
    #[diagnostic(
        code(onto::conflict::unknown_class),
        help(
            "Every class of an active mapping must exist in the hierarchy index. \
             Load both ontologies into the same index before building conflict sets."
        )
    )]
    UnknownClass { class: ClassId, mapping: usize },

    #[error("ancestor expansion from {origin} did not converge within {cap} rounds")]
    #[diagnostic(
        code(onto::conflict::fixpoint_diverged),
        help(
            "Each round adds one mapping to every path, so the expansion must stop \
             after as many rounds as there are active mappings. This is a bug; \
             please file a report with the input that triggered it."
        )
    )]
    FixpointDiverged { origin: ClassId, cap: usize },
}

// ---------------------------------------------------------------------------
// Repair errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RepairError {
    #[error("conflict set {conflict} refers to mapping {index}, which is not in the set")]
    #[diagnostic(
        code(onto::repair::unknown_mapping),
        help("Conflict sets must be built from the same mapping set that is being repaired.")
    )]
    UnknownMapping { conflict: usize, index: usize },

    #[error("failed to read a verdict from the reviewer")]
    #[diagnostic(
        code(onto::repair::prompt),
        help("Interactive repair reads answers from standard input; make sure it is a terminal.")
    )]
    Prompt {
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Mapping(#[from] MappingError),
}

/// Convenience result type for onto-repair operations.
pub type OntoResult<T> = std::result::Result<T, OntoError>;

/// Result type for hierarchy operations.
pub type HierarchyResult<T> = std::result::Result<T, HierarchyError>;

/// Result type for mapping-set operations.
pub type MappingResult<T> = std::result::Result<T, MappingError>;

/// Result type for conflict-set construction.
pub type ConflictResult<T> = std::result::Result<T, ConflictError>;

/// Result type for the greedy repair loop.
pub type RepairResult<T> = std::result::Result<T, RepairError>;
