//! Repair problems stored as JSON.
//!
//! A problem file lists the classes of both ontologies with their is-a,
//! equivalence and disjointness edges, the candidate mappings, and optionally
//! a reference alignment used to answer interactive reviews.
//!
//! ```json
//! {
//!   "classes": [
//!     { "uri": "http://s#A", "ontology": "source", "disjoint": ["http://s#B"] },
//!     { "uri": "http://s#B", "ontology": "source" },
//!     { "uri": "http://t#X", "ontology": "target" }
//!   ],
//!   "mappings": [
//!     { "source": "http://s#A", "target": "http://t#X", "similarity": 0.9 }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::class::{ClassId, Ontology};
use crate::error::HierarchyError;
use crate::hierarchy::Taxonomy;
use crate::mapping::{Mapping, MappingSet, MappingStatus};
use crate::repair::ReferenceOracle;

/// Errors from loading a problem file.
#[derive(Debug, Error, Diagnostic)]
pub enum ProblemError {
    #[error("failed to read problem file: {path}")]
    #[diagnostic(
        code(onto::problem::read),
        help("Ensure the problem file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse problem file: {path}: {message}")]
    #[diagnostic(
        code(onto::problem::parse),
        help("A problem file is a JSON object with `classes`, `mappings` and optional `reference` arrays.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write {path}")]
    #[diagnostic(
        code(onto::problem::write),
        help("Ensure you have write permissions to the target directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context} refers to undeclared class \"{uri}\"")]
    #[diagnostic(
        code(onto::problem::unknown_class),
        help("Every URI used in a relation or mapping must appear in the `classes` array.")
    )]
    UnknownClass { uri: String, context: String },

    #[error("class \"{uri}\" is declared more than once")]
    #[diagnostic(
        code(onto::problem::duplicate_uri),
        help("Merge the duplicate entries into one class declaration.")
    )]
    DuplicateUri { uri: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Hierarchy(#[from] HierarchyError),
}

pub type ProblemResult<T> = std::result::Result<T, ProblemError>;

/// One class declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSpec {
    pub uri: String,
    #[serde(default)]
    pub ontology: Ontology,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Direct superclasses, by URI.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub equivalents: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disjoint: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

impl ClassSpec {
    pub fn new(uri: impl Into<String>, ontology: Ontology) -> Self {
        Self {
            uri: uri.into(),
            ontology,
            label: None,
            parents: Vec::new(),
            equivalents: Vec::new(),
            disjoint: Vec::new(),
            deprecated: false,
        }
    }
}

/// One candidate mapping, by class URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingSpec {
    pub source: String,
    pub target: String,
    pub similarity: f64,
    #[serde(default)]
    pub status: MappingStatus,
}

/// A complete repair problem as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepairProblem {
    pub classes: Vec<ClassSpec>,
    #[serde(default)]
    pub mappings: Vec<MappingSpec>,
    /// Known-correct `(source, target)` pairs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference: Vec<(String, String)>,
}

/// A problem resolved into handles.
#[derive(Debug)]
pub struct LoadedProblem {
    pub taxonomy: Taxonomy,
    pub mappings: MappingSet,
    pub reference: Vec<(ClassId, ClassId)>,
}

impl LoadedProblem {
    /// An oracle answering from the reference alignment.
    pub fn oracle(&self) -> ReferenceOracle {
        ReferenceOracle::new(self.reference.iter().copied())
    }
}

impl RepairProblem {
    /// Parse JSON text; `origin` names the source in errors.
    pub fn from_json(content: &str, origin: &str) -> ProblemResult<Self> {
        serde_json::from_str(content).map_err(|e| ProblemError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> ProblemResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ProblemError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&content, &path.display().to_string())
    }

    /// Save as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> ProblemResult<()> {
        write_json(path, self)
    }

    /// Resolve URIs and build the taxonomy and mapping set.
    pub fn resolve(&self) -> ProblemResult<LoadedProblem> {
        let mut builder = Taxonomy::builder();
        let mut seen = HashSet::new();
        for class in &self.classes {
            if !seen.insert(class.uri.as_str()) {
                return Err(ProblemError::DuplicateUri {
                    uri: class.uri.clone(),
                });
            }
            let id = builder.add_class(class.uri.as_str(), class.ontology);
            if let Some(label) = &class.label {
                builder.set_label(id, label.as_str())?;
            }
            if class.deprecated {
                builder.set_deprecated(id, true)?;
            }
        }

        let find = |uri: &str, context: &str| {
            builder.lookup(uri).ok_or_else(|| ProblemError::UnknownClass {
                uri: uri.to_string(),
                context: context.to_string(),
            })
        };
        let mut subsumptions = Vec::new();
        let mut equivalences = Vec::new();
        let mut disjoint = Vec::new();
        for class in &self.classes {
            let context = format!("class \"{}\"", class.uri);
            let id = find(&class.uri, &context)?;
            for p in &class.parents {
                subsumptions.push((id, find(p, &context)?));
            }
            for e in &class.equivalents {
                equivalences.push((id, find(e, &context)?));
            }
            for d in &class.disjoint {
                disjoint.push((id, find(d, &context)?));
            }
        }

        let mut mappings = MappingSet::new();
        for (n, m) in self.mappings.iter().enumerate() {
            let context = format!("mapping {n}");
            let mapping = Mapping::new(
                find(&m.source, &context)?,
                find(&m.target, &context)?,
                m.similarity,
            )
            .with_status(m.status);
            mappings.add(mapping);
        }

        let mut reference = Vec::with_capacity(self.reference.len());
        for (a, b) in &self.reference {
            reference.push((find(a, "reference")?, find(b, "reference")?));
        }

        for (sub, sup) in subsumptions {
            builder.add_subclass(sub, sup)?;
        }
        for (a, b) in equivalences {
            builder.add_equivalence(a, b)?;
        }
        for (a, b) in disjoint {
            builder.add_disjoint(a, b)?;
        }

        let taxonomy = builder.build();
        tracing::info!(
            classes = taxonomy.len(),
            mappings = mappings.len(),
            reference = reference.len(),
            "problem loaded"
        );
        Ok(LoadedProblem {
            taxonomy,
            mappings,
            reference,
        })
    }
}

/// Present mappings of a set, by class URI, in index order.
pub fn mapping_specs(taxonomy: &Taxonomy, mappings: &MappingSet) -> Vec<MappingSpec> {
    let uri = |c: ClassId| {
        taxonomy
            .meta(c)
            .map(|m| m.uri.clone())
            .unwrap_or_else(|| c.to_string())
    };
    mappings
        .iter()
        .map(|(_, m)| MappingSpec {
            source: uri(m.source),
            target: uri(m.target),
            similarity: m.similarity,
            status: m.status,
        })
        .collect()
}

/// Write any serializable value as pretty-printed JSON.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> ProblemResult<()> {
    let content = serde_json::to_string_pretty(value).map_err(|e| ProblemError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    std::fs::write(path, content).map_err(|e| ProblemError::Write {
        path: path.display().to_string(),
        source: e,
    })
}
