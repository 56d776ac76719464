//! Arbiters decide whether a mapping selected for removal is really wrong.

use std::collections::{HashMap, HashSet};
use std::io::{BufRead, Write};

use crate::class::ClassId;
use crate::error::{RepairError, RepairResult};
use crate::mapping::Mapping;

/// Decision on a mapping selected for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Keep the mapping and never select it again.
    Correct,
    /// Proceed with the removal.
    Incorrect,
}

/// Reviews mappings during interactive repair.
pub trait Arbiter {
    fn review(&mut self, index: usize, mapping: &Mapping) -> RepairResult<Verdict>;
}

/// Answers from a reference alignment: pairs in the reference are correct.
#[derive(Debug, Clone, Default)]
pub struct ReferenceOracle {
    pairs: HashSet<(ClassId, ClassId)>,
    asked: usize,
}

impl ReferenceOracle {
    pub fn new(pairs: impl IntoIterator<Item = (ClassId, ClassId)>) -> Self {
        Self {
            pairs: pairs.into_iter().collect(),
            asked: 0,
        }
    }

    /// Whether the pair is in the reference, in either orientation.
    pub fn contains(&self, a: ClassId, b: ClassId) -> bool {
        self.pairs.contains(&(a, b)) || self.pairs.contains(&(b, a))
    }

    /// Number of reviews answered so far.
    pub fn asked(&self) -> usize {
        self.asked
    }
}

impl Arbiter for ReferenceOracle {
    fn review(&mut self, _index: usize, mapping: &Mapping) -> RepairResult<Verdict> {
        self.asked += 1;
        Ok(if self.contains(mapping.source, mapping.target) {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        })
    }
}

/// Asks a person over a line-oriented reader/writer pair.
///
/// An answer starting with `y` keeps the mapping; anything else, including end
/// of input, removes it.
pub struct PromptArbiter<R, W> {
    input: R,
    output: W,
    names: HashMap<ClassId, String>,
}

impl<R: BufRead, W: Write> PromptArbiter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            names: HashMap::new(),
        }
    }

    /// Display names used in prompts instead of raw handles.
    pub fn with_names(mut self, names: impl IntoIterator<Item = (ClassId, String)>) -> Self {
        self.names.extend(names);
        self
    }

    fn name(&self, class: ClassId) -> String {
        self.names
            .get(&class)
            .cloned()
            .unwrap_or_else(|| class.to_string())
    }

    /// Give back the reader and writer.
    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl<R: BufRead, W: Write> Arbiter for PromptArbiter<R, W> {
    fn review(&mut self, index: usize, mapping: &Mapping) -> RepairResult<Verdict> {
        let prompt = format!(
            "[{index}] {} -> {} ({:.2}) keep? [y/N] ",
            self.name(mapping.source),
            self.name(mapping.target),
            mapping.similarity
        );
        let io = |source| RepairError::Prompt { source };
        self.output.write_all(prompt.as_bytes()).map_err(io)?;
        self.output.flush().map_err(io)?;

        let mut line = String::new();
        self.input.read_line(&mut line).map_err(io)?;
        let answer = line.trim().to_ascii_lowercase();
        Ok(if answer.starts_with('y') {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        })
    }
}
