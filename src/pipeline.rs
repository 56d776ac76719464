//! Filter/flag stage: run repair strategies in sequence over one mapping set.

use serde::{Deserialize, Serialize};

use crate::config::RepairConfig;
use crate::error::OntoResult;
use crate::hierarchy::HierarchyIndex;
use crate::mapping::MappingSet;
use crate::repair::{
    CardinalityRepairer, CoherenceRepairer, ObsoleteRepairer, RemovalAction, RepairReport,
    Repairer,
};

/// Whether the stage removes mappings or only flags them for review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    Remove,
    Flag,
}

impl FilterMode {
    pub fn removal_action(self) -> RemovalAction {
        match self {
            FilterMode::Remove => RemovalAction::MarkIncorrect,
            FilterMode::Flag => RemovalAction::Flag,
        }
    }
}

/// Built-in strategies, selectable by name in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Obsolete,
    Coherence,
    Cardinality,
}

/// Per-strategy results of one stage run.
#[derive(Debug, Clone, Default)]
pub struct StageReport {
    pub runs: Vec<(String, RepairReport)>,
}

impl StageReport {
    /// All runs folded into one report.
    pub fn total(&self) -> RepairReport {
        let mut total = RepairReport::default();
        for (_, r) in &self.runs {
            total.absorb(r.clone());
        }
        total
    }
}

/// An ordered list of strategies applied with one filter mode.
pub struct RepairStage {
    mode: FilterMode,
    strategies: Vec<Box<dyn Repairer>>,
}

impl RepairStage {
    pub fn new(mode: FilterMode) -> Self {
        Self {
            mode,
            strategies: Vec::new(),
        }
    }

    /// Build the stage a config file describes.
    pub fn from_config(config: &RepairConfig) -> Self {
        let mut stage = Self::new(config.mode);
        for strategy in &config.strategies {
            let repairer: Box<dyn Repairer> = match strategy {
                Strategy::Obsolete => Box::new(ObsoleteRepairer::new()),
                Strategy::Coherence => Box::new(CoherenceRepairer::new(config.to_builder_config())),
                Strategy::Cardinality => Box::new(CardinalityRepairer::new()),
            };
            stage.strategies.push(repairer);
        }
        stage
    }

    /// Append a strategy.
    pub fn with(mut self, repairer: Box<dyn Repairer>) -> Self {
        self.strategies.push(repairer);
        self
    }

    /// Replace the strategy with the same name, or append it.
    pub fn replace(mut self, repairer: Box<dyn Repairer>) -> Self {
        let existing = self
            .strategies
            .iter()
            .position(|s| s.name() == repairer.name());
        match existing {
            Some(pos) => self.strategies[pos] = repairer,
            None => self.strategies.push(repairer),
        }
        self
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Strategy names in run order.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run every strategy in order.
    pub fn run(
        &mut self,
        mappings: &mut MappingSet,
        hierarchy: &dyn HierarchyIndex,
    ) -> OntoResult<StageReport> {
        let mode = self.mode;
        let action = mode.removal_action();
        let mut report = StageReport::default();
        for strategy in &mut self.strategies {
            let before = mappings.active_len();
            let run = strategy.repair(mappings, hierarchy, action)?;
            tracing::info!(
                strategy = strategy.name(),
                mode = ?mode,
                before,
                after = mappings.active_len(),
                affected = run.removed_count,
                "repair strategy applied"
            );
            report.runs.push((strategy.name().to_string(), run));
        }
        Ok(report)
    }
}
