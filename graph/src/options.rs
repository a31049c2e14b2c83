use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// Which lane assignment strategy lays out the graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Branches are the unit of layout; commits inherit their branch's lane
    #[default]
    BranchFirst,
    /// Commits are laid out one row at a time; branches only label them
    RowByRow,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::BranchFirst => "branch-first",
            StrategyKind::RowByRow => "row-by-row",
        }
    }
}

/// Tunables for one layout computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct LayoutOptions {
    pub strategy: StrategyKind,
    /// Explicit default branch; wins over `mainline_candidates`
    pub mainline: Option<String>,
    /// Names tried in order when `mainline` is unset
    pub mainline_candidates: Vec<String>,
    /// Mainline name used when the history carries no branch ref at all
    pub fallback_mainline: String,
    /// Lane colors, indexed by `lane % palette.len()`
    pub palette: Vec<String>,
    /// Prefix of the synthetic name given to unrecognised merged branches
    pub synthetic_prefix: String,
}

pub const DEFAULT_PALETTE: [&str; 10] = [
    "#15a0bf", "#0669f7", "#8e00c2", "#c517b6", "#d90171", "#cd0101", "#f25d2e", "#f2ca33",
    "#7bd938", "#2ece9d",
];

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            mainline: None,
            mainline_candidates: ["main", "master", "trunk", "develop"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fallback_mainline: "main".to_string(),
            palette: DEFAULT_PALETTE.iter().map(|s| s.to_string()).collect(),
            synthetic_prefix: "merged".to_string(),
        }
    }
}

impl LayoutOptions {
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_mainline(mut self, name: impl Into<String>) -> Self {
        self.mainline = Some(name.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.palette.is_empty() {
            return Err(GraphError::EmptyPalette);
        }
        Ok(())
    }

    /// Color of a lane
    pub fn color_for_lane(&self, lane: usize) -> &str {
        &self.palette[lane % self.palette.len()]
    }
}
