//! Lane assignment strategies.
//!
//! Both strategies consume the same [`CommitDag`] and [`Lineage`] and hand
//! back a [`LaneAssignment`]; enrichment turns that into the final graph.

pub mod branch_first;
pub mod lane_pool;
pub mod row_by_row;

use crate::core::CommitDag;
use crate::lineage::{BranchId, Lineage};
use crate::options::StrategyKind;

pub use branch_first::BranchFirst;
pub use lane_pool::{LanePool, RowSpan};
pub use row_by_row::{LaneSlots, RowByRow};

/// A lane represents a vertical column in the graph
pub type LaneIdx = usize;

/// How enrichment should pick each commit's primary branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimarySource {
    /// Ownership first, then the leftmost reaching branch
    Ownership,
    /// Per-commit labels chosen by the strategy, indexed by `CommitId`
    Labels(Vec<Option<BranchId>>),
}

/// Lanes chosen by a strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneAssignment {
    /// Indexed by `CommitId`
    pub commit_lanes: Vec<LaneIdx>,
    /// Indexed by `BranchId`
    pub branch_lanes: Vec<LaneIdx>,
    pub primary: PrimarySource,
}

impl LaneAssignment {
    /// Number of lanes in use
    pub fn lane_count(&self) -> usize {
        self.commit_lanes
            .iter()
            .chain(self.branch_lanes.iter())
            .max()
            .map_or(0, |max| max + 1)
    }
}

/// One way of turning commits and branches into lanes
pub trait LayoutStrategy {
    fn kind(&self) -> StrategyKind;

    fn assign(&self, dag: &CommitDag, lineage: &Lineage) -> LaneAssignment;
}

/// The strategy implementation for a configured kind
pub fn strategy_for(kind: StrategyKind) -> Box<dyn LayoutStrategy> {
    match kind {
        StrategyKind::BranchFirst => Box::new(BranchFirst),
        StrategyKind::RowByRow => Box::new(RowByRow),
    }
}
