//! Commit-graph layout engine.
//!
//! Takes parsed commits and refs and computes a lane and color per commit,
//! the branch lineage behind them and the merge connectors between lanes.
//! The engine performs no I/O; [`git_backend`] is an optional loader.

pub mod core;
pub mod enrich;
pub mod engine;
pub mod error;
pub mod git_backend;
pub mod layout;
pub mod lineage;
pub mod model;
pub mod options;

#[cfg(test)]
pub(crate) mod test_support;

pub use core::{Commit, CommitDag, CommitId, DagStats, Ref, RefKind};
pub use engine::{compute_graph, GraphEngine};
pub use error::GraphError;
pub use git_backend::GitWalker;
pub use layout::{BranchFirst, LaneIdx, LayoutStrategy, RowByRow};
pub use lineage::{BranchId, Lineage};
pub use model::{Branch, BranchGraph, EnrichedCommit, MergePoint};
pub use options::{LayoutOptions, StrategyKind};
