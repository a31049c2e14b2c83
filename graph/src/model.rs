//! Output of a layout computation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::Commit;
use crate::layout::LaneIdx;
use crate::options::StrategyKind;

/// A laid-out branch, real or reconstructed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub name: String,
    pub head: String,
    pub base_commit: Option<String>,
    pub base_branch: Option<String>,
    /// Commits owned by this branch alone, newest first
    pub exclusive_commits: Vec<String>,
    /// Everything reachable from the head
    pub all_commits: Vec<String>,
    /// Oldest exclusive commit
    pub created_at: Option<String>,
    /// Still named by a live ref
    pub is_active: bool,
    /// Reconstructed from a merge commit
    pub is_virtual: bool,
    pub merged_into: Option<String>,
    pub merged_at: Option<DateTime<Utc>>,
    pub lane: LaneIdx,
    pub color: String,
}

/// A commit with everything a renderer needs to draw it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedCommit {
    #[serde(flatten)]
    pub commit: Commit,
    /// Position in newest-first display order
    pub row: usize,
    pub belongs_to_branches: Vec<String>,
    pub primary_branch: String,
    pub lane: LaneIdx,
    pub color: String,
    pub is_merge_commit: bool,
    /// Branches brought in by this commit, by parent index
    pub merged_branches: Vec<String>,
}

/// Connector from a merged parent's lane into its merge commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergePoint {
    pub merge_commit: String,
    pub parent_commit: String,
    pub parent_index: usize,
    pub merged_branch: String,
    pub target_branch: String,
    pub source_lane: LaneIdx,
    pub target_lane: LaneIdx,
}

/// Complete layout for one history; never mutated after it is returned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchGraph {
    pub strategy: StrategyKind,
    pub mainline: String,
    pub branches: BTreeMap<String, Branch>,
    pub commits: BTreeMap<String, EnrichedCommit>,
    pub commit_to_branches: BTreeMap<String, Vec<String>>,
    /// Bases before the branches forked from them
    pub branch_order: Vec<String>,
    pub merge_points: Vec<MergePoint>,
    /// Commit hashes newest first
    pub rows: Vec<String>,
    pub lane_count: usize,
}

impl BranchGraph {
    pub fn commit(&self, hash: &str) -> Option<&EnrichedCommit> {
        self.commits.get(hash)
    }

    pub fn branch(&self, name: &str) -> Option<&Branch> {
        self.branches.get(name)
    }

    /// Commits in display order
    pub fn iter_rows(&self) -> impl Iterator<Item = &EnrichedCommit> + '_ {
        self.rows.iter().filter_map(|hash| self.commits.get(hash))
    }

    /// Branches in layout order
    pub fn iter_branches(&self) -> impl Iterator<Item = &Branch> + '_ {
        self.branch_order
            .iter()
            .filter_map(|name| self.branches.get(name))
    }

    pub fn merge_points_at<'a>(&'a self, hash: &'a str) -> impl Iterator<Item = &'a MergePoint> + 'a {
        self.merge_points
            .iter()
            .filter(move |point| point.merge_commit == hash)
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}
