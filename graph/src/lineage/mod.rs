//! Branch discovery: which branch owns which commits, and in what order
//! branches have to be laid out.

pub mod discovery;
pub mod merge_message;
pub mod order;

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::core::CommitId;

pub use discovery::discover;
pub use merge_message::{merged_branch_name, synthetic_name};

/// Stable handle of a branch inside one [`Lineage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchId(pub(crate) usize);

impl BranchId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Where a branch entity came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchOrigin {
    /// A live branch ref
    Ref,
    /// Reconstructed from the non-first parent of a merge commit
    Virtual { merge: CommitId },
    /// Stand-in mainline for a history without any branch ref
    Implicit,
}

#[derive(Debug, Clone)]
pub struct BranchNode {
    pub name: String,
    pub head: CommitId,
    pub origin: BranchOrigin,
    /// First already-owned commit met while claiming
    pub base_commit: Option<CommitId>,
    pub base_branch: Option<BranchId>,
    /// Claimed commits, newest first
    pub exclusive: Vec<CommitId>,
    /// Everything reachable from the head, in walk order
    pub reach: Vec<CommitId>,
    /// Newest merge commit that brought this branch in
    pub merged_into: Option<CommitId>,
}

impl BranchNode {
    fn new(name: String, head: CommitId, origin: BranchOrigin) -> Self {
        Self {
            name,
            head,
            origin,
            base_commit: None,
            base_branch: None,
            exclusive: Vec::new(),
            reach: Vec::new(),
            merged_into: None,
        }
    }

    /// Still named by a live ref
    pub fn is_active(&self) -> bool {
        self.origin == BranchOrigin::Ref
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self.origin, BranchOrigin::Virtual { .. })
    }

    /// Oldest exclusive commit
    pub fn created_at(&self) -> Option<CommitId> {
        self.exclusive.last().copied()
    }
}

/// Branch entities plus the commit <-> branch relations between them
#[derive(Debug, Clone)]
pub struct Lineage {
    branches: Vec<BranchNode>,
    by_name: HashMap<String, BranchId>,
    mainline: Option<BranchId>,
    mainline_name: String,
    /// Claiming branch of each commit, indexed by `CommitId`
    owner: Vec<Option<BranchId>>,
    /// Every branch reaching each commit, ascending `BranchId`
    members: Vec<SmallVec<[BranchId; 4]>>,
    /// Bases before the branches built on them
    order: Vec<BranchId>,
}

impl Lineage {
    pub fn branch(&self, id: BranchId) -> &BranchNode {
        &self.branches[id.0]
    }

    pub fn branches(&self) -> impl Iterator<Item = (BranchId, &BranchNode)> + '_ {
        self.branches
            .iter()
            .enumerate()
            .map(|(idx, branch)| (BranchId(idx), branch))
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<BranchId> {
        self.by_name.get(name).copied()
    }

    pub fn mainline(&self) -> Option<BranchId> {
        self.mainline
    }

    /// Name of the mainline, even when no branch stands behind it
    pub fn mainline_name(&self) -> &str {
        &self.mainline_name
    }

    pub fn owner(&self, commit: CommitId) -> Option<BranchId> {
        self.owner[commit.index()]
    }

    pub fn members(&self, commit: CommitId) -> &[BranchId] {
        &self.members[commit.index()]
    }

    /// Topological branch order: a branch never precedes its base
    pub fn order(&self) -> &[BranchId] {
        &self.order
    }

    pub fn name(&self, id: BranchId) -> &str {
        &self.branches[id.0].name
    }
}

impl Lineage {
    /// Branch deciding the color of a commit under branch-first layout.
    ///
    /// A commit reached by a single branch belongs to it; otherwise its
    /// claiming branch; otherwise the leftmost branch reaching it.
    pub fn resolve_primary(&self, commit: CommitId, branch_lanes: &[usize]) -> Option<BranchId> {
        let members = self.members(commit);
        if let [only] = members {
            return Some(*only);
        }
        if let Some(owner) = self.owner(commit) {
            return Some(owner);
        }
        members
            .iter()
            .copied()
            .min_by_key(|branch| (branch_lanes[branch.0], branch.0))
    }
}
