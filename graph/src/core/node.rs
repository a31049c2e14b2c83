use smallvec::SmallVec;

use super::commit::Commit;
use super::dag::CommitId;
use super::edge::ChildLink;

/// A commit in the arena, together with its resolved parents and children
#[derive(Debug, Clone)]
pub struct CommitNode {
    pub commit: Commit,
    /// Parents by index; `None` for a parent outside the loaded history
    pub parents: SmallVec<[Option<CommitId>; 2]>,
    /// Every commit listing this one as a parent
    pub children: SmallVec<[ChildLink; 2]>,
}

impl CommitNode {
    pub(crate) fn new(commit: Commit) -> Self {
        Self {
            commit,
            parents: SmallVec::new(),
            children: SmallVec::new(),
        }
    }

    pub fn hash(&self) -> &str {
        &self.commit.hash
    }

    pub fn first_parent(&self) -> Option<CommitId> {
        self.parents.first().copied().flatten()
    }

    /// Parents merged in by this commit that exist in the arena, with their index
    pub fn merged_parents(&self) -> impl Iterator<Item = (usize, CommitId)> + '_ {
        self.parents
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(idx, parent)| parent.map(|id| (idx, id)))
    }

    pub fn present_parents(&self) -> impl Iterator<Item = CommitId> + '_ {
        self.parents.iter().filter_map(|parent| *parent)
    }

    /// Children that continue this commit's line
    pub fn branch_children(&self) -> impl Iterator<Item = CommitId> + '_ {
        self.children
            .iter()
            .filter(|link| link.is_branch())
            .map(|link| link.child)
    }

    /// Children that merged this commit in
    pub fn merge_children(&self) -> impl Iterator<Item = CommitId> + '_ {
        self.children
            .iter()
            .filter(|link| link.is_merge())
            .map(|link| link.child)
    }

    /// Nothing continues or merges this commit
    pub fn is_head(&self) -> bool {
        self.children.is_empty()
    }

    /// Merged somewhere but never continued
    pub fn is_merged_tip(&self) -> bool {
        !self.children.is_empty() && self.children.iter().all(|link| link.is_merge())
    }

    pub fn is_merge(&self) -> bool {
        self.commit.is_merge()
    }
}
