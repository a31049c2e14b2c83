use super::dag::CommitId;

/// How a child reaches its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildKind {
    /// The parent is the child's first (mainline) parent
    Branch,
    /// The parent was merged in by the child (parent index >= 1)
    Merge,
}

/// A child edge, stored on the parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildLink {
    pub kind: ChildKind,
    pub child: CommitId,
}

impl ChildLink {
    pub fn new(kind: ChildKind, child: CommitId) -> Self {
        Self { kind, child }
    }

    pub fn for_parent_index(index: usize, child: CommitId) -> Self {
        let kind = if index == 0 {
            ChildKind::Branch
        } else {
            ChildKind::Merge
        };
        Self { kind, child }
    }

    pub fn is_branch(&self) -> bool {
        self.kind == ChildKind::Branch
    }

    pub fn is_merge(&self) -> bool {
        self.kind == ChildKind::Merge
    }
}
