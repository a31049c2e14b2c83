use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use super::commit::Commit;
use super::edge::ChildLink;
use super::node::CommitNode;
use crate::error::GraphError;

/// Stable handle of a commit inside one [`CommitDag`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitId(pub(crate) usize);

impl CommitId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Directed acyclic graph of the loaded history.
///
/// Commits are kept in an arena in input order; all cross references
/// (parents, children, rows) are [`CommitId`]s into that arena.
#[derive(Debug, Clone)]
pub struct CommitDag {
    nodes: Vec<CommitNode>,
    index: HashMap<String, CommitId>,
    /// Newest first, every commit ahead of its parents
    rows: Vec<CommitId>,
    /// Row of each commit, indexed by `CommitId`
    row_of: Vec<usize>,
}

impl CommitDag {
    /// Index the commits and invert their parent pointers.
    ///
    /// Parent hashes missing from `commits` are kept as `None` and never
    /// produce children, so truncated histories load without error.
    pub fn build(commits: Vec<Commit>) -> Result<Self, GraphError> {
        let mut nodes = Vec::with_capacity(commits.len());
        let mut index = HashMap::with_capacity(commits.len());

        for commit in commits {
            let id = CommitId(nodes.len());
            if index.insert(commit.hash.clone(), id).is_some() {
                return Err(GraphError::DuplicateCommit(commit.hash));
            }
            nodes.push(CommitNode::new(commit));
        }

        for i in 0..nodes.len() {
            let parents: Vec<Option<CommitId>> = nodes[i]
                .commit
                .parents
                .iter()
                .map(|hash| index.get(hash).copied())
                .collect();

            for (parent_idx, parent) in parents.iter().enumerate() {
                if let Some(parent) = parent {
                    nodes[parent.0]
                        .children
                        .push(ChildLink::for_parent_index(parent_idx, CommitId(i)));
                }
            }
            nodes[i].parents = parents.into_iter().collect();
        }

        let rows = row_order(&nodes)?;
        let mut row_of = vec![0; nodes.len()];
        for (row, id) in rows.iter().enumerate() {
            row_of[id.0] = row;
        }

        Ok(Self {
            nodes,
            index,
            rows,
            row_of,
        })
    }

    pub fn node(&self, id: CommitId) -> &CommitNode {
        &self.nodes[id.0]
    }

    pub fn commit(&self, id: CommitId) -> &Commit {
        &self.nodes[id.0].commit
    }

    pub fn hash(&self, id: CommitId) -> &str {
        &self.nodes[id.0].commit.hash
    }

    /// Resolve a hash to its arena handle
    pub fn get(&self, hash: &str) -> Option<CommitId> {
        self.index.get(hash).copied()
    }

    /// All commits in input order
    pub fn ids(&self) -> impl Iterator<Item = CommitId> + '_ {
        (0..self.nodes.len()).map(CommitId)
    }

    /// Commits newest first, children always ahead of their parents
    pub fn rows(&self) -> &[CommitId] {
        &self.rows
    }

    pub fn row_of(&self, id: CommitId) -> usize {
        self.row_of[id.0]
    }

    /// Count of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walk first parents starting at (and including) `start`
    pub fn first_parent_chain(&self, start: CommitId) -> impl Iterator<Item = CommitId> + '_ {
        std::iter::successors(Some(start), move |&id| self.node(id).first_parent())
    }

    /// Get statistics about the DAG
    pub fn stats(&self) -> DagStats {
        let merge_commits = self.nodes.iter().filter(|n| n.is_merge()).count();
        let root_commits = self.nodes.iter().filter(|n| n.commit.is_root()).count();
        let leaf_commits = self.nodes.iter().filter(|n| n.is_head()).count();
        let dangling_parents = self
            .nodes
            .iter()
            .map(|n| n.parents.iter().filter(|p| p.is_none()).count())
            .sum();

        DagStats {
            total_commits: self.nodes.len(),
            merge_commits,
            root_commits,
            leaf_commits,
            dangling_parents,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DagStats {
    pub total_commits: usize,
    pub merge_commits: usize,
    pub root_commits: usize,
    pub leaf_commits: usize,
    /// Parent edges pointing outside the loaded history
    pub dangling_parents: usize,
}

/// Newest-first order with every child ahead of its parents.
///
/// Input order is kept when it already satisfies that; otherwise a Kahn pass
/// emits, among the commits whose children are all placed, the one that comes
/// first by date descending (ties by input order).
fn row_order(nodes: &[CommitNode]) -> Result<Vec<CommitId>, GraphError> {
    let already_ordered = nodes.iter().enumerate().all(|(i, node)| {
        node.parents
            .iter()
            .flatten()
            .all(|parent| parent.0 > i)
    });
    if already_ordered {
        return Ok((0..nodes.len()).map(CommitId).collect());
    }

    let mut by_date: Vec<usize> = (0..nodes.len()).collect();
    by_date.sort_by(|&a, &b| nodes[b].commit.date.cmp(&nodes[a].commit.date));
    let mut rank = vec![0; nodes.len()];
    for (position, &i) in by_date.iter().enumerate() {
        rank[i] = position;
    }

    let mut pending: Vec<usize> = nodes.iter().map(|n| n.children.len()).collect();
    let mut ready: BinaryHeap<Reverse<(usize, usize)>> = pending
        .iter()
        .enumerate()
        .filter(|(_, count)| **count == 0)
        .map(|(i, _)| Reverse((rank[i], i)))
        .collect();

    let mut rows = Vec::with_capacity(nodes.len());
    while let Some(Reverse((_, i))) = ready.pop() {
        rows.push(CommitId(i));
        for parent in nodes[i].parents.iter().flatten() {
            pending[parent.0] -= 1;
            if pending[parent.0] == 0 {
                ready.push(Reverse((rank[parent.0], parent.0)));
            }
        }
    }

    if rows.len() < nodes.len() {
        let stuck = pending
            .iter()
            .position(|&count| count > 0)
            .unwrap_or_default();
        return Err(GraphError::CycleDetected(nodes[stuck].commit.hash.clone()));
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn commit(hash: &str, parents: &[&str], secs: i64) -> Commit {
        Commit::new(
            hash,
            parents.iter().map(|p| p.to_string()).collect(),
            Utc.timestamp_opt(secs, 0).unwrap(),
            "Alice",
            format!("commit {hash}"),
        )
    }

    #[test]
    fn test_children_are_tagged() {
        let dag = CommitDag::build(vec![
            commit("m", &["a", "f"], 4),
            commit("f", &["base"], 3),
            commit("a", &["base"], 2),
            commit("base", &[], 1),
        ])
        .unwrap();

        let base = dag.node(dag.get("base").unwrap());
        assert_eq!(base.branch_children().count(), 2);
        assert_eq!(base.merge_children().count(), 0);

        let f = dag.node(dag.get("f").unwrap());
        assert!(f.is_merged_tip());
        assert_eq!(f.merge_children().collect::<Vec<_>>(), vec![dag.get("m").unwrap()]);

        let m = dag.node(dag.get("m").unwrap());
        assert!(m.is_head());
        assert_eq!(m.merged_parents().count(), 1);
    }

    #[test]
    fn test_dangling_parent_is_tolerated() {
        let dag = CommitDag::build(vec![
            commit("c2", &["c1"], 2),
            commit("c1", &["c0"], 1),
        ])
        .unwrap();

        let c1 = dag.node(dag.get("c1").unwrap());
        assert_eq!(c1.first_parent(), None);
        assert_eq!(dag.stats().dangling_parents, 1);
        assert_eq!(dag.rows().len(), 2);
    }

    #[test]
    fn test_input_order_kept_when_topological() {
        let dag = CommitDag::build(vec![
            commit("c", &["b"], 1),
            commit("b", &["a"], 5),
            commit("a", &[], 9),
        ])
        .unwrap();
        let rows: Vec<&str> = dag.rows().iter().map(|&id| dag.hash(id)).collect();
        assert_eq!(rows, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_reorders_oldest_first_input() {
        let dag = CommitDag::build(vec![
            commit("a", &[], 1),
            commit("b", &["a"], 2),
            commit("x", &["a"], 3),
            commit("c", &["b"], 4),
        ])
        .unwrap();
        let rows: Vec<&str> = dag.rows().iter().map(|&id| dag.hash(id)).collect();
        assert_eq!(rows, vec!["c", "x", "b", "a"]);
        assert_eq!(dag.row_of(dag.get("a").unwrap()), 3);
    }

    #[test]
    fn test_parent_stays_below_child_despite_clock_skew() {
        let dag = CommitDag::build(vec![
            commit("parent", &[], 10),
            commit("child", &["parent"], 5),
        ])
        .unwrap();
        let rows: Vec<&str> = dag.rows().iter().map(|&id| dag.hash(id)).collect();
        assert_eq!(rows, vec!["child", "parent"]);
    }

    #[test]
    fn test_cycle_is_reported() {
        let err = CommitDag::build(vec![
            commit("a", &["b"], 1),
            commit("b", &["a"], 2),
        ])
        .unwrap_err();
        assert!(matches!(err, GraphError::CycleDetected(_)));
    }

    #[test]
    fn test_duplicate_hash_is_reported() {
        let err = CommitDag::build(vec![commit("a", &[], 1), commit("a", &[], 2)]).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateCommit(hash) if hash == "a"));
    }

    #[test]
    fn test_stats() {
        let dag = CommitDag::build(vec![
            commit("m", &["a", "f"], 4),
            commit("f", &["base"], 3),
            commit("a", &["base"], 2),
            commit("base", &[], 1),
        ])
        .unwrap();
        let stats = dag.stats();
        assert_eq!(stats.total_commits, 4);
        assert_eq!(stats.merge_commits, 1);
        assert_eq!(stats.root_commits, 1);
        assert_eq!(stats.leaf_commits, 1);
    }
}
