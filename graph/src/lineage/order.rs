use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::{BranchId, BranchNode};

/// Topological order of branches over `base_branch -> branch` edges.
///
/// Ready branches are emitted lowest id first, which puts the mainline
/// ahead and keeps the result deterministic.
pub(crate) fn branch_order(branches: &[BranchNode]) -> Vec<BranchId> {
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); branches.len()];
    let mut waiting = vec![0usize; branches.len()];
    for (idx, branch) in branches.iter().enumerate() {
        if let Some(base) = branch.base_branch.filter(|base| base.0 != idx) {
            dependents[base.0].push(idx);
            waiting[idx] += 1;
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = waiting
        .iter()
        .enumerate()
        .filter(|(_, count)| **count == 0)
        .map(|(idx, _)| Reverse(idx))
        .collect();

    let mut order = Vec::with_capacity(branches.len());
    let mut placed = vec![false; branches.len()];
    while let Some(Reverse(idx)) = ready.pop() {
        order.push(BranchId(idx));
        placed[idx] = true;
        for &dependent in &dependents[idx] {
            waiting[dependent] -= 1;
            if waiting[dependent] == 0 {
                ready.push(Reverse(dependent));
            }
        }
    }

    // Bases are always claimed before their dependents, so this only
    // matters for hand-built inputs.
    order.extend((0..branches.len()).filter(|&idx| !placed[idx]).map(BranchId));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CommitId;
    use crate::lineage::BranchOrigin;

    fn branch(name: &str, base: Option<usize>) -> BranchNode {
        let mut node = BranchNode::new(name.to_string(), CommitId(0), BranchOrigin::Ref);
        node.base_branch = base.map(BranchId);
        node
    }

    #[test]
    fn test_bases_come_first() {
        let branches = vec![
            branch("main", None),
            branch("child", Some(2)),
            branch("parent", Some(0)),
        ];
        let order = branch_order(&branches);
        assert_eq!(order, vec![BranchId(0), BranchId(2), BranchId(1)]);
    }

    #[test]
    fn test_cycles_still_yield_every_branch() {
        let branches = vec![branch("a", Some(1)), branch("b", Some(0)), branch("c", None)];
        let order = branch_order(&branches);
        assert_eq!(order, vec![BranchId(2), BranchId(0), BranchId(1)]);
    }
}
