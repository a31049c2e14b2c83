use std::collections::{HashMap, VecDeque};

use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use super::merge_message::{merged_branch_name, synthetic_name};
use super::order::branch_order;
use super::{BranchId, BranchNode, BranchOrigin, Lineage};
use crate::core::commit::short_hash;
use crate::core::{CommitDag, CommitId, Ref};
use crate::options::LayoutOptions;

/// Build the branch model for `dag`.
///
/// Real branches come from branch refs; the mainline claims its first-parent
/// line first, then the other refs (oldest head first), then one virtual
/// branch per merged-in parent nobody has claimed yet. Reachability is
/// recorded for every branch so shared commits know all their branches.
pub fn discover(dag: &CommitDag, refs: &[Ref], options: &LayoutOptions) -> Lineage {
    let heads = branch_heads(dag, refs);
    let mainline_pos = resolve_mainline(&heads, options);

    let mut builder = LineageBuilder::new(dag);

    match mainline_pos {
        Some(pos) => {
            let (name, head) = &heads[pos];
            builder.add(name.clone(), *head, BranchOrigin::Ref);
        }
        None => {
            builder.mainline_name = options
                .mainline
                .clone()
                .unwrap_or_else(|| options.fallback_mainline.clone());
            if let Some(&head) = dag.rows().first() {
                let name = builder.mainline_name.clone();
                builder.add(name, head, BranchOrigin::Implicit);
            }
        }
    }

    // Oldest head first: a branch sitting on top of another one only claims
    // what lies above it.
    let mut others: Vec<(usize, &(String, CommitId))> = heads
        .iter()
        .enumerate()
        .filter(|(pos, _)| Some(*pos) != mainline_pos)
        .collect();
    others.sort_by_key(|(pos, (_, head))| (std::cmp::Reverse(dag.row_of(*head)), *pos));
    for (_, (name, head)) in others {
        builder.add(name.clone(), *head, BranchOrigin::Ref);
    }

    builder.reconstruct_merged_branches(&options.synthetic_prefix);
    builder.record_merges();
    builder.finish()
}

/// Branch refs that point into the loaded history, last write wins per name
fn branch_heads(dag: &CommitDag, refs: &[Ref]) -> Vec<(String, CommitId)> {
    let mut heads: Vec<(String, CommitId)> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();

    for r in refs.iter().filter(|r| r.is_branch()) {
        let Some(head) = dag.get(&r.hash) else {
            warn!(branch = %r.name, hash = %r.hash, "branch ref points outside loaded history");
            continue;
        };
        match position.get(r.name.as_str()) {
            Some(&pos) => heads[pos].1 = head,
            None => {
                position.insert(r.name.as_str(), heads.len());
                heads.push((r.name.clone(), head));
            }
        }
    }

    heads
}

/// Index into `heads` of the default branch
fn resolve_mainline(heads: &[(String, CommitId)], options: &LayoutOptions) -> Option<usize> {
    if let Some(explicit) = &options.mainline {
        if let Some(pos) = heads.iter().position(|(name, _)| name == explicit) {
            return Some(pos);
        }
        warn!(mainline = %explicit, "configured mainline has no branch ref");
    }

    let exact = options
        .mainline_candidates
        .iter()
        .find_map(|candidate| heads.iter().position(|(name, _)| name == candidate));
    if exact.is_some() {
        return exact;
    }

    let remote = options.mainline_candidates.iter().find_map(|candidate| {
        heads.iter().position(|(name, _)| {
            name.split_once('/')
                .is_some_and(|(_, branch)| branch == candidate)
        })
    });
    if remote.is_some() {
        return remote;
    }

    if heads.is_empty() {
        None
    } else {
        Some(0)
    }
}

struct LineageBuilder<'a> {
    dag: &'a CommitDag,
    branches: Vec<BranchNode>,
    by_name: HashMap<String, BranchId>,
    mainline_name: String,
    owner: Vec<Option<BranchId>>,
    members: Vec<SmallVec<[BranchId; 4]>>,
}

impl<'a> LineageBuilder<'a> {
    fn new(dag: &'a CommitDag) -> Self {
        Self {
            dag,
            branches: Vec::new(),
            by_name: HashMap::new(),
            mainline_name: String::new(),
            owner: vec![None; dag.len()],
            members: vec![SmallVec::new(); dag.len()],
        }
    }

    /// Register a branch, claim its line and record what it reaches
    fn add(&mut self, name: String, head: CommitId, origin: BranchOrigin) -> BranchId {
        let id = BranchId(self.branches.len());
        if self.branches.is_empty() {
            self.mainline_name = name.clone();
        }
        self.by_name.insert(name.clone(), id);
        self.branches.push(BranchNode::new(name, head, origin));

        self.claim(id, head);
        self.walk_reach(id, head);

        let branch = &self.branches[id.0];
        trace!(
            branch = %branch.name,
            exclusive = branch.exclusive.len(),
            reach = branch.reach.len(),
            "branch discovered"
        );
        id
    }

    /// Take first-parent commits from `head` down to the first owned one
    fn claim(&mut self, branch: BranchId, head: CommitId) {
        let dag = self.dag;
        for id in dag.first_parent_chain(head) {
            if let Some(owner) = self.owner[id.index()] {
                let node = &mut self.branches[branch.0];
                node.base_commit = Some(id);
                node.base_branch = Some(owner);
                return;
            }
            self.owner[id.index()] = Some(branch);
            self.branches[branch.0].exclusive.push(id);
        }
    }

    /// Reverse breadth-first walk over every parent edge
    fn walk_reach(&mut self, branch: BranchId, start: CommitId) {
        let dag = self.dag;
        let mut seen = vec![false; dag.len()];
        let mut queue = VecDeque::from([start]);
        seen[start.index()] = true;

        let mut reach = Vec::new();
        while let Some(id) = queue.pop_front() {
            reach.push(id);
            self.members[id.index()].push(branch);
            for parent in dag.node(id).present_parents() {
                if !seen[parent.index()] {
                    seen[parent.index()] = true;
                    queue.push_back(parent);
                }
            }
        }
        self.branches[branch.0].reach = reach;
    }

    /// One virtual branch per merged-in parent that no branch has claimed
    fn reconstruct_merged_branches(&mut self, synthetic_prefix: &str) {
        let dag = self.dag;
        let mut created = 0;
        for &merge in dag.rows() {
            let node = dag.node(merge);
            for (parent_idx, parent) in node.merged_parents() {
                if self.owner[parent.index()].is_some() {
                    continue;
                }
                let name = merged_branch_name(&node.commit.message, parent_idx)
                    .unwrap_or_else(|| synthetic_name(synthetic_prefix, node.hash()));
                let name = self.unique_name(name, node.hash());
                self.add(name, parent, BranchOrigin::Virtual { merge });
                created += 1;
            }
        }
        debug!(virtual_branches = created, "reconstructed merged branches");
    }

    fn unique_name(&self, name: String, merge_hash: &str) -> String {
        if !self.by_name.contains_key(&name) {
            return name;
        }
        let suffixed = format!("{}@{}", name, short_hash(merge_hash));
        let mut candidate = suffixed.clone();
        let mut n = 2;
        while self.by_name.contains_key(&candidate) {
            candidate = format!("{suffixed}-{n}");
            n += 1;
        }
        candidate
    }

    /// Newest merge commit bringing in each branch
    fn record_merges(&mut self) {
        let dag = self.dag;
        for &merge in dag.rows() {
            let target = self.owner[merge.index()];
            for (_, parent) in dag.node(merge).merged_parents() {
                let Some(source) = self.owner[parent.index()] else {
                    continue;
                };
                let branch = &mut self.branches[source.0];
                if Some(source) != target && branch.merged_into.is_none() {
                    branch.merged_into = Some(merge);
                }
            }
        }
    }

    fn finish(self) -> Lineage {
        let order = branch_order(&self.branches);
        let mainline = if self.branches.is_empty() {
            None
        } else {
            Some(BranchId(0))
        };
        debug!(
            branches = self.branches.len(),
            mainline = %self.mainline_name,
            "branch discovery finished"
        );

        Lineage {
            branches: self.branches,
            by_name: self.by_name,
            mainline,
            mainline_name: self.mainline_name,
            owner: self.owner,
            members: self.members,
            order,
        }
    }
}
