use std::collections::HashMap;

use tracing::{debug, trace};

use super::{LaneAssignment, LaneIdx, LayoutStrategy, PrimarySource};
use crate::core::{CommitDag, CommitId};
use crate::lineage::{BranchId, BranchOrigin, Lineage};
use crate::options::StrategyKind;

/// Per-lane occupancy while walking rows.
///
/// A slot holds the commit whose line currently runs through the lane, or
/// `None` when the lane is free. Slots are cleared but never removed, so
/// lane indices stay stable for the whole walk.
#[derive(Debug, Clone, Default)]
pub struct LaneSlots {
    slots: Vec<Option<CommitId>>,
    /// Lane 0 is kept for the mainline
    reserve_first: bool,
}

impl LaneSlots {
    pub fn new(reserve_first: bool) -> Self {
        Self {
            slots: Vec::new(),
            reserve_first,
        }
    }

    fn first_usable(&self) -> LaneIdx {
        usize::from(self.reserve_first)
    }

    fn is_free(&self, lane: LaneIdx) -> bool {
        lane >= self.first_usable() && self.slots.get(lane).map_or(true, Option::is_none)
    }

    /// First free lane by ascending index, appending one when all are busy
    pub fn first_free(&self) -> LaneIdx {
        (self.first_usable()..self.slots.len())
            .find(|&lane| self.is_free(lane))
            .unwrap_or_else(|| self.slots.len().max(self.first_usable()))
    }

    /// Free lane nearest to `start`, looking left first and then right
    pub fn free_near(&self, start: LaneIdx) -> LaneIdx {
        let start = start.min(self.slots.len());
        (self.first_usable()..=start)
            .rev()
            .chain(start + 1..self.slots.len())
            .find(|&lane| self.is_free(lane))
            .unwrap_or_else(|| self.slots.len().max(self.first_usable()))
    }

    pub fn occupy(&mut self, lane: LaneIdx, commit: CommitId) {
        if lane >= self.slots.len() {
            self.slots.resize(lane + 1, None);
        }
        self.slots[lane] = Some(commit);
    }

    /// Clear `lane` if `commit` still holds it
    pub fn release_if_held(&mut self, lane: LaneIdx, commit: CommitId) -> bool {
        match self.slots.get_mut(lane) {
            Some(slot) if *slot == Some(commit) => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    pub fn holder(&self, lane: LaneIdx) -> Option<CommitId> {
        self.slots.get(lane).copied().flatten()
    }

    pub fn lane_count(&self) -> usize {
        self.slots.len()
    }
}

/// Row-by-row layout: commits are placed newest first, one row at a time.
///
/// A commit continues the leftmost lane among the children it is the first
/// parent of. Placing a merge reserves a free lane near it for every merged
/// parent still below, so the connector owns that lane until the parent's
/// row; a parent only merged somewhere then takes its reserved lane. A head
/// takes the first free lane. Lanes are released as soon as the line running
/// through them has reached its fork point.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowByRow;

impl LayoutStrategy for RowByRow {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RowByRow
    }

    fn assign(&self, dag: &CommitDag, lineage: &Lineage) -> LaneAssignment {
        let on_mainline = mainline_line(dag, lineage);
        let commit_lanes = place_commits(dag, &on_mainline, lineage.mainline().is_some());
        let labels = label_commits(dag, lineage, &commit_lanes);

        let branch_lanes = lineage
            .branches()
            .map(|(_, branch)| {
                let tip = branch.exclusive.first().copied().unwrap_or(branch.head);
                commit_lanes[tip.index()]
            })
            .collect();

        LaneAssignment {
            commit_lanes,
            branch_lanes,
            primary: PrimarySource::Labels(labels),
        }
    }
}

/// Commits on the mainline's first-parent line
fn mainline_line(dag: &CommitDag, lineage: &Lineage) -> Vec<bool> {
    let mut on_mainline = vec![false; dag.len()];
    if let Some(mainline) = lineage.mainline() {
        for id in dag.first_parent_chain(lineage.branch(mainline).head) {
            on_mainline[id.index()] = true;
        }
    }
    on_mainline
}

fn place_commits(dag: &CommitDag, on_mainline: &[bool], reserve_first: bool) -> Vec<LaneIdx> {
    let mut slots = LaneSlots::new(reserve_first);
    let mut lanes: Vec<Option<LaneIdx>> = vec![None; dag.len()];
    // Lane held for a merged parent between its merge and its own row
    let mut reserved: Vec<Option<LaneIdx>> = vec![None; dag.len()];

    for &id in dag.rows() {
        let node = dag.node(id);
        let lane = if on_mainline[id.index()] {
            0
        } else if let Some(lane) = node.branch_children().filter_map(|c| lanes[c.index()]).min() {
            lane
        } else if let Some(lane) = reserved[id.index()] {
            lane
        } else {
            slots.first_free()
        };
        if let Some(held) = reserved[id.index()].filter(|&held| held != lane) {
            slots.release_if_held(held, id);
        }
        lanes[id.index()] = Some(lane);
        slots.occupy(lane, id);
        trace!(commit = %node.hash(), lane, "commit placed");

        // A child's lane is done once its own first parent has been placed
        for link in &node.children {
            let Some(child_lane) = lanes[link.child.index()] else {
                continue;
            };
            if child_lane == lane {
                continue;
            }
            let line_done = dag
                .node(link.child)
                .first_parent()
                .map_or(true, |parent| lanes[parent.index()].is_some());
            if line_done {
                slots.release_if_held(child_lane, link.child);
            }
        }

        if node.first_parent().is_none() && !(reserve_first && lane == 0) {
            slots.release_if_held(lane, id);
        }

        for (_, parent) in node.merged_parents() {
            if lanes[parent.index()].is_some() || reserved[parent.index()].is_some() {
                continue;
            }
            let slot = slots.free_near(lane);
            slots.occupy(slot, parent);
            reserved[parent.index()] = Some(slot);
            trace!(merge = %node.hash(), parent = %dag.hash(parent), lane = slot, "lane reserved");
        }
    }

    debug!(lanes = slots.lane_count(), commits = dag.len(), "rows placed");
    lanes.into_iter().map(|lane| lane.unwrap_or(0)).collect()
}

/// Nearest branch label for each commit.
///
/// A branch ref on the commit wins (mainline first); otherwise the label
/// flows down from the child continuing in the same lane; otherwise the
/// branch that claimed the commit; otherwise the mainline.
fn label_commits(dag: &CommitDag, lineage: &Lineage, lanes: &[LaneIdx]) -> Vec<Option<BranchId>> {
    let mut ref_heads: HashMap<CommitId, BranchId> = HashMap::new();
    if let Some(mainline) = lineage.mainline() {
        ref_heads.insert(lineage.branch(mainline).head, mainline);
    }
    for &id in lineage.order() {
        let branch = lineage.branch(id);
        if branch.origin == BranchOrigin::Ref {
            ref_heads.entry(branch.head).or_insert(id);
        }
    }

    let mut labels: Vec<Option<BranchId>> = vec![None; dag.len()];
    for &id in dag.rows() {
        let lane = lanes[id.index()];
        let label = ref_heads
            .get(&id)
            .copied()
            .or_else(|| {
                dag.node(id)
                    .branch_children()
                    .filter(|child| lanes[child.index()] == lane)
                    .find_map(|child| labels[child.index()])
            })
            .or_else(|| lineage.owner(id))
            .or_else(|| lineage.mainline());
        labels[id.index()] = label;
    }
    labels
}
