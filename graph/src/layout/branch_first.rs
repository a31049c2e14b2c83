use tracing::{debug, trace};

use super::lane_pool::{LanePool, RowSpan};
use super::{LaneAssignment, LaneIdx, LayoutStrategy, PrimarySource};
use crate::core::CommitDag;
use crate::lineage::{BranchId, Lineage};
use crate::options::StrategyKind;

/// Branch-first layout: every branch gets a lane, commits inherit it.
///
/// Branches are placed in lineage order so a base always has its lane
/// before the branches forked from it. The mainline owns lane 0 for the
/// whole graph; every other branch takes the smallest lane right of its
/// base that is free for the rows it spans.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchFirst;

impl LayoutStrategy for BranchFirst {
    fn kind(&self) -> StrategyKind {
        StrategyKind::BranchFirst
    }

    fn assign(&self, dag: &CommitDag, lineage: &Lineage) -> LaneAssignment {
        let mut branch_lanes = allocate_branch_lanes(dag, lineage);
        compact_lanes(&mut branch_lanes);

        let commit_lanes = dag
            .ids()
            .map(|commit| {
                lineage
                    .resolve_primary(commit, &branch_lanes)
                    .map_or(0, |branch| branch_lanes[branch.index()])
            })
            .collect();

        LaneAssignment {
            commit_lanes,
            branch_lanes,
            primary: PrimarySource::Ownership,
        }
    }
}

fn allocate_branch_lanes(dag: &CommitDag, lineage: &Lineage) -> Vec<LaneIdx> {
    let mut pool = LanePool::new();
    let mut lanes: Vec<Option<LaneIdx>> = vec![None; lineage.len()];

    if let Some(mainline) = lineage.mainline() {
        let last_row = dag.len().saturating_sub(1);
        pool.reserve(0, RowSpan::rows(0, last_row));
        lanes[mainline.index()] = Some(0);
    }

    for &id in lineage.order() {
        if lanes[id.index()].is_some() {
            continue;
        }
        let branch = lineage.branch(id);
        let parent_lane = branch
            .base_branch
            .and_then(|base| lanes[base.index()])
            .unwrap_or(0);

        let lane = match branch_span(dag, lineage, id) {
            Some(span) => pool.allocate(parent_lane, span),
            // Nothing of its own to draw: ride along on the base's lane
            None => parent_lane,
        };
        trace!(branch = %branch.name, lane, parent_lane, "branch lane assigned");
        lanes[id.index()] = Some(lane);
    }

    debug!(lanes = pool.width(), branches = lineage.len(), "branch lanes allocated");
    lanes.into_iter().map(|lane| lane.unwrap_or(0)).collect()
}

/// Rows a branch needs its lane for, or `None` when it owns no commit.
///
/// The lane is held from just above the base commit up to the newest
/// commit. A branch merged after its last commit releases the lane right
/// below the merge; any other branch keeps it up to the top of the graph.
fn branch_span(dag: &CommitDag, lineage: &Lineage, id: BranchId) -> Option<RowSpan> {
    let branch = lineage.branch(id);
    let newest = dag.row_of(*branch.exclusive.first()?);
    let oldest = dag.row_of(*branch.exclusive.last()?);

    let bottom = match branch.base_commit {
        Some(base) => 2 * dag.row_of(base) - 1,
        None => 2 * oldest,
    };
    let top = match branch.merged_into {
        Some(merge) if dag.row_of(merge) < newest => 2 * dag.row_of(merge) + 1,
        _ => 0,
    };
    Some(RowSpan::new(top, bottom))
}

/// Renumber lanes by rank, closing gaps without reordering anything
pub(crate) fn compact_lanes(lanes: &mut [LaneIdx]) {
    let mut used: Vec<LaneIdx> = lanes.to_vec();
    used.sort_unstable();
    used.dedup();
    for lane in lanes.iter_mut() {
        *lane = used.binary_search(lane).unwrap_or_else(|rank| rank);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineage::discover;
    use crate::options::LayoutOptions;
    use crate::test_support::History;

    fn layout(history: &History) -> (CommitDag, Lineage, LaneAssignment) {
        let dag = history.dag();
        let lineage = discover(&dag, &history.refs, &LayoutOptions::default());
        let assignment = BranchFirst.assign(&dag, &lineage);
        (dag, lineage, assignment)
    }

    fn lane_of(dag: &CommitDag, assignment: &LaneAssignment, hash: &str) -> LaneIdx {
        assignment.commit_lanes[dag.get(hash).unwrap().index()]
    }

    #[test]
    fn test_linear_history() {
        let history = History::new()
            .commit("c3", &["c2"])
            .commit("c2", &["c1"])
            .commit("c1", &[])
            .branch("main", "c3");
        let (dag, _, assignment) = layout(&history);

        for hash in ["c1", "c2", "c3"] {
            assert_eq!(lane_of(&dag, &assignment, hash), 0);
        }
        assert_eq!(assignment.lane_count(), 1);
    }

    #[test]
    fn test_merged_feature_moves_right() {
        let history = History::new()
            .merge("m2", &["m1", "f2"], "Merge branch 'feature'")
            .commit("f2", &["f1"])
            .commit("f1", &["m1"])
            .commit("m1", &[])
            .branch("main", "m2");
        let (dag, lineage, assignment) = layout(&history);

        assert_eq!(lane_of(&dag, &assignment, "m2"), 0);
        assert_eq!(lane_of(&dag, &assignment, "f2"), 1);
        assert_eq!(lane_of(&dag, &assignment, "f1"), 1);
        let feature = lineage.find("feature").unwrap();
        assert_eq!(assignment.branch_lanes[feature.index()], 1);
    }

    #[test]
    fn test_concurrent_branches_get_distinct_lanes() {
        let history = History::new()
            .commit("b1", &["m1"])
            .commit("a1", &["m1"])
            .commit("m2", &["m1"])
            .commit("m1", &[])
            .branch("main", "m2")
            .branch("a", "a1")
            .branch("b", "b1");
        let (dag, _, assignment) = layout(&history);

        let a = lane_of(&dag, &assignment, "a1");
        let b = lane_of(&dag, &assignment, "b1");
        assert_ne!(a, 0);
        assert_ne!(b, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_lane_is_reused_after_merge() {
        let history = History::new()
            .merge("m3", &["m2", "b1"], "Merge branch 'b'")
            .commit("b1", &["m2"])
            .merge("m2", &["m1", "a1"], "Merge branch 'a'")
            .commit("a1", &["m1"])
            .commit("m1", &[])
            .branch("main", "m3");
        let (dag, _, assignment) = layout(&history);

        assert_eq!(lane_of(&dag, &assignment, "a1"), 1);
        assert_eq!(lane_of(&dag, &assignment, "b1"), 1);
        assert_eq!(assignment.lane_count(), 2);
    }

    #[test]
    fn test_live_unmerged_branch_keeps_lane() {
        // `long` stays open while `short` is forked and merged above its fork
        let history = History::new()
            .merge("m3", &["m2", "s1"], "Merge branch 'short'")
            .commit("s1", &["m2"])
            .commit("l1", &["m1"])
            .commit("m2", &["m1"])
            .commit("m1", &[])
            .branch("main", "m3")
            .branch("long", "l1");
        let (dag, _, assignment) = layout(&history);

        assert_eq!(lane_of(&dag, &assignment, "l1"), 1);
        assert_eq!(lane_of(&dag, &assignment, "s1"), 2);
    }

    #[test]
    fn test_pointer_branch_shares_base_lane() {
        let history = History::new()
            .commit("m2", &["m1"])
            .commit("m1", &[])
            .branch("main", "m2")
            .branch("old", "m1");
        let (dag, lineage, assignment) = layout(&history);

        let old = lineage.find("old").unwrap();
        assert_eq!(assignment.branch_lanes[old.index()], 0);
        assert_eq!(lane_of(&dag, &assignment, "m1"), 0);
    }

    #[test]
    fn test_compaction_preserves_order() {
        let mut lanes = vec![0, 4, 2, 4, 7];
        compact_lanes(&mut lanes);
        assert_eq!(lanes, vec![0, 2, 1, 2, 3]);
    }
}
