//! Final pass: primary branch, lane and color per commit, and the merge
//! connectors derived from them.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::core::{CommitDag, CommitId};
use crate::layout::{LaneAssignment, PrimarySource};
use crate::lineage::{merged_branch_name, synthetic_name, BranchId, Lineage};
use crate::model::{Branch, BranchGraph, EnrichedCommit, MergePoint};
use crate::options::{LayoutOptions, StrategyKind};

pub fn enrich(
    dag: &CommitDag,
    lineage: &Lineage,
    assignment: &LaneAssignment,
    options: &LayoutOptions,
    strategy: StrategyKind,
) -> BranchGraph {
    let mut order_pos = vec![usize::MAX; lineage.len()];
    for (pos, id) in lineage.order().iter().enumerate() {
        order_pos[id.index()] = pos;
    }

    let primary: Vec<String> = dag
        .ids()
        .map(|commit| {
            let branch = match &assignment.primary {
                PrimarySource::Ownership => {
                    lineage.resolve_primary(commit, &assignment.branch_lanes)
                }
                PrimarySource::Labels(labels) => labels[commit.index()],
            };
            branch.map_or_else(
                || lineage.mainline_name().to_string(),
                |branch| lineage.name(branch).to_string(),
            )
        })
        .collect();

    let merge_points = merge_points(dag, assignment, &primary, options);
    let mut merged_by: HashMap<&str, Vec<String>> = HashMap::new();
    for point in &merge_points {
        merged_by
            .entry(point.merge_commit.as_str())
            .or_default()
            .push(point.merged_branch.clone());
    }

    let mut commits = BTreeMap::new();
    let mut commit_to_branches = BTreeMap::new();
    for id in dag.ids() {
        let node = dag.node(id);
        let mut members: Vec<BranchId> = lineage.members(id).to_vec();
        members.sort_by_key(|branch| order_pos[branch.index()]);
        let belongs: Vec<String> = members
            .iter()
            .map(|&branch| lineage.name(branch).to_string())
            .collect();

        let lane = assignment.commit_lanes[id.index()];
        let merged_branches = merged_by.remove(node.hash()).unwrap_or_default();

        commit_to_branches.insert(node.hash().to_string(), belongs.clone());
        commits.insert(
            node.hash().to_string(),
            EnrichedCommit {
                commit: node.commit.clone(),
                row: dag.row_of(id),
                belongs_to_branches: belongs,
                primary_branch: primary[id.index()].clone(),
                lane,
                color: options.color_for_lane(lane).to_string(),
                is_merge_commit: node.is_merge(),
                merged_branches,
            },
        );
    }

    let branches = lineage
        .branches()
        .map(|(id, branch)| {
            let lane = assignment.branch_lanes[id.index()];
            let out = Branch {
                name: branch.name.clone(),
                head: dag.hash(branch.head).to_string(),
                base_commit: branch.base_commit.map(|c| dag.hash(c).to_string()),
                base_branch: branch.base_branch.map(|b| lineage.name(b).to_string()),
                exclusive_commits: hashes(dag, &branch.exclusive),
                all_commits: hashes(dag, &branch.reach),
                created_at: branch.created_at().map(|c| dag.hash(c).to_string()),
                is_active: branch.is_active(),
                is_virtual: branch.is_virtual(),
                merged_into: branch.merged_into.map(|c| dag.hash(c).to_string()),
                merged_at: branch.merged_into.map(|c| dag.commit(c).date),
                lane,
                color: options.color_for_lane(lane).to_string(),
            };
            (branch.name.clone(), out)
        })
        .collect();

    let branch_order = lineage
        .order()
        .iter()
        .map(|&id| lineage.name(id).to_string())
        .collect();
    let rows = dag.rows().iter().map(|&id| dag.hash(id).to_string()).collect();

    debug!(
        commits = dag.len(),
        merge_points = merge_points.len(),
        lanes = assignment.lane_count(),
        "graph enriched"
    );

    BranchGraph {
        strategy,
        mainline: lineage.mainline_name().to_string(),
        branches,
        commits,
        commit_to_branches,
        branch_order,
        merge_points,
        rows,
        lane_count: assignment.lane_count(),
    }
}

fn hashes(dag: &CommitDag, ids: &[CommitId]) -> Vec<String> {
    ids.iter().map(|&id| dag.hash(id).to_string()).collect()
}

/// One connector per non-first parent of every merge commit, in row order
fn merge_points(
    dag: &CommitDag,
    assignment: &LaneAssignment,
    primary: &[String],
    options: &LayoutOptions,
) -> Vec<MergePoint> {
    let mut points = Vec::new();
    for &merge in dag.rows() {
        let node = dag.node(merge);
        let target_lane = assignment.commit_lanes[merge.index()];

        for (parent_index, parent) in node.parents.iter().enumerate().skip(1) {
            let (parent_commit, merged_branch, source_lane) = match parent {
                Some(parent) => (
                    dag.hash(*parent).to_string(),
                    primary[parent.index()].clone(),
                    assignment.commit_lanes[parent.index()],
                ),
                // Outside the loaded history: name it from the message
                None => (
                    node.commit.parents[parent_index].clone(),
                    merged_branch_name(&node.commit.message, parent_index)
                        .unwrap_or_else(|| synthetic_name(&options.synthetic_prefix, node.hash())),
                    target_lane,
                ),
            };
            points.push(MergePoint {
                merge_commit: node.hash().to_string(),
                parent_commit,
                parent_index,
                merged_branch,
                target_branch: primary[merge.index()].clone(),
                source_lane,
                target_lane,
            });
        }
    }
    points
}
