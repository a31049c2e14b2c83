use tracing::{debug, info_span};

use crate::core::{Commit, CommitDag, Ref};
use crate::enrich::enrich;
use crate::error::Result;
use crate::layout::{strategy_for, LayoutStrategy};
use crate::lineage::discover;
use crate::model::BranchGraph;
use crate::options::LayoutOptions;

/// Graph engine entrypoint: `(commits, refs) -> BranchGraph`.
///
/// Every call works on its own arena, lineage and lane tables, so engines
/// can be shared freely and repeated calls on the same input agree.
#[derive(Debug, Clone, Default)]
pub struct GraphEngine {
    options: LayoutOptions,
}

impl GraphEngine {
    pub fn new(options: LayoutOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Lay out with the configured strategy
    pub fn layout(&self, commits: Vec<Commit>, refs: &[Ref]) -> Result<BranchGraph> {
        let strategy = strategy_for(self.options.strategy);
        self.layout_with(strategy.as_ref(), commits, refs)
    }

    /// Lay out with an explicit strategy, ignoring `options.strategy`
    pub fn layout_with(
        &self,
        strategy: &dyn LayoutStrategy,
        commits: Vec<Commit>,
        refs: &[Ref],
    ) -> Result<BranchGraph> {
        let span = info_span!(
            "layout",
            strategy = strategy.kind().as_str(),
            commits = commits.len(),
            refs = refs.len()
        );
        let _entered = span.enter();

        self.options.validate()?;
        let dag = CommitDag::build(commits)?;
        debug!(stats = ?dag.stats(), "history indexed");

        let lineage = discover(&dag, refs, &self.options);
        let assignment = strategy.assign(&dag, &lineage);
        Ok(enrich(&dag, &lineage, &assignment, &self.options, strategy.kind()))
    }
}

/// One-shot layout with `options`
pub fn compute_graph(commits: Vec<Commit>, refs: &[Ref], options: &LayoutOptions) -> Result<BranchGraph> {
    GraphEngine::new(options.clone()).layout(commits, refs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use crate::layout::RowByRow;
    use crate::options::StrategyKind;
    use crate::test_support::History;

    fn scenario_b() -> History {
        History::new()
            .merge("m2", &["m1", "f2"], "Merge branch 'feature'")
            .commit("f2", &["f1"])
            .commit("f1", &["m1"])
            .commit("m1", &[])
            .branch("main", "m2")
    }

    #[test]
    fn test_enriched_commits_and_merge_point() {
        let history = scenario_b();
        let graph = compute_graph(history.commits, &history.refs, &LayoutOptions::default()).unwrap();

        let m2 = graph.commit("m2").unwrap();
        assert!(m2.is_merge_commit);
        assert_eq!(m2.primary_branch, "main");
        assert_eq!(m2.merged_branches, vec!["feature".to_string()]);
        assert_eq!(m2.row, 0);

        let f1 = graph.commit("f1").unwrap();
        assert_eq!(f1.primary_branch, "feature");
        assert_eq!(f1.belongs_to_branches, vec!["main".to_string(), "feature".to_string()]);
        assert_eq!(f1.color, LayoutOptions::default().color_for_lane(1));

        assert_eq!(graph.merge_points.len(), 1);
        let point = &graph.merge_points[0];
        assert_eq!(point.merged_branch, "feature");
        assert_eq!(point.target_branch, "main");
        assert_eq!((point.source_lane, point.target_lane), (1, 0));
        assert_eq!(graph.merge_points_at("m2").count(), 1);

        let feature = graph.branch("feature").unwrap();
        assert!(feature.is_virtual);
        assert_eq!(feature.merged_into.as_deref(), Some("m2"));
        assert_eq!(feature.merged_at, Some(m2.commit.date));
        assert_eq!(feature.base_branch.as_deref(), Some("main"));
        assert_eq!(graph.branch_order, vec!["main".to_string(), "feature".to_string()]);
        assert_eq!(graph.lane_count, 2);
    }

    #[test]
    fn test_layout_with_explicit_strategy() {
        let history = scenario_b();
        let engine = GraphEngine::default();
        let graph = engine.layout_with(&RowByRow, history.commits, &history.refs).unwrap();

        assert_eq!(graph.strategy, StrategyKind::RowByRow);
        assert_eq!(graph.commit("f2").unwrap().lane, 1);
        assert_eq!(graph.commit("f2").unwrap().primary_branch, "feature");
    }

    #[test]
    fn test_dangling_merge_parent_still_yields_merge_point() {
        let history = History::new()
            .merge("m2", &["m1", "gone"], "Merge pull request #4 from octo/shallow")
            .commit("m1", &[])
            .branch("main", "m2");
        let graph = compute_graph(history.commits, &history.refs, &LayoutOptions::default()).unwrap();

        assert_eq!(graph.merge_points.len(), 1);
        let point = &graph.merge_points[0];
        assert_eq!(point.parent_commit, "gone");
        assert_eq!(point.merged_branch, "shallow");
        assert_eq!(point.source_lane, point.target_lane);
    }

    #[test]
    fn test_orphan_commit_falls_back_to_mainline() {
        let history = History::new()
            .commit("m2", &["m1"])
            .commit("detached", &["m1"])
            .commit("m1", &[])
            .branch("main", "m2");
        let graph = compute_graph(history.commits, &history.refs, &LayoutOptions::default()).unwrap();

        let detached = graph.commit("detached").unwrap();
        assert_eq!(detached.primary_branch, "main");
        assert_eq!(detached.lane, 0);
        assert!(detached.belongs_to_branches.is_empty());
    }

    #[test]
    fn test_empty_history() {
        let graph = compute_graph(Vec::new(), &[], &LayoutOptions::default()).unwrap();
        assert!(graph.is_empty());
        assert!(graph.branches.is_empty());
        assert_eq!(graph.mainline, "main");
        assert_eq!(graph.lane_count, 0);
    }

    #[test]
    fn test_invalid_input_is_an_error() {
        let history = History::new().commit("a", &["b"]).commit("b", &["a"]);
        let err = compute_graph(history.commits, &[], &LayoutOptions::default()).unwrap_err();
        assert!(matches!(err, GraphError::CycleDetected(_)));

        let options = LayoutOptions {
            palette: Vec::new(),
            ..LayoutOptions::default()
        };
        let err = compute_graph(Vec::new(), &[], &options).unwrap_err();
        assert_eq!(err, GraphError::EmptyPalette);
    }

    #[test]
    fn test_graph_serializes_camel_case() {
        let history = scenario_b();
        let graph = compute_graph(history.commits, &history.refs, &LayoutOptions::default()).unwrap();
        let json = serde_json::to_value(&graph).unwrap();

        assert_eq!(json["strategy"], "branch-first");
        assert_eq!(json["commits"]["f1"]["primaryBranch"], "feature");
        assert_eq!(json["commits"]["f1"]["hash"], "f1");
        assert_eq!(json["mergePoints"][0]["sourceLane"], 1);

        let back: BranchGraph = serde_json::from_value(json).unwrap();
        assert_eq!(back, graph);
    }
}
