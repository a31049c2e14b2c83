//! Plain-text rendering of a laid-out graph for the terminal.

use std::collections::BTreeMap;

use graph::{BranchGraph, EnrichedCommit};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const COMMIT: char = '●';
const MERGE: char = '◉';
const LINE: char = '│';
const EMPTY: char = ' ';

/// Rows each lane is drawn through, as inclusive `(newest, oldest)` ranges
fn lane_spans(graph: &BranchGraph) -> BTreeMap<usize, Vec<(usize, usize)>> {
    let row_of = |hash: &str| graph.commit(hash).map(|c| c.row);
    let mut spans: BTreeMap<usize, Vec<(usize, usize)>> = BTreeMap::new();

    for branch in graph.branches.values() {
        let rows: Vec<usize> = branch
            .exclusive_commits
            .iter()
            .filter_map(|hash| row_of(hash.as_str()))
            .collect();
        let (Some(&newest), Some(&oldest)) = (rows.iter().min(), rows.iter().max()) else {
            continue;
        };
        let top = branch
            .merged_into
            .as_deref()
            .and_then(row_of)
            .filter(|&merge| merge < newest)
            .unwrap_or(newest);
        let bottom = branch
            .base_commit
            .as_deref()
            .and_then(row_of)
            .unwrap_or(oldest);
        spans.entry(branch.lane).or_default().push((top, bottom));
    }
    spans
}

fn glyphs(commit: &EnrichedCommit, width: usize, spans: &BTreeMap<usize, Vec<(usize, usize)>>) -> String {
    (0..width)
        .map(|lane| {
            if lane == commit.lane {
                if commit.is_merge_commit {
                    MERGE
                } else {
                    COMMIT
                }
            } else if spans.get(&lane).is_some_and(|spans| {
                spans
                    .iter()
                    .any(|&(top, bottom)| top < commit.row && commit.row < bottom)
            }) {
                LINE
            } else {
                EMPTY
            }
        })
        .flat_map(|glyph| [glyph, ' '])
        .collect()
}

/// Truncate to `max_width` columns on grapheme boundaries
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for grapheme in text.graphemes(true) {
        let grapheme_width = grapheme.width();
        if current_width + grapheme_width + 1 > max_width {
            break;
        }
        result.push_str(grapheme);
        current_width += grapheme_width;
    }
    result.push('…');
    result
}

/// One line per commit: lanes, short hash, branch and summary
pub fn render(graph: &BranchGraph, max_width: usize) -> Vec<String> {
    let spans = lane_spans(graph);
    let width = graph.lane_count.max(1);

    graph
        .iter_rows()
        .map(|commit| {
            let summary = commit.commit.message.lines().next().unwrap_or("");
            let line = format!(
                "{}{} [{}] {}",
                glyphs(commit, width, &spans),
                commit.commit.short_hash(),
                commit.primary_branch,
                summary
            );
            truncate_to_width(&line, max_width)
        })
        .collect()
}

/// Branch table in layout order
pub fn branch_table(graph: &BranchGraph) -> Vec<String> {
    let name_width = graph
        .branches
        .keys()
        .map(|name| name.width())
        .max()
        .unwrap_or(0);

    graph
        .iter_branches()
        .map(|branch| {
            let marker = if branch.name == graph.mainline { "* " } else { "  " };
            let padding = " ".repeat(name_width - branch.name.width());
            let state = match (branch.is_virtual, &branch.merged_into) {
                (true, _) => "reconstructed",
                (false, Some(_)) => "merged",
                (false, None) => "open",
            };
            let base = branch
                .base_branch
                .as_deref()
                .map(|base| format!(" from {base}"))
                .unwrap_or_default();
            format!(
                "{marker}{}{padding}  lane {:<2} {:>4} commits  {state}{base}",
                branch.name,
                branch.lane,
                branch.exclusive_commits.len()
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use graph::{compute_graph, Commit, LayoutOptions, Ref};
    use pretty_assertions::assert_eq;

    fn merged_feature() -> BranchGraph {
        let date = |i: i64| Utc.timestamp_opt(1_700_000_000 - 60 * i, 0).unwrap();
        let commits = vec![
            Commit::new("m2aaaaaaaa", vec!["m1aaaaaaaa".into(), "f2aaaaaaaa".into()], date(0), "Alice", "Merge branch 'feature'"),
            Commit::new("f2aaaaaaaa", vec!["f1aaaaaaaa".into()], date(1), "Alice", "feature two"),
            Commit::new("f1aaaaaaaa", vec!["m1aaaaaaaa".into()], date(2), "Alice", "feature one"),
            Commit::new("m1aaaaaaaa", vec![], date(3), "Alice", "root"),
        ];
        compute_graph(commits, &[Ref::branch("main", "m2aaaaaaaa")], &LayoutOptions::default()).unwrap()
    }

    #[test]
    fn test_renders_lanes() {
        let lines = render(&merged_feature(), 80);
        assert_eq!(
            lines,
            vec![
                "◉   m2aaaaa [main] Merge branch 'feature'",
                "│ ● f2aaaaa [feature] feature two",
                "│ ● f1aaaaa [feature] feature one",
                "●   m1aaaaa [main] root",
            ]
        );
    }

    #[test]
    fn test_lists_branches_in_layout_order() {
        let lines = branch_table(&merged_feature());
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("* main"));
        assert!(lines[1].contains("reconstructed from main"));
    }

    #[test]
    fn test_truncates_on_grapheme_boundaries() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
        assert_eq!(truncate_to_width("hello world", 6), "hello…");
        assert_eq!(truncate_to_width("日本語テキスト", 5), "日本…");
        assert_eq!(truncate_to_width("abc", 0), "");
    }
}
