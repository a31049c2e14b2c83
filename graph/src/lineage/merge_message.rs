//! Best-effort recovery of a merged branch's name from its merge message.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::commit::short_hash;

fn pull_request_regex() -> &'static Regex {
    static PULL_REQUEST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
        // Merge pull request #42 from owner/feature-x
        Regex::new(r"^Merge pull request #\d+ from (?:[^/\s]+/)?(\S+)").unwrap()
    });
    &PULL_REQUEST_REGEX
}

fn remote_branch_regex() -> &'static Regex {
    static REMOTE_BRANCH_REGEX: LazyLock<Regex> = LazyLock::new(|| {
        // Merge remote-tracking branch 'origin/feature-x'
        Regex::new(r"^Merge remote-tracking branch '(?:[^/']+/)?([^']+)'").unwrap()
    });
    &REMOTE_BRANCH_REGEX
}

fn local_branch_regex() -> &'static Regex {
    static LOCAL_BRANCH_REGEX: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^Merge branch '([^']+)'").unwrap());
    &LOCAL_BRANCH_REGEX
}

fn octopus_regex() -> &'static Regex {
    static OCTOPUS_REGEX: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^Merge branches ((?:'[^']+'(?:, | and |,? and )?)+)").unwrap());
    &OCTOPUS_REGEX
}

fn quoted_regex() -> &'static Regex {
    static QUOTED_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'([^']+)'").unwrap());
    &QUOTED_REGEX
}

fn merged_in_regex() -> &'static Regex {
    static MERGED_IN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
        // Merged in feature-x (pull request #7)
        Regex::new(r"^Merged in (\S+)").unwrap()
    });
    &MERGED_IN_REGEX
}

/// Name of the branch a merge commit brought in through `parent_index`.
///
/// Only the summary line is inspected. Octopus merges ("Merge branches 'a'
/// and 'b'") map the n-th quoted name to parent `n`.
pub fn merged_branch_name(message: &str, parent_index: usize) -> Option<String> {
    let summary = message.lines().next()?.trim();
    if parent_index == 0 {
        return None;
    }

    if let Some(captures) = octopus_regex().captures(summary) {
        return quoted_regex()
            .captures_iter(&captures[1])
            .nth(parent_index - 1)
            .map(|quoted| quoted[1].to_string());
    }

    [
        pull_request_regex(),
        remote_branch_regex(),
        local_branch_regex(),
        merged_in_regex(),
    ]
    .into_iter()
    .find_map(|regex| regex.captures(summary))
    .map(|captures| captures[1].to_string())
    .filter(|name| !name.is_empty())
}

/// Fallback name for a merged branch nobody can name
pub fn synthetic_name(prefix: &str, merge_hash: &str) -> String {
    format!("{}-{}", prefix, short_hash(merge_hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognises_pull_requests() {
        assert_eq!(
            merged_branch_name("Merge pull request #12 from octo/feature-login", 1).as_deref(),
            Some("feature-login")
        );
        assert_eq!(
            merged_branch_name("Merge pull request #3 from octo/fix/crash\n\nbody", 1).as_deref(),
            Some("fix/crash")
        );
    }

    #[test]
    fn test_recognises_branch_merges() {
        assert_eq!(
            merged_branch_name("Merge branch 'feature/x' into develop", 1).as_deref(),
            Some("feature/x")
        );
        assert_eq!(
            merged_branch_name("Merge remote-tracking branch 'origin/hotfix'", 1).as_deref(),
            Some("hotfix")
        );
        assert_eq!(
            merged_branch_name("Merged in topic (pull request #7)", 1).as_deref(),
            Some("topic")
        );
    }

    #[test]
    fn test_octopus_merges_map_by_parent_index() {
        let message = "Merge branches 'alpha', 'beta' and 'gamma'";
        assert_eq!(merged_branch_name(message, 1).as_deref(), Some("alpha"));
        assert_eq!(merged_branch_name(message, 2).as_deref(), Some("beta"));
        assert_eq!(merged_branch_name(message, 3).as_deref(), Some("gamma"));
        assert_eq!(merged_branch_name(message, 4), None);
    }

    #[test]
    fn test_unrecognised_messages_fall_back() {
        assert_eq!(merged_branch_name("Integrate the thing", 1), None);
        assert_eq!(merged_branch_name("", 1), None);
        assert_eq!(synthetic_name("merged", "0123456789abcdef"), "merged-0123456");
    }
}
