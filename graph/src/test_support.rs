//! History fixtures shared by unit tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::core::{Commit, CommitDag, Ref};

/// Builds a history newest commit first; each commit is a minute older
/// than the previous one.
#[derive(Debug, Default)]
pub(crate) struct History {
    pub commits: Vec<Commit>,
    pub refs: Vec<Ref>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_date(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 - 60 * self.commits.len() as i64, 0)
            .unwrap()
    }

    pub fn commit(self, hash: &str, parents: &[&str]) -> Self {
        let message = format!("commit {hash}");
        self.merge(hash, parents, &message)
    }

    pub fn merge(mut self, hash: &str, parents: &[&str], message: &str) -> Self {
        let date = self.next_date();
        self.commits.push(Commit::new(
            hash,
            parents.iter().map(|p| p.to_string()).collect(),
            date,
            "Alice",
            message,
        ));
        self
    }

    pub fn branch(mut self, name: &str, hash: &str) -> Self {
        self.refs.push(Ref::branch(name, hash));
        self
    }

    pub fn dag(&self) -> CommitDag {
        CommitDag::build(self.commits.clone()).unwrap()
    }
}
