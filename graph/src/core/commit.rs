use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A commit as handed to the engine by the history loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    /// Unique commit ID (SHA)
    pub hash: String,
    /// Parent commit IDs, first parent is the mainline parent
    #[serde(default)]
    pub parents: Vec<String>,
    /// Full commit message; only the summary line is parsed
    #[serde(default)]
    pub message: String,
    /// Author name
    #[serde(default)]
    pub author: String,
    /// Commit timestamp
    pub date: DateTime<Utc>,
    /// Ref names pointing at this commit
    #[serde(default)]
    pub refs: Vec<String>,
}

impl Commit {
    pub fn new(
        hash: impl Into<String>,
        parents: Vec<String>,
        date: DateTime<Utc>,
        author: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            hash: hash.into(),
            parents,
            message: message.into(),
            author: author.into(),
            date,
            refs: Vec::new(),
        }
    }

    pub fn with_refs(mut self, refs: Vec<String>) -> Self {
        self.refs = refs;
        self
    }

    /// Check if this is a root commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Check if this is a merge commit (multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Abbreviated hash for display and synthetic names
    pub fn short_hash(&self) -> &str {
        short_hash(&self.hash)
    }
}

pub(crate) fn short_hash(hash: &str) -> &str {
    let end = hash
        .char_indices()
        .nth(7)
        .map(|(idx, _)| idx)
        .unwrap_or(hash.len());
    &hash[..end]
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    #[default]
    Branch,
    Tag,
    Other,
}

/// A named reference; only branches take part in layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ref {
    pub name: String,
    pub hash: String,
    #[serde(default)]
    pub kind: RefKind,
}

impl Ref {
    pub fn branch(name: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hash: hash.into(),
            kind: RefKind::Branch,
        }
    }

    pub fn tag(name: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hash: hash.into(),
            kind: RefKind::Tag,
        }
    }

    pub fn is_branch(&self) -> bool {
        self.kind == RefKind::Branch
    }
}
