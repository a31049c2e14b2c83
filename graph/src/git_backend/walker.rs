use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use git2::{Reference, ReferenceType, Repository, Sort};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::{Commit, Ref, RefKind};

/// Commits newest first plus the refs pointing into them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    pub commits: Vec<Commit>,
    #[serde(default)]
    pub refs: Vec<Ref>,
}

pub struct GitWalker {
    repo: Repository,
}

impl GitWalker {
    pub fn new(repo_path: Option<&str>) -> Result<Self> {
        let repo = match repo_path {
            Some(path) => Repository::discover(path),
            None => Repository::open_from_env(),
        }
        .context("Failed to open repository")?;

        Ok(Self { repo })
    }

    pub fn from_repository(repo: Repository) -> Self {
        Self { repo }
    }

    /// Walk every branch and HEAD, newest first, stopping after `limit`
    /// commits. Parents past the limit are left dangling.
    pub fn load(&self, limit: Option<usize>) -> Result<History> {
        let refs = self.refs()?;
        let mut revwalk = self.repo.revwalk()?;

        if let Err(err) = revwalk.push_head() {
            // Unborn HEAD on a fresh repository
            debug!(%err, "HEAD not walkable");
        }
        for r in refs.iter().filter(|r| r.kind == RefKind::Branch) {
            let oid = git2::Oid::from_str(&r.hash)?;
            revwalk.push(oid)?;
        }
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

        let mut commits = Vec::new();
        for oid in revwalk {
            if limit.is_some_and(|limit| commits.len() >= limit) {
                break;
            }
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;
            commits.push(self.convert(&commit, &refs)?);
        }

        debug!(commits = commits.len(), refs = refs.len(), "history loaded");
        Ok(History { commits, refs })
    }

    fn convert(&self, commit: &git2::Commit, refs: &[Ref]) -> Result<Commit> {
        let hash = commit.id().to_string();
        let parents: Vec<String> = commit.parent_ids().map(|oid| oid.to_string()).collect();

        let date = Utc
            .timestamp_opt(commit.time().seconds(), 0)
            .single()
            .context("Invalid commit timestamp")?;

        let author = commit.author().name().unwrap_or("Unknown").to_string();
        let message = commit.message().unwrap_or("").trim_end().to_string();

        let decorations = refs
            .iter()
            .filter(|r| r.hash == hash)
            .map(|r| r.name.clone())
            .collect();

        Ok(Commit::new(hash, parents, date, author, message).with_refs(decorations))
    }

    /// Local branches, remote-tracking branches and tags, peeled to commits
    pub fn refs(&self) -> Result<Vec<Ref>> {
        let mut refs = Vec::new();
        for reference in self.repo.references()? {
            let reference = reference?;
            if let Some(r) = Self::convert_ref(&reference)? {
                trace!(name = %r.name, hash = %r.hash, "ref");
                refs.push(r);
            }
        }
        Ok(refs)
    }

    fn convert_ref(reference: &Reference) -> Result<Option<Ref>> {
        // origin/HEAD and friends
        if reference.kind() == Some(ReferenceType::Symbolic) {
            return Ok(None);
        }
        let kind = if reference.is_branch() || reference.is_remote() {
            RefKind::Branch
        } else if reference.is_tag() {
            RefKind::Tag
        } else {
            return Ok(None);
        };
        let Some(name) = reference.shorthand() else {
            return Ok(None);
        };
        let Ok(commit) = reference.peel_to_commit() else {
            // Tags on trees or blobs
            return Ok(None);
        };

        Ok(Some(Ref {
            name: name.to_string(),
            hash: commit.id().to_string(),
            kind,
        }))
    }
}
