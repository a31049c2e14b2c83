use thiserror::Error;

/// Inputs the engine refuses to lay out.
///
/// Incomplete history is not an error: dangling parents, refs outside the
/// loaded commits and unparseable merge messages all degrade gracefully.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("commit {0} appears more than once in the history")]
    DuplicateCommit(String),

    #[error("parent chain through commit {0} forms a cycle")]
    CycleDetected(String),

    #[error("lane palette must contain at least one color")]
    EmptyPalette,
}

pub type Result<T> = std::result::Result<T, GraphError>;
