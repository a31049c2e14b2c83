//! Loading history out of a git repository.

mod walker;

pub use walker::{GitWalker, History};
