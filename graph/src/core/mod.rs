pub mod commit;
pub mod node;
pub mod edge;
pub mod dag;

pub use commit::{Commit, Ref, RefKind};
pub use node::CommitNode;
pub use edge::{ChildKind, ChildLink};
pub use dag::{CommitDag, CommitId, DagStats};
