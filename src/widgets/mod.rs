// Reusable widgets built on ratatui primitives
//
// - TreeView: flattened tree with typed payloads, used for the container tree
pub mod tree;

pub use tree::{TreeNode, TreeRow, TreeView};
