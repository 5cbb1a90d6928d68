//! Traversal roots

use crate::path::PathResolver;
use services_storage::StorageNode;

/// A resolved directory node plus the relative path accumulated to reach it
#[derive(Debug, Clone)]
pub struct TraversalRoot {
    node: StorageNode,
    current_path: String,
}

impl TraversalRoot {
    /// Root of a whole traversal (empty prefix)
    pub fn top(node: StorageNode) -> Self {
        Self::nested(node, String::new())
    }

    /// Root of a nested traversal below `current_path`
    pub fn nested(node: StorageNode, current_path: String) -> Self {
        Self { node, current_path }
    }

    pub fn node(&self) -> &StorageNode {
        &self.node
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    /// Relative path of a child of this root
    pub fn child_path(&self, leaf: &str) -> String {
        PathResolver::join(&self.current_path, leaf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_child_paths() {
        let top = TraversalRoot::top(StorageNode::Local(PathBuf::from("/data")));
        assert_eq!(top.current_path(), "");
        assert_eq!(top.child_path("sub"), "sub");

        let nested = TraversalRoot::nested(
            StorageNode::Local(PathBuf::from("/data/sub")),
            top.child_path("sub"),
        );
        assert_eq!(nested.child_path("b.txt"), "sub/b.txt");
    }
}
