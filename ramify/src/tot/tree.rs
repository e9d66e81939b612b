//! Search tree: an arena of retained reasoning steps.
//!
//! Nodes are addressed by [`NodeId`]; each node owns its ordered child list and holds a
//! non-owning parent index. Only nodes that were proposed, scored and selected ever enter
//! the arena, so pruned candidates need no cleanup.

use serde::Serialize;

/// Index of a node in its [`SearchTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One reasoning step. The root has empty content and represents the unsolved problem.
#[derive(Clone, Debug, Serialize)]
pub struct SearchNode {
    content: String,
    score: f64,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SearchNode {
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Evaluation score assigned when the node was created; never changes.
    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Arena holding the root and every retained node.
#[derive(Clone, Debug, Serialize)]
pub struct SearchTree {
    nodes: Vec<SearchNode>,
}

impl Default for SearchTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchTree {
    /// A tree holding only the empty root.
    pub fn new() -> Self {
        Self {
            nodes: vec![SearchNode {
                content: String::new(),
                score: 0.0,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> Option<&SearchNode> {
        self.nodes.get(id.0)
    }

    /// Creates a scored node under `parent` and returns its id.
    ///
    /// # Panics
    ///
    /// If `parent` does not belong to this tree.
    pub fn attach(&mut self, parent: NodeId, content: impl Into<String>, score: f64) -> NodeId {
        assert!(parent.0 < self.nodes.len(), "parent {:?} not in tree", parent);
        let id = NodeId(self.nodes.len());
        self.nodes.push(SearchNode {
            content: content.into(),
            score,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Contents from the root (exclusive) to `id` (inclusive), in root-to-node order.
    pub fn path(&self, id: NodeId) -> Vec<&str> {
        let mut out = Vec::new();
        let mut cursor = self.get(id);
        while let Some(node) = cursor {
            if node.is_root() {
                break;
            }
            out.push(node.content());
            cursor = node.parent.and_then(|p| self.get(p));
        }
        out.reverse();
        out
    }

    /// [`path`](Self::path) joined one step per line.
    pub fn history(&self, id: NodeId) -> String {
        self.path(id).join("\n")
    }

    /// Edges between `id` and the root.
    pub fn depth(&self, id: NodeId) -> usize {
        self.path(id).len()
    }
}

impl std::ops::Index<NodeId> for SearchTree {
    type Output = SearchNode;

    fn index(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0]
    }
}
