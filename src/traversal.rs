use crate::node::TreeNode;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Whether an analysis covers only the selected node or the node together
/// with all of its descendants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    #[schemars(description = "Only the selected node")]
    Node,

    #[schemars(description = "The selected node and every descendant, in pre-order")]
    Subtree,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Node => "node",
            Scope::Subtree => "subtree",
        }
    }
}

/// All nodes of a forest in pre-order: each node, then its children's
/// subtrees in order.
pub fn preorder(forest: &[TreeNode]) -> Vec<&TreeNode> {
    let mut out = Vec::new();
    let mut stack: Vec<&TreeNode> = forest.iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(node);
        stack.extend(node.children.iter().rev());
    }
    out
}

/// Flattens `root` and all of its descendants in pre-order. `None` yields an
/// empty list.
pub fn collect_subtree(root: Option<&TreeNode>) -> Vec<&TreeNode> {
    match root {
        Some(node) => preorder(std::slice::from_ref(node)),
        None => Vec::new(),
    }
}

/// The records an analysis over `node` should see for the given scope.
pub fn scope_records(node: &TreeNode, scope: Scope) -> Vec<&TreeNode> {
    match scope {
        Scope::Node => vec![node],
        Scope::Subtree => collect_subtree(Some(node)),
    }
}

/// Every id in the forest, pre-order. Used to expand a whole tree.
pub fn flatten_ids(forest: &[TreeNode]) -> Vec<String> {
    preorder(forest)
        .into_iter()
        .map(|node| node.id.clone())
        .collect()
}

/// First node in pre-order whose id equals `id`.
pub fn find_by_id<'a>(forest: &'a [TreeNode], id: &str) -> Option<&'a TreeNode> {
    let mut stack: Vec<&TreeNode> = forest.iter().rev().collect();
    while let Some(node) = stack.pop() {
        if node.id == id {
            return Some(node);
        }
        stack.extend(node.children.iter().rev());
    }
    None
}

/// The chain from a root down to the first node with `id`, both ends
/// included. Nodes carry no parent link, so the path is recomputed here.
pub fn ancestor_path<'a>(forest: &'a [TreeNode], id: &str) -> Option<Vec<&'a TreeNode>> {
    // (node, depth) pairs; `path` holds the current root-to-node chain
    let mut stack: Vec<(&TreeNode, usize)> = forest.iter().rev().map(|n| (n, 0)).collect();
    let mut path: Vec<&TreeNode> = Vec::new();

    while let Some((node, depth)) = stack.pop() {
        path.truncate(depth);
        path.push(node);
        if node.id == id {
            return Some(path);
        }
        stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
    }

    None
}
