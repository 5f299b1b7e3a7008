use crate::mapper::map_record;
use crate::node::TreeNode;
use crate::raw::RawRecord;
use log::debug;

// Internal struct to track a record while its children are being built
struct Frame<'a> {
    raw: &'a RawRecord,
    node: TreeNode,
    next_child: usize,
}

impl<'a> Frame<'a> {
    fn new(raw: &'a RawRecord) -> Self {
        let mut node = map_record(raw);
        node.children = Vec::with_capacity(raw.children.len());
        Self {
            raw,
            node,
            next_child: 0,
        }
    }
}

/// Converts a backend record forest into canonical nodes, keeping the
/// backend order at every level. Uses an explicit stack, so hierarchy depth
/// is limited by memory only.
pub fn build_forest(raws: &[RawRecord]) -> Vec<TreeNode> {
    let mut forest = Vec::with_capacity(raws.len());
    let mut total = 0usize;

    for root in raws {
        let mut stack = vec![Frame::new(root)];

        while let Some(frame) = stack.last_mut() {
            let raw = frame.raw;
            if let Some(child) = raw.children.get(frame.next_child) {
                frame.next_child += 1;
                stack.push(Frame::new(child));
                continue;
            }

            let Some(done) = stack.pop() else {
                break;
            };
            total += 1;

            match stack.last_mut() {
                Some(parent) => parent.node.children.push(done.node),
                None => forest.push(done.node),
            }
        }
    }

    debug!(
        "Built statement forest with {} roots and {} nodes",
        forest.len(),
        total
    );

    forest
}

/// Total number of nodes in a forest.
pub fn count_nodes(forest: &[TreeNode]) -> usize {
    let mut stack: Vec<&TreeNode> = forest.iter().collect();
    let mut count = 0;
    while let Some(node) = stack.pop() {
        count += 1;
        stack.extend(node.children.iter());
    }
    count
}
