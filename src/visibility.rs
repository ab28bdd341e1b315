//! Which nodes can be displayed given the expansion state of their ancestors.
//!
//! A node is visible iff it is the root, or its parent exists, is visible and
//! is expanded. Both entry points avoid recursion: [`is_visible`] walks the
//! parent chain in a loop, [`VisibleTree::compute`] does a single top-down
//! pass so siblings never re-walk shared ancestors.

use crate::graph::{MindMapState, NodeId};
use std::collections::HashSet;

/// Visibility of a single node, by walking up its parent chain.
///
/// The walk is bounded by the node count, so a corrupted state with a parent
/// cycle terminates and reports the node as hidden.
pub fn is_visible(state: &MindMapState, id: &NodeId) -> bool {
    let Some(mut node) = state.get(id) else {
        return false;
    };

    for _ in 0..=state.len() {
        let Some(parent_id) = &node.parent_id else {
            return node.id == state.root_id;
        };
        match state.get(parent_id) {
            Some(parent) if parent.is_expanded => node = parent,
            _ => return false,
        }
    }
    false
}

/// The visible part of the tree, computed once per render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibleTree {
    /// Visible ids in pre-order, children in `childrenIds` order. This is
    /// also the paint order: a child is drawn after its parent.
    order: Vec<NodeId>,
    visible: HashSet<NodeId>,
}

impl VisibleTree {
    pub fn compute(state: &MindMapState) -> Self {
        let mut order = Vec::new();
        let mut visible = HashSet::new();

        if !state.contains(&state.root_id) {
            return Self { order, visible };
        }

        let mut stack = vec![&state.root_id];
        while let Some(id) = stack.pop() {
            // Guards against a corrupted state revisiting a node.
            if !visible.insert(id.clone()) {
                continue;
            }
            order.push(id.clone());

            let Some(node) = state.get(id) else { continue };
            if node.is_expanded {
                // Reverse so the first child is popped first.
                stack.extend(
                    node.children_ids
                        .iter()
                        .rev()
                        .filter(|child| state.contains(child)),
                );
            }
        }

        Self { order, visible }
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.visible.contains(id)
    }

    /// Visible ids in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeId> + '_ {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
