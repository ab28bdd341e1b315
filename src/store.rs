//! Action-based mutation of the mind map.
//!
//! [`reduce`] is the only way a [`MindMapState`] changes. It is pure: the input
//! state is never touched and the same `(state, action)` pair always yields the
//! same result. Actions naming a node that does not exist are no-ops.
//!
//! [`Store`] owns the current state for a running editor and notifies
//! subscribers after every dispatch.
//!
//! # Example
//!
//! ```ignore
//! use slint_mindmap::{Action, Store};
//!
//! let store = Store::new();
//! let root = store.state().root_id.clone();
//! store.dispatch(Action::add_child(root, "Child A"));
//! assert_eq!(store.state().len(), 2);
//! ```

use crate::graph::{ConnectionStyle, MindMapState, Node, NodeId, NodeStyle, Position};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, trace};

/// Horizontal distance of a default-placed child from its parent.
pub const CHILD_OFFSET_X: f32 = 200.0;
/// Vertical distance between default-placed siblings.
pub const SIBLING_SPACING_Y: f32 = 100.0;

/// Every mutation the store understands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Action {
    AddNode {
        parent_id: NodeId,
        text: String,
        #[serde(default)]
        position: Option<Position>,
        #[serde(default)]
        style: Option<NodeStyle>,
    },
    UpdateNodeText {
        node_id: NodeId,
        text: String,
    },
    ToggleNodeExpansion {
        node_id: NodeId,
    },
    SetNodePosition {
        node_id: NodeId,
        position: Position,
    },
    UpdateNodeStyle {
        node_id: NodeId,
        style: NodeStyle,
    },
    UpdateNodeHtmlContent {
        node_id: NodeId,
        html_content: String,
    },
    UpdateNodeConnectionStyle {
        node_id: NodeId,
        connection_style: ConnectionStyle,
    },
}

impl Action {
    /// `AddNode` with default position and inherited style.
    pub fn add_child(parent_id: impl Into<NodeId>, text: impl Into<String>) -> Self {
        Action::AddNode {
            parent_id: parent_id.into(),
            text: text.into(),
            position: None,
            style: None,
        }
    }

    /// The node this action addresses (the parent, for `AddNode`).
    pub fn target(&self) -> &NodeId {
        match self {
            Action::AddNode { parent_id, .. } => parent_id,
            Action::UpdateNodeText { node_id, .. }
            | Action::ToggleNodeExpansion { node_id }
            | Action::SetNodePosition { node_id, .. }
            | Action::UpdateNodeStyle { node_id, .. }
            | Action::UpdateNodeHtmlContent { node_id, .. }
            | Action::UpdateNodeConnectionStyle { node_id, .. } => node_id,
        }
    }
}

/// Apply `action` to `state`, returning the next state.
pub fn reduce(state: &MindMapState, action: &Action) -> MindMapState {
    let Some(target) = state.nodes.get(action.target()) else {
        debug!(target_id = %action.target(), ?action, "action targets unknown node, ignored");
        return state.clone();
    };

    match action {
        Action::AddNode {
            text,
            position,
            style,
            ..
        } => add_node(state, target, text, *position, style.as_ref()),
        Action::UpdateNodeText { text, .. } => {
            update_node(state, target, |node| node.text = text.clone())
        }
        Action::ToggleNodeExpansion { .. } => {
            update_node(state, target, |node| node.is_expanded = !node.is_expanded)
        }
        Action::SetNodePosition { position, .. } => {
            update_node(state, target, |node| node.position = *position)
        }
        Action::UpdateNodeStyle { style, .. } => {
            update_node(state, target, |node| node.style.merge(style))
        }
        Action::UpdateNodeHtmlContent { html_content, .. } => update_node(state, target, |node| {
            node.html_content = Some(html_content.clone())
        }),
        Action::UpdateNodeConnectionStyle {
            connection_style, ..
        } => update_node(state, target, |node| {
            node.connection_style.merge(connection_style)
        }),
    }
}

fn update_node(state: &MindMapState, node: &Rc<Node>, edit: impl FnOnce(&mut Node)) -> MindMapState {
    let mut updated = Node::clone(node);
    edit(&mut updated);

    let mut next = state.clone();
    next.nodes.insert(updated.id.clone(), Rc::new(updated));
    next
}

fn add_node(
    state: &MindMapState,
    parent: &Rc<Node>,
    text: &str,
    position: Option<Position>,
    style: Option<&NodeStyle>,
) -> MindMapState {
    let (id, next_seq) = state.fresh_id();
    let sibling_count = parent.children_ids.len() as f32;
    let position = position.unwrap_or(Position::new(
        parent.position.x + CHILD_OFFSET_X,
        parent.position.y + sibling_count * SIBLING_SPACING_Y,
    ));

    let mut child = Node::new(id.clone(), text, position);
    child.parent_id = Some(parent.id.clone());
    child.style = match style {
        Some(style) => style.clone(),
        None => parent.style.inherited(),
    };
    child.connection_style = ConnectionStyle::child_default();

    let mut parent = Node::clone(parent);
    parent.children_ids.push(id.clone());

    trace!(node_id = %id, parent_id = %parent.id, x = position.x, y = position.y, "node added");

    let mut next = state.clone();
    next.next_seq = next_seq;
    next.nodes.insert(parent.id.clone(), Rc::new(parent));
    next.nodes.insert(id, Rc::new(child));
    next
}

impl MindMapState {
    /// Method form of [`reduce`].
    pub fn dispatch(&self, action: &Action) -> MindMapState {
        reduce(self, action)
    }
}

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&Rc<MindMapState>)>;

struct StoreInner {
    state: Rc<MindMapState>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

/// Owner of the current [`MindMapState`].
///
/// Clone the store to share it; all clones see the same state. The store is
/// single-threaded and meant to be created once per editor.
#[derive(Clone)]
pub struct Store {
    inner: Rc<RefCell<StoreInner>>,
    dispatched: Rc<Cell<u64>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// A store holding a fresh map with only the root.
    pub fn new() -> Self {
        Self::with_state(MindMapState::new())
    }

    pub fn with_state(state: MindMapState) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                state: Rc::new(state),
                listeners: Vec::new(),
                next_subscription: 0,
            })),
            dispatched: Rc::new(Cell::new(0)),
        }
    }

    /// Snapshot of the current state. Later dispatches never alter it.
    pub fn state(&self) -> Rc<MindMapState> {
        self.inner.borrow().state.clone()
    }

    /// Apply an action and notify subscribers.
    ///
    /// Subscribers run after the store has released its internal borrow, so
    /// they may read the store or dispatch further actions.
    pub fn dispatch(&self, action: Action) -> Rc<MindMapState> {
        let (next, listeners) = {
            let mut inner = self.inner.borrow_mut();
            let next = Rc::new(reduce(&inner.state, &action));
            inner.state = next.clone();
            let listeners: Vec<Listener> =
                inner.listeners.iter().map(|(_, l)| l.clone()).collect();
            (next, listeners)
        };
        self.dispatched.set(self.dispatched.get() + 1);

        for listener in listeners {
            listener(&next);
        }
        next
    }

    /// Replace the whole state, e.g. after importing a snapshot.
    pub fn replace(&self, state: MindMapState) -> Rc<MindMapState> {
        let (next, listeners) = {
            let mut inner = self.inner.borrow_mut();
            inner.state = Rc::new(state);
            let listeners: Vec<Listener> =
                inner.listeners.iter().map(|(_, l)| l.clone()).collect();
            (inner.state.clone(), listeners)
        };
        for listener in listeners {
            listener(&next);
        }
        next
    }

    /// Register a callback invoked with the new state after each dispatch.
    pub fn subscribe(&self, listener: impl Fn(&Rc<MindMapState>) + 'static) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_subscription);
        inner.next_subscription += 1;
        inner.listeners.push((id, Rc::new(listener)));
        id
    }

    /// Returns `true` if the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let len_before = inner.listeners.len();
        inner.listeners.retain(|(sid, _)| *sid != id);
        inner.listeners.len() != len_before
    }

    /// Number of actions dispatched so far, no-ops included.
    pub fn dispatch_count(&self) -> u64 {
        self.dispatched.get()
    }
}
