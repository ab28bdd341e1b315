//! Pointer, wheel and button handling for the mind map.
//!
//! [`InteractionController`] turns raw input events into viewport changes and
//! store actions. Pan and drag are explicit state machines:
//!
//! ```text
//! PanState:  Idle --down on canvas--> Panning{anchor} --up--> Idle
//! DragState: Idle --left down on node--> Dragging{node, last} --up--> Idle
//! ```
//!
//! Pointer coordinates are always screen space. Drags dispatch absolute
//! `SetNodePosition` actions computed from the scale-corrected pointer delta,
//! so a node follows the pointer at every zoom level.

use crate::config::EditorConfig;
use crate::graph::{NodeId, Position};
use crate::store::{Action, Store};
use crate::tracking::LayoutTracker;
use crate::viewport::Viewport;
use crate::visibility::VisibleTree;
use slint::SharedString;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PanState {
    #[default]
    Idle,
    /// `anchor` is the pointer position minus the translation at pointer-down.
    Panning { anchor: Position },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// `last` is the screen position of the previous pointer event.
    Dragging { node_id: NodeId, last: Position },
}

/// Coarse gesture state, for cursor feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gesture {
    Idle,
    Panning,
    Dragging(NodeId),
}

/// Where a pointer-down landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    Canvas,
    Node(NodeId),
}

/// An open inline edit of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub node_id: NodeId,
    /// Rich content if the node has any, otherwise its plain label.
    pub initial_content: String,
}

/// What [`InteractionController::commit_edit`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommit {
    /// No edit session was open.
    NoSession,
    /// Neither content nor label changed; nothing was dispatched.
    Unchanged,
    HtmlContent,
    Text,
}

/// Input state machine shared by all of the host's event callbacks.
///
/// Clone this controller to share it across callbacks.
#[derive(Clone)]
pub struct InteractionController {
    store: Store,
    viewport: Viewport,
    tracker: LayoutTracker,
    config: Rc<EditorConfig>,
    pan: Rc<RefCell<PanState>>,
    drag: Rc<RefCell<DragState>>,
    edit: Rc<RefCell<Option<EditSession>>>,
}

impl InteractionController {
    pub fn new(store: Store, viewport: Viewport, tracker: LayoutTracker, config: Rc<EditorConfig>) -> Self {
        Self {
            store,
            viewport,
            tracker,
            config,
            pan: Rc::new(RefCell::new(PanState::Idle)),
            drag: Rc::new(RefCell::new(DragState::Idle)),
            edit: Rc::new(RefCell::new(None)),
        }
    }

    pub fn pan_state(&self) -> PanState {
        *self.pan.borrow()
    }

    pub fn drag_state(&self) -> DragState {
        self.drag.borrow().clone()
    }

    pub fn gesture(&self) -> Gesture {
        if let DragState::Dragging { node_id, .. } = &*self.drag.borrow() {
            return Gesture::Dragging(node_id.clone());
        }
        match *self.pan.borrow() {
            PanState::Panning { .. } => Gesture::Panning,
            PanState::Idle => Gesture::Idle,
        }
    }

    pub fn edit_session(&self) -> Option<EditSession> {
        self.edit.borrow().clone()
    }

    // === Pointer ===

    /// Pointer-down on empty canvas: start panning.
    ///
    /// The right button is left to the host (context menus).
    pub fn pointer_down_on_canvas(&self, x: f32, y: f32, button: PointerButton) {
        if button == PointerButton::Right {
            return;
        }
        let transform = self.viewport.transform();
        let anchor = Position::new(x - transform.x, y - transform.y);
        debug!(x, y, "pan started");
        *self.pan.borrow_mut() = PanState::Panning { anchor };
    }

    /// Pointer-down on a node: a left press starts dragging it.
    ///
    /// Never starts a pan. Pressing the node that is being edited does not
    /// drag, so text selection inside the editor keeps working.
    pub fn pointer_down_on_node(&self, node_id: &NodeId, x: f32, y: f32, button: PointerButton) {
        if button != PointerButton::Left || !self.store.state().contains(node_id) {
            return;
        }
        if self.edit.borrow().as_ref().is_some_and(|s| s.node_id == *node_id) {
            return;
        }
        debug!(node_id = %node_id, x, y, "drag started");
        *self.drag.borrow_mut() = DragState::Dragging {
            node_id: node_id.clone(),
            last: Position::new(x, y),
        };
    }

    /// Pointer-down for hosts that cannot attribute events to elements.
    ///
    /// Hit-tests the visible nodes against the measured geometry, topmost
    /// first, and forwards to the node or canvas handler.
    pub fn pointer_down(&self, x: f32, y: f32, button: PointerButton) -> PointerTarget {
        let target = self.node_at(x, y).map_or(PointerTarget::Canvas, PointerTarget::Node);
        match &target {
            PointerTarget::Node(id) => self.pointer_down_on_node(id, x, y, button),
            PointerTarget::Canvas => self.pointer_down_on_canvas(x, y, button),
        }
        target
    }

    /// Topmost visible node under a screen position.
    pub fn node_at(&self, x: f32, y: f32) -> Option<NodeId> {
        let state = self.store.state();
        let visible = VisibleTree::compute(&state);
        let point = self.viewport.screen_to_canvas(x, y);
        let cache = self.tracker.cache();
        let cache = cache.borrow();
        cache.find_node_at(point.x, point.y, visible.iter()).cloned()
    }

    /// Returns `true` if the move was consumed by a drag or a pan.
    pub fn pointer_move(&self, x: f32, y: f32) -> bool {
        let pointer = Position::new(x, y);

        let drag = self.drag.borrow().clone();
        if let DragState::Dragging { node_id, last } = drag {
            *self.drag.borrow_mut() = DragState::Dragging {
                node_id: node_id.clone(),
                last: pointer,
            };

            let state = self.store.state();
            let Some(node) = state.get(&node_id) else {
                return true;
            };
            let scale = self.viewport.scale();
            let delta = pointer - last;
            let position = Position::new(
                node.position.x + delta.x / scale,
                node.position.y + delta.y / scale,
            );
            self.store.dispatch(Action::SetNodePosition { node_id, position });
            return true;
        }

        let pan = *self.pan.borrow();
        if let PanState::Panning { anchor } = pan {
            self.viewport.set_translation(x - anchor.x, y - anchor.y);
            return true;
        }

        false
    }

    /// Ends any drag or pan, wherever the pointer is.
    pub fn pointer_up(&self) {
        let mut drag = self.drag.borrow_mut();
        if let DragState::Dragging { node_id, .. } = &*drag {
            debug!(node_id = %node_id, "drag ended");
        }
        *drag = DragState::Idle;

        let mut pan = self.pan.borrow_mut();
        if *pan != PanState::Idle {
            debug!("pan ended");
        }
        *pan = PanState::Idle;
    }

    /// Zoom around the pointer.
    ///
    /// Always returns `true`: the host must suppress its default scrolling.
    pub fn wheel(&self, x: f32, y: f32, delta: f32) -> bool {
        self.viewport.zoom_at(x, y, delta);
        true
    }

    // === Editing ===

    /// Open an inline edit (double-click). Returns `None` for unknown nodes.
    pub fn begin_edit(&self, node_id: &NodeId) -> Option<EditSession> {
        let state = self.store.state();
        let node = state.get(node_id)?;
        let session = EditSession {
            node_id: node_id.clone(),
            initial_content: node.display_content().to_owned(),
        };
        debug!(node_id = %node_id, "edit started");
        *self.edit.borrow_mut() = Some(session.clone());
        Some(session)
    }

    /// Close the open edit (blur or Enter), dispatching at most one action.
    ///
    /// `html` is the editor's rich content, `text` its plain-text rendering.
    /// Changed rich content wins; otherwise a changed label is stored, with a
    /// blank label replaced by the configured placeholder.
    pub fn commit_edit(&self, html: &str, text: &str) -> EditCommit {
        let Some(session) = self.edit.borrow_mut().take() else {
            return EditCommit::NoSession;
        };
        let state = self.store.state();
        let Some(node) = state.get(&session.node_id) else {
            return EditCommit::Unchanged;
        };

        if html != node.html_content.as_deref().unwrap_or_default() {
            debug!(node_id = %session.node_id, "edit committed html content");
            self.store.dispatch(Action::UpdateNodeHtmlContent {
                node_id: session.node_id,
                html_content: html.to_owned(),
            });
            return EditCommit::HtmlContent;
        }

        let text = if text.trim().is_empty() {
            self.config.placeholder_label.as_str()
        } else {
            text
        };
        if text != node.text {
            debug!(node_id = %session.node_id, "edit committed text");
            self.store.dispatch(Action::UpdateNodeText {
                node_id: session.node_id,
                text: text.to_owned(),
            });
            return EditCommit::Text;
        }

        EditCommit::Unchanged
    }

    /// Close the open edit without dispatching anything.
    pub fn cancel_edit(&self) {
        self.edit.borrow_mut().take();
    }

    // === Buttons ===

    /// The node's add button: append a child with the default label.
    pub fn add_child_pressed(&self, node_id: &NodeId) {
        self.store
            .dispatch(Action::add_child(node_id.clone(), self.config.new_node_label.clone()));
    }

    /// The node's expand/collapse button.
    pub fn toggle_pressed(&self, node_id: &NodeId) {
        self.store.dispatch(Action::ToggleNodeExpansion {
            node_id: node_id.clone(),
        });
    }

    // === Callback factories ===

    /// Returns a callback for the canvas `scroll-event` handler.
    pub fn wheel_callback(&self) -> impl Fn(f32, f32, f32) -> bool + Clone {
        let ctrl = self.clone();
        move |x, y, delta| ctrl.wheel(x, y, delta)
    }

    /// Returns a callback for a node's `add-child-clicked`.
    pub fn add_child_callback(&self) -> impl Fn(SharedString) + Clone {
        let ctrl = self.clone();
        move |id| ctrl.add_child_pressed(&NodeId::from(id.as_str()))
    }

    /// Returns a callback for a node's `toggle-clicked`.
    pub fn toggle_callback(&self) -> impl Fn(SharedString) + Clone {
        let ctrl = self.clone();
        move |id| ctrl.toggle_pressed(&NodeId::from(id.as_str()))
    }
}
