//! Test harness simulating a presentation layer.
//!
//! Wires a [`MindMapController`] the way a Slint window would: every state or
//! transform change re-renders the visible nodes, which reports their screen
//! boxes back through the node-rect callback, and the edge model is re-synced.
//! Nodes render with a fixed canvas size so tests can compute screen
//! positions by hand.

#![allow(dead_code)]

use super::CallbackTracker;
use slint::{Color, Model, SharedString, VecModel};
use slint_mindmap::{
    Action, EditorConfig, MindMapController, MindMapState, NodeId, PointerButton, PointerTarget,
    Position,
};
use std::cell::Cell;
use std::rc::Rc;

/// Canvas-space size of every rendered node.
pub const NODE_WIDTH: f32 = 120.0;
pub const NODE_HEIGHT: f32 = 40.0;

/// One row of the bound edge model.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeRow {
    pub child_id: SharedString,
    pub path: SharedString,
    pub color: Color,
    pub width: f32,
    pub dash: SharedString,
}

pub struct MindMapTestHarness {
    pub ctrl: MindMapController,
    pub edges: Rc<VecModel<EdgeRow>>,
    pub tracker: CallbackTracker,
    /// When false, state changes no longer trigger a render pass
    pub auto_render: Rc<Cell<bool>>,
}

impl MindMapTestHarness {
    /// Harness around a fresh map holding only the root.
    pub fn new() -> Self {
        Self::with_state(MindMapState::new())
    }

    pub fn with_state(state: MindMapState) -> Self {
        let ctrl = MindMapController::with_state(state, EditorConfig::default());
        let tracker = CallbackTracker::new();
        let auto_render = Rc::new(Cell::new(true));

        let edges = Rc::new(VecModel::<EdgeRow>::default());
        ctrl.bind_edge_model(edges.clone(), |child_id, path, color, width, dash| EdgeRow {
            child_id,
            path,
            color,
            width,
            dash,
        });

        ctrl.store().subscribe({
            let ctrl = ctrl.clone();
            let tracker = tracker.clone();
            let auto_render = auto_render.clone();
            move |_| {
                *tracker.state_changed.borrow_mut() += 1;
                if auto_render.get() {
                    render(&ctrl, &tracker);
                }
            }
        });

        ctrl.viewport().on_changed({
            let ctrl = ctrl.clone();
            let tracker = tracker.clone();
            let auto_render = auto_render.clone();
            move |transform| {
                tracker.transform_changed.borrow_mut().push(transform);
                if auto_render.get() {
                    render(&ctrl, &tracker);
                }
            }
        });

        let harness = Self {
            ctrl,
            edges,
            tracker,
            auto_render,
        };
        harness.render();
        harness
    }

    /// Run one render pass: report every visible node's box and sync edges.
    pub fn render(&self) {
        render(&self.ctrl, &self.tracker);
    }

    pub fn state(&self) -> Rc<MindMapState> {
        self.ctrl.state()
    }

    pub fn root(&self) -> NodeId {
        self.state().root_id.clone()
    }

    pub fn children(&self, id: &NodeId) -> Vec<NodeId> {
        self.state()
            .get(id)
            .map(|n| n.children_ids.clone())
            .unwrap_or_default()
    }

    pub fn position(&self, id: &NodeId) -> Position {
        self.state().get(id).map(|n| n.position).unwrap_or_default()
    }

    /// Add a child through the node's add button and return its id.
    pub fn add_child(&self, parent: &NodeId) -> NodeId {
        self.ctrl.interaction().add_child_pressed(parent);
        self.children(parent).last().cloned().unwrap_or_else(|| parent.clone())
    }

    /// Add a child with a given label and return its id.
    pub fn add_labeled(&self, parent: &NodeId, text: &str) -> NodeId {
        self.ctrl.dispatch(Action::add_child(parent.clone(), text));
        self.children(parent).last().cloned().unwrap_or_else(|| parent.clone())
    }

    /// Screen-space center of a rendered node.
    pub fn node_center(&self, id: &NodeId) -> Option<(f32, f32)> {
        let geom = self.ctrl.tracker().get(id)?;
        let center = self.ctrl.viewport().canvas_to_screen(Position::new(
            geom.x + geom.width / 2.0,
            geom.y + geom.height / 2.0,
        ));
        Some((center.x, center.y))
    }

    pub fn edge_row(&self, child: &NodeId) -> Option<EdgeRow> {
        (0..self.edges.row_count())
            .filter_map(|i| self.edges.row_data(i))
            .find(|row| row.child_id.as_str() == child.as_str())
    }

    // === Pointer helpers ===

    pub fn mouse_down(&self, x: f32, y: f32) -> PointerTarget {
        self.ctrl.interaction().pointer_down(x, y, PointerButton::Left)
    }

    pub fn mouse_down_button(&self, x: f32, y: f32, button: PointerButton) -> PointerTarget {
        self.ctrl.interaction().pointer_down(x, y, button)
    }

    pub fn mouse_move(&self, x: f32, y: f32) -> bool {
        self.ctrl.interaction().pointer_move(x, y)
    }

    pub fn mouse_up(&self) {
        self.ctrl.interaction().pointer_up();
    }

    /// Simulate a complete drag from start to end in `steps` moves.
    pub fn drag(&self, start_x: f32, start_y: f32, end_x: f32, end_y: f32, steps: usize) {
        self.mouse_down(start_x, start_y);
        let steps = steps.max(1);
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            self.mouse_move(start_x + (end_x - start_x) * t, start_y + (end_y - start_y) * t);
        }
        self.mouse_up();
    }

    /// Simulate scroll (for zoom).
    pub fn scroll(&self, x: f32, y: f32, delta_y: f32) -> bool {
        self.ctrl.interaction().wheel(x, y, delta_y)
    }
}

impl Default for MindMapTestHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn render(ctrl: &MindMapController, tracker: &CallbackTracker) {
    let state = ctrl.state();
    let transform = ctrl.viewport().transform();
    let report = ctrl.node_rect_callback();

    for id in ctrl.visible_nodes() {
        let Some(node) = state.get(&id) else { continue };
        let screen = transform.canvas_to_screen(node.position);
        let (w, h) = (NODE_WIDTH * transform.scale, NODE_HEIGHT * transform.scale);
        tracker
            .node_rect_changed
            .borrow_mut()
            .push((id.to_string(), screen.x, screen.y, w, h));
        report(SharedString::from(id.as_str()), screen.x, screen.y, w, h);
    }

    ctrl.refresh_edges();
    *tracker.edges_synced.borrow_mut() += 1;
}
