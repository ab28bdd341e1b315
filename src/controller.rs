//! High-level controller for mind map applications.
//!
//! The [`MindMapController`] reduces boilerplate by owning the store, the
//! viewport, geometry tracking, edge routing and input handling in one place,
//! all built from a single [`EditorConfig`].
//!
//! # Example
//!
//! ```ignore
//! use slint_mindmap::{EditorConfig, MindMapController, PointerButton};
//!
//! slint::include_modules!();
//!
//! fn main() {
//!     let window = MainWindow::new().unwrap();
//!     let ctrl = MindMapController::new(EditorConfig::default());
//!     let w = window.as_weak();
//!
//!     // Geometry tracking
//!     window.on_node_rect_changed(ctrl.node_rect_callback());
//!     window.on_compute_edge_path(ctrl.compute_edge_path_callback());
//!
//!     // Input
//!     window.on_canvas_scrolled(ctrl.interaction().wheel_callback());
//!     window.on_add_child_clicked(ctrl.interaction().add_child_callback());
//!     window.on_toggle_clicked(ctrl.interaction().toggle_callback());
//!     window.on_pointer_moved({
//!         let ctrl = ctrl.clone();
//!         move |x, y| { ctrl.interaction().pointer_move(x, y); }
//!     });
//!
//!     // Re-render whenever the tree changes
//!     ctrl.store().subscribe({
//!         let w = w.clone();
//!         move |state| {
//!             if let Some(w) = w.upgrade() {
//!                 w.set_nodes(to_node_model(state));
//!             }
//!         }
//!     });
//!
//!     window.run().unwrap();
//! }
//! ```

use crate::config::EditorConfig;
use crate::graph::{MindMapState, NodeId};
use crate::hit_test::find_edge_at;
use crate::interaction::InteractionController;
use crate::links::{ConnectionRouter, EdgeRoute};
use crate::snapshot::SnapshotResult;
use crate::store::{Action, Store};
use crate::tracking::LayoutTracker;
use crate::viewport::Viewport;
use crate::visibility::{is_visible, VisibleTree};
use slint::{SharedString, VecModel};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// Controller that owns the editor's state and provides callback implementations.
///
/// This provides a high-level API that handles:
/// - The tree store and its actions
/// - Geometry caching in **canvas space**
/// - Edge routing (canvas→screen conversion done internally)
/// - Pan, zoom, drag and inline editing
///
/// Clone this controller to share it across callbacks; all clones drive the
/// same editor.
#[derive(Clone)]
pub struct MindMapController {
    config: Rc<EditorConfig>,
    store: Store,
    viewport: Viewport,
    tracker: LayoutTracker,
    router: Rc<RefCell<ConnectionRouter>>,
    interaction: InteractionController,
}

impl Default for MindMapController {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl MindMapController {
    /// Create a controller around a fresh map holding only the root.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_state(MindMapState::new(), config)
    }

    /// Create a controller around an existing map.
    pub fn with_state(state: MindMapState, config: EditorConfig) -> Self {
        let config = Rc::new(config);
        let store = Store::with_state(state);
        let viewport = Viewport::new(config.clone());
        let tracker = LayoutTracker::new(viewport.clone());

        let mut router = ConnectionRouter::new(store.clone(), tracker.cache(), viewport.clone());
        router.set_max_offset(config.max_bow_offset);

        let interaction =
            InteractionController::new(store.clone(), viewport.clone(), tracker.clone(), config.clone());

        Self {
            config,
            store,
            viewport,
            tracker,
            router: Rc::new(RefCell::new(router)),
            interaction,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn tracker(&self) -> &LayoutTracker {
        &self.tracker
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    pub fn router(&self) -> Rc<RefCell<ConnectionRouter>> {
        self.router.clone()
    }

    /// Current state snapshot.
    pub fn state(&self) -> Rc<MindMapState> {
        self.store.state()
    }

    pub fn dispatch(&self, action: Action) -> Rc<MindMapState> {
        self.store.dispatch(action)
    }

    // === Callback factories ===

    /// Returns a callback for `node-rect-changed` (screen-space boxes).
    pub fn node_rect_callback(&self) -> impl Fn(SharedString, f32, f32, f32, f32) + Clone {
        self.tracker.node_rect_callback()
    }

    /// Returns a callback for `compute-edge-path`.
    ///
    /// The second argument is a version counter the UI bumps to force
    /// re-evaluation; it is otherwise ignored.
    pub fn compute_edge_path_callback(&self) -> impl Fn(SharedString, i32) -> SharedString + Clone {
        let ctrl = self.clone();
        move |child_id, _version| ctrl.compute_edge_path(&NodeId::from(child_id.as_str()))
    }

    // === Direct handlers ===

    /// Handle node-rect-changed: convert screen→canvas and update the cache.
    pub fn handle_node_rect(&self, id: &str, x: f32, y: f32, w: f32, h: f32) {
        self.tracker.report(&NodeId::from(id), x, y, w, h);
    }

    /// Bind the edge rows of the UI; see [`ConnectionRouter::bind_model`].
    pub fn bind_edge_model<P, F>(&self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(SharedString, SharedString, slint::Color, f32, SharedString) -> P + 'static,
    {
        self.router.borrow_mut().bind_model(model, constructor);
    }

    /// Recompute routes (and the bound edge model) from the current state,
    /// geometry and transform.
    pub fn refresh_edges(&self) {
        self.router.borrow().update_routes();
    }

    /// All visible, measured edges in canvas space.
    pub fn edge_routes(&self) -> Vec<EdgeRoute> {
        let router = self.router.borrow();
        router.update_routes();
        router.routes()
    }

    /// Screen-space SVG path of the edge ending at `child_id`.
    ///
    /// Empty when the edge is hidden or either endpoint is unmeasured.
    pub fn compute_edge_path(&self, child_id: &NodeId) -> SharedString {
        let state = self.store.state();
        let Some(parent_id) = state.get(child_id).and_then(|n| n.parent_id.as_ref()) else {
            return SharedString::default();
        };
        if !is_visible(&state, child_id) {
            return SharedString::default();
        }

        let cache = self.tracker.cache();
        let curve = cache
            .borrow()
            .edge_curve(parent_id, child_id, self.config.max_bow_offset);
        let transform = self.viewport.transform();
        curve
            .map(|c| c.map(|p| transform.canvas_to_screen(p)).to_svg())
            .unwrap_or_default()
            .into()
    }

    /// Visible node ids in paint order (parents before children).
    pub fn visible_nodes(&self) -> Vec<NodeId> {
        VisibleTree::compute(&self.store.state()).iter().cloned().collect()
    }

    // === Screen-space hit-testing facades ===

    /// Topmost visible node under a screen position.
    pub fn find_node_at_screen(&self, x: f32, y: f32) -> Option<NodeId> {
        self.interaction.node_at(x, y)
    }

    /// Child id of the edge closest to a screen position, within the
    /// configured hover distance.
    pub fn find_edge_at_screen(&self, x: f32, y: f32) -> Option<NodeId> {
        let routes = {
            let router = self.router.borrow();
            router.update_routes();
            router.screen_routes()
        };
        find_edge_at(
            x,
            y,
            &routes,
            self.config.edge_hit_distance,
            self.config.edge_hit_samples,
        )
        .cloned()
    }

    // === Snapshots ===

    pub fn export_snapshot(&self) -> SnapshotResult<String> {
        self.store.state().to_json()
    }

    /// Replace the whole map with a validated snapshot.
    ///
    /// On error the current map is left untouched. On success the geometry
    /// cache is cleared, since it describes nodes of the previous map.
    pub fn import_snapshot(&self, json: &str) -> SnapshotResult<()> {
        let state = MindMapState::from_json(json)?;
        debug!(nodes = state.len(), "snapshot imported");
        self.interaction.pointer_up();
        self.interaction.cancel_edit();
        self.tracker.clear();
        self.store.replace(state);
        self.refresh_edges();
        Ok(())
    }

    // === Arrangement ===

    /// Lay out the visible tree and dispatch the resulting moves.
    ///
    /// Returns the number of nodes moved.
    #[cfg(feature = "layout")]
    pub fn auto_arrange(&self, config: &crate::layout::SugiyamaConfig) -> usize {
        let state = self.store.state();
        let positions = {
            let cache = self.tracker.cache();
            let cache = cache.borrow();
            crate::layout::tree_layout(&state, &cache, config)
        };
        let actions = crate::layout::arrange_actions(&state, &positions);
        let moved = actions.len();
        for action in actions {
            self.store.dispatch(action);
        }
        moved
    }
}
