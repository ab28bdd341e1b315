//! # Slint Mind Map Library
//!
//! The non-visual core of a mind-map canvas for Slint applications: a tree of
//! ideas with action-based updates, a pan/zoom view transform, measurement
//! driven geometry tracking and parent→child connector routing.
//!
//! ## Features
//!
//! - **Immutable State** - Every change is an [`Action`] applied by a pure reducer
//! - **Structural Sharing** - Consecutive states share all untouched nodes
//! - **Canvas-Space Geometry** - Measured boxes are cached independent of pan/zoom
//! - **Callback-Based Integration** - Factories return closures ready for Slint callbacks
//! - **Snapshots** - Export and validated import as JSON
//!
//! ## Quick Start
//!
//! ```ignore
//! use slint_mindmap::{Action, EditorConfig, MindMapController};
//!
//! let ctrl = MindMapController::new(EditorConfig::default());
//! let root = ctrl.state().root_id.clone();
//! ctrl.dispatch(Action::add_child(root, "First branch"));
//!
//! window.on_node_rect_changed(ctrl.node_rect_callback());
//! window.on_compute_edge_path(ctrl.compute_edge_path_callback());
//! ```
//!
//! ## Building Blocks
//!
//! - [`Store`] / [`reduce`] - Tree state and its actions
//! - [`Viewport`] / [`ViewTransform`] - Screen↔canvas mapping
//! - [`LayoutTracker`] / [`GeometryCache`] - Measured node geometry
//! - [`ConnectionRouter`] / [`route_edges`] - Visible edges as quadratic curves
//! - [`InteractionController`] - Pan, drag, zoom, edit and button handling
//! - [`MindMapController`] - All of the above behind one handle
//!
//! The `layout` feature adds automatic arrangement of the visible tree.

pub mod config;
pub mod graph;
pub mod store;
pub mod snapshot;
pub mod path;
pub mod viewport;
pub mod state;
pub mod tracking;
pub mod visibility;
pub mod links;
pub mod interaction;
pub mod controller;
#[cfg(feature = "layout")]
pub mod layout;

pub use config::EditorConfig;
pub use graph::{
    ConnectionStyle, LineStyle, MindMapState, Node, NodeId, NodeStyle, Position, TreeError,
};
pub use store::{reduce, Action, Store, SubscriptionId};
pub use snapshot::{SnapshotError, SnapshotResult};
pub use path::{distance_to_quadratic, generate_edge_path, QuadraticBezier};
pub use hit_test::{find_edge_at, find_node_at, NodeGeometry, SimpleNodeGeometry};
pub use viewport::{ViewTransform, Viewport};
pub use state::GeometryCache;
pub use tracking::LayoutTracker;
pub use visibility::{is_visible, VisibleTree};
pub use links::{parse_hex_color, route_edges, ConnectionRouter, EdgeRoute};
pub use interaction::{
    DragState, EditCommit, EditSession, Gesture, InteractionController, PanState, PointerButton,
    PointerTarget,
};
pub use controller::MindMapController;
#[cfg(feature = "layout")]
pub use layout::{arrange_actions, sugiyama_layout, tree_layout, Direction, NodePosition, SugiyamaConfig};
