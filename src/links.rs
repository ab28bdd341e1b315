//! Parent→child connectors for the mind map.
//!
//! This module provides [`route_edges`], which turns the current tree and the
//! measured geometry into one [`EdgeRoute`] per visible edge, and
//! [`ConnectionRouter`], which keeps those routes synchronized with a Slint
//! model for rendering.
//!
//! # Example
//!
//! ```ignore
//! use slint_mindmap::{ConnectionRouter, LayoutTracker, Store, Viewport};
//!
//! let store = Store::new();
//! let viewport = Viewport::default();
//! let tracker = LayoutTracker::new(viewport.clone());
//! window.on_node_rect_changed(tracker.node_rect_callback());
//!
//! let mut router = ConnectionRouter::new(store.clone(), tracker.cache(), viewport);
//!
//! // Bind once - auto-syncs on every update_routes call
//! let model = Rc::new(VecModel::<EdgePath>::default());
//! router.bind_model(model.clone(), |child_id, path, color, width, dash| EdgePath {
//!     id: child_id,
//!     path_commands: path,
//!     color,
//!     width,
//!     dash,
//! });
//! window.set_edge_paths(ModelRc::from(model));
//!
//! // Recompute whenever the tree, the geometry or the transform changed
//! router.update_routes();
//! ```

use crate::graph::{LineStyle, MindMapState, NodeId, Position, DEFAULT_EDGE_COLOR};
use crate::hit_test::{NodeGeometry, SimpleNodeGeometry};
use crate::path::QuadraticBezier;
use crate::state::GeometryCache;
use crate::store::Store;
use crate::viewport::{ViewTransform, Viewport};
use crate::visibility::VisibleTree;
use slint::{Model, SharedString, VecModel};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;

/// A routed edge from a parent's bottom-center to a child's top-center.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRoute {
    pub parent_id: NodeId,
    /// The child owns the edge; its id identifies the edge.
    pub child_id: NodeId,
    pub start: Position,
    pub control: Position,
    pub end: Position,
    /// Stroke color exactly as stored on the child.
    pub color: String,
    pub thickness: f32,
    pub line_style: LineStyle,
}

impl EdgeRoute {
    pub fn curve(&self) -> QuadraticBezier {
        QuadraticBezier {
            p0: self.start,
            p1: self.control,
            p2: self.end,
        }
    }

    /// SVG path command, e.g. "M 150 90 Q 200 40 250 200".
    pub fn path(&self) -> String {
        self.curve().to_svg()
    }

    /// `stroke-dasharray` value, `None` for solid edges.
    pub fn dash_pattern(&self) -> Option<&'static str> {
        self.line_style.dash_pattern()
    }

    pub fn stroke_color(&self) -> slint::Color {
        parse_hex_color(&self.color)
    }

    /// Map a canvas-space route into screen space.
    ///
    /// The stroke width scales with the view so edges keep their weight
    /// relative to the nodes.
    pub fn to_screen(&self, transform: &ViewTransform) -> EdgeRoute {
        let curve = self.curve().map(|p| transform.canvas_to_screen(p));
        EdgeRoute {
            start: curve.p0,
            control: curve.p1,
            end: curve.p2,
            thickness: self.thickness * transform.scale,
            ..self.clone()
        }
    }
}

/// Route every visible edge whose endpoints have been measured.
///
/// Edges come out in visible pre-order of their child, so the result is
/// stable for a given state. An edge with an unmeasured endpoint is skipped
/// for this pass; it reappears once the geometry is reported.
pub fn route_edges<N>(state: &MindMapState, cache: &GeometryCache<N>, max_offset: f32) -> Vec<EdgeRoute>
where
    N: NodeGeometry,
{
    let visible = VisibleTree::compute(state);
    let mut routes = Vec::with_capacity(visible.len().saturating_sub(1));

    for child_id in visible.iter() {
        let Some(child) = state.get(child_id) else { continue };
        let Some(parent_id) = &child.parent_id else { continue };
        if !visible.contains(parent_id) {
            continue;
        }

        let Some(curve) = cache.edge_curve(parent_id, child_id, max_offset) else {
            trace!(parent = %parent_id, child = %child_id, "edge skipped, geometry not reported yet");
            continue;
        };

        let style = &child.connection_style;
        routes.push(EdgeRoute {
            parent_id: parent_id.clone(),
            child_id: child_id.clone(),
            start: curve.p0,
            control: curve.p1,
            end: curve.p2,
            color: style.stroke_color().to_owned(),
            thickness: style.stroke_width(),
            line_style: style.line(),
        });
    }

    routes
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` into a Slint color.
///
/// Anything else yields the default edge color.
pub fn parse_hex_color(value: &str) -> slint::Color {
    try_parse_hex(value)
        .or_else(|| try_parse_hex(DEFAULT_EDGE_COLOR))
        .unwrap_or_else(|| slint::Color::from_rgb_u8(0xCB, 0xD5, 0xE1))
}

fn try_parse_hex(value: &str) -> Option<slint::Color> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|n| n * 17);

    match hex.len() {
        3 => Some(slint::Color::from_rgb_u8(nibble(0)?, nibble(1)?, nibble(2)?)),
        6 => Some(slint::Color::from_rgb_u8(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(slint::Color::from_argb_u8(byte(6)?, byte(0)?, byte(2)?, byte(4)?)),
        _ => None,
    }
}

/// Internal trait for auto-syncing to Slint models.
trait ModelSyncer {
    fn sync(&self, routes: &[EdgeRoute]);
}

/// Concrete implementation of ModelSyncer for a specific row type.
struct ConcreteModelSyncer<P, F> {
    model: Rc<VecModel<P>>,
    constructor: F,
}

impl<P, F> ModelSyncer for ConcreteModelSyncer<P, F>
where
    P: Clone + 'static,
    F: Fn(SharedString, SharedString, slint::Color, f32, SharedString) -> P,
{
    fn sync(&self, routes: &[EdgeRoute]) {
        // Update existing rows or add new ones
        for (i, route) in routes.iter().enumerate() {
            let item = (self.constructor)(
                SharedString::from(route.child_id.as_str()),
                SharedString::from(route.path().as_str()),
                route.stroke_color(),
                route.thickness,
                SharedString::from(route.dash_pattern().unwrap_or_default()),
            );
            if i < self.model.row_count() {
                self.model.set_row_data(i, item);
            } else {
                self.model.push(item);
            }
        }
        // Remove excess rows
        while self.model.row_count() > routes.len() {
            self.model.remove(self.model.row_count() - 1);
        }
    }
}

/// Keeps the routed edges of the current state, optionally mirrored into a
/// Slint model.
///
/// # Auto-Sync Mode
///
/// Use [`bind_model`](Self::bind_model) to enable automatic synchronization
/// to a Slint `VecModel`. After binding, every call to
/// [`update_routes`](Self::update_routes) rewrites the model in place with
/// screen-space paths.
pub struct ConnectionRouter<N = SimpleNodeGeometry> {
    store: Store,
    cache: Rc<RefCell<GeometryCache<N>>>,
    viewport: Viewport,
    /// Canvas-space routes from the last update
    routes: RefCell<Vec<EdgeRoute>>,
    max_offset: f32,
    /// Optional auto-sync to Slint model
    syncer: Option<Box<dyn ModelSyncer>>,
}

impl<N> ConnectionRouter<N>
where
    N: NodeGeometry,
{
    pub fn new(store: Store, cache: Rc<RefCell<GeometryCache<N>>>, viewport: Viewport) -> Self {
        Self {
            store,
            cache,
            viewport,
            routes: RefCell::new(Vec::new()),
            max_offset: 100.0,
            syncer: None,
        }
    }

    /// Set the cap on how far edges bow away from the straight line
    /// (default: 100.0).
    pub fn set_max_offset(&mut self, max_offset: f32) {
        self.max_offset = max_offset;
    }

    /// Bind to a Slint model for automatic synchronization.
    ///
    /// # Arguments
    ///
    /// * `model` - The VecModel to sync to
    /// * `constructor` - Function to create rows from
    ///   (child_id, path_commands, color, line_width, dash_pattern)
    pub fn bind_model<P, F>(&mut self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(SharedString, SharedString, slint::Color, f32, SharedString) -> P + 'static,
    {
        self.syncer = Some(Box::new(ConcreteModelSyncer { model, constructor }));
    }

    /// Recompute all routes from the current state and geometry.
    ///
    /// Call this whenever:
    /// - The store dispatched an action
    /// - Node geometry was reported
    /// - The view transform changed (only needed with a bound model)
    pub fn update_routes(&self) {
        let state = self.store.state();
        let routes = route_edges(&state, &self.cache.borrow(), self.max_offset);

        // Auto-sync to bound model if present
        if let Some(syncer) = &self.syncer {
            let transform = self.viewport.transform();
            let screen: Vec<EdgeRoute> = routes.iter().map(|r| r.to_screen(&transform)).collect();
            syncer.sync(&screen);
        }

        *self.routes.borrow_mut() = routes;
    }

    /// Canvas-space routes from the last [`update_routes`](Self::update_routes).
    pub fn routes(&self) -> Vec<EdgeRoute> {
        self.routes.borrow().clone()
    }

    /// Routes from the last update, mapped through the current transform.
    pub fn screen_routes(&self) -> Vec<EdgeRoute> {
        let transform = self.viewport.transform();
        self.routes
            .borrow()
            .iter()
            .map(|r| r.to_screen(&transform))
            .collect()
    }

    /// Canvas-space route of the edge ending at `child_id`, if it was routed.
    pub fn route_to(&self, child_id: &NodeId) -> Option<EdgeRoute> {
        self.routes
            .borrow()
            .iter()
            .find(|r| r.child_id == *child_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.routes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ConnectionStyle;
    use crate::store::Action;
    use slint::Color;

    struct Fixture {
        store: Store,
        cache: Rc<RefCell<GeometryCache>>,
        viewport: Viewport,
        a: NodeId,
        b: NodeId,
    }

    /// Root with two measured children, `a` to the lower right and `b` straight below.
    fn fixture() -> Fixture {
        let store = Store::new();
        let root = store.state().root_id.clone();
        store.dispatch(Action::add_child(root.clone(), "a"));
        store.dispatch(Action::add_child(root.clone(), "b"));
        let state = store.state();
        let a = state.get(&root).unwrap().children_ids[0].clone();
        let b = state.get(&root).unwrap().children_ids[1].clone();

        let cache = Rc::new(RefCell::new(GeometryCache::new()));
        cache.borrow_mut().update_node_rect(root, 0.0, 0.0, 100.0, 50.0);
        cache.borrow_mut().update_node_rect(a.clone(), 200.0, 100.0, 100.0, 50.0);
        cache.borrow_mut().update_node_rect(b.clone(), 0.0, 150.0, 100.0, 50.0);

        Fixture {
            store,
            cache,
            viewport: Viewport::default(),
            a,
            b,
        }
    }

    fn router(f: &Fixture) -> ConnectionRouter {
        ConnectionRouter::new(f.store.clone(), f.cache.clone(), f.viewport.clone())
    }

    #[test]
    fn test_routes_follow_visible_preorder() {
        let f = fixture();
        let routes = route_edges(&f.store.state(), &f.cache.borrow(), 100.0);
        let children: Vec<&NodeId> = routes.iter().map(|r| &r.child_id).collect();
        assert_eq!(children, vec![&f.a, &f.b]);
    }

    #[test]
    fn test_route_anchors() {
        let f = fixture();
        let routes = route_edges(&f.store.state(), &f.cache.borrow(), 100.0);
        let to_a = &routes[0];
        assert_eq!(to_a.start, Position::new(50.0, 50.0));
        assert_eq!(to_a.end, Position::new(250.0, 100.0));
        assert!(to_a.path().starts_with("M 50 50 Q "));
        assert!(to_a.path().ends_with(" 250 100"));
    }

    #[test]
    fn test_missing_geometry_skips_edge() {
        let f = fixture();
        f.cache.borrow_mut().remove(&f.a);
        let routes = route_edges(&f.store.state(), &f.cache.borrow(), 100.0);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].child_id, f.b);
    }

    #[test]
    fn test_collapsed_parent_hides_edges() {
        let f = fixture();
        let root = f.store.state().root_id.clone();
        f.store.dispatch(Action::ToggleNodeExpansion { node_id: root });
        let routes = route_edges(&f.store.state(), &f.cache.borrow(), 100.0);
        assert!(routes.is_empty());
    }

    #[test]
    fn test_default_edge_styling() {
        let f = fixture();
        let routes = route_edges(&f.store.state(), &f.cache.borrow(), 100.0);
        assert_eq!(routes[0].color, DEFAULT_EDGE_COLOR);
        assert_eq!(routes[0].thickness, 2.0);
        assert_eq!(routes[0].dash_pattern(), None);
    }

    #[test]
    fn test_connection_style_dash_patterns() {
        let f = fixture();
        for (name, expected) in [("dashed", Some("5,5")), ("dotted", Some("2,2")), ("solid", None)] {
            f.store.dispatch(Action::UpdateNodeConnectionStyle {
                node_id: f.a.clone(),
                connection_style: ConnectionStyle {
                    line_style: Some(name.into()),
                    ..Default::default()
                },
            });
            let routes = route_edges(&f.store.state(), &f.cache.borrow(), 100.0);
            assert_eq!(routes[0].dash_pattern(), expected, "line style {name}");
        }
    }

    #[test]
    fn test_to_screen_applies_transform() {
        let f = fixture();
        let routes = route_edges(&f.store.state(), &f.cache.borrow(), 100.0);
        let screen = routes[0].to_screen(&ViewTransform::new(10.0, 20.0, 2.0));
        assert_eq!(screen.start, Position::new(110.0, 120.0));
        assert_eq!(screen.end, Position::new(510.0, 220.0));
        assert_eq!(screen.thickness, 4.0);
        assert_eq!(screen.child_id, routes[0].child_id);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff0000"), Color::from_rgb_u8(255, 0, 0));
        assert_eq!(parse_hex_color("#0f0"), Color::from_rgb_u8(0, 255, 0));
        assert_eq!(parse_hex_color("#0000ff80"), Color::from_argb_u8(0x80, 0, 0, 255));
        assert_eq!(parse_hex_color("  #CBD5E1 "), Color::from_rgb_u8(0xCB, 0xD5, 0xE1));
    }

    #[test]
    fn test_parse_hex_color_falls_back() {
        let default = Color::from_rgb_u8(0xCB, 0xD5, 0xE1);
        assert_eq!(parse_hex_color("red"), default);
        assert_eq!(parse_hex_color("#12"), default);
        assert_eq!(parse_hex_color("#zzzzzz"), default);
        assert_eq!(parse_hex_color("#ééé"), default);
    }

    #[test]
    fn test_router_update_routes() {
        let f = fixture();
        let router = router(&f);
        assert!(router.is_empty());

        router.update_routes();
        assert_eq!(router.len(), 2);
        assert!(router.route_to(&f.b).is_some());
        assert!(router.route_to(&"nope".into()).is_none());
    }

    #[test]
    fn test_router_sees_new_nodes_after_update() {
        let f = fixture();
        let router = router(&f);
        router.update_routes();

        f.store.dispatch(Action::add_child(f.a.clone(), "a1"));
        let a1 = f.store.state().get(&f.a).unwrap().children_ids[0].clone();
        f.cache.borrow_mut().update_node_rect(a1.clone(), 400.0, 200.0, 100.0, 50.0);

        assert_eq!(router.len(), 2, "stale until updated");
        router.update_routes();
        assert_eq!(router.len(), 3);
        assert_eq!(router.route_to(&a1).unwrap().parent_id, f.a);
    }

    #[test]
    fn test_bound_model_syncs_in_place() {
        #[derive(Clone, Debug, PartialEq)]
        struct Row {
            id: SharedString,
            path: SharedString,
            color: Color,
            width: f32,
            dash: SharedString,
        }

        let f = fixture();
        let mut router = router(&f);
        let model = Rc::new(VecModel::<Row>::default());
        router.bind_model(model.clone(), |id, path, color, width, dash| Row {
            id,
            path,
            color,
            width,
            dash,
        });

        f.store.dispatch(Action::UpdateNodeConnectionStyle {
            node_id: f.b.clone(),
            connection_style: ConnectionStyle {
                color: Some("#ff0000".into()),
                line_style: Some("dashed".into()),
                ..Default::default()
            },
        });
        router.update_routes();
        assert_eq!(model.row_count(), 2);
        let row = model.row_data(1).unwrap();
        assert_eq!(row.id.as_str(), f.b.as_str());
        assert_eq!(row.color, Color::from_rgb_u8(255, 0, 0));
        assert_eq!(row.dash.as_str(), "5,5");
        assert_eq!(model.row_data(0).unwrap().dash.as_str(), "");

        // Excess rows are removed when edges disappear
        f.cache.borrow_mut().remove(&f.a);
        router.update_routes();
        assert_eq!(model.row_count(), 1);
    }

    #[test]
    fn test_bound_model_receives_screen_space_paths() {
        let f = fixture();
        let mut router = router(&f);
        let model = Rc::new(VecModel::<(SharedString, f32)>::default());
        router.bind_model(model.clone(), |_, path, _, width, _| (path, width));

        f.viewport.set(ViewTransform::new(100.0, 0.0, 2.0));
        router.update_routes();

        let (path, width) = model.row_data(0).unwrap();
        assert!(path.as_str().starts_with("M 200 100 Q "), "{path}");
        assert_eq!(width, 4.0);
        // The router's own routes stay in canvas space
        assert_eq!(router.routes()[0].start, Position::new(50.0, 50.0));
        assert_eq!(router.screen_routes()[0].start, Position::new(200.0, 100.0));
    }
}
