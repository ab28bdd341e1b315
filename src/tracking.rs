//! Measurement-driven node geometry.
//!
//! Nodes are drawn with an intrinsic, content-dependent size, so their width
//! and height are only known after the presentation layer has laid them out.
//! [`LayoutTracker`] receives those screen-space boxes, converts them to
//! canvas-logical coordinates with the current [`Viewport`] and stores them in
//! a [`GeometryCache`].
//!
//! # Example
//!
//! ```ignore
//! use slint_mindmap::{LayoutTracker, Viewport};
//!
//! let tracker = LayoutTracker::new(Viewport::default());
//!
//! // Wire up the measurement callback (one-time setup)
//! window.on_node_rect_changed(tracker.node_rect_callback());
//!
//! // Get the cache for routing and hit testing
//! let cache = tracker.cache();
//! ```

use crate::graph::NodeId;
use crate::hit_test::SimpleNodeGeometry;
use crate::state::GeometryCache;
use crate::viewport::Viewport;
use slint::SharedString;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;

/// Screen→canvas converting front end of a shared [`GeometryCache`].
///
/// Cloning the tracker shares the cache and the viewport.
#[derive(Clone)]
pub struct LayoutTracker {
    cache: Rc<RefCell<GeometryCache>>,
    viewport: Viewport,
}

impl LayoutTracker {
    /// Create a tracker with an empty cache.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            cache: Rc::new(RefCell::new(GeometryCache::new())),
            viewport,
        }
    }

    /// Create a tracker wrapping an existing cache.
    ///
    /// Useful when the cache is pre-seeded, e.g. from a previous session's
    /// measurements.
    pub fn with_cache(cache: Rc<RefCell<GeometryCache>>, viewport: Viewport) -> Self {
        Self { cache, viewport }
    }

    /// Get a clone of the internal cache reference.
    pub fn cache(&self) -> Rc<RefCell<GeometryCache>> {
        self.cache.clone()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Record a node's rendered box, given in screen coordinates.
    ///
    /// The box is converted with the transform current at the time of the
    /// call; a report that arrives after a zoom but was measured before it is
    /// stored with the new transform until the next report replaces it.
    pub fn report(&self, id: &NodeId, x: f32, y: f32, width: f32, height: f32) {
        let geometry = self.viewport.transform().screen_rect_to_canvas(x, y, width, height);
        trace!(node_id = %id, x = geometry.x, y = geometry.y, w = geometry.width, h = geometry.height, "geometry reported");
        self.cache.borrow_mut().insert(id.clone(), geometry);
    }

    /// Canvas-logical geometry of a node, if it has been measured.
    pub fn get(&self, id: &NodeId) -> Option<SimpleNodeGeometry> {
        self.cache.borrow().get(id).copied()
    }

    /// Drop a node's geometry, e.g. when it is no longer rendered.
    pub fn forget(&self, id: &NodeId) {
        self.cache.borrow_mut().remove(id);
    }

    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }

    /// Get a callback for node rectangle updates.
    ///
    /// Wire this to the Slint `on_node_rect_changed` callback:
    ///
    /// ```ignore
    /// window.on_node_rect_changed(tracker.node_rect_callback());
    /// ```
    ///
    /// The callback signature matches Slint's generated callback:
    /// `(id: string, x: length, y: length, width: length, height: length)`
    /// in screen coordinates.
    pub fn node_rect_callback(&self) -> impl Fn(SharedString, f32, f32, f32, f32) + Clone {
        let tracker = self.clone();
        move |id, x, y, width, height| {
            tracker.report(&NodeId::from(id.as_str()), x, y, width, height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::ViewTransform;

    #[test]
    fn test_tracker_new_creates_empty_cache() {
        let tracker = LayoutTracker::new(Viewport::default());
        assert!(tracker.is_empty());
        assert!(tracker.cache().borrow().node_rects.is_empty());
    }

    #[test]
    fn test_tracker_with_existing_cache() {
        let cache = Rc::new(RefCell::new(GeometryCache::new()));
        cache.borrow_mut().update_node_rect("a", 10.0, 20.0, 100.0, 50.0);

        let tracker = LayoutTracker::with_cache(cache.clone(), Viewport::default());

        // Should share the same cache
        assert!(tracker.get(&"a".into()).is_some());
    }

    #[test]
    fn test_report_identity_transform() {
        let tracker = LayoutTracker::new(Viewport::default());
        tracker.report(&"a".into(), 10.0, 20.0, 100.0, 50.0);
        assert_eq!(
            tracker.get(&"a".into()),
            Some(SimpleNodeGeometry::new(10.0, 20.0, 100.0, 50.0))
        );
    }

    #[test]
    fn test_report_inverts_current_transform() {
        let viewport = Viewport::default();
        viewport.set(ViewTransform::new(100.0, 50.0, 2.0));
        let tracker = LayoutTracker::new(viewport);

        tracker.report(&"a".into(), 300.0, 250.0, 200.0, 80.0);
        assert_eq!(
            tracker.get(&"a".into()),
            Some(SimpleNodeGeometry::new(100.0, 100.0, 100.0, 40.0))
        );
    }

    #[test]
    fn test_geometry_is_stable_across_transform_changes() {
        let viewport = Viewport::default();
        let tracker = LayoutTracker::new(viewport.clone());
        tracker.report(&"a".into(), 10.0, 10.0, 100.0, 40.0);

        // Cache is canvas-space: panning after the fact changes nothing.
        viewport.pan(500.0, 500.0);
        assert_eq!(
            tracker.get(&"a".into()),
            Some(SimpleNodeGeometry::new(10.0, 10.0, 100.0, 40.0))
        );
    }

    #[test]
    fn test_node_rect_callback_updates_cache() {
        let tracker = LayoutTracker::new(Viewport::default());
        let callback = tracker.node_rect_callback();

        callback(SharedString::from("node-1"), 10.0, 20.0, 100.0, 50.0);

        let node = tracker.get(&"node-1".into()).unwrap();
        assert_eq!(node.x, 10.0);
        assert_eq!(node.y, 20.0);
        assert_eq!(node.width, 100.0);
        assert_eq!(node.height, 50.0);
    }

    #[test]
    fn test_callback_is_clone() {
        let tracker = LayoutTracker::new(Viewport::default());

        let cb1 = tracker.node_rect_callback();
        let cb2 = cb1.clone();

        cb1(SharedString::from("a"), 0.0, 0.0, 100.0, 50.0);
        cb2(SharedString::from("b"), 100.0, 0.0, 100.0, 50.0);

        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_forget_and_clear() {
        let tracker = LayoutTracker::new(Viewport::default());
        tracker.report(&"a".into(), 0.0, 0.0, 1.0, 1.0);
        tracker.report(&"b".into(), 0.0, 0.0, 1.0, 1.0);
        tracker.forget(&"a".into());
        assert!(tracker.get(&"a".into()).is_none());
        assert_eq!(tracker.len(), 1);
        tracker.clear();
        assert!(tracker.is_empty());
    }
}
