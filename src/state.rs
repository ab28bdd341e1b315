use std::collections::HashMap;
use crate::graph::NodeId;
use crate::hit_test::{find_node_at, NodeGeometry, SimpleNodeGeometry};
use crate::path::QuadraticBezier;

/// Measured node geometry in canvas-logical coordinates.
///
/// Filled from the presentation layer's measurement callbacks, independently
/// of the tree store, so an entry may lag behind the node's stored position
/// until the next report arrives.
///
/// Generic over N to allow using specialized node types that implement NodeGeometry.
pub struct GeometryCache<N = SimpleNodeGeometry> {
    pub node_rects: HashMap<NodeId, N>,
}

impl<N> Default for GeometryCache<N> {
    fn default() -> Self {
        Self {
            node_rects: HashMap::new(),
        }
    }
}

impl<N> GeometryCache<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &NodeId) -> Option<&N> {
        self.node_rects.get(id)
    }

    pub fn insert(&mut self, id: NodeId, geometry: N) {
        self.node_rects.insert(id, geometry);
    }

    pub fn remove(&mut self, id: &NodeId) -> Option<N> {
        self.node_rects.remove(id)
    }

    pub fn clear(&mut self) {
        self.node_rects.clear();
    }

    pub fn len(&self) -> usize {
        self.node_rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_rects.is_empty()
    }
}

impl<N> GeometryCache<N>
where
    N: NodeGeometry,
{
    /// Find the topmost node at a canvas position among `paint_order`.
    ///
    /// Nodes without geometry are skipped.
    pub fn find_node_at<'a, I>(&'a self, x: f32, y: f32, paint_order: I) -> Option<&'a NodeId>
    where
        I: IntoIterator<Item = &'a NodeId>,
    {
        find_node_at(
            x,
            y,
            paint_order
                .into_iter()
                .filter_map(|id| self.node_rects.get_key_value(id)),
        )
    }

    /// Curve between a parent and a child, `None` while either is unmeasured.
    pub fn edge_curve(&self, parent: &NodeId, child: &NodeId, max_offset: f32) -> Option<QuadraticBezier> {
        let parent = self.node_rects.get(parent)?;
        let child = self.node_rects.get(child)?;
        Some(QuadraticBezier::from_endpoints(
            parent.bottom_center(),
            child.top_center(),
            max_offset,
        ))
    }
}

/// Convenience implementation for the default SimpleNodeGeometry
impl GeometryCache<SimpleNodeGeometry> {
    /// Update a node's rectangle (canvas coordinates)
    pub fn update_node_rect(&mut self, id: impl Into<NodeId>, x: f32, y: f32, width: f32, height: f32) {
        self.node_rects
            .insert(id.into(), SimpleNodeGeometry::new(x, y, width, height));
    }
}
