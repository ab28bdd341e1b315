//! Automatic arrangement of the visible tree.
//!
//! This module lays the visible part of a mind map out in layers using the
//! Sugiyama algorithm via the `rust-sugiyama` crate. The result is returned as
//! positions, or as `SetNodePosition` actions ready for the store, so the
//! arrangement goes through the same reducer as every other change.
//!
//! The layout API uses `f64` coordinates because the underlying `rust-sugiyama`
//! crate operates in `f64`. Positions are narrowed to `f32` only when turned
//! into actions.
//!
//! Requires the `layout` feature to be enabled.

use std::collections::HashMap;

use crate::graph::{MindMapState, NodeId, Position};
use crate::hit_test::NodeGeometry;
use crate::state::GeometryCache;
use crate::store::Action;
use crate::visibility::VisibleTree;
use tracing::debug;

/// Size assumed for nodes that have not been measured yet.
pub const DEFAULT_NODE_SIZE: (f64, f64) = (150.0, 40.0);

/// Layout direction for the Sugiyama algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum Direction {
    /// Layers flow top to bottom.
    TopToBottom,
    /// Layers flow left to right (default): the root on the left, each
    /// generation one column further right.
    #[default]
    LeftToRight,
}

/// A positioned node returned by [`sugiyama_layout`].
#[derive(Debug, Clone, PartialEq)]
pub struct NodePosition {
    pub id: NodeId,
    /// X coordinate of the node's top-left corner.
    pub x: f64,
    /// Y coordinate of the node's top-left corner.
    pub y: f64,
}

/// Configuration for the Sugiyama layout algorithm.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct SugiyamaConfig {
    /// Minimum spacing between vertices (default: 0.0, which uses the
    /// `rust-sugiyama` default of 10.0).
    pub vertex_spacing: f64,
    /// Minimum edge length between layers (default: 0, which uses the
    /// `rust-sugiyama` default of 1).
    pub minimum_length: u32,
    /// Whether to include dummy vertices in the layout (default: false).
    pub dummy_vertices: bool,
    /// Layout direction (default: [`Direction::LeftToRight`]).
    pub direction: Direction,
}

impl SugiyamaConfig {
    pub fn with_direction(direction: Direction) -> Self {
        Self {
            direction,
            ..Default::default()
        }
    }
}

/// Compute Sugiyama hierarchical layout positions.
///
/// Takes edges as `(parent, child)` pairs and node sizes as
/// `(node_id, (width, height))` pairs. Returns a [`NodePosition`] for each node.
///
/// Node ids are mapped to sequential `u32` indices internally for
/// `rust-sugiyama` and translated back before returning. Duplicate ids in
/// `node_sizes` are ignored (first occurrence wins); edges naming an unknown
/// node are dropped.
pub fn sugiyama_layout(
    edges: &[(NodeId, NodeId)],
    node_sizes: &[(NodeId, (f64, f64))],
    config: &SugiyamaConfig,
) -> Vec<NodePosition> {
    if node_sizes.is_empty() {
        return Vec::new();
    }

    let horizontal = config.direction == Direction::LeftToRight;

    let mut id_to_idx: HashMap<&NodeId, u32> = HashMap::with_capacity(node_sizes.len());
    let mut idx_to_id: Vec<&NodeId> = Vec::with_capacity(node_sizes.len());
    let mut vertices: Vec<(u32, (f64, f64))> = Vec::with_capacity(node_sizes.len());

    for (node_id, (w, h)) in node_sizes {
        if let std::collections::hash_map::Entry::Vacant(e) = id_to_idx.entry(node_id) {
            let idx = idx_to_id.len() as u32;
            e.insert(idx);
            idx_to_id.push(node_id);
            // For horizontal layout, swap width/height so the algorithm spaces
            // layers along what will become the x-axis.
            let size = if horizontal { (*h, *w) } else { (*w, *h) };
            vertices.push((idx, size));
        }
    }

    let mapped_edges: Vec<(u32, u32)> = edges
        .iter()
        .filter_map(|(src, dst)| Some((*id_to_idx.get(src)?, *id_to_idx.get(dst)?)))
        .collect();

    let mut sg_config = rust_sugiyama::configure::Config {
        dummy_vertices: config.dummy_vertices,
        ..Default::default()
    };
    if config.vertex_spacing > 0.0 {
        sg_config.vertex_spacing = config.vertex_spacing;
    }
    if config.minimum_length > 0 {
        sg_config.minimum_length = config.minimum_length;
    }

    // Returns Vec<(Vec<(usize, (f64, f64))>, f64, f64)>, one entry per subgraph
    let subgraphs = rust_sugiyama::from_vertices_and_edges(&vertices, &mapped_edges, &sg_config);

    let mut results = Vec::with_capacity(idx_to_id.len());
    for (layout, _width, _height) in &subgraphs {
        for &(idx, (x, y)) in layout {
            if let Some(node_id) = idx_to_id.get(idx) {
                let (px, py) = if horizontal { (y, x) } else { (x, y) };
                results.push(NodePosition {
                    id: (*node_id).clone(),
                    x: px,
                    y: py,
                });
            }
        }
    }

    results
}

/// Lay out the visible tree using measured node sizes.
///
/// Hidden nodes keep their positions and are not part of the result. The
/// whole arrangement is translated so the root stays where it is.
pub fn tree_layout<N>(state: &MindMapState, cache: &GeometryCache<N>, config: &SugiyamaConfig) -> Vec<NodePosition>
where
    N: NodeGeometry,
{
    let visible = VisibleTree::compute(state);

    let node_sizes: Vec<(NodeId, (f64, f64))> = visible
        .iter()
        .map(|id| {
            let size = cache.get(id).map_or(DEFAULT_NODE_SIZE, |geom| {
                let (_, _, w, h) = geom.rect();
                (w as f64, h as f64)
            });
            (id.clone(), size)
        })
        .collect();

    let edges: Vec<(NodeId, NodeId)> = visible
        .iter()
        .filter_map(|id| {
            let parent = state.get(id)?.parent_id.as_ref()?;
            visible.contains(parent).then(|| (parent.clone(), id.clone()))
        })
        .collect();

    let mut positions = sugiyama_layout(&edges, &node_sizes, config);

    if let Some(root) = state.root() {
        let (root_x, root_y) = (root.position.x as f64, root.position.y as f64);
        let offset = positions
            .iter()
            .find(|p| p.id == root.id)
            .map(|laid_out| (root_x - laid_out.x, root_y - laid_out.y));
        if let Some((dx, dy)) = offset {
            for p in &mut positions {
                if p.id == root.id {
                    // Exact, so the root never produces a move action.
                    (p.x, p.y) = (root_x, root_y);
                } else {
                    p.x += dx;
                    p.y += dy;
                }
            }
        }
    }

    debug!(nodes = positions.len(), edges = edges.len(), "tree layout computed");
    positions
}

/// Turn layout positions into `SetNodePosition` actions.
///
/// Nodes that are unknown or already in place produce no action.
pub fn arrange_actions(state: &MindMapState, positions: &[NodePosition]) -> Vec<Action> {
    positions
        .iter()
        .filter_map(|p| {
            let node = state.get(&p.id)?;
            let position = Position::new(p.x as f32, p.y as f32);
            (node.position != position).then(|| Action::SetNodePosition {
                node_id: p.id.clone(),
                position,
            })
        })
        .collect()
}
