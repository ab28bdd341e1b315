//! Tree data model for the mind map.
//!
//! [`MindMapState`] is an immutable value: every mutation goes through
//! [`crate::store::reduce`] and produces a new state. Nodes live behind [`Rc`]
//! so consecutive states share every node an action did not touch.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::ops::{Add, Sub};
use std::rc::Rc;
use thiserror::Error;

/// Id of the root node in a freshly created state.
pub const ROOT_ID: &str = "root";
/// Label of the root node in a freshly created state.
pub const ROOT_LABEL: &str = "Central Idea";
/// Canvas position of the root node in a freshly created state.
pub const ROOT_POSITION: Position = Position { x: 300.0, y: 200.0 };
/// Background assigned to children that inherit their parent's style.
pub const DEFAULT_BACKGROUND: &str = "#FFFFFF";
/// Edge stroke used when a child has no connection color.
pub const DEFAULT_EDGE_COLOR: &str = "#CBD5E1";
/// Edge stroke width used when a child has no connection thickness.
pub const DEFAULT_EDGE_THICKNESS: f32 = 2.0;

/// Opaque, stable node identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A point in canvas-logical coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Visual attributes of a node box.
///
/// Every field is an optional, unvalidated string handed to the presentation
/// layer as-is. The same type doubles as a partial update: `None` fields are
/// left alone by [`NodeStyle::merge`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
}

impl NodeStyle {
    /// Style of the root node in a fresh state.
    pub fn root_default() -> Self {
        Self {
            text_color: Some("#FFFFFF".into()),
            background_color: Some("#3B82F6".into()),
            font_size: Some("18px".into()),
            font_weight: Some("bold".into()),
            border_color: Some("#2563EB".into()),
            border_width: Some("2px".into()),
            border_style: Some("solid".into()),
            border_radius: Some("12px".into()),
            background_image: None,
        }
    }

    /// Shallow merge: fields set in `patch` replace ours, the rest survive.
    pub fn merge(&mut self, patch: &NodeStyle) {
        fn take(slot: &mut Option<String>, value: &Option<String>) {
            if let Some(value) = value {
                *slot = Some(value.clone());
            }
        }
        take(&mut self.text_color, &patch.text_color);
        take(&mut self.background_color, &patch.background_color);
        take(&mut self.font_size, &patch.font_size);
        take(&mut self.font_weight, &patch.font_weight);
        take(&mut self.border_color, &patch.border_color);
        take(&mut self.border_width, &patch.border_width);
        take(&mut self.border_style, &patch.border_style);
        take(&mut self.border_radius, &patch.border_radius);
        take(&mut self.background_image, &patch.background_image);
    }

    /// The style a new child takes from its parent.
    pub fn inherited(&self) -> Self {
        Self {
            background_color: Some(DEFAULT_BACKGROUND.into()),
            ..self.clone()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == NodeStyle::default()
    }
}

/// Stroke pattern of an edge, parsed from the stored line style string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

impl LineStyle {
    /// Unknown names fall back to a solid stroke.
    pub fn parse(name: &str) -> Self {
        match name {
            "dashed" => LineStyle::Dashed,
            "dotted" => LineStyle::Dotted,
            _ => LineStyle::Solid,
        }
    }

    /// SVG `stroke-dasharray` value, `None` for solid strokes.
    pub fn dash_pattern(self) -> Option<&'static str> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some("5,5"),
            LineStyle::Dotted => Some("2,2"),
        }
    }
}

/// Styling of the edge from a node to its parent, stored on the child.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_style: Option<String>,
}

impl ConnectionStyle {
    /// Connection style given to every new child.
    pub fn child_default() -> Self {
        Self {
            color: Some(DEFAULT_EDGE_COLOR.into()),
            thickness: Some(DEFAULT_EDGE_THICKNESS),
            line_style: Some("solid".into()),
        }
    }

    pub fn merge(&mut self, patch: &ConnectionStyle) {
        if let Some(color) = &patch.color {
            self.color = Some(color.clone());
        }
        if let Some(thickness) = patch.thickness {
            self.thickness = Some(thickness);
        }
        if let Some(line_style) = &patch.line_style {
            self.line_style = Some(line_style.clone());
        }
    }

    pub fn stroke_color(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_EDGE_COLOR)
    }

    pub fn stroke_width(&self) -> f32 {
        self.thickness.unwrap_or(DEFAULT_EDGE_THICKNESS)
    }

    pub fn line(&self) -> LineStyle {
        self.line_style
            .as_deref()
            .map(LineStyle::parse)
            .unwrap_or(LineStyle::Solid)
    }

    pub fn is_empty(&self) -> bool {
        *self == ConnectionStyle::default()
    }
}

/// One idea in the map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    #[serde(default)]
    pub children_ids: Vec<NodeId>,
    pub position: Position,
    #[serde(default = "expanded_by_default")]
    pub is_expanded: bool,
    #[serde(default, skip_serializing_if = "NodeStyle::is_empty")]
    pub style: NodeStyle,
    #[serde(default, skip_serializing_if = "ConnectionStyle::is_empty")]
    pub connection_style: ConnectionStyle,
}

fn expanded_by_default() -> bool {
    true
}

impl Node {
    pub fn new(id: NodeId, text: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            text: text.into(),
            html_content: None,
            parent_id: None,
            children_ids: Vec::new(),
            position,
            is_expanded: true,
            style: NodeStyle::default(),
            connection_style: ConnectionStyle::default(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Rich content when present and non-empty, the plain label otherwise.
    pub fn display_content(&self) -> &str {
        match self.html_content.as_deref() {
            Some(html) if !html.is_empty() => html,
            _ => &self.text,
        }
    }
}

/// Violations of the tree invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("root node {0} does not exist")]
    MissingRoot(NodeId),
    #[error("root node {0} has a parent")]
    RootHasParent(NodeId),
    #[error("node {0} has no parent but is not the root")]
    MultipleRoots(NodeId),
    #[error("node stored under key {key} carries id {id}")]
    KeyMismatch { key: NodeId, id: NodeId },
    #[error("node {node} references missing parent {parent}")]
    DanglingParent { node: NodeId, parent: NodeId },
    #[error("node {parent} lists missing child {child}")]
    DanglingChild { parent: NodeId, child: NodeId },
    #[error("node {parent} lists child {child}, whose parent is {actual:?}")]
    ParentMismatch {
        parent: NodeId,
        child: NodeId,
        actual: Option<NodeId>,
    },
    #[error("node {parent} lists child {child} more than once")]
    DuplicateChild { parent: NodeId, child: NodeId },
    #[error("node {node} is not listed among the children of {parent}")]
    NotListedByParent { node: NodeId, parent: NodeId },
    #[error("node {0} is not reachable from the root")]
    Unreachable(NodeId),
}

fn next_seq_after(seq: u64) -> u64 {
    seq.checked_add(1).unwrap_or(1)
}

/// The whole map: nodes keyed by id plus the root id.
///
/// Equality compares the tree only; the id counter is an allocation hint.
///
/// Sharing between successive states is per node: a reduction clones the map
/// itself (one `Rc` bump per entry) and allocates only the nodes it changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMapState {
    pub root_id: NodeId,
    pub nodes: BTreeMap<NodeId, Rc<Node>>,
    #[serde(skip)]
    pub(crate) next_seq: u64,
}

impl PartialEq for MindMapState {
    fn eq(&self, other: &Self) -> bool {
        self.root_id == other.root_id && self.nodes == other.nodes
    }
}

impl Default for MindMapState {
    fn default() -> Self {
        Self::new()
    }
}

impl MindMapState {
    /// A map holding only the default root.
    pub fn new() -> Self {
        let root_id = NodeId::from(ROOT_ID);
        let mut root = Node::new(root_id.clone(), ROOT_LABEL, ROOT_POSITION);
        root.style = NodeStyle::root_default();

        let mut nodes = BTreeMap::new();
        nodes.insert(root_id.clone(), Rc::new(root));
        Self {
            root_id,
            nodes,
            next_seq: 1,
        }
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id).map(|node| node.as_ref())
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn root(&self) -> Option<&Node> {
        self.get(&self.root_id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children<'a>(&'a self, id: &NodeId) -> impl Iterator<Item = &'a Node> + 'a {
        self.get(id)
            .into_iter()
            .flat_map(|node| node.children_ids.iter())
            .filter_map(move |child| self.get(child))
    }

    /// Next unused `node-<n>` id, starting from the state's counter.
    ///
    /// The counter wraps back to 1 once exhausted; taken ids are skipped, so
    /// the loop ends as long as the map holds fewer than `u64::MAX` nodes.
    pub(crate) fn fresh_id(&self) -> (NodeId, u64) {
        let mut seq = self.next_seq.max(1);
        loop {
            let id = NodeId::new(format!("node-{seq}"));
            if !self.nodes.contains_key(&id) {
                return (id, next_seq_after(seq));
            }
            seq = next_seq_after(seq);
        }
    }

    /// Verify the four tree invariants, reporting the first violation.
    pub fn check_invariants(&self) -> Result<(), TreeError> {
        let root = self
            .nodes
            .get(&self.root_id)
            .ok_or_else(|| TreeError::MissingRoot(self.root_id.clone()))?;
        if root.parent_id.is_some() {
            return Err(TreeError::RootHasParent(self.root_id.clone()));
        }

        for (key, node) in &self.nodes {
            if *key != node.id {
                return Err(TreeError::KeyMismatch {
                    key: key.clone(),
                    id: node.id.clone(),
                });
            }
            match &node.parent_id {
                None if *key != self.root_id => {
                    return Err(TreeError::MultipleRoots(key.clone()));
                }
                None => {}
                Some(parent_id) => {
                    let parent = self.nodes.get(parent_id).ok_or_else(|| {
                        TreeError::DanglingParent {
                            node: key.clone(),
                            parent: parent_id.clone(),
                        }
                    })?;
                    if !parent.children_ids.contains(key) {
                        return Err(TreeError::NotListedByParent {
                            node: key.clone(),
                            parent: parent_id.clone(),
                        });
                    }
                }
            }

            let mut seen = HashSet::with_capacity(node.children_ids.len());
            for child_id in &node.children_ids {
                if !seen.insert(child_id) {
                    return Err(TreeError::DuplicateChild {
                        parent: key.clone(),
                        child: child_id.clone(),
                    });
                }
                let child = self.nodes.get(child_id).ok_or_else(|| TreeError::DanglingChild {
                    parent: key.clone(),
                    child: child_id.clone(),
                })?;
                if child.parent_id.as_ref() != Some(key) {
                    return Err(TreeError::ParentMismatch {
                        parent: key.clone(),
                        child: child_id.clone(),
                        actual: child.parent_id.clone(),
                    });
                }
            }
        }

        // With consistent links on both sides, a node outside the root's
        // subtree can only sit on a parent cycle.
        let mut reached = HashSet::with_capacity(self.nodes.len());
        let mut stack = vec![&self.root_id];
        while let Some(id) = stack.pop() {
            if !reached.insert(id) {
                continue;
            }
            if let Some(node) = self.nodes.get(id) {
                stack.extend(node.children_ids.iter());
            }
        }
        if let Some(orphan) = self.nodes.keys().find(|id| !reached.contains(id)) {
            return Err(TreeError::Unreachable(orphan.clone()));
        }

        Ok(())
    }
}
