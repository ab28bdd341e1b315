//! JSON snapshots of a whole mind map.
//!
//! The format is the serde form of [`MindMapState`]: `rootId` plus a `nodes`
//! object keyed by id, each node in camelCase. Keys are ordered, so the same
//! state always exports to the same text.
//!
//! Import is the one place where outside data enters the store, so it is the
//! one place the tree invariants are checked.

use crate::graph::{MindMapState, TreeError};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while importing a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The text is not JSON of the expected shape.
    #[error("malformed snapshot: {0}")]
    Parse(#[from] serde_json::Error),
    /// Well-formed, but the nodes do not form a valid tree.
    #[error("invalid snapshot: {0}")]
    Invalid(#[from] TreeError),
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

impl MindMapState {
    pub fn to_json(&self) -> SnapshotResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> SnapshotResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a snapshot.
    ///
    /// New ids continue after the highest `node-<n>` in the snapshot.
    pub fn from_json(json: &str) -> SnapshotResult<MindMapState> {
        let mut state: MindMapState = serde_json::from_str(json)?;
        if let Err(err) = state.check_invariants() {
            debug!(error = %err, "snapshot rejected");
            return Err(err.into());
        }

        state.next_seq = state
            .nodes
            .keys()
            .filter_map(|id| id.as_str().strip_prefix("node-")?.parse::<u64>().ok())
            .max()
            .map_or(1, |n| n.saturating_add(1));
        Ok(state)
    }
}
