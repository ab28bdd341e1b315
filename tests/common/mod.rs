//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use slint_mindmap::ViewTransform;
use std::cell::RefCell;
use std::rc::Rc;

/// Tracks callback invocations for testing.
///
/// Each field records calls to the corresponding callback with their arguments.
#[derive(Default, Clone)]
pub struct CallbackTracker {
    /// Count of store notifications
    pub state_changed: Rc<RefCell<usize>>,
    /// New transform of each viewport change
    pub transform_changed: Rc<RefCell<Vec<ViewTransform>>>,
    /// (node_id, x, y, width, height)
    pub node_rect_changed: Rc<RefCell<Vec<(String, f32, f32, f32, f32)>>>,
    /// Count of edge model syncs
    pub edges_synced: Rc<RefCell<usize>>,
}

impl CallbackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all recorded callbacks.
    pub fn clear(&self) {
        *self.state_changed.borrow_mut() = 0;
        self.transform_changed.borrow_mut().clear();
        self.node_rect_changed.borrow_mut().clear();
        *self.edges_synced.borrow_mut() = 0;
    }
}
