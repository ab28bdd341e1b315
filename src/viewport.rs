//! Pan/zoom mapping between screen space and canvas-logical space.
//!
//! `screen = canvas * scale + (x, y)`. Node positions and cached geometry are
//! always canvas-logical; only pointer input and reported element boxes are in
//! screen space.

use crate::config::EditorConfig;
use crate::graph::Position;
use crate::hit_test::SimpleNodeGeometry;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;

/// Translation in screen pixels plus a uniform scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl ViewTransform {
    pub const fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }

    pub fn new(x: f32, y: f32, scale: f32) -> Self {
        Self { x, y, scale }
    }

    /// A zero or negative scale is treated as 1 so conversions stay finite.
    fn safe_scale(&self) -> f32 {
        if self.scale > 0.0 {
            self.scale
        } else {
            1.0
        }
    }

    pub fn canvas_to_screen(&self, point: Position) -> Position {
        Position::new(point.x * self.scale + self.x, point.y * self.scale + self.y)
    }

    pub fn screen_to_canvas(&self, point: Position) -> Position {
        let s = self.safe_scale();
        Position::new((point.x - self.x) / s, (point.y - self.y) / s)
    }

    /// Convert a screen-space box into canvas-logical geometry.
    pub fn screen_rect_to_canvas(&self, x: f32, y: f32, width: f32, height: f32) -> SimpleNodeGeometry {
        let s = self.safe_scale();
        SimpleNodeGeometry {
            x: (x - self.x) / s,
            y: (y - self.y) / s,
            width: width / s,
            height: height / s,
        }
    }

    /// Translate by a raw screen delta.
    pub fn panned(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    /// Zoom one wheel tick around `cursor` (screen space).
    ///
    /// A positive `delta` zooms out (scale / step), a negative one zooms in
    /// (scale * step). The canvas point under the cursor stays put.
    pub fn zoomed_at(self, cursor: Position, delta: f32, config: &EditorConfig) -> Self {
        let factor = if delta > 0.0 {
            1.0 / config.zoom_step
        } else if delta < 0.0 {
            config.zoom_step
        } else {
            return self;
        };

        let old_scale = self.safe_scale();
        let new_scale = config.clamp_scale(old_scale * factor);
        let ratio = (new_scale - old_scale) / old_scale;
        let offset_x = cursor.x - self.x;
        let offset_y = cursor.y - self.y;

        Self {
            x: self.x - offset_x * ratio,
            y: self.y - offset_y * ratio,
            scale: new_scale,
        }
    }
}

type TransformListener = Rc<dyn Fn(ViewTransform)>;

/// Shared, observable owner of the current [`ViewTransform`].
///
/// Clone it to hand the same viewport to the tracker, the interaction
/// controller and the presentation layer.
#[derive(Clone)]
pub struct Viewport {
    transform: Rc<RefCell<ViewTransform>>,
    listeners: Rc<RefCell<Vec<TransformListener>>>,
    config: Rc<EditorConfig>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Rc::new(EditorConfig::default()))
    }
}

impl Viewport {
    pub fn new(config: Rc<EditorConfig>) -> Self {
        Self {
            transform: Rc::new(RefCell::new(ViewTransform::identity())),
            listeners: Rc::new(RefCell::new(Vec::new())),
            config,
        }
    }

    pub fn transform(&self) -> ViewTransform {
        *self.transform.borrow()
    }

    pub fn scale(&self) -> f32 {
        self.transform.borrow().scale
    }

    /// Register a callback fired with the new transform after every change.
    pub fn on_changed(&self, listener: impl Fn(ViewTransform) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    pub fn pan(&self, dx: f32, dy: f32) {
        let next = self.transform().panned(dx, dy);
        self.set(next);
    }

    pub fn set_translation(&self, x: f32, y: f32) {
        let current = self.transform();
        self.set(ViewTransform { x, y, ..current });
    }

    /// Zoom around a screen-space cursor. See [`ViewTransform::zoomed_at`].
    pub fn zoom_at(&self, cursor_x: f32, cursor_y: f32, delta: f32) {
        let current = self.transform();
        let next = current.zoomed_at(Position::new(cursor_x, cursor_y), delta, &self.config);
        trace!(from = current.scale, to = next.scale, "zoom");
        self.set(next);
    }

    pub fn reset(&self) {
        self.set(ViewTransform::identity());
    }

    /// Replace the transform; the scale is clamped to the configured range.
    pub fn set(&self, transform: ViewTransform) {
        let transform = ViewTransform {
            scale: self.config.clamp_scale(transform.scale),
            ..transform
        };
        {
            let mut current = self.transform.borrow_mut();
            if *current == transform {
                return;
            }
            *current = transform;
        }
        let listeners: Vec<TransformListener> = self.listeners.borrow().clone();
        for listener in listeners {
            listener(transform);
        }
    }

    pub fn screen_to_canvas(&self, x: f32, y: f32) -> Position {
        self.transform().screen_to_canvas(Position::new(x, y))
    }

    pub fn canvas_to_screen(&self, point: Position) -> Position {
        self.transform().canvas_to_screen(point)
    }
}
