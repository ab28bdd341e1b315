use crate::graph::Position;

/// Quadratic bezier curve used for parent→child connectors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticBezier {
    pub p0: Position, // Start point
    pub p1: Position, // Control point
    pub p2: Position, // End point
}

impl QuadraticBezier {
    /// Create a curve that bows away from the straight start→end line
    ///
    /// The control point is the midpoint displaced perpendicular to the
    /// start→end direction (angle + 90°) by `min(|dx|, max_offset)`. Vertically
    /// stacked endpoints therefore get a straight line, and siblings fanning
    /// out to either side bow consistently.
    ///
    /// # Arguments
    /// * `start` - Parent anchor (bottom-center)
    /// * `end` - Child anchor (top-center)
    /// * `max_offset` - Upper bound on the bow (default: 100.0)
    pub fn from_endpoints(start: Position, end: Position, max_offset: f32) -> Self {
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        let mid = Position::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
        let offset = dx.abs().min(max_offset);
        let angle = dy.atan2(dx) + std::f32::consts::FRAC_PI_2;

        QuadraticBezier {
            p0: start,
            p1: Position::new(mid.x + offset * angle.cos(), mid.y + offset * angle.sin()),
            p2: end,
        }
    }

    /// Evaluate the curve at parameter t (0.0 to 1.0)
    pub fn eval(&self, t: f32) -> Position {
        let mt = 1.0 - t;
        let a = mt * mt;
        let b = 2.0 * mt * t;
        let c = t * t;
        Position::new(
            a * self.p0.x + b * self.p1.x + c * self.p2.x,
            a * self.p0.y + b * self.p1.y + c * self.p2.y,
        )
    }

    /// SVG path command, e.g. "M 10 20 Q 60 20 90 80"
    pub fn to_svg(&self) -> String {
        format!(
            "M {} {} Q {} {} {} {}",
            self.p0.x, self.p0.y, self.p1.x, self.p1.y, self.p2.x, self.p2.y
        )
    }

    /// Map every point through `f` (used for canvas→screen conversion).
    ///
    /// Exact for affine maps, which preserve bezier control polygons.
    pub fn map(&self, f: impl Fn(Position) -> Position) -> Self {
        QuadraticBezier {
            p0: f(self.p0),
            p1: f(self.p1),
            p2: f(self.p2),
        }
    }
}

/// Generate SVG path command for a parent→child connector
///
/// # Arguments
/// * `start` - Parent bottom-center
/// * `end` - Child top-center
/// * `max_offset` - Upper bound on the bow (default: 100.0)
///
/// # Returns
/// SVG path command string (e.g., "M 150 90 Q 200 40 250 200")
pub fn generate_edge_path(start: Position, end: Position, max_offset: f32) -> String {
    QuadraticBezier::from_endpoints(start, end, max_offset).to_svg()
}

/// Calculate squared distance from a point to a line segment
fn distance_to_line_segment_sq(point: Position, a: Position, b: Position) -> f32 {
    let ab = (b.x - a.x, b.y - a.y);
    let ap = (point.x - a.x, point.y - a.y);

    let ab_len_sq = ab.0 * ab.0 + ab.1 * ab.1;

    if ab_len_sq < f32::EPSILON {
        // Degenerate segment (a == b)
        return ap.0 * ap.0 + ap.1 * ap.1;
    }

    // Project point onto line, clamped to segment
    let t = ((ap.0 * ab.0 + ap.1 * ab.1) / ab_len_sq).clamp(0.0, 1.0);

    let dx = point.x - (a.x + t * ab.0);
    let dy = point.y - (a.y + t * ab.1);
    dx * dx + dy * dy
}

/// Calculate the minimum distance from a point to a quadratic bezier curve
///
/// Approximates the curve with `num_samples` line segments (0 means 20).
pub fn distance_to_quadratic(point: Position, curve: &QuadraticBezier, num_samples: usize) -> f32 {
    let num_samples = if num_samples == 0 { 20 } else { num_samples };

    let mut min_dist_sq = f32::MAX;
    let mut prev = curve.eval(0.0);

    for i in 1..=num_samples {
        let t = i as f32 / num_samples as f32;
        let curr = curve.eval(t);
        min_dist_sq = min_dist_sq.min(distance_to_line_segment_sq(point, prev, curr));
        prev = curr;
    }

    min_dist_sq.sqrt()
}
