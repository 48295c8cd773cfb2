use glam::Vec2;

/// 2D axis-aligned bounding box over UV/texel coordinates.
///
/// Starts empty (`mn = +INF`, `mx = -INF`); the first extended point
/// initializes both corners. Once non-empty, `mn <= mx` holds per axis.
/// Zero-width or zero-height boxes are legal and have zero area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub mn: Vec2,
    pub mx: Vec2,
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            mn: Vec2::INFINITY,
            mx: Vec2::NEG_INFINITY,
        }
    }
}

impl Aabb {
    /// Empty box; extending with any point initializes it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Smallest box covering all `points`. Empty input yields an empty box.
    pub fn from_points(points: &[Vec2]) -> Self {
        let mut aabb = Self::new();
        aabb.extend_by_points(points);
        aabb
    }

    pub fn is_empty(&self) -> bool {
        self.mn.x > self.mx.x || self.mn.y > self.mx.y
    }

    /// Grow to include `p`.
    pub fn extend_by_point(&mut self, p: Vec2) {
        self.mn = self.mn.min(p);
        self.mx = self.mx.max(p);
    }

    pub fn extend_by_points(&mut self, points: &[Vec2]) {
        for &p in points {
            self.extend_by_point(p);
        }
    }

    /// Whether `p` lies within the box expanded by `epsilon` on all sides.
    pub fn contains_point(&self, p: Vec2, epsilon: f32) -> bool {
        if self.is_empty() {
            return false;
        }
        self.mn.x - epsilon <= p.x
            && p.x <= self.mx.x + epsilon
            && self.mn.y - epsilon <= p.y
            && p.y <= self.mx.y + epsilon
    }

    /// Rectangle overlap test with `epsilon` slack, compared per axis.
    ///
    /// Covers the crossing configuration where neither box holds a corner
    /// of the other, which a corner-sampling test misses.
    pub fn intersects(&self, other: &Aabb, epsilon: f32) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.mn.x - epsilon <= other.mx.x
            && other.mn.x - epsilon <= self.mx.x
            && self.mn.y - epsilon <= other.mx.y
            && other.mn.y - epsilon <= self.mx.y
    }

    pub fn width(&self) -> f32 {
        if self.is_empty() { 0.0 } else { self.mx.x - self.mn.x }
    }

    pub fn height(&self) -> f32 {
        if self.is_empty() { 0.0 } else { self.mx.y - self.mn.y }
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// The four corners, min and max first.
    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.mn,
            self.mx,
            Vec2::new(self.mn.x, self.mx.y),
            Vec2::new(self.mx.x, self.mn.y),
        ]
    }

    /// Whether `other` fits entirely inside this box (within `epsilon`).
    pub fn contains_box(&self, other: &Aabb, epsilon: f32) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.contains_point(other.mn, epsilon)
            && self.contains_point(other.mx, epsilon)
    }
}

fn triangle_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    0.5 * (b - a).perp_dot(c - a).abs()
}

/// Area of a simple polygon given as an ordered loop of points.
///
/// Triangles and quads take the direct route; longer loops use the shoelace
/// formula. Fewer than three points is degenerate and yields zero.
pub fn polygon_area(points: &[Vec2]) -> f32 {
    match points.len() {
        0..=2 => 0.0,
        3 => triangle_area(points[0], points[1], points[2]),
        4 => {
            triangle_area(points[0], points[1], points[2])
                + triangle_area(points[0], points[2], points[3])
        }
        n => {
            let mut s = points[n - 1].x * points[0].y - points[0].x * points[n - 1].y;
            for i in 0..n - 1 {
                s += points[i].x * points[i + 1].y;
                s -= points[i + 1].x * points[i].y;
            }
            0.5 * s.abs()
        }
    }
}
