//! Geometry primitives shared by every layer of the whiteboard.
//!
//! Points are plain `f32` pairs. Whether a point is in world space or screen
//! space is decided by the caller; the helpers here are space-agnostic.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// A 2D point (or vector) in either world or screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal component
    pub x: f32,
    /// Vertical component (grows downwards)
    pub y: f32,
}

impl Point {
    /// The origin.
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    /// Creates a point from its components.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length when the point is read as a vector.
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Distance between two points.
    pub fn distance(self, other: Point) -> f32 {
        (self - other).length()
    }

    /// Dot product of two vectors.
    pub fn dot(self, other: Point) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Returns `true` when both components are finite numbers.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Point {
    type Output = Point;

    fn div(self, rhs: f32) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point::new(x, y)
    }
}

/// Axis-aligned rectangle described by its minimum and maximum corners.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Top-left corner
    pub min: Point,
    /// Bottom-right corner
    pub max: Point,
}

impl Rect {
    /// Builds a rectangle from its top-left corner and its size.
    pub fn from_min_size(min: Point, width: f32, height: f32) -> Self {
        Self {
            min,
            max: Point::new(min.x + width, min.y + height),
        }
    }

    /// Builds the smallest rectangle containing both points, in any order.
    pub fn from_two_points(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Center point.
    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }

    /// Returns `true` when `point` lies inside the rectangle or on its border.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

/// One of the four edge midpoints of a node used as a connection endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Middle of the top edge
    Top,
    /// Middle of the right edge
    Right,
    /// Middle of the bottom edge
    Bottom,
    /// Middle of the left edge
    Left,
}

impl Anchor {
    /// All anchors, in hit-testing order.
    pub const ALL: [Anchor; 4] = [Anchor::Top, Anchor::Right, Anchor::Bottom, Anchor::Left];

    /// Short lowercase name, used in logs and the properties panel.
    pub fn name(self) -> &'static str {
        match self {
            Anchor::Top => "top",
            Anchor::Right => "right",
            Anchor::Bottom => "bottom",
            Anchor::Left => "left",
        }
    }
}

/// Returns the midpoint of the edge of `rect` named by `anchor`.
pub fn anchor_point(rect: &Rect, anchor: Anchor) -> Point {
    let w = rect.width();
    let h = rect.height();
    let Point { x, y } = rect.min;
    match anchor {
        Anchor::Top => Point::new(x + w / 2.0, y),
        Anchor::Right => Point::new(x + w, y + h / 2.0),
        Anchor::Bottom => Point::new(x + w / 2.0, y + h),
        Anchor::Left => Point::new(x, y + h / 2.0),
    }
}

/// Finds the anchor of `rect` closest to `point`.
///
/// # Arguments
///
/// * `rect` - The rectangle whose edge midpoints are candidates
/// * `point` - The probe position, in the same space as `rect`
/// * `max_distance` - Anchors further away than this are ignored
///
/// # Returns
///
/// The nearest anchor together with its distance, or `None` if every anchor is
/// further than `max_distance`.
pub fn nearest_anchor(rect: &Rect, point: Point, max_distance: f32) -> Option<(Anchor, f32)> {
    Anchor::ALL
        .iter()
        .map(|anchor| (*anchor, anchor_point(rect, *anchor).distance(point)))
        .filter(|(_, distance)| *distance <= max_distance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Calculates the distance from a point to a line segment.
///
/// Uses vector projection to find the closest point on the segment, clamped to
/// its endpoints. Degenerate segments fall back to point distance.
pub fn point_to_segment_distance(point: Point, start: Point, end: Point) -> f32 {
    let segment = end - start;
    let offset = point - start;
    let length_sq = segment.dot(segment);

    if length_sq < 0.0001 {
        return offset.length();
    }

    let t = (offset.dot(segment) / length_sq).clamp(0.0, 1.0);
    let projection = start + segment * t;
    point.distance(projection)
}
