#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Planar polygon primitives for site boundaries.
//!
//! Everything in this crate works on locally-planar coordinates in meters.
//! Geographic (`[lng, lat]`) input is projected with [`LocalProjection`]
//! before it reaches any of these operations. Nothing here knows about
//! setbacks or councils.

pub mod projection;

use geo::{Contains, Intersects};
use serde::{Deserialize, Serialize};

pub use projection::LocalProjection;

/// Tolerance used for coincident points and parallel-line detection.
pub const EPSILON: f64 = 1e-9;

/// Errors raised when a geometric invariant does not hold.
///
/// Input validation is expected to catch all of these before any geometry
/// runs, so seeing one at runtime points to a gap upstream.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// Fewer than three distinct points were supplied.
    #[error("polygon requires at least 3 distinct points, got {count}")]
    InsufficientPoints {
        /// Number of distinct points that were available.
        count: usize,
    },

    /// A coordinate was `NaN` or infinite.
    #[error("coordinate {index} is not finite: [{x}, {y}]")]
    NonFiniteCoordinate {
        /// Position of the offending point in the input sequence.
        index: usize,
        /// X (or longitude) component.
        x: f64,
        /// Y (or latitude) component.
        y: f64,
    },

    /// An edge index was outside the polygon.
    #[error("edge index {index} out of range for polygon with {edge_count} edges")]
    EdgeOutOfRange {
        /// Requested edge index.
        index: usize,
        /// Number of edges in the polygon.
        edge_count: usize,
    },
}

/// A point in a locally-planar coordinate system.
///
/// Serialized as a two-element `[x, y]` array to match the coordinate
/// pairs exchanged with map frontends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    /// Easting (or longitude before projection).
    pub x: f64,
    /// Northing (or latitude before projection).
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Whether the two points are within [`EPSILON`] of each other.
    #[must_use]
    pub fn coincides_with(self, other: Self) -> bool {
        self.distance(other) <= EPSILON
    }

    #[must_use]
    const fn translate(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

/// Vertex ordering of a polygon ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    CounterClockwise,
    Clockwise,
}

impl Winding {
    /// Winding implied by the sign of a shoelace sum. Zero-area rings are
    /// reported as counter-clockwise.
    #[must_use]
    pub fn from_signed_area(signed_area: f64) -> Self {
        if signed_area < 0.0 {
            Self::Clockwise
        } else {
            Self::CounterClockwise
        }
    }
}

/// A directed boundary segment from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub start: Point,
    pub end: Point,
}

impl Edge {
    #[must_use]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Unnormalized direction vector `end - start`.
    #[must_use]
    pub fn direction(&self) -> (f64, f64) {
        (self.end.x - self.start.x, self.end.y - self.start.y)
    }

    #[must_use]
    pub fn midpoint(&self) -> Point {
        Point::new(
            f64::midpoint(self.start.x, self.end.x),
            f64::midpoint(self.start.y, self.end.y),
        )
    }

    /// Unit normal pointing into a polygon with the given winding.
    ///
    /// Counter-clockwise rings keep their interior on the left of every
    /// edge, clockwise rings on the right. Zero-length edges yield `(0, 0)`.
    #[must_use]
    pub fn inward_normal(&self, winding: Winding) -> (f64, f64) {
        let length = self.length();
        if length <= EPSILON {
            return (0.0, 0.0);
        }
        let (dx, dy) = self.direction();
        match winding {
            Winding::CounterClockwise => (-dy / length, dx / length),
            Winding::Clockwise => (dy / length, -dx / length),
        }
    }
}

/// Translates both endpoints of `edge` along its inward normal.
///
/// The result is always parallel to the original edge. A distance of zero
/// returns the edge unchanged.
#[must_use]
pub fn offset_edge_inward(edge: &Edge, distance: f64, winding: Winding) -> Edge {
    if distance == 0.0 {
        return *edge;
    }
    let (nx, ny) = edge.inward_normal(winding);
    Edge::new(
        edge.start.translate(nx * distance, ny * distance),
        edge.end.translate(nx * distance, ny * distance),
    )
}

/// Intersection of the infinite lines through `a` and `b`.
///
/// Not bounded by the segments. Returns `None` when the lines are parallel
/// (including collinear) or either edge has zero length.
#[must_use]
pub fn intersect_lines(a: &Edge, b: &Edge) -> Option<Point> {
    let (adx, ady) = a.direction();
    let (bdx, bdy) = b.direction();
    let denom = cross(adx, ady, bdx, bdy);
    let scale = a.length() * b.length();

    if scale <= EPSILON || denom.abs() <= EPSILON * scale {
        return None;
    }

    let t = cross(b.start.x - a.start.x, b.start.y - a.start.y, bdx, bdy) / denom;
    Some(a.start.translate(adx * t, ady * t))
}

/// Signed shoelace area. Positive for counter-clockwise rings.
#[must_use]
pub fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    // Accumulate relative to the first vertex to limit cancellation on
    // large projected coordinates.
    let origin = points[0];
    let mut sum = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        sum += cross(a.x - origin.x, a.y - origin.y, b.x - origin.x, b.y - origin.y);
    }
    sum / 2.0
}

/// Absolute shoelace area in square coordinate units (m² for projected
/// input).
///
/// # Errors
///
/// Returns [`GeometryError::InsufficientPoints`] for fewer than 3 points.
pub fn polygon_area(points: &[Point]) -> Result<f64, GeometryError> {
    if points.len() < 3 {
        return Err(GeometryError::InsufficientPoints {
            count: points.len(),
        });
    }
    Ok(signed_area(points).abs())
}

/// Whether any two non-adjacent edges of the ring touch or cross.
///
/// Pairwise O(n²); site boundaries are small.
#[must_use]
pub fn is_self_intersecting(points: &[Point]) -> bool {
    let n = points.len();
    if n < 4 {
        return false;
    }

    for i in 0..n {
        let a1 = points[i];
        let a2 = points[(i + 1) % n];

        for j in (i + 2)..n {
            // The last edge is adjacent to the first
            if i == 0 && j == n - 1 {
                continue;
            }

            let b1 = points[j];
            let b2 = points[(j + 1) % n];

            if segments_intersect(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

fn segments_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);

    if d1 * d2 < 0.0 && d3 * d4 < 0.0 {
        return true;
    }

    (d1 == 0.0 && on_segment(b1, b2, a1))
        || (d2 == 0.0 && on_segment(b1, b2, a2))
        || (d3 == 0.0 && on_segment(a1, a2, b1))
        || (d4 == 0.0 && on_segment(a1, a2, b2))
}

/// Sign of the turn `a -> b -> c`, snapped to zero within [`EPSILON`].
fn orientation(a: Point, b: Point, c: Point) -> f64 {
    let value = cross(b.x - a.x, b.y - a.y, c.x - a.x, c.y - a.y);
    if value.abs() <= EPSILON {
        0.0
    } else {
        value.signum()
    }
}

/// Assumes `p` is collinear with `a`-`b`.
fn on_segment(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) - EPSILON
        && p.x <= a.x.max(b.x) + EPSILON
        && p.y >= a.y.min(b.y) - EPSILON
        && p.y <= a.y.max(b.y) + EPSILON
}

const fn cross(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    ax * by - ay * bx
}

/// An implicitly closed ring of at least three distinct points.
///
/// Construction strips coincident consecutive vertices (and a repeated
/// closing vertex), so every edge has non-zero length.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    /// Builds a polygon from raw points.
    ///
    /// # Errors
    ///
    /// * [`GeometryError::NonFiniteCoordinate`] if any point is `NaN` or
    ///   infinite
    /// * [`GeometryError::InsufficientPoints`] if fewer than 3 distinct
    ///   points remain after deduplication
    pub fn new(points: Vec<Point>) -> Result<Self, GeometryError> {
        if let Some((index, p)) = points.iter().enumerate().find(|(_, p)| !p.is_finite()) {
            return Err(GeometryError::NonFiniteCoordinate {
                index,
                x: p.x,
                y: p.y,
            });
        }

        let points = dedup_ring(points);
        if points.len() < 3 {
            return Err(GeometryError::InsufficientPoints {
                count: points.len(),
            });
        }
        Ok(Self { points })
    }

    /// Builds a polygon from `[x, y]` coordinate pairs.
    ///
    /// # Errors
    ///
    /// See [`Polygon::new`].
    pub fn from_coords(coords: &[[f64; 2]]) -> Result<Self, GeometryError> {
        Self::new(coords.iter().copied().map(Point::from).collect())
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    #[must_use]
    pub fn to_coords(&self) -> Vec<[f64; 2]> {
        self.points.iter().copied().map(Into::into).collect()
    }

    /// Number of vertices, which is also the number of edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; kept for API symmetry with [`Self::len`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Edge `index`, running from vertex `index` to vertex `index + 1`
    /// (wrapping).
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::EdgeOutOfRange`] if `index >= len()`.
    pub fn edge(&self, index: usize) -> Result<Edge, GeometryError> {
        let n = self.points.len();
        if index >= n {
            return Err(GeometryError::EdgeOutOfRange {
                index,
                edge_count: n,
            });
        }
        Ok(Edge::new(self.points[index], self.points[(index + 1) % n]))
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| Edge::new(self.points[i], self.points[(i + 1) % n]))
    }

    #[must_use]
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.points)
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    #[must_use]
    pub fn winding(&self) -> Winding {
        Winding::from_signed_area(self.signed_area())
    }

    /// Area-weighted centroid, falling back to the vertex mean for rings
    /// with no area.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn centroid(&self) -> Point {
        let n = self.points.len();
        let origin = self.points[0];
        let mut area2 = 0.0;
        let mut cx = 0.0;
        let mut cy = 0.0;

        for i in 0..n {
            let a = self.points[i].translate(-origin.x, -origin.y);
            let b = self.points[(i + 1) % n].translate(-origin.x, -origin.y);
            let c = cross(a.x, a.y, b.x, b.y);
            area2 += c;
            cx += (a.x + b.x) * c;
            cy += (a.y + b.y) * c;
        }

        if area2.abs() <= EPSILON {
            let count = n as f64;
            let sx: f64 = self.points.iter().map(|p| p.x).sum();
            let sy: f64 = self.points.iter().map(|p| p.y).sum();
            return Point::new(sx / count, sy / count);
        }

        Point::new(origin.x + cx / (3.0 * area2), origin.y + cy / (3.0 * area2))
    }

    #[must_use]
    pub fn is_self_intersecting(&self) -> bool {
        is_self_intersecting(&self.points)
    }

    /// Point-in-polygon test. Points on the boundary count as inside.
    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        self.to_geo().intersects(&geo::Point::new(point.x, point.y))
    }

    /// Whether `other` lies entirely within this polygon. Shared boundary
    /// segments are allowed; any part of `other` outside is not.
    #[must_use]
    pub fn contains_polygon(&self, other: &Self) -> bool {
        self.to_geo().contains(&other.to_geo())
    }

    /// Converts to a closed [`geo::Polygon`] with no interior rings.
    #[must_use]
    pub fn to_geo(&self) -> geo::Polygon<f64> {
        let exterior: Vec<geo::Coord<f64>> = self
            .points
            .iter()
            .map(|p| geo::Coord { x: p.x, y: p.y })
            .collect();
        // `Polygon::new` closes the ring
        geo::Polygon::new(geo::LineString::from(exterior), vec![])
    }
}

/// Removes coincident consecutive points, including a closing point equal
/// to the first. [`Polygon::new`] applies this to every ring it builds.
#[must_use]
pub fn dedup_ring(points: Vec<Point>) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_some_and(|last| last.coincides_with(p)) {
            continue;
        }
        out.push(p);
    }
    while out.len() > 1 && out[0].coincides_with(out[out.len() - 1]) {
        out.pop();
    }
    out
}
