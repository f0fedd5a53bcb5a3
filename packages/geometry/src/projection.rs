//! Local equirectangular projection between `[lng, lat]` degrees and
//! planar meters.
//!
//! Accurate to well under a centimeter for parcel-sized polygons away from
//! the poles, which is all the setback engine needs.

use crate::Point;

/// Mean Earth radius in meters (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Equirectangular projection anchored at a reference longitude/latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalProjection {
    origin: Point,
    meters_per_degree_x: f64,
    meters_per_degree_y: f64,
}

impl LocalProjection {
    /// Projection anchored at `origin` (`x` = longitude, `y` = latitude).
    #[must_use]
    pub fn new(origin: Point) -> Self {
        let meters_per_degree_y = EARTH_RADIUS_M.to_radians();
        let meters_per_degree_x = meters_per_degree_y * origin.y.to_radians().cos();
        Self {
            origin,
            meters_per_degree_x,
            meters_per_degree_y,
        }
    }

    /// Projection anchored at the mean of `points`, or `None` when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn centered_on(points: &[Point]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let count = points.len() as f64;
        let lng = points.iter().map(|p| p.x).sum::<f64>() / count;
        let lat = points.iter().map(|p| p.y).sum::<f64>() / count;
        Some(Self::new(Point::new(lng, lat)))
    }

    #[must_use]
    pub const fn origin(&self) -> Point {
        self.origin
    }

    /// Degrees to local meters.
    #[must_use]
    pub fn project(&self, lng_lat: Point) -> Point {
        Point::new(
            (lng_lat.x - self.origin.x) * self.meters_per_degree_x,
            (lng_lat.y - self.origin.y) * self.meters_per_degree_y,
        )
    }

    /// Local meters back to degrees.
    #[must_use]
    pub fn unproject(&self, meters: Point) -> Point {
        Point::new(
            self.origin.x + meters.x / self.meters_per_degree_x,
            self.origin.y + meters.y / self.meters_per_degree_y,
        )
    }

    #[must_use]
    pub fn project_all(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|p| self.project(*p)).collect()
    }

    #[must_use]
    pub fn unproject_all(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|p| self.unproject(*p)).collect()
    }
}
