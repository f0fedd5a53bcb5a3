//! Edge-offset inset of a site boundary.
//!
//! Every edge is moved inward by its own setback distance and each pair of
//! neighbouring offset edges is intersected to find the new corner. When
//! the setbacks cross over each other the candidate ring inverts or
//! self-intersects, which is reported as [`Inset::Degenerate`] rather than
//! as an error.

use std::collections::BTreeMap;

use site_planner_geometry::{
    EPSILON, Edge, Point, Polygon, intersect_lines, is_self_intersecting, offset_edge_inward,
    signed_area,
};
use site_planner_setback_models::{EdgeClassification, EdgeSetbackDetail, SetbackRequirements};

/// Why an inset produced no usable polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateReason {
    /// Fewer than three distinct corners survived.
    Collapsed,
    /// The ring turned inside out or shrank to nothing.
    NonPositiveArea,
    /// An offset edge ran backwards because opposing setbacks crossed.
    Inverted,
    /// Offset edges crossed each other.
    SelfIntersecting,
}

/// Outcome of insetting a boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Inset {
    /// The buildable ring, in the same winding and edge order as the site.
    Buildable(Vec<Point>),
    Degenerate(DegenerateReason),
}

impl Inset {
    #[must_use]
    pub fn points(&self) -> Option<&[Point]> {
        match self {
            Self::Buildable(points) => Some(points),
            Self::Degenerate(_) => None,
        }
    }
}

/// Looks up the setback for every edge of `site`.
///
/// Roles without a matching requirement (water with no water setback,
/// unclassified) use the side distance and are flagged as such.
#[must_use]
pub fn applied_setbacks(
    site: &Polygon,
    classification: &EdgeClassification,
    requirements: &SetbackRequirements,
) -> Vec<EdgeSetbackDetail> {
    site.edges()
        .enumerate()
        .map(|(i, edge)| {
            let role = classification.role(i);
            let (distance_m, side_fallback) = requirements.distance_for(role);
            if side_fallback {
                log::debug!("Edge {i} ({role}) has no matching requirement; using side setback");
            }
            EdgeSetbackDetail {
                role,
                distance_m,
                length_m: edge.length(),
                side_fallback,
            }
        })
        .collect()
}

/// Keys setback details by edge index for the result contract.
#[must_use]
pub fn details_by_edge(details: Vec<EdgeSetbackDetail>) -> BTreeMap<usize, EdgeSetbackDetail> {
    details.into_iter().enumerate().collect()
}

/// Furthest a re-stitched corner may sit from its source vertex, in
/// multiples of the larger of its two setbacks, before the two edges are
/// treated as parallel. Only applies where the boundary turns by less than
/// a right angle.
pub const MITER_LIMIT: f64 = 4.0;

/// Offsets every edge of `site` inward by `distances[i]` and rebuilds the
/// ring from the corner intersections.
///
/// Corners between two zero-distance edges keep the original vertex, so an
/// all-zero inset returns the site unchanged. Corners between parallel
/// offset edges use the end of the incoming offset edge. So do corners
/// where a nearly straight boundary changes setback: their offset lines
/// meet far outside the site (see [`MITER_LIMIT`]).
///
/// # Panics
///
/// Panics if `distances` does not have one entry per edge.
#[must_use]
pub fn inset_polygon(site: &Polygon, distances: &[f64]) -> Inset {
    let n = site.len();
    assert_eq!(distances.len(), n, "one setback distance per edge");

    let winding = site.winding();
    let edges: Vec<Edge> = site.edges().collect();
    let offsets: Vec<Edge> = edges
        .iter()
        .zip(distances)
        .map(|(edge, distance)| offset_edge_inward(edge, *distance, winding))
        .collect();

    // Corner i starts edge i and ends edge i - 1
    let raw: Vec<Point> = (0..n)
        .map(|i| {
            let prev = (i + n - 1) % n;
            let vertex = site.points()[i];
            if distances[prev] == 0.0 && distances[i] == 0.0 {
                return vertex;
            }

            let limit = MITER_LIMIT * distances[prev].max(distances[i]);
            match intersect_lines(&offsets[prev], &offsets[i]) {
                Some(point)
                    if !(same_heading(&edges[prev], &edges[i])
                        && point.distance(vertex) > limit) =>
                {
                    point
                }
                Some(_) => {
                    log::debug!(
                        "Edges {prev} and {i} are nearly collinear; using offset endpoint as corner"
                    );
                    offsets[prev].end
                }
                None => {
                    log::debug!("Edges {prev} and {i} are parallel; using offset endpoint as corner");
                    offsets[prev].end
                }
            }
        })
        .collect();

    let reversed = site.edges().enumerate().any(|(i, edge)| {
        let (ex, ey) = edge.direction();
        let (start, end) = (raw[i], raw[(i + 1) % n]);
        (end.x - start.x) * ex + (end.y - start.y) * ey < -EPSILON
    });

    let mut corners: Vec<Point> = Vec::with_capacity(n);
    for corner in raw {
        if corners.last().is_some_and(|last| last.coincides_with(corner)) {
            continue;
        }
        corners.push(corner);
    }
    while corners.len() > 1 && corners[0].coincides_with(corners[corners.len() - 1]) {
        corners.pop();
    }

    if corners.len() < 3 {
        return Inset::Degenerate(DegenerateReason::Collapsed);
    }

    // Same sign as the site when the ring kept its orientation
    let oriented_area = signed_area(&corners) * site.signed_area().signum();
    if oriented_area <= EPSILON {
        return Inset::Degenerate(DegenerateReason::NonPositiveArea);
    }

    if reversed {
        return Inset::Degenerate(DegenerateReason::Inverted);
    }

    if is_self_intersecting(&corners) {
        return Inset::Degenerate(DegenerateReason::SelfIntersecting);
    }

    Inset::Buildable(corners)
}

/// Whether the boundary turns by less than a right angle from `a` to `b`.
fn same_heading(a: &Edge, b: &Edge) -> bool {
    let (ax, ay) = a.direction();
    let (bx, by) = b.direction();
    ax * bx + ay * by > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_planner_geometry::polygon_area;

    fn rectangle(w: f64, h: f64) -> Polygon {
        Polygon::from_coords(&[[0.0, 0.0], [w, 0.0], [w, h], [0.0, h]]).unwrap()
    }

    fn area(inset: &Inset) -> f64 {
        inset.points().map_or(0.0, |p| polygon_area(p).unwrap())
    }

    #[test]
    fn mixed_setbacks_on_rectangle() {
        // front (bottom) 4.5, sides 1.5, rear (top) 3.5
        let inset = inset_polygon(&rectangle(20.0, 15.0), &[4.5, 1.5, 3.5, 1.5]);
        let points = inset.points().unwrap();

        let expected = [[1.5, 4.5], [18.5, 4.5], [18.5, 11.5], [1.5, 11.5]];
        for (p, e) in points.iter().zip(expected) {
            assert!((p.x - e[0]).abs() < 1e-9 && (p.y - e[1]).abs() < 1e-9, "{p:?}");
        }
        assert!((area(&inset) - 119.0).abs() < 1e-9);
    }

    #[test]
    fn zero_setbacks_return_the_site_exactly() {
        let site = Polygon::from_coords(&[
            [0.0, 0.0],
            [13.7, 1.1],
            [15.2, 9.8],
            [6.1, 14.3],
            [-2.0, 8.0],
        ])
        .unwrap();
        let inset = inset_polygon(&site, &[0.0; 5]);
        assert_eq!(inset.points().unwrap(), site.points());
    }

    #[test]
    fn clockwise_site_insets_inward() {
        let site =
            Polygon::from_coords(&[[0.0, 0.0], [0.0, 10.0], [10.0, 10.0], [10.0, 0.0]]).unwrap();
        let inset = inset_polygon(&site, &[1.0; 4]);
        assert!((area(&inset) - 64.0).abs() < 1e-9);
    }

    #[test]
    fn crossing_setbacks_are_degenerate() {
        // The offset square is the site rotated half a turn, so only the
        // reversed edges give it away
        let inset = inset_polygon(&rectangle(10.0, 10.0), &[6.0; 4]);
        assert_eq!(inset, Inset::Degenerate(DegenerateReason::Inverted));

        // Front and rear overlap on a shallow lot and flip the ring over
        let inset = inset_polygon(&rectangle(10.0, 4.0), &[3.0, 1.0, 3.0, 1.0]);
        assert_eq!(inset, Inset::Degenerate(DegenerateReason::NonPositiveArea));
    }

    #[test]
    fn setbacks_meeting_in_the_middle_are_degenerate() {
        let inset = inset_polygon(&rectangle(10.0, 10.0), &[5.0; 4]);
        assert!(matches!(inset, Inset::Degenerate(_)));
    }

    #[test]
    fn collinear_vertex_uses_offset_endpoint() {
        // Bottom side split into two collinear edges
        let site = Polygon::from_coords(&[
            [0.0, 0.0],
            [10.0, 0.0],
            [20.0, 0.0],
            [20.0, 10.0],
            [0.0, 10.0],
        ])
        .unwrap();
        let inset = inset_polygon(&site, &[2.0, 2.0, 1.0, 1.0, 1.0]);
        let points = inset.points().unwrap();

        assert!(points.iter().any(|p| (p.x - 10.0).abs() < 1e-9 && (p.y - 2.0).abs() < 1e-9));
        assert!((area(&inset) - 18.0 * 7.0).abs() < 1e-9);
    }

    #[test]
    fn slight_kink_between_different_setbacks_keeps_the_envelope() {
        let straight = Polygon::from_coords(&[
            [0.0, 0.0],
            [15.0, 0.0],
            [30.0, 0.0],
            [30.0, 20.0],
            [0.0, 20.0],
        ])
        .unwrap();
        let distances = [4.5, 1.5, 1.5, 3.5, 1.5];
        let baseline = area(&inset_polygon(&straight, &distances));
        assert!((baseline - 344.25).abs() < 1e-9);

        for dy in [0.001, -0.001, 0.05, 0.3, -0.3] {
            let kinked = Polygon::from_coords(&[
                [0.0, 0.0],
                [15.0, -dy],
                [30.0, 0.0],
                [30.0, 20.0],
                [0.0, 20.0],
            ])
            .unwrap();
            let inset = inset_polygon(&kinked, &distances);
            assert!(inset.points().is_some(), "dy {dy}: {inset:?}");
            assert!(
                (area(&inset) - baseline).abs() < 10.0,
                "dy {dy}: {} vs {baseline}",
                area(&inset)
            );
        }
    }

    #[test]
    fn sharp_corners_still_use_the_intersection() {
        // Turns of 30 degrees stay well inside the miter limit
        let site = Polygon::from_coords(&[
            [0.0, 0.0],
            [20.0, 0.0],
            [20.0 + 10.0 * 3f64.sqrt(), 10.0],
            [20.0, 25.0],
            [0.0, 25.0],
        ])
        .unwrap();
        let inset = inset_polygon(&site, &[4.5, 1.5, 1.5, 3.5, 1.5]);
        let points = inset.points().unwrap();
        let offsets: Vec<Edge> = site
            .edges()
            .zip([4.5, 1.5])
            .map(|(edge, d)| offset_edge_inward(&edge, d, site.winding()))
            .collect();
        let expected = intersect_lines(&offsets[0], &offsets[1]).unwrap();
        assert!(points[1].coincides_with(expected));
    }

    #[test]
    fn chamfer_shorter_than_its_setbacks_is_swallowed() {
        // Known limitation of re-stitching neighbours only: a short edge
        // whose offset falls behind both neighbours turns the ring over
        let site = Polygon::from_coords(&[
            [0.0, 0.0],
            [19.5, 0.0],
            [20.0, 0.5],
            [20.0, 15.0],
            [0.0, 15.0],
        ])
        .unwrap();
        let inset = inset_polygon(&site, &[4.5, 1.5, 1.5, 3.5, 1.5]);
        assert!(matches!(inset, Inset::Degenerate(_)));
    }

    #[test]
    fn concave_site_keeps_its_notch() {
        let l_shape = Polygon::from_coords(&[
            [0.0, 0.0],
            [20.0, 0.0],
            [20.0, 8.0],
            [8.0, 8.0],
            [8.0, 20.0],
            [0.0, 20.0],
        ])
        .unwrap();
        let inset = inset_polygon(&l_shape, &[1.0; 6]);
        // Outer 18x18 minus the 12x12 notch
        assert!((area(&inset) - (18.0 * 18.0 - 12.0 * 12.0)).abs() < 1e-9);
    }

    #[test]
    fn larger_setbacks_never_grow_the_area() {
        let site = rectangle(30.0, 20.0);
        let mut previous = f64::INFINITY;
        for step in 0..40 {
            let front = f64::from(step) * 0.5;
            let current = area(&inset_polygon(&site, &[front, 1.5, 3.5, 1.5]));
            assert!(current <= previous + 1e-9, "front {front}: {current} > {previous}");
            previous = current;
        }
        assert!(previous.abs() < f64::EPSILON);
    }
}
