//! Pre- and post-condition checks around a buildable area calculation.
//!
//! Every rule that fails contributes one message; nothing short-circuits
//! at the first violation, so callers can show the user everything that
//! needs fixing in one go.

use std::collections::BTreeSet;

use site_planner_geometry::{
    EPSILON, Point, Polygon, dedup_ring, is_self_intersecting, signed_area,
};
use site_planner_setback_models::{
    BuildableAreaRequest, BuildableAreaResult, CompassDirection, CoordinateSpace,
    EdgeClassificationInput, NullRolePolicy, RequirementsInput, SetbackRole,
};

use crate::{CalculationOptions, project_coords};
use crate::classifier::has_explicit_roles;

/// Ordered list of rule violations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<String>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    #[must_use]
    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    /// `(valid, errors)`.
    #[must_use]
    pub fn into_parts(self) -> (bool, Vec<String>) {
        (self.errors.is_empty(), self.errors)
    }

    fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn extend(&mut self, messages: impl IntoIterator<Item = String>) {
        self.errors.extend(messages);
    }
}

/// Checks a request before any geometry runs.
#[must_use]
pub fn validate_buildable_area_inputs(
    request: &BuildableAreaRequest,
    options: &CalculationOptions,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    let edge_count = validate_site_coords(
        &request.site_coords,
        request.coordinate_space,
        options,
        &mut report,
    );

    if let Some(requirements) = &request.requirements {
        report.extend(validate_requirements(requirements));
    }

    validate_classifications(
        &request.edge_classifications,
        edge_count,
        options.null_role_policy,
        &mut report,
    );

    if let Some(hint) = &request.frontage
        && let Err(unknown) = CompassDirection::parse_hint(hint)
    {
        report.push(format!(
            "Unknown frontage direction '{unknown}': expected a compass direction or 'auto'"
        ));
    }

    report
}

/// Validates the boundary and returns its edge count once duplicate
/// vertices are removed, or `None` if the boundary is unusable.
fn validate_site_coords(
    coords: &[[f64; 2]],
    space: CoordinateSpace,
    options: &CalculationOptions,
    report: &mut ValidationReport,
) -> Option<usize> {
    if coords.len() < 3 {
        report.push(format!(
            "Site boundary needs at least 3 points, got {}",
            coords.len()
        ));
        return None;
    }
    if coords.len() > options.max_vertices {
        report.push(format!(
            "Site boundary has {} points; at most {} are accepted",
            coords.len(),
            options.max_vertices
        ));
        return None;
    }

    let mut finite = true;
    for (i, [x, y]) in coords.iter().enumerate() {
        if !x.is_finite() || !y.is_finite() {
            report.push(format!("Site coordinate {i} is not a finite number pair"));
            finite = false;
        } else if space == CoordinateSpace::Geographic
            && (!(-180.0..=180.0).contains(x) || !(-90.0..=90.0).contains(y))
        {
            report.push(format!(
                "Site coordinate {i} [{x}, {y}] is outside longitude/latitude range"
            ));
            finite = false;
        }
    }
    if !finite {
        return None;
    }

    // Same projection and dedup as the engine, so edge counts agree
    let (points, _) = project_coords(coords, space);
    let ring = dedup_ring(points);

    if ring.len() < 3 {
        report.push(format!(
            "Site boundary needs at least 3 distinct points, got {}",
            ring.len()
        ));
        return None;
    }

    if signed_area(&ring).abs() <= EPSILON {
        report.push("Site boundary encloses no area");
    }
    if is_self_intersecting(&ring) {
        report.push("Site boundary is self-intersecting");
    }

    Some(ring.len())
}

/// Checks a requirement set: `front`, `side`, and `rear` must all be
/// present, finite, and non-negative. `water` is optional but held to the
/// same rules when given.
#[must_use]
pub fn validate_requirements(requirements: &RequirementsInput) -> Vec<String> {
    let mut errors = Vec::new();

    for (name, value) in [
        ("front", requirements.front),
        ("side", requirements.side),
        ("rear", requirements.rear),
    ] {
        match value {
            None => errors.push(format!("Missing required setback '{name}'")),
            Some(v) => check_distance(name, v, &mut errors),
        }
    }
    if let Some(water) = requirements.water {
        check_distance("water", water, &mut errors);
    }

    errors
}

fn check_distance(name: &str, value: f64, errors: &mut Vec<String>) {
    if !value.is_finite() {
        errors.push(format!("Setback '{name}' must be a finite number"));
    } else if value < 0.0 {
        errors.push(format!("Setback '{name}' must not be negative, got {value}"));
    }
}

fn validate_classifications(
    entries: &[EdgeClassificationInput],
    edge_count: Option<usize>,
    policy: NullRolePolicy,
    report: &mut ValidationReport,
) {
    if let Some(n) = edge_count
        && entries.len() > n
    {
        report.push(format!(
            "Got {} edge classifications for a boundary with {n} edges",
            entries.len()
        ));
    }

    let mut seen = BTreeSet::new();

    for (position, entry) in entries.iter().enumerate() {
        let index = entry.edge_index.unwrap_or(position);

        if let Some(n) = edge_count
            && index >= n
        {
            report.push(format!(
                "Edge classification refers to edge {index}, but the site boundary has {n} edges"
            ));
        }
        if !seen.insert(index) {
            report.push(format!("Edge {index} is classified more than once"));
        }

        match entry.role.as_deref() {
            Some(role) if role.trim().parse::<SetbackRole>().is_err() => {
                report.push(format!("Unknown edge type '{role}' for edge {index}"));
            }
            None if policy == NullRolePolicy::Reject && has_explicit_roles(entries) => {
                report.push(format!("Edge {index} has no classification"));
            }
            _ => {}
        }
    }

    if policy == NullRolePolicy::Reject
        && has_explicit_roles(entries)
        && let Some(n) = edge_count
    {
        for index in (0..n).filter(|i| !seen.contains(i)) {
            report.push(format!("Edge {index} has no classification"));
        }
    }
}

/// Checks an assembled result. Findings are reported; the result itself is
/// left untouched.
#[must_use]
pub fn validate_buildable_area_result(
    result: &BuildableAreaResult,
    options: &CalculationOptions,
) -> ValidationReport {
    let mut report = ValidationReport::default();
    let area = result.buildable_area_m2;

    if !area.is_finite() {
        report.push("Buildable area is not a finite number");
    } else {
        if area < 0.0 {
            report.push(format!("Buildable area is negative: {area}"));
        }
        let limit = result.site_area_m2 + options.area_tolerance_for(result.site_area_m2);
        if area > limit {
            report.push(format!(
                "Buildable area {area:.3} m² exceeds site area {:.3} m²",
                result.site_area_m2
            ));
        }
    }

    if !(0.0..=1.0).contains(&result.coverage_ratio) {
        report.push(format!(
            "Coverage ratio {} is outside [0, 1]",
            result.coverage_ratio
        ));
    }

    if !result.buildable_coords.is_empty() {
        if result.buildable_coords.len() < 3 {
            report.push(format!(
                "Buildable polygon has only {} points",
                result.buildable_coords.len()
            ));
        } else {
            let ring: Vec<Point> = result
                .buildable_coords
                .iter()
                .copied()
                .map(Point::from)
                .collect();
            if is_self_intersecting(&ring) {
                report.push("Buildable polygon is self-intersecting");
            }
        }
    }

    report
}

/// Reports buildable vertices that fall outside the site, and buildable
/// edges that leave it between two inside vertices (possible on concave
/// sites). Both rings must be in the same planar space.
#[must_use]
pub fn validate_containment(site: &Polygon, buildable: &[Point]) -> Vec<String> {
    let outside: Vec<usize> = buildable
        .iter()
        .enumerate()
        .filter(|(_, p)| !site.contains_point(**p))
        .map(|(i, _)| i)
        .collect();

    if !outside.is_empty() {
        return vec![format!(
            "Buildable polygon vertices {outside:?} lie outside the site boundary"
        )];
    }

    match Polygon::new(buildable.to_vec()) {
        Ok(ring) if !site.contains_polygon(&ring) => {
            vec!["Buildable polygon crosses the site boundary".to_string()]
        }
        _ => Vec::new(),
    }
}
