#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Buildable area engine.
//!
//! Takes a site boundary, per-edge setback roles (or a single frontage
//! direction), and a council's numeric setback requirements, and derives
//! the largest legal building envelope inside the site.
//!
//! The pipeline for one [`calculate`] call is:
//!
//! 1. [`validator::validate_buildable_area_inputs`] checks every input rule
//!    and reports all violations at once.
//! 2. Requirements are taken from the request or looked up through a
//!    [`RequirementsResolver`], falling back to
//!    [`SetbackRequirements::DEFAULT`].
//! 3. [`classifier::classify_edges`] assigns a role to every edge.
//! 4. [`inset::inset_polygon`] offsets each edge inward and re-stitches the
//!    corners.
//! 5. [`assemble::ResultAssembler`] packages the result, and
//!    [`validator::validate_buildable_area_result`] attaches any output
//!    findings without discarding the result.
//!
//! The engine holds no state between calls; every call owns its inputs.

pub mod assemble;
pub mod classifier;
pub mod inset;
pub mod validator;

use site_planner_geometry::{GeometryError, LocalProjection, Point, Polygon};
use site_planner_setback_models::{
    BuildableAreaRequest, BuildableAreaResult, CompassDirection, CoordinateSpace,
    NullRolePolicy, ResolvedRequirements,
};

pub use site_planner_setback_models::SetbackRequirements;

use crate::assemble::ResultAssembler;
use crate::classifier::classify_edges;
use crate::inset::{Inset, applied_setbacks, inset_polygon};
use crate::validator::{
    validate_buildable_area_inputs, validate_buildable_area_result, validate_containment,
    validate_requirements,
};

/// Errors that can occur during a buildable area calculation.
///
/// A site with no remaining buildable area is not an error; it comes back
/// as a result tagged `degenerate-empty`.
#[derive(Debug, thiserror::Error)]
pub enum SetbackError {
    /// Malformed or incomplete input. Carries one message per violated rule.
    #[error("Invalid inputs: {}", .errors.join("; "))]
    Validation {
        /// Human-readable violations, in rule order.
        errors: Vec<String>,
    },

    /// A geometric invariant failed after validation passed.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

impl SetbackError {
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            errors: vec![message.into()],
        }
    }
}

/// Tunables for one calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculationOptions {
    /// Treatment of explicit classifications whose role is `null`.
    pub null_role_policy: NullRolePolicy,
    /// Boundaries with more vertices than this are rejected as malformed.
    pub max_vertices: usize,
    /// Absolute slack, in m², when comparing buildable and site areas.
    pub area_tolerance_m2: f64,
}

impl CalculationOptions {
    /// Relative slack added on top of [`Self::area_tolerance_m2`].
    pub const RELATIVE_AREA_TOLERANCE: f64 = 1e-6;

    /// Allowed floating-point drift when comparing against `site_area_m2`.
    #[must_use]
    pub fn area_tolerance_for(&self, site_area_m2: f64) -> f64 {
        self.area_tolerance_m2 + site_area_m2.abs() * Self::RELATIVE_AREA_TOLERANCE
    }
}

impl Default for CalculationOptions {
    fn default() -> Self {
        Self {
            null_role_policy: NullRolePolicy::DefaultToSide,
            max_vertices: 1000,
            area_tolerance_m2: 0.01,
        }
    }
}

/// Source of council setback requirements.
///
/// Implementations must never fail: a lookup miss returns the default
/// requirement set tagged with [`site_planner_setback_models::RequirementsOrigin::Default`].
pub trait RequirementsResolver {
    fn resolve(&self, jurisdiction: &str, zoning: Option<&str>) -> ResolvedRequirements;
}

/// Resolver that knows no jurisdictions and always answers with
/// [`SetbackRequirements::DEFAULT`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRequirements;

impl RequirementsResolver for DefaultRequirements {
    fn resolve(&self, jurisdiction: &str, _zoning: Option<&str>) -> ResolvedRequirements {
        log::warn!("No setback table for '{jurisdiction}', using default requirements");
        ResolvedRequirements::fallback()
    }
}

/// Site boundary converted to planar meters, plus the projection needed to
/// map results back to the caller's coordinate space.
pub(crate) struct PlanarSite {
    pub polygon: Polygon,
    pub projection: Option<LocalProjection>,
}

impl PlanarSite {
    pub(crate) fn from_coords(
        coords: &[[f64; 2]],
        space: CoordinateSpace,
    ) -> Result<Self, GeometryError> {
        let (points, projection) = project_coords(coords, space);
        Ok(Self {
            polygon: Polygon::new(points)?,
            projection,
        })
    }
}

/// Converts raw coordinates to planar meters, along with the projection
/// used for geographic input. Points are not deduplicated here; the
/// validator and [`PlanarSite`] both apply
/// [`site_planner_geometry::dedup_ring`] to the projected points so they
/// agree on the edge count.
pub(crate) fn project_coords(
    coords: &[[f64; 2]],
    space: CoordinateSpace,
) -> (Vec<Point>, Option<LocalProjection>) {
    let points: Vec<Point> = coords.iter().copied().map(Point::from).collect();
    match space {
        CoordinateSpace::Planar => (points, None),
        CoordinateSpace::Geographic => match LocalProjection::centered_on(&points) {
            Some(projection) => (projection.project_all(&points), Some(projection)),
            None => (points, None),
        },
    }
}

/// Picks the requirement set for a request: explicit values win, then a
/// jurisdiction lookup, then the hardcoded default.
///
/// Assumes the request already passed input validation.
#[must_use]
pub fn resolve_requirements(
    request: &BuildableAreaRequest,
    resolver: &dyn RequirementsResolver,
) -> ResolvedRequirements {
    if let Some(requirements) = request.requirements.as_ref().and_then(|r| r.complete()) {
        return ResolvedRequirements::supplied(requirements);
    }

    match request.jurisdiction.as_deref().map(str::trim) {
        Some(jurisdiction) if !jurisdiction.is_empty() => {
            log::info!(
                "Looking up requirements for {jurisdiction}, zoning: {}",
                request.zoning.as_deref().unwrap_or("(default)")
            );
            resolver.resolve(jurisdiction, request.zoning.as_deref())
        }
        _ => {
            log::warn!("No requirements or jurisdiction supplied, using default requirements");
            ResolvedRequirements::fallback()
        }
    }
}

/// Runs a complete buildable area calculation.
///
/// # Errors
///
/// * [`SetbackError::Validation`] if any input rule is violated, or no
///   classification source exists while side setbacks are required
/// * [`SetbackError::Geometry`] if a geometric invariant fails after
///   validation (indicates a validation gap)
pub fn calculate(
    request: &BuildableAreaRequest,
    resolver: &dyn RequirementsResolver,
    options: &CalculationOptions,
) -> Result<BuildableAreaResult, SetbackError> {
    let report = validate_buildable_area_inputs(request, options);
    if !report.is_valid() {
        log::warn!("Invalid buildable area inputs: {}", report.errors().join("; "));
        return Err(SetbackError::Validation {
            errors: report.into_errors(),
        });
    }

    let site = PlanarSite::from_coords(&request.site_coords, request.coordinate_space)?;
    log::info!(
        "Calculating buildable area for {} boundary points ({})",
        site.polygon.len(),
        request.coordinate_space
    );

    let resolved = resolve_requirements(request, resolver);
    let requirement_errors = validate_requirements(&resolved.requirements.into());
    if !requirement_errors.is_empty() {
        return Err(SetbackError::Validation {
            errors: requirement_errors,
        });
    }

    // Validation already rejected unknown directions
    let frontage = request
        .frontage
        .as_deref()
        .and_then(|hint| CompassDirection::parse_hint(hint).ok().flatten());

    let classification = classify_edges(
        &site.polygon,
        &request.edge_classifications,
        frontage,
        &resolved.requirements,
    )?;

    let details = applied_setbacks(&site.polygon, &classification, &resolved.requirements);
    let distances: Vec<f64> = details.iter().map(|d| d.distance_m).collect();
    let inset = inset_polygon(&site.polygon, &distances);

    let mut findings = Vec::new();
    match &inset {
        Inset::Buildable(points) => findings.extend(validate_containment(&site.polygon, points)),
        Inset::Degenerate(reason) => {
            log::debug!("Inset of {} edges is degenerate: {reason:?}", distances.len());
        }
    }

    let result = ResultAssembler::new(&site.polygon, site.projection, request.coordinate_space)
        .classification(&classification)
        .requirements(&resolved)
        .setbacks(details)
        .inset(inset)
        .assemble();

    findings.extend(validate_buildable_area_result(&result, options).into_errors());

    if findings.is_empty() {
        if result.is_degenerate() {
            log::info!("No buildable area remains under current setbacks");
        } else {
            log::info!(
                "Buildable area calculated: {:.1} m² of {:.1} m² ({:.1}%)",
                result.buildable_area_m2,
                result.site_area_m2,
                result.coverage_ratio * 100.0
            );
        }
        return Ok(result);
    }

    let message = findings.join("; ");
    log::warn!("Buildable area result failed validation: {message}");
    Ok(BuildableAreaResult {
        error: Some(message),
        ..result
    })
}
