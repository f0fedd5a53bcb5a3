//! Assigns a setback role to every site boundary edge.
//!
//! Three sources, in order of precedence:
//!
//! 1. Explicit per-edge roles. Edges left `null` or not mentioned get the
//!    side setback. A frontage hint supplied alongside is ignored.
//! 2. A compass frontage hint. The edge whose midpoint lies most nearly in
//!    that direction from the centroid becomes the front; all others are
//!    side. Rear and water are never inferred.
//! 3. Nothing. Allowed only when the side setback is zero, since otherwise
//!    every edge would silently receive a setback nobody asked for.

use site_planner_geometry::{EPSILON, Polygon};
use site_planner_setback_models::{
    ClassificationSource, CompassDirection, EdgeClassification, EdgeClassificationInput,
    SetbackRequirements, SetbackRole,
};

use crate::SetbackError;

/// Builds a complete classification for `site`.
///
/// # Errors
///
/// * [`SetbackError::Validation`] if no role is supplied anywhere, no
///   frontage hint is given, and the side setback is positive
/// * [`SetbackError::Validation`] if an explicit entry names an edge
///   outside the boundary or an unknown role (both normally caught by input
///   validation first)
pub fn classify_edges(
    site: &Polygon,
    explicit: &[EdgeClassificationInput],
    frontage: Option<CompassDirection>,
    requirements: &SetbackRequirements,
) -> Result<EdgeClassification, SetbackError> {
    let edge_count = site.len();

    if has_explicit_roles(explicit) {
        if let Some(direction) = frontage {
            log::debug!("Explicit edge classifications override frontage hint '{direction}'");
        }
        return from_explicit(edge_count, explicit);
    }

    if let Some(direction) = frontage {
        return Ok(from_frontage(site, direction));
    }

    if requirements.side > 0.0 {
        return Err(SetbackError::validation(
            "Edge classification is required: supply edge_classifications or a frontage direction",
        ));
    }

    log::warn!("No edge classification supplied; treating all {edge_count} edges as side");
    Ok(EdgeClassification::uniform(edge_count))
}

/// Whether any entry carries a role. A list of nothing but `null` roles is
/// what a frontend sends before the user has classified anything, so it
/// counts as no classification at all.
#[must_use]
pub fn has_explicit_roles(explicit: &[EdgeClassificationInput]) -> bool {
    explicit.iter().any(|entry| entry.role.is_some())
}

fn from_explicit(
    edge_count: usize,
    explicit: &[EdgeClassificationInput],
) -> Result<EdgeClassification, SetbackError> {
    let mut assigned: Vec<Option<SetbackRole>> = vec![None; edge_count];

    for (position, entry) in explicit.iter().enumerate() {
        let index = entry.edge_index.unwrap_or(position);
        if index >= edge_count {
            return Err(SetbackError::validation(format!(
                "Edge classification refers to edge {index}, but the site boundary has {edge_count} edges"
            )));
        }

        let Some(role) = entry.role.as_deref() else {
            continue;
        };
        let role: SetbackRole = role
            .trim()
            .parse()
            .map_err(|_| SetbackError::validation(format!("Unknown edge type '{role}'")))?;
        assigned[index] = Some(role);
    }

    let defaulted: Vec<usize> = assigned
        .iter()
        .enumerate()
        .filter_map(|(i, role)| role.is_none().then_some(i))
        .collect();

    if !defaulted.is_empty() {
        log::warn!("Edges {defaulted:?} have no classification; applying side setback");
    }

    let roles = assigned
        .into_iter()
        .map(|role| role.unwrap_or(SetbackRole::Side))
        .collect();

    Ok(EdgeClassification::new(
        roles,
        ClassificationSource::Explicit,
        defaulted,
    ))
}

fn from_frontage(site: &Polygon, direction: CompassDirection) -> EdgeClassification {
    let front = frontage_edge(site, direction);
    log::debug!("Frontage '{direction}' resolved to edge {front}");

    let roles = (0..site.len())
        .map(|i| {
            if i == front {
                SetbackRole::Front
            } else {
                SetbackRole::Side
            }
        })
        .collect();

    EdgeClassification::new(roles, ClassificationSource::Frontage, Vec::new())
}

/// Index of the edge whose midpoint lies most nearly in `direction` from
/// the polygon centroid. Ties go to the lowest index.
#[must_use]
pub fn frontage_edge(site: &Polygon, direction: CompassDirection) -> usize {
    let centroid = site.centroid();
    let (dx, dy) = direction.unit_vector();

    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;

    for (i, edge) in site.edges().enumerate() {
        let mid = edge.midpoint();
        let (vx, vy) = (mid.x - centroid.x, mid.y - centroid.y);
        let length = vx.hypot(vy);
        if length <= EPSILON {
            continue;
        }
        let score = (vx * dx + vy * dy) / length;
        if score > best_score + EPSILON {
            best = i;
            best_score = score;
        }
    }

    best
}
