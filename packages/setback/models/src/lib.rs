#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Setback roles, requirement sets, and buildable area result types.
//!
//! These are the plain data shapes exchanged with the buildable area
//! engine. Raw request types keep every field optional so that the input
//! validator can report each missing or malformed value by name; the
//! engine itself only ever sees the validated forms.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Role assigned to a site boundary edge, which selects its setback.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SetbackRole {
    /// Edge facing the primary access road
    Front,
    /// Edge shared with a neighbouring lot
    Side,
    /// Edge opposite the frontage
    #[serde(alias = "back")]
    #[strum(to_string = "rear", serialize = "back")]
    Rear,
    /// Edge adjoining a waterway
    #[serde(alias = "waterway")]
    #[strum(to_string = "water", serialize = "waterway")]
    Water,
    /// No role assigned; receives the side setback
    Unclassified,
}

impl SetbackRole {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Front,
            Self::Side,
            Self::Rear,
            Self::Water,
            Self::Unclassified,
        ]
    }
}

/// Which requirement value a role draws its distance from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementField {
    Front,
    Side,
    Rear,
    Water,
}

impl RequirementField {
    /// The requirement field for `role`. Unclassified edges are measured
    /// against the side setback.
    #[must_use]
    pub const fn for_role(role: SetbackRole) -> Self {
        match role {
            SetbackRole::Front => Self::Front,
            SetbackRole::Side | SetbackRole::Unclassified => Self::Side,
            SetbackRole::Rear => Self::Rear,
            SetbackRole::Water => Self::Water,
        }
    }
}

/// Eight-point compass direction used as a frontage hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum CompassDirection {
    #[strum(to_string = "north", serialize = "n")]
    North,
    #[strum(
        to_string = "northeast",
        serialize = "ne",
        serialize = "north-east",
        serialize = "north_east"
    )]
    NorthEast,
    #[strum(to_string = "east", serialize = "e")]
    East,
    #[strum(
        to_string = "southeast",
        serialize = "se",
        serialize = "south-east",
        serialize = "south_east"
    )]
    SouthEast,
    #[strum(to_string = "south", serialize = "s")]
    South,
    #[strum(
        to_string = "southwest",
        serialize = "sw",
        serialize = "south-west",
        serialize = "south_west"
    )]
    SouthWest,
    #[strum(to_string = "west", serialize = "w")]
    West,
    #[strum(
        to_string = "northwest",
        serialize = "nw",
        serialize = "north-west",
        serialize = "north_west"
    )]
    NorthWest,
}

impl CompassDirection {
    /// Clockwise bearing from north, in degrees.
    #[must_use]
    pub const fn bearing_degrees(self) -> f64 {
        match self {
            Self::North => 0.0,
            Self::NorthEast => 45.0,
            Self::East => 90.0,
            Self::SouthEast => 135.0,
            Self::South => 180.0,
            Self::SouthWest => 225.0,
            Self::West => 270.0,
            Self::NorthWest => 315.0,
        }
    }

    /// Unit vector `(x, y)` with `+y` north and `+x` east.
    #[must_use]
    pub fn unit_vector(self) -> (f64, f64) {
        let bearing = self.bearing_degrees().to_radians();
        (bearing.sin(), bearing.cos())
    }

    /// Parses a frontage hint. Blank input and `"auto"` mean "no hint".
    ///
    /// # Errors
    ///
    /// Returns the unrecognized input if it is not a compass direction.
    pub fn parse_hint(hint: &str) -> Result<Option<Self>, String> {
        let trimmed = hint.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            return Ok(None);
        }
        trimmed.parse().map(Some).map_err(|_| trimmed.to_string())
    }
}

/// Interpretation of incoming `site_coords`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CoordinateSpace {
    /// Projected coordinates already in meters
    #[default]
    Planar,
    /// `[longitude, latitude]` in degrees
    Geographic,
}

/// Setback requirements as received, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementsInput {
    #[serde(default)]
    pub front: Option<f64>,
    #[serde(default)]
    pub side: Option<f64>,
    #[serde(default)]
    pub rear: Option<f64>,
    #[serde(default)]
    pub water: Option<f64>,
}

impl RequirementsInput {
    /// The complete requirement set, if `front`, `side`, and `rear` are
    /// all present. Does not check signs or finiteness.
    #[must_use]
    pub fn complete(&self) -> Option<SetbackRequirements> {
        match (self.front, self.side, self.rear) {
            (Some(front), Some(side), Some(rear)) => Some(SetbackRequirements {
                front,
                side,
                rear,
                water: self.water,
            }),
            _ => None,
        }
    }
}

impl From<SetbackRequirements> for RequirementsInput {
    fn from(req: SetbackRequirements) -> Self {
        Self {
            front: Some(req.front),
            side: Some(req.side),
            rear: Some(req.rear),
            water: req.water,
        }
    }
}

/// Validated setback distances in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetbackRequirements {
    pub front: f64,
    pub side: f64,
    pub rear: f64,
    /// Only meaningful when some edge is classified as water.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water: Option<f64>,
}

impl SetbackRequirements {
    /// Requirements used when no jurisdiction-specific set can be found.
    pub const DEFAULT: Self = Self {
        front: 4.5,
        side: 1.5,
        rear: 3.5,
        water: None,
    };

    /// Distance for `role`, and whether the side setback stood in for a
    /// missing role-specific value.
    #[must_use]
    pub fn distance_for(&self, role: SetbackRole) -> (f64, bool) {
        match RequirementField::for_role(role) {
            RequirementField::Front => (self.front, false),
            RequirementField::Side => (self.side, role == SetbackRole::Unclassified),
            RequirementField::Rear => (self.rear, false),
            RequirementField::Water => self.water.map_or((self.side, true), |water| (water, false)),
        }
    }
}

impl Default for SetbackRequirements {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Where the requirement set used for a calculation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RequirementsOrigin {
    /// Passed in with the request
    Supplied,
    /// Looked up from a council table
    Council,
    /// Hardcoded fallback after a lookup miss
    Default,
}

/// A requirement set together with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRequirements {
    pub requirements: SetbackRequirements,
    pub origin: RequirementsOrigin,
    /// Council id that matched, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub council: Option<String>,
    /// Zone key that matched, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

impl ResolvedRequirements {
    #[must_use]
    pub const fn supplied(requirements: SetbackRequirements) -> Self {
        Self {
            requirements,
            origin: RequirementsOrigin::Supplied,
            council: None,
            zone: None,
        }
    }

    #[must_use]
    pub const fn fallback() -> Self {
        Self {
            requirements: SetbackRequirements::DEFAULT,
            origin: RequirementsOrigin::Default,
            council: None,
            zone: None,
        }
    }
}

/// A single explicit edge classification as received.
///
/// `edge_index` may be omitted, in which case the entry's position in the
/// list is used. A missing or `null` role marks the edge as unclassified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeClassificationInput {
    #[serde(default, alias = "edgeIndex", alias = "index")]
    pub edge_index: Option<usize>,
    #[serde(default, rename = "type", alias = "classification", alias = "role")]
    pub role: Option<String>,
}

impl EdgeClassificationInput {
    #[must_use]
    pub fn new(edge_index: usize, role: Option<SetbackRole>) -> Self {
        Self {
            edge_index: Some(edge_index),
            role: role.map(|r| r.to_string()),
        }
    }
}

/// How null-role edges in an explicit classification are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullRolePolicy {
    /// Null roles receive the side setback
    #[default]
    DefaultToSide,
    /// Null roles fail input validation
    Reject,
}

/// Input to a buildable area calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildableAreaRequest {
    /// Site boundary, implicitly closed.
    pub site_coords: Vec<[f64; 2]>,
    /// Explicit requirements. When absent they are resolved from
    /// `jurisdiction`/`zoning`.
    #[serde(default)]
    pub requirements: Option<RequirementsInput>,
    /// Compass direction of the frontage, used only without explicit
    /// classifications.
    #[serde(default)]
    pub frontage: Option<String>,
    #[serde(default)]
    pub edge_classifications: Vec<EdgeClassificationInput>,
    #[serde(default)]
    pub coordinate_space: CoordinateSpace,
    #[serde(default, alias = "council")]
    pub jurisdiction: Option<String>,
    #[serde(default)]
    pub zoning: Option<String>,
}

/// Where the edge roles used for a calculation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ClassificationSource {
    /// Per-edge roles supplied by the caller
    Explicit,
    /// Front edge inferred from a compass hint, all others side
    Frontage,
    /// No classification input; every edge treated as side
    Default,
}

/// A complete role assignment covering every edge of a site boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeClassification {
    roles: Vec<SetbackRole>,
    source: ClassificationSource,
    /// Edges that had no role and fell back to side treatment.
    defaulted: Vec<usize>,
}

impl EdgeClassification {
    #[must_use]
    pub const fn new(
        roles: Vec<SetbackRole>,
        source: ClassificationSource,
        defaulted: Vec<usize>,
    ) -> Self {
        Self {
            roles,
            source,
            defaulted,
        }
    }

    /// Every edge as `side`.
    #[must_use]
    pub fn uniform(edge_count: usize) -> Self {
        Self {
            roles: vec![SetbackRole::Side; edge_count],
            source: ClassificationSource::Default,
            defaulted: (0..edge_count).collect(),
        }
    }

    /// Role of edge `index`. Out-of-range indices read as unclassified.
    #[must_use]
    pub fn role(&self, index: usize) -> SetbackRole {
        self.roles
            .get(index)
            .copied()
            .unwrap_or(SetbackRole::Unclassified)
    }

    #[must_use]
    pub fn roles(&self) -> &[SetbackRole] {
        &self.roles
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    #[must_use]
    pub const fn source(&self) -> ClassificationSource {
        self.source
    }

    #[must_use]
    pub fn defaulted(&self) -> &[usize] {
        &self.defaulted
    }
}

/// Which code path produced a [`BuildableAreaResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CalculationMethod {
    /// Per-edge offsets from a frontage hint or explicit classification
    EdgeOffset,
    /// Uniform side setback on every edge, no classification available
    FallbackUniform,
    /// Setbacks consumed the site; no buildable polygon remains
    DegenerateEmpty,
}

/// Setback applied to one boundary edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeSetbackDetail {
    pub role: SetbackRole,
    /// Applied inward offset in meters.
    pub distance_m: f64,
    /// Length of the boundary edge in meters.
    pub length_m: f64,
    /// `true` when the side setback stood in for a missing role value.
    pub side_fallback: bool,
}

/// Outcome of one buildable area calculation.
///
/// Assembled once per call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildableAreaResult {
    /// Buildable polygon in the request's coordinate space; empty for a
    /// degenerate result.
    pub buildable_coords: Vec<[f64; 2]>,
    pub buildable_area_m2: f64,
    pub site_area_m2: f64,
    /// `buildable_area_m2 / site_area_m2`, clamped to `[0, 1]`.
    pub coverage_ratio: f64,
    /// Keyed by boundary edge index.
    pub setback_details: BTreeMap<usize, EdgeSetbackDetail>,
    pub calculation_method: CalculationMethod,
    pub classification_source: ClassificationSource,
    pub requirements: SetbackRequirements,
    pub requirements_origin: RequirementsOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub council: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    pub coordinate_space: CoordinateSpace,
    /// Output validation findings, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BuildableAreaResult {
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        matches!(self.calculation_method, CalculationMethod::DegenerateEmpty)
    }
}
