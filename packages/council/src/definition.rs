//! TOML schema for council setback tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use site_planner_setback_models::SetbackRequirements;

/// One council's setback table, deserialized from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouncilDefinition {
    /// Unique council identifier (e.g., `"brisbane"`).
    pub id: String,
    /// Official name (e.g., "Brisbane City Council").
    pub name: String,
    /// State or territory abbreviation.
    pub state: String,
    /// Other names the council is known by.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Zone used when the requested zoning is missing or unknown.
    pub default_zone: String,
    /// Setbacks keyed by zone id.
    pub zones: BTreeMap<String, ZoneRequirements>,
}

impl CouncilDefinition {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every name this council answers to: id, official name, and aliases.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        [self.id.as_str(), self.name.as_str()]
            .into_iter()
            .chain(self.aliases.iter().map(String::as_str))
    }
}

/// Setback distances for one zone, in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRequirements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Zone codes used on planning scheme maps (e.g., `"LDR"`).
    #[serde(default)]
    pub aliases: Vec<String>,
    pub front: f64,
    pub side: f64,
    pub rear: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water: Option<f64>,
}

impl From<&ZoneRequirements> for SetbackRequirements {
    fn from(zone: &ZoneRequirements) -> Self {
        Self {
            front: zone.front,
            side: zone.side,
            rear: zone.rear,
            water: zone.water,
        }
    }
}
