//! Compile-time registry of council setback tables.
//!
//! Each entry is a `(name, toml_content)` pair embedded via `include_str!`.
//! Adding a council requires creating a TOML file in `councils/` and adding
//! a corresponding entry here.

use site_planner_setback::validator::validate_requirements;
use site_planner_setback_models::SetbackRequirements;

use crate::CouncilError;
use crate::definition::CouncilDefinition;

/// Number of registered councils. Updated when new councils are added.
/// Enforced by a test.
#[cfg(test)]
const EXPECTED_COUNCIL_COUNT: usize = 5;

/// Embedded TOML council definitions.
const COUNCIL_TOMLS: &[(&str, &str)] = &[
    ("brisbane", include_str!("../councils/brisbane.toml")),
    ("gold_coast", include_str!("../councils/gold_coast.toml")),
    (
        "sunshine_coast",
        include_str!("../councils/sunshine_coast.toml"),
    ),
    ("moreton_bay", include_str!("../councils/moreton_bay.toml")),
    ("logan", include_str!("../councils/logan.toml")),
];

/// Parses and checks one council definition.
///
/// # Errors
///
/// * [`CouncilError::Parse`] if the TOML does not match the schema
/// * [`CouncilError::UnknownDefaultZone`] if `default_zone` names no zone
/// * [`CouncilError::InvalidZone`] if a zone has a missing, negative, or
///   non-finite distance
pub fn parse_council(name: &str, toml_str: &str) -> Result<CouncilDefinition, CouncilError> {
    let council: CouncilDefinition =
        toml::de::from_str(toml_str).map_err(|source| CouncilError::Parse {
            name: name.to_string(),
            source,
        })?;

    if !council.zones.contains_key(&council.default_zone) {
        return Err(CouncilError::UnknownDefaultZone {
            council: council.id,
            zone: council.default_zone,
        });
    }

    for (zone_id, zone) in &council.zones {
        let errors = validate_requirements(&SetbackRequirements::from(zone).into());
        if !errors.is_empty() {
            return Err(CouncilError::InvalidZone {
                council: council.id.clone(),
                zone: zone_id.clone(),
                message: errors.join("; "),
            });
        }
    }

    Ok(council)
}

/// Parses every embedded council definition.
///
/// # Errors
///
/// Returns the first definition that fails [`parse_council`].
pub fn embedded_councils() -> Result<Vec<CouncilDefinition>, CouncilError> {
    COUNCIL_TOMLS
        .iter()
        .map(|(name, toml_str)| parse_council(name, toml_str))
        .collect()
}

/// Returns all registered councils.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse. Since these are
/// compile-time constants, parse failures indicate a development error
/// and are caught during CI.
#[must_use]
pub fn all_councils() -> Vec<CouncilDefinition> {
    COUNCIL_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            parse_council(name, toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse council '{name}': {e}"))
        })
        .collect()
}
