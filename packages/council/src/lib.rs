#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Council setback tables and requirement lookup.
//!
//! Councils are defined as TOML files embedded at compile time (see
//! [`registry`]). [`CouncilRegistry`] answers requirement lookups for the
//! buildable area engine by council id, name, or alias, and by zone id or
//! zone code. A council it does not know resolves to the default
//! requirement set rather than failing.

pub mod definition;
pub mod registry;

use site_planner_setback::RequirementsResolver;
use site_planner_setback_models::{RequirementsOrigin, ResolvedRequirements, SetbackRequirements};
use thiserror::Error;

use crate::definition::{CouncilDefinition, ZoneRequirements};

/// Errors that can occur while loading council definitions.
#[derive(Debug, Error)]
pub enum CouncilError {
    /// TOML did not match the council schema.
    #[error("Failed to parse council '{name}': {source}")]
    Parse {
        /// Registry name of the definition.
        name: String,
        /// Underlying parse error.
        source: toml::de::Error,
    },

    /// `default_zone` names a zone the council does not define.
    #[error("Council '{council}' default zone '{zone}' is not defined")]
    UnknownDefaultZone {
        /// Council id.
        council: String,
        /// Missing zone id.
        zone: String,
    },

    /// A zone's distances are out of range.
    #[error("Council '{council}' zone '{zone}' is invalid: {message}")]
    InvalidZone {
        /// Council id.
        council: String,
        /// Zone id.
        zone: String,
        /// Validation messages.
        message: String,
    },

    /// Two definitions share an id.
    #[error("Duplicate council id '{0}'")]
    DuplicateId(String),
}

/// Lookup table over a set of council definitions.
#[derive(Debug, Clone)]
pub struct CouncilRegistry {
    councils: Vec<CouncilDefinition>,
}

impl CouncilRegistry {
    /// Registry over the given definitions.
    ///
    /// # Errors
    ///
    /// Returns [`CouncilError::DuplicateId`] if two definitions share an id.
    pub fn new(councils: Vec<CouncilDefinition>) -> Result<Self, CouncilError> {
        for (i, council) in councils.iter().enumerate() {
            if councils[..i].iter().any(|other| other.id == council.id) {
                return Err(CouncilError::DuplicateId(council.id.clone()));
            }
        }
        Ok(Self { councils })
    }

    /// Registry over the councils embedded in this crate.
    ///
    /// # Errors
    ///
    /// Returns the first embedded definition that fails to load.
    pub fn embedded() -> Result<Self, CouncilError> {
        let registry = Self::new(registry::embedded_councils()?)?;
        log::debug!("Loaded {} council definitions", registry.councils.len());
        Ok(registry)
    }

    #[must_use]
    pub fn councils(&self) -> &[CouncilDefinition] {
        &self.councils
    }

    /// Finds a council by id, official name, or alias.
    ///
    /// Matching ignores case, whitespace, and punctuation, and tolerates a
    /// trailing "council" / "city council" / "regional council" / "shire
    /// council" suffix.
    #[must_use]
    pub fn find(&self, query: &str) -> Option<&CouncilDefinition> {
        let key = normalize(query);
        if key.is_empty() {
            return None;
        }
        let stripped = strip_council_suffix(&key);

        self.councils.iter().find(|council| {
            council.names().any(|name| {
                let candidate = normalize(name);
                candidate == key || strip_council_suffix(&candidate) == stripped
            })
        })
    }

    /// Resolves a zone of `council`, falling back to its default zone when
    /// `zoning` is absent or unknown. Returns the zone id with its table.
    #[must_use]
    pub fn zone<'a>(
        council: &'a CouncilDefinition,
        zoning: Option<&str>,
    ) -> Option<(&'a str, &'a ZoneRequirements)> {
        if let Some(query) = zoning.map(normalize).filter(|q| !q.is_empty()) {
            let found = council.zones.iter().find(|(id, zone)| {
                normalize(id) == query || zone.aliases.iter().any(|a| normalize(a) == query)
            });
            if let Some((id, zone)) = found {
                return Some((id.as_str(), zone));
            }
            log::warn!(
                "Council '{}' has no zone matching '{query}', using default zone '{}'",
                council.id,
                council.default_zone
            );
        }

        council
            .zones
            .get_key_value(&council.default_zone)
            .map(|(id, zone)| (id.as_str(), zone))
    }
}

impl RequirementsResolver for CouncilRegistry {
    fn resolve(&self, jurisdiction: &str, zoning: Option<&str>) -> ResolvedRequirements {
        let Some(council) = self.find(jurisdiction) else {
            log::warn!("Unknown council '{jurisdiction}', using default requirements");
            return ResolvedRequirements::fallback();
        };

        let Some((zone_id, zone)) = Self::zone(council, zoning) else {
            log::warn!(
                "Council '{}' has no usable zone, using default requirements",
                council.id
            );
            return ResolvedRequirements::fallback();
        };

        let requirements = SetbackRequirements::from(zone);
        log::info!(
            "Council requirements loaded for {} ({zone_id}): front {} m, side {} m, rear {} m",
            council.name,
            requirements.front,
            requirements.side,
            requirements.rear
        );

        ResolvedRequirements {
            requirements,
            origin: RequirementsOrigin::Council,
            council: Some(council.id.clone()),
            zone: Some(zone_id.to_string()),
        }
    }
}

/// Lowercase ASCII alphanumerics only.
fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn strip_council_suffix(key: &str) -> &str {
    ["citycouncil", "regionalcouncil", "shirecouncil", "council"]
        .iter()
        .find_map(|suffix| key.strip_suffix(suffix))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> CouncilRegistry {
        CouncilRegistry::embedded().unwrap()
    }

    #[test]
    fn finds_councils_by_any_name() {
        let registry = registry();
        for query in [
            "brisbane",
            "Brisbane City Council",
            "BRISBANE CITY COUNCIL",
            "bcc",
            "  Brisbane  ",
        ] {
            assert_eq!(
                registry.find(query).map(CouncilDefinition::id),
                Some("brisbane"),
                "{query}"
            );
        }
        assert_eq!(
            registry.find("Gold-Coast").map(CouncilDefinition::id),
            Some("gold_coast")
        );
        assert_eq!(
            registry.find("Logan Council").map(CouncilDefinition::id),
            Some("logan")
        );
        assert!(registry.find("Toowoomba Regional Council").is_none());
        assert!(registry.find("").is_none());
        assert!(registry.find("council").is_none());
    }

    #[test]
    fn resolves_zone_by_id_or_code() {
        let registry = registry();
        let resolved = registry.resolve("Brisbane", Some("Medium Density Residential"));
        assert_eq!(resolved.origin, RequirementsOrigin::Council);
        assert_eq!(resolved.zone.as_deref(), Some("medium_density_residential"));

        let by_code = registry.resolve("brisbane", Some("MDR"));
        assert_eq!(by_code, resolved);
    }

    #[test]
    fn unknown_zone_uses_default_zone() {
        let registry = registry();
        let resolved = registry.resolve("gold coast", Some("industrial"));
        assert_eq!(resolved.council.as_deref(), Some("gold_coast"));
        assert_eq!(resolved.zone.as_deref(), Some("low_density_residential"));

        let no_zone = registry.resolve("gold coast", None);
        assert_eq!(no_zone, resolved);
    }

    #[test]
    fn unknown_council_uses_default_requirements() {
        let resolved = registry().resolve("Atlantis Shire", Some("LDR"));
        assert_eq!(resolved.origin, RequirementsOrigin::Default);
        assert_eq!(resolved.requirements, SetbackRequirements::DEFAULT);
        assert!(resolved.council.is_none());
    }

    #[test]
    fn water_setback_comes_from_zone() {
        let resolved = registry().resolve("moreton bay", Some("rural residential"));
        assert_eq!(resolved.requirements.water, Some(20.0));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut councils = registry::all_councils();
        councils.push(councils[0].clone());
        let err = CouncilRegistry::new(councils).unwrap_err();
        assert!(matches!(err, CouncilError::DuplicateId(id) if id == "brisbane"));
    }
}
