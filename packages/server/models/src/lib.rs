#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the site planner server.
//!
//! Calculation requests and results use the engine's own types directly;
//! this crate only adds the envelopes and the council listing shapes.

use serde::{Deserialize, Serialize};
use site_planner_council::definition::CouncilDefinition;
use site_planner_setback_models::SetbackRequirements;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    pub healthy: bool,
    /// Server crate version.
    pub version: String,
}

/// Successful response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Always `true`.
    pub success: bool,
    /// Human-readable summary for display.
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    #[must_use]
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// Failed response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Always `false`.
    pub success: bool,
    /// Summary of what went wrong.
    pub error: String,
    /// One entry per violated rule; empty for server faults.
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ApiError {
    #[must_use]
    pub fn new(error: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            errors,
        }
    }
}

/// A council as listed by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCouncil {
    pub id: String,
    pub name: String,
    pub state: String,
    pub aliases: Vec<String>,
    pub default_zone: String,
    pub zones: Vec<ApiZone>,
}

/// One zone of a council with its setbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiZone {
    pub id: String,
    pub description: Option<String>,
    pub aliases: Vec<String>,
    pub requirements: SetbackRequirements,
}

impl From<&CouncilDefinition> for ApiCouncil {
    fn from(council: &CouncilDefinition) -> Self {
        Self {
            id: council.id.clone(),
            name: council.name.clone(),
            state: council.state.clone(),
            aliases: council.aliases.clone(),
            default_zone: council.default_zone.clone(),
            zones: council
                .zones
                .iter()
                .map(|(id, zone)| ApiZone {
                    id: id.clone(),
                    description: zone.description.clone(),
                    aliases: zone.aliases.clone(),
                    requirements: SetbackRequirements::from(zone),
                })
                .collect(),
        }
    }
}

/// Query parameters for the requirements endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequirementsQueryParams {
    /// Council id, name, or alias.
    pub council: Option<String>,
    /// Zone id or code.
    pub zoning: Option<String>,
}
