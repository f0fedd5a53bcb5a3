//! HTTP handler functions for the site planner API.

use actix_web::{HttpResponse, web};
use site_planner_server_models::{
    ApiCouncil, ApiError, ApiHealth, ApiResponse, RequirementsQueryParams,
};
use site_planner_setback::{RequirementsResolver as _, SetbackError, calculate};
use site_planner_setback_models::{BuildableAreaRequest, BuildableAreaResult, ResolvedRequirements};

use crate::AppState;
use crate::overlay::feature_collection;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/councils`
///
/// Lists every registered council with its zones and setbacks.
pub async fn councils(state: web::Data<AppState>) -> HttpResponse {
    let councils: Vec<ApiCouncil> = state
        .councils
        .councils()
        .iter()
        .map(ApiCouncil::from)
        .collect();

    HttpResponse::Ok().json(councils)
}

/// `GET /api/requirements?council=&zoning=`
///
/// Resolves the setbacks that a calculation for this council and zone
/// would use. Unknown councils answer with the default requirement set.
pub async fn requirements(
    state: web::Data<AppState>,
    params: web::Query<RequirementsQueryParams>,
) -> HttpResponse {
    let resolved = match params.council.as_deref().map(str::trim) {
        Some(council) if !council.is_empty() => {
            state.councils.resolve(council, params.zoning.as_deref())
        }
        _ => ResolvedRequirements::fallback(),
    };

    let message = match &resolved.council {
        Some(council) => format!(
            "Requirements for {council} ({})",
            resolved.zone.as_deref().unwrap_or("default zone")
        ),
        None => "Default requirements".to_string(),
    };

    HttpResponse::Ok().json(ApiResponse::ok(message, resolved))
}

/// `POST /api/calculate-buildable-area`
///
/// Runs a buildable area calculation. Validation failures are `400` with
/// every violated rule listed; a site with nothing left to build on is a
/// normal `200`.
pub async fn calculate_buildable_area(
    state: web::Data<AppState>,
    body: web::Json<BuildableAreaRequest>,
) -> HttpResponse {
    match run_calculation(state, body.into_inner()).await {
        Ok((_, result)) => {
            let message = summary(&result);
            HttpResponse::Ok().json(ApiResponse::ok(message, result))
        }
        Err(response) => response,
    }
}

/// `POST /api/calculate-buildable-area/geojson`
///
/// Same input as [`calculate_buildable_area`]; answers with a `GeoJSON`
/// `FeatureCollection` holding the site, the buildable envelope, and each
/// boundary edge with its applied setback.
pub async fn calculate_buildable_area_geojson(
    state: web::Data<AppState>,
    body: web::Json<BuildableAreaRequest>,
) -> HttpResponse {
    match run_calculation(state, body.into_inner()).await {
        Ok((request, result)) => HttpResponse::Ok().json(feature_collection(&request, &result)),
        Err(response) => response,
    }
}

/// Runs the engine on the blocking pool and maps failures to responses.
async fn run_calculation(
    state: web::Data<AppState>,
    request: BuildableAreaRequest,
) -> Result<(BuildableAreaRequest, BuildableAreaResult), HttpResponse> {
    let outcome = web::block(move || {
        let result = calculate(&request, &state.councils, &state.options);
        (request, result)
    })
    .await;

    match outcome {
        Ok((request, Ok(result))) => Ok((request, result)),
        Ok((_, Err(SetbackError::Validation { errors }))) => {
            log::warn!("Rejected buildable area request: {}", errors.join("; "));
            Err(HttpResponse::BadRequest().json(ApiError::new("Invalid inputs", errors)))
        }
        Ok((_, Err(e @ SetbackError::Geometry(_)))) => {
            log::error!("Buildable area calculation failed: {e}");
            Err(HttpResponse::InternalServerError().json(ApiError::new(
                format!("Buildable area calculation failed: {e}"),
                Vec::new(),
            )))
        }
        Err(e) => {
            log::error!("Buildable area worker failed: {e}");
            Err(HttpResponse::InternalServerError()
                .json(ApiError::new("Buildable area calculation failed", Vec::new())))
        }
    }
}

fn summary(result: &BuildableAreaResult) -> String {
    if result.is_degenerate() {
        return "No buildable area remains under current setbacks".to_string();
    }
    let mut message = format!(
        "Buildable area: {:.1} m² of {:.1} m² ({:.1}% coverage)",
        result.buildable_area_m2,
        result.site_area_m2,
        result.coverage_ratio * 100.0
    );
    if let Some(error) = &result.error {
        message.push_str(" with warnings: ");
        message.push_str(error);
    }
    message
}
