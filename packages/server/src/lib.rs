#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the buildable area engine.
//!
//! A thin transport layer: requests are deserialized straight into the
//! engine's request type, calculations run on the blocking thread pool,
//! and results come back in a `{success, message, data}` envelope or as a
//! `GeoJSON` overlay for map frontends.

mod handlers;
pub mod interactive;
pub mod overlay;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, error, middleware, web};
use site_planner_council::CouncilRegistry;
use site_planner_server_models::ApiError;
use site_planner_setback::CalculationOptions;
use site_planner_setback_models::NullRolePolicy;

/// Shared application state.
pub struct AppState {
    /// Council setback tables used to resolve requirements.
    pub councils: CouncilRegistry,
    /// Engine tunables applied to every calculation.
    pub options: CalculationOptions,
}

/// Default listen address when `BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
/// Default listen port when `PORT` is unset or unparseable.
pub const DEFAULT_PORT: u16 = 8080;

/// Where the server listens and how it runs calculations.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    pub options: CalculationOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            options: CalculationOptions::default(),
        }
    }
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT`, and `SITE_PLANNER_STRICT_CLASSIFICATION`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let strict = var("SITE_PLANNER_STRICT_CLASSIFICATION").is_some_and(|v| is_truthy(&v));

        Self {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            port: var("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
            options: options_for(strict),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

/// Engine options for the given classification strictness.
///
/// Strict mode rejects explicit classifications that leave edges without
/// a role instead of treating them as sides.
#[must_use]
pub fn options_for(strict: bool) -> CalculationOptions {
    CalculationOptions {
        null_role_policy: if strict {
            NullRolePolicy::Reject
        } else {
            NullRolePolicy::DefaultToSide
        },
        ..CalculationOptions::default()
    }
}

/// Registers the `/api` routes. Shared by [`run_server`] and tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        log::warn!("Rejected request body: {message}");
        error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(ApiError::new("Invalid request body", vec![message])),
        )
        .into()
    });

    cfg.service(
        web::scope("/api")
            .app_data(json_config)
            .route("/health", web::get().to(handlers::health))
            .route("/councils", web::get().to(handlers::councils))
            .route("/requirements", web::get().to(handlers::requirements))
            .route(
                "/calculate-buildable-area",
                web::post().to(handlers::calculate_buildable_area),
            )
            .route(
                "/calculate-buildable-area/geojson",
                web::post().to(handlers::calculate_buildable_area_geojson),
            ),
    );
}

/// Starts the site planner API server with settings from the environment.
///
/// See [`ServerConfig::from_env`]. The caller provides the async runtime.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the council tables fail to load,
/// or the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    serve(ServerConfig::from_env()).await
}

/// Loads the embedded council tables and serves the `/api` routes on
/// `config.bind_addr:config.port`.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the council tables fail to load,
/// or the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn serve(config: ServerConfig) -> std::io::Result<()> {
    // The CLI may have installed a logger already
    let _ = pretty_env_logger::try_init_custom_env("RUST_LOG");

    log::info!("Loading council setback tables...");
    let councils = CouncilRegistry::embedded().map_err(std::io::Error::other)?;
    log::info!("Loaded {} councils", councils.councils().len());

    let ServerConfig {
        bind_addr,
        port,
        options,
    } = config;
    if options.null_role_policy == NullRolePolicy::Reject {
        log::info!("Strict edge classification enabled");
    }

    let state = web::Data::new(AppState { councils, options });

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
