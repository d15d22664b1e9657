use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::handlers::{auth, catalog, health, import, races, simulations};
use super::state::AppState;
use crate::domain::models::ServerConfig;

/// Build the full application router.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let api = Router::new()
        .route("/health/", get(health::health))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Races and seasons
        .route("/races", get(races::list_races))
        .route("/races/{id}", get(races::get_race))
        .route("/races/{id}/laps", get(races::race_laps))
        .route("/races/{id}/pit-stops", get(races::race_pit_stops))
        .route("/races/{id}/results", get(races::race_results))
        .route("/races/{id}/fastest-lap", get(races::fastest_lap))
        .route("/seasons", get(races::list_seasons))
        .route("/seasons/{year}", get(races::get_season))
        // Drivers, teams, circuits
        .route("/drivers", get(catalog::list_drivers))
        .route("/drivers/{id}", get(catalog::get_driver))
        .route("/teams", get(catalog::list_teams))
        .route("/teams/{name}", get(catalog::get_team))
        .route("/circuits", get(catalog::list_circuits))
        .route("/circuits/{id}", get(catalog::get_circuit))
        // Ingestion
        .route("/import/race/{season}/{round}", post(import::import_race))
        // Strategy
        .route("/simulations/pit-stop", get(simulations::pit_stop))
        .route("/simulations/overtake", get(simulations::overtake))
        .route("/simulations/defend", get(simulations::defend))
        .route("/simulations/weather", get(simulations::weather))
        .route(
            "/simulations",
            get(simulations::list_simulations).post(simulations::create_simulation),
        );

    let prefix = config.api_prefix.trim_end_matches('/');
    let app = if prefix.is_empty() {
        Router::new().merge(api)
    } else {
        Router::new().nest(prefix, api)
    };

    app.route("/health", get(health::liveness))
        .with_state(state)
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// The REST server.
pub struct HttpServer {
    state: AppState,
    config: ServerConfig,
}

impl HttpServer {
    pub fn new(state: AppState, config: ServerConfig) -> Self {
        Self { state, config }
    }

    /// Serve until `shutdown` resolves.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = build_router(self.state, &self.config);

        // Host may be a name ("localhost") or a bare IPv6 literal ("::").
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;
        info!(%addr, prefix = %self.config.api_prefix, "HTTP server listening");

        axum::serve(listener, router).with_graceful_shutdown(shutdown).await?;
        info!("HTTP server stopped");
        Ok(())
    }
}
