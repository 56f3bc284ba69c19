//! `api` crate — HTTP REST API layer.
//!
//! Exposes:
//!   POST   /auth/register
//!   POST   /auth/login
//!   GET    /auth/profile
//!   PUT    /auth/update
//!   POST   /vehicles            GET /vehicles
//!   GET    /vehicles/{id}       PUT/DELETE /vehicles/{id}
//!   POST   /service-records     GET /service-records
//!   GET    /service-records/{id} PUT/DELETE /service-records/{id}
//!   POST   /reminders           GET /reminders
//!   GET    /reminders/{id}      PUT/DELETE /reminders/{id}
//!   GET    /health

pub mod error;
pub mod extract;
pub mod handlers;
pub mod validate;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use auth::JwtManager;
use db::DbPool;
use vin::VinDecoder;

/// Shared state injected into every handler. Cloning is cheap; all members
/// are handles.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub jwt: JwtManager,
    pub vin: VinDecoder,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/profile", get(handlers::auth::profile))
        .route("/auth/update", put(handlers::auth::update_profile))
        .route(
            "/vehicles",
            post(handlers::vehicles::create).get(handlers::vehicles::list),
        )
        .route(
            "/vehicles/:id",
            get(handlers::vehicles::get)
                .put(handlers::vehicles::update)
                .delete(handlers::vehicles::delete),
        )
        .route(
            "/service-records",
            post(handlers::service_records::create).get(handlers::service_records::list),
        )
        .route(
            "/service-records/:id",
            get(handlers::service_records::get)
                .put(handlers::service_records::update)
                .delete(handlers::service_records::delete),
        )
        .route(
            "/reminders",
            post(handlers::reminders::create).get(handlers::reminders::list),
        )
        .route(
            "/reminders/:id",
            get(handlers::reminders::get)
                .put(handlers::reminders::update)
                .delete(handlers::reminders::delete),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve the API until the process exits.
pub async fn serve(bind: &str, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("API server listening on {bind}");
    axum::serve(listener, app).await
}
