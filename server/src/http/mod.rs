pub mod admin;
pub mod app_state;
pub mod register;
pub mod state_endpoint;
pub mod ws;

pub use app_state::AppState;

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/api/register", post(register::register))
        .route("/api/submit", post(register::submit))
        .route("/api/state", get(state_endpoint::get_state))
        .route("/api/docs/ai-contract", get(state_endpoint::get_ai_contract))
        .route("/api/admin/start", post(admin::start))
        .route("/api/admin/pause", post(admin::pause))
        .route("/api/admin/reset", post(admin::reset))
        .route("/api/admin/snake/{id}", delete(admin::remove_snake))
        .route("/api/admin/config", post(admin::update_config))
        .route("/ws", get(ws::ws_upgrade_handler))
        .layer(cors)
        .with_state(state)
}
