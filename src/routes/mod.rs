pub mod auth;
pub mod samples;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::middleware::rate_limit::limit_auth;
use crate::state::SharedState;

pub fn api_routes(state: SharedState) -> Router<SharedState> {
    let auth_routes = Router::new()
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/forgot-password", post(auth::forgot_password))
        .route("/api/v1/auth/reset-password", post(auth::reset_password))
        .route_layer(axum::middleware::from_fn_with_state(state, limit_auth));

    Router::new()
        .merge(auth_routes)
        .route("/api/v1/health", get(health))
        .route("/api/v1/profile", get(auth::profile))
        // Samples
        .route("/api/v1/samples", get(samples::list).post(samples::create))
        .route(
            "/api/v1/samples/{id}",
            get(samples::get)
                .put(samples::update)
                .patch(samples::update)
                .delete(samples::delete),
        )
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Server is running" }))
}
