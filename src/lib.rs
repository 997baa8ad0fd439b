pub mod config;
pub mod error;
pub mod state;
pub mod auth;
pub mod db;
pub mod models;
pub mod middleware;
pub mod routes;
pub mod email;
pub mod rate_limit;
pub mod validation;
pub mod pagination;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::auth::reset_token::ResetTokenSigner;
use crate::config::Config;
use crate::email::{LogMailer, Mailer, SmtpMailer};
use crate::rate_limit::RateLimiter;
use crate::state::{AppState, SharedState};

/// Build the application with the mail transport described by `config`.
pub fn build_app(pool: PgPool, config: Config) -> (Router, SharedState) {
    let mailer: Arc<dyn Mailer> = match config.smtp.as_ref().map(SmtpMailer::new) {
        Some(Ok(mailer)) => {
            tracing::info!("SMTP configured");
            Arc::new(mailer)
        }
        Some(Err(e)) => {
            tracing::warn!("SMTP not available, falling back to log mailer: {e}");
            Arc::new(LogMailer)
        }
        None => {
            tracing::warn!("SMTP not configured, outgoing email will only be logged");
            Arc::new(LogMailer)
        }
    };

    build_app_with_mailer(pool, config, mailer)
}

pub fn build_app_with_mailer(
    pool: PgPool,
    config: Config,
    mailer: Arc<dyn Mailer>,
) -> (Router, SharedState) {
    let state: SharedState = Arc::new(AppState {
        pool,
        reset_signer: ResetTokenSigner::new(config.reset_token_secret.clone()),
        auth_limiter: RateLimiter::from_config(&config.auth_rate_limit),
        mailer,
        config,
    });

    let security_headers = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ));

    let app = Router::new()
        .merge(routes::api_routes(state.clone()))
        .route("/health", axum::routing::get(health))
        .layer(security_headers)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    (app, state)
}

async fn health() -> &'static str {
    "ok"
}
