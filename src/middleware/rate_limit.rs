use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::middleware::client_ip;
use crate::state::SharedState;

/// Throttle sensitive auth endpoints per client IP. Each route has its own budget.
pub async fn limit_auth(State(state): State<SharedState>, req: Request, next: Next) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let client = client_ip::resolve(req.headers(), peer, &state.config.trusted_proxies);
    let path = req.uri().path();

    if !state.auth_limiter.allow(&limiter_key(path, client)) {
        tracing::warn!(%client, %path, "Auth rate limit exceeded");
        return AppError::RateLimited.into_response();
    }

    next.run(req).await
}

/// Limiter key for one client on one route.
pub fn limiter_key(path: &str, client: IpAddr) -> String {
    format!("{path}:{client}")
}
