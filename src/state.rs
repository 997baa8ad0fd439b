use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::reset_token::ResetTokenSigner;
use crate::config::Config;
use crate::email::Mailer;
use crate::rate_limit::RateLimiter;

pub type SharedState = Arc<AppState>;

/// Everything a handler needs, passed explicitly through axum's `State`.
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub mailer: Arc<dyn Mailer>,
    pub reset_signer: ResetTokenSigner,
    pub auth_limiter: RateLimiter,
}
