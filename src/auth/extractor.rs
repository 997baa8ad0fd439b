use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::RequestPartsExt;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;

use crate::auth::jwt;
use crate::error::AppError;
use crate::state::SharedState;

/// Authenticated caller, decoded from the session token on each request and
/// handed to handlers as a typed argument.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| {
                AppError::Authentication("Missing or malformed authorization header".to_string())
            })?;

        let claims = jwt::decode_token(bearer.token(), &state.config.jwt).map_err(|e| {
            tracing::debug!("Rejected session token: {e}");
            AppError::Authentication("Invalid or expired token".to_string())
        })?;

        Ok(AuthUser {
            user_id: claims.user_id,
            email: claims.email,
        })
    }
}
