use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;

pub const SESSION_LIFETIME_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

impl Claims {
    pub fn new(user_id: i64, email: &str, jwt: &JwtConfig) -> Self {
        Self::issued_at(user_id, email, jwt, Utc::now())
    }

    pub fn issued_at(user_id: i64, email: &str, jwt: &JwtConfig, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(SESSION_LIFETIME_HOURS)).timestamp(),
            iss: jwt.issuer.clone(),
            aud: jwt.audience.clone(),
        }
    }
}

pub fn encode_token(claims: &Claims, jwt: &JwtConfig) -> Result<String, String> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(jwt.secret.as_bytes()),
    )
    .map_err(|e| format!("JWT encode failed: {e}"))
}

/// Verify signature and expiry, plus issuer and audience when configured.
pub fn decode_token(token: &str, jwt: &JwtConfig) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt.secret.as_bytes()),
        &validation(jwt),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("JWT decode failed: {e}"))
}

fn validation(jwt: &JwtConfig) -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    // A token is dead the second `exp` passes.
    validation.leeway = 0;
    let mut required = vec!["exp"];

    if let Some(issuer) = &jwt.issuer {
        validation.set_issuer(&[issuer]);
        required.push("iss");
    }

    match &jwt.audience {
        Some(audience) => {
            validation.set_audience(&[audience]);
            required.push("aud");
        }
        None => validation.validate_aud = false,
    }

    validation.set_required_spec_claims(&required);
    validation
}
