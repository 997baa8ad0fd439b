use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::extractor::AuthUser;
use crate::auth::jwt::{encode_token, Claims};
use crate::auth::{password, reset_token};
use crate::db;
use crate::email;
use crate::error::{conflict_on_unique, AppError};
use crate::models::User;
use crate::state::SharedState;
use crate::validation;

const DUPLICATE_EMAIL: &str = "User with this email already exists";
const FORGOT_PASSWORD_MESSAGE: &str = "If the email exists, a reset link has been sent";

// Missing fields deserialize as empty so they surface as validation errors.
#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub user: User,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

fn invalid_credentials() -> AppError {
    AppError::Authentication("Invalid credentials".to_string())
}

fn invalid_reset_token() -> AppError {
    AppError::Validation("Invalid or expired reset token".to_string())
}

fn require_password(value: &str, field: &str) -> Result<(), AppError> {
    if value.is_empty() {
        Err(AppError::Validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let email = validation::email(&req.email)?;
    let first_name = validation::required(&req.first_name, "First name")?;
    let last_name = validation::required(&req.last_name, "Last name")?;
    require_password(&req.password, "Password")?;
    password::check_policy(&req.password).map_err(AppError::Validation)?;

    if db::users::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
    }

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;

    // The unique index still catches a concurrent registration of the same email.
    let user = db::users::create(&state.pool, &email, &pw_hash, &first_name, &last_name)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_EMAIL))?;

    tracing::info!(user_id = user.id, "User registered");

    Ok((StatusCode::CREATED, Json(RegisterResponse { user })))
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = validation::email(&req.email)?;
    require_password(&req.password, "Password")?;

    let user = db::users::find_by_email(&state.pool, &email).await?;

    // Unknown email, wrong password and inactive account all look the same.
    let authenticated = match &user {
        Some(user) => password::verify(&req.password, &user.password_hash) && user.is_active,
        None => password::verify_dummy(&req.password),
    };
    let Some(user) = user.filter(|_| authenticated) else {
        tracing::info!("Rejected login attempt");
        return Err(invalid_credentials());
    };

    let claims = Claims::new(user.id, &user.email, &state.config.jwt);
    let token = encode_token(&claims, &state.config.jwt).map_err(AppError::Internal)?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(LoginResponse { token, user }))
}

pub async fn forgot_password(
    State(state): State<SharedState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = validation::email(&req.email)?;

    let Some(user) = db::users::find_by_email(&state.pool, &email).await? else {
        return Ok(MessageResponse::new(FORGOT_PASSWORD_MESSAGE));
    };

    let issued = state.reset_signer.issue().map_err(AppError::Internal)?;

    let mut tx = state.pool.begin().await?;
    // Serialises concurrent requests for the same user so only one token stays valid.
    db::users::lock_by_id(&mut *tx, user.id).await?;
    let revoked = db::password_reset_tokens::invalidate_for_user(&mut *tx, user.id).await?;
    db::password_reset_tokens::create(
        &mut *tx,
        user.id,
        &issued.token_hash,
        Utc::now() + reset_token::lifetime(),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(user_id = user.id, revoked, "Password reset token issued");

    let reset_url = format!(
        "{}/reset-password?token={}",
        state.config.frontend_url, issued.signed
    );
    email::send_password_reset(state.mailer.as_ref(), &user.email, &reset_url)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to send reset email: {e}")))?;

    Ok(MessageResponse::new(FORGOT_PASSWORD_MESSAGE))
}

pub async fn reset_password(
    State(state): State<SharedState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let token = validation::required(&req.token, "Token")?;
    require_password(&req.new_password, "New password")?;
    password::check_policy(&req.new_password).map_err(AppError::Validation)?;

    let raw = state.reset_signer.verify(&token).map_err(|e| {
        tracing::debug!("Rejected reset token: {e}");
        invalid_reset_token()
    })?;
    let token_hash = reset_token::hash_raw(&raw);

    // Hash before taking row locks.
    let pw_hash = password::hash(&req.new_password).map_err(AppError::Internal)?;

    let mut tx = state.pool.begin().await?;

    let stored = db::password_reset_tokens::lock_valid_by_hash(&mut *tx, &token_hash)
        .await?
        .ok_or_else(invalid_reset_token)?;

    // Tokens cascade with their user, so this only fires on an inconsistent database.
    let user = db::users::find_by_id(&mut *tx, stored.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    db::users::update_password(&mut *tx, user.id, &pw_hash).await?;
    if !db::password_reset_tokens::mark_used(&mut *tx, stored.id).await? {
        return Err(invalid_reset_token());
    }

    tx.commit().await?;

    tracing::info!(user_id = user.id, "Password reset completed");

    // The password change is committed; a failed confirmation must not undo it.
    if let Err(e) = email::send_password_reset_success(state.mailer.as_ref(), &user.email).await {
        tracing::warn!(user_id = user.id, "Failed to send password reset confirmation: {e}");
    }

    Ok(MessageResponse::new("Password has been reset successfully"))
}

pub async fn profile(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<User>, AppError> {
    let user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}
