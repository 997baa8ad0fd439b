use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::{conflict_on_unique, AppError};
use crate::models::{Sample, SampleChanges, SampleResponse, User};
use crate::pagination::{Page, PageMeta, PageParams, PageQuery};
use crate::routes::auth::MessageResponse;
use crate::state::SharedState;
use crate::validation;

const DUPLICATE_TITLE: &str = "Title already exists";

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CreateSample {
    pub title: String,
    pub description: String,
}

fn sample_not_found() -> AppError {
    AppError::NotFound("Sample not found".to_string())
}

fn missing_owner(sample: &Sample) -> AppError {
    AppError::Internal(format!(
        "Owner {} of sample {} not found",
        sample.user_id, sample.id
    ))
}

/// Attach each sample's owner, loaded in one query.
async fn with_owners(pool: &PgPool, samples: Vec<Sample>) -> Result<Vec<SampleResponse>, AppError> {
    let mut ids: Vec<i64> = samples.iter().map(|s| s.user_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let owners: HashMap<i64, User> = db::users::find_by_ids(pool, &ids)
        .await?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();

    samples
        .into_iter()
        .map(|sample| {
            let user = owners
                .get(&sample.user_id)
                .cloned()
                .ok_or_else(|| missing_owner(&sample))?;
            Ok(SampleResponse { sample, user })
        })
        .collect()
}

async fn with_owner(pool: &PgPool, sample: Sample) -> Result<SampleResponse, AppError> {
    let user = db::users::find_by_id(pool, sample.user_id)
        .await?
        .ok_or_else(|| missing_owner(&sample))?;
    Ok(SampleResponse { sample, user })
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<SampleResponse>>, AppError> {
    let params = PageParams::from_query(&query);

    let total = db::samples::count_all(&state.pool).await?;
    let samples = db::samples::list(&state.pool, &params).await?;

    Ok(Json(Page {
        data: with_owners(&state.pool, samples).await?,
        meta: PageMeta::build(total, &params),
    }))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateSample>,
) -> Result<(StatusCode, Json<SampleResponse>), AppError> {
    let title = validation::required(&req.title, "Title")?;
    let description = req.description.trim();

    if db::samples::title_taken(&state.pool, &title).await? {
        return Err(AppError::Conflict(DUPLICATE_TITLE.to_string()));
    }

    // The partial unique index still catches a concurrent create with the same title.
    let sample = db::samples::create(&state.pool, auth.user_id, &title, description)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_TITLE))?;

    tracing::info!(sample_id = sample.id, user_id = auth.user_id, "Sample created");

    Ok((
        StatusCode::CREATED,
        Json(with_owner(&state.pool, sample).await?),
    ))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<SampleResponse>, AppError> {
    let sample = db::samples::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(sample_not_found)?;
    Ok(Json(with_owner(&state.pool, sample).await?))
}

/// Serves both PUT and PATCH: only non-blank fields overwrite.
pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(changes): Json<SampleChanges>,
) -> Result<Json<SampleResponse>, AppError> {
    let mut tx = state.pool.begin().await?;

    // Existence first, so a missing sample is 404 rather than 403.
    let current = db::samples::lock_by_id(&mut *tx, id)
        .await?
        .ok_or_else(sample_not_found)?;
    current.ensure_owner(auth.user_id)?;

    let sample = if changes.is_empty() {
        tx.rollback().await?;
        current
    } else {
        let (title, description) = changes.merge(&current);
        let sample = db::samples::update(&mut *tx, id, &title, &description)
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_TITLE))?;
        tx.commit().await?;
        tracing::info!(sample_id = id, user_id = auth.user_id, "Sample updated");
        sample
    };

    Ok(Json(with_owner(&state.pool, sample).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut tx = state.pool.begin().await?;

    let current = db::samples::lock_by_id(&mut *tx, id)
        .await?
        .ok_or_else(sample_not_found)?;
    current.ensure_owner(auth.user_id)?;

    db::samples::delete(&mut *tx, id).await?;
    tx.commit().await?;

    tracing::info!(sample_id = id, user_id = auth.user_id, "Sample deleted");

    Ok(Json(MessageResponse {
        message: "Sample deleted successfully".to_string(),
    }))
}
