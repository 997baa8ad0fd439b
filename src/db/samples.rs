use crate::models::Sample;
use crate::pagination::PageParams;

// Soft-deleted rows (`deleted_at` set) are invisible to every query below.

pub async fn list<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    params: &PageParams,
) -> Result<Vec<Sample>, sqlx::Error> {
    // The ORDER BY clause comes from a whitelist, never from raw input.
    if params.all {
        let sql = format!(
            "SELECT * FROM samples WHERE deleted_at IS NULL ORDER BY {}, id",
            params.order_clause()
        );
        return sqlx::query_as::<_, Sample>(&sql).fetch_all(executor).await;
    }

    let sql = format!(
        "SELECT * FROM samples WHERE deleted_at IS NULL ORDER BY {}, id LIMIT $1 OFFSET $2",
        params.order_clause()
    );
    sqlx::query_as::<_, Sample>(&sql)
        .bind(params.per_page)
        .bind(params.offset())
        .fetch_all(executor)
        .await
}

pub async fn count_all<'e, E: sqlx::PgExecutor<'e>>(executor: E) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM samples WHERE deleted_at IS NULL")
        .fetch_one(executor)
        .await?;
    Ok(row.0)
}

pub async fn title_taken<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    title: &str,
) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM samples WHERE title = $1 AND deleted_at IS NULL)",
    )
    .bind(title)
    .fetch_one(executor)
    .await?;
    Ok(row.0)
}

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    user_id: i64,
    title: &str,
    description: &str,
) -> Result<Sample, sqlx::Error> {
    sqlx::query_as::<_, Sample>(
        "INSERT INTO samples (user_id, title, description) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(user_id)
    .bind(title)
    .bind(description)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: i64,
) -> Result<Option<Sample>, sqlx::Error> {
    sqlx::query_as::<_, Sample>("SELECT * FROM samples WHERE id = $1 AND deleted_at IS NULL")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn lock_by_id<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: i64,
) -> Result<Option<Sample>, sqlx::Error> {
    sqlx::query_as::<_, Sample>(
        "SELECT * FROM samples WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn update<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: i64,
    title: &str,
    description: &str,
) -> Result<Sample, sqlx::Error> {
    sqlx::query_as::<_, Sample>(
        "UPDATE samples SET title = $2, description = $3, updated_at = now()
         WHERE id = $1 AND deleted_at IS NULL RETURNING *",
    )
    .bind(id)
    .bind(title)
    .bind(description)
    .fetch_one(executor)
    .await
}

/// Soft delete: the row stays, stamped with `deleted_at`.
pub async fn delete<'e, E: sqlx::PgExecutor<'e>>(executor: E, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE samples SET deleted_at = now(), updated_at = now()
         WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .execute(executor)
    .await?;
    Ok(())
}
